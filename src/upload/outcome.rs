use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of one upload attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum UploadOutcome {
    /// 2xx response; the raw body as text
    Success(String),
    /// Response outside the 2xx range
    HttpError(u16),
    /// The request never produced a response
    TransportError(String),
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Success(_))
    }
}

impl fmt::Display for UploadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadOutcome::Success(body) => write!(f, "success: {}", body),
            UploadOutcome::HttpError(code) => write!(f, "http error {}", code),
            UploadOutcome::TransportError(message) => write!(f, "transport error: {}", message),
        }
    }
}
