//! HTTP uploader
//!
//! Posts the upload form to the measurement service with `reqwest`.

use super::{UploadForm, UploadOutcome, Uploader};
use crate::capture::CapturedFrame;
use crate::config::{UploadConfig, DEFAULT_BASE_URL, DEFAULT_UPLOAD_PATH};
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Uploader backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpUploader {
    /// HTTP client for requests
    client: reqwest::Client,
    /// Scheme, host and port of the service
    base_url: String,
    /// Path of the upload route
    upload_path: String,
}

impl HttpUploader {
    /// Uploader for the default service address
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Uploader for a custom service address
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            upload_path: DEFAULT_UPLOAD_PATH.to_string(),
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::with_base_url(config.base_url.clone()).with_path(config.path.clone())
    }

    /// Override the upload route
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.upload_path = path.into();
        self
    }

    fn upload_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.upload_path.starts_with('/') {
            format!("{}{}", base, self.upload_path)
        } else {
            format!("{}/{}", base, self.upload_path)
        }
    }
}

impl Default for HttpUploader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn send(&self, frame: &CapturedFrame, distance_meters: f64) -> UploadOutcome {
        let form = match UploadForm::build(frame, distance_meters) {
            Ok(form) => form,
            Err(e) => {
                warn!(error = %e, "Failed to encode frame for upload");
                return UploadOutcome::TransportError(format!("failed to encode frame: {}", e));
            }
        };

        let url = self.upload_url();
        debug!(
            %url,
            image_len = form.image.len(),
            distance = %form.distance,
            "Posting measurement"
        );

        let fields = form.fields();
        let response = match self.client.post(&url).form(&fields[..]).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(%url, error = %e, "Upload request failed");
                return UploadOutcome::TransportError(e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Upload rejected");
            return UploadOutcome::HttpError(status.as_u16());
        }

        match response.text().await {
            Ok(body) => {
                info!(%url, status = status.as_u16(), "Upload accepted");
                UploadOutcome::Success(body)
            }
            Err(e) => {
                warn!(%url, error = %e, "Failed to read upload response");
                UploadOutcome::TransportError(format!("failed to read response: {}", e))
            }
        }
    }

    fn endpoint(&self) -> String {
        self.upload_url()
    }
}
