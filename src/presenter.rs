//! User-visible status line
//!
//! Exactly one status is shown at a time; every update replaces the previous
//! one, whatever it was.

use crate::upload::UploadOutcome;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tracing::info;

/// The status currently on screen
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Status {
    /// Nothing measured yet
    Idle,
    /// Two anchors placed
    Measured { distance_meters: f64 },
    /// Snapshot could not be taken, so nothing can be sent
    CaptureFailed {
        distance_meters: f64,
        message: String,
    },
    Uploaded { body: String },
    HttpError { code: u16 },
    TransportError { message: String },
}

impl From<&UploadOutcome> for Status {
    fn from(outcome: &UploadOutcome) -> Self {
        match outcome {
            UploadOutcome::Success(body) => Status::Uploaded { body: body.clone() },
            UploadOutcome::HttpError(code) => Status::HttpError { code: *code },
            UploadOutcome::TransportError(message) => Status::TransportError {
                message: message.clone(),
            },
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => write!(f, "Tap two points to measure"),
            Status::Measured { distance_meters } => write!(f, "Distance: {:.2} m", distance_meters),
            Status::CaptureFailed {
                distance_meters,
                message,
            } => write!(
                f,
                "Distance: {:.2} m (capture failed: {})",
                distance_meters, message
            ),
            Status::Uploaded { body } => write!(f, "Result: {}", body),
            Status::HttpError { code } => write!(f, "Error: HTTP {}", code),
            Status::TransportError { message } => write!(f, "Upload failed: {}", message),
        }
    }
}

/// Holds the current status and when it last changed
#[derive(Debug, Clone)]
pub struct ResultPresenter {
    status: Status,
    updated_at: DateTime<Utc>,
    updates: u64,
}

impl ResultPresenter {
    pub fn new() -> Self {
        Self {
            status: Status::Idle,
            updated_at: Utc::now(),
            updates: 0,
        }
    }

    /// Replace the current status
    pub fn show(&mut self, status: Status) {
        info!(status = %status, "Status updated");
        self.status = status;
        self.updated_at = Utc::now();
        self.updates += 1;
    }

    pub fn show_distance(&mut self, distance_meters: f64) {
        self.show(Status::Measured { distance_meters });
    }

    pub fn show_outcome(&mut self, outcome: &UploadOutcome) {
        self.show(Status::from(outcome));
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// The status as displayed
    pub fn text(&self) -> String {
        self.status.to_string()
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Number of times the status has been replaced
    pub fn updates(&self) -> u64 {
        self.updates
    }
}

impl Default for ResultPresenter {
    fn default() -> Self {
        Self::new()
    }
}
