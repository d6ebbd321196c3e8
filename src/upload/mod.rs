//! Upload of a captured frame and its measured distance
//!
//! The frame travels as base64-encoded PNG text in a form-encoded POST,
//! next to the distance in meters.

mod encode;
mod mock;
mod outcome;

#[cfg(feature = "http")]
mod client;

pub use encode::{encode_image_field, encode_png, format_distance, UploadForm};
pub use mock::MockUploader;
pub use outcome::UploadOutcome;

#[cfg(feature = "http")]
pub use client::HttpUploader;

use crate::capture::CapturedFrame;
use async_trait::async_trait;

/// Sends a frame and distance to the remote service.
///
/// Every failure is reported through [`UploadOutcome`]; implementations never
/// retry, time out or cancel on their own.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn send(&self, frame: &CapturedFrame, distance_meters: f64) -> UploadOutcome;

    /// Where uploads go, for logs
    fn endpoint(&self) -> String;
}
