//! ar-measure: two-point AR distance measurement
//!
//! A user taps two points on detected surfaces; the distance between the
//! resulting anchors is measured, the rendered view is captured, and the
//! snapshot plus distance can be uploaded to a remote service.
//!
//! - [`geometry`]: points and Euclidean distance
//! - [`session`]: the anchor state machine
//! - [`capture`]: pixel snapshots behind the [`capture::FrameSource`] trait
//! - [`upload`]: PNG/base64 form upload behind the [`upload::Uploader`] trait
//! - [`presenter`]: the single status line shown to the user
//! - [`controller`]: the event queue tying them together

pub mod capture;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod presenter;
pub mod session;
pub mod upload;

// Re-export commonly used types
pub use capture::{CaptureError, CapturedFrame, FrameSource, ViewDescriptor};
pub use config::MeasureConfig;
pub use controller::{ControllerHandle, MeasureController, MeasureEvent};
pub use error::{MeasureError, Result};
pub use geometry::{distance, Point3};
pub use presenter::{ResultPresenter, Status};
pub use session::{Anchor, AnchorSession, MeasurementResult, SessionState};
pub use upload::{UploadOutcome, Uploader};
