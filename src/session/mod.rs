//! Anchor session: the two-tap measurement state machine
//!
//! The session never performs I/O. Transitions that need a capture return a
//! [`CaptureRequest`] for the caller to issue, and completions are fed back in
//! through [`AnchorSession::on_capture_complete`] and
//! [`AnchorSession::on_upload_complete`].

mod anchor;
mod core;

pub use anchor::Anchor;
pub use core::{
    AnchorSession, CaptureRequest, CaptureRequestId, CaptureTransition, MeasurementResult,
    Placement, SessionState, UploadRequest, MAX_ANCHORS,
};
