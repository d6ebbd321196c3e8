//! Session state and transitions

use super::Anchor;
use crate::capture::{CaptureError, CapturedFrame};
use crate::geometry::{distance, Point3};
use crate::upload::UploadOutcome;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Anchors a session accepts before further taps are ignored
pub const MAX_ANCHORS: usize = 2;

/// The distance between the two anchors of a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementResult {
    pub distance_meters: f64,
}

/// Coarse phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Empty,
    OneAnchor,
    Measured,
}

/// Identifies one capture request so late completions can be recognised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureRequestId(Uuid);

impl CaptureRequestId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CaptureRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A capture the caller must issue after the second anchor is placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRequest {
    pub id: CaptureRequestId,
}

/// What a call to [`AnchorSession::place_anchor`] did
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    /// First anchor stored
    First,
    /// Second anchor stored and the distance computed
    Measured {
        result: MeasurementResult,
        capture: CaptureRequest,
    },
    /// Session already holds two anchors; nothing changed
    Ignored,
}

/// What a call to [`AnchorSession::on_capture_complete`] did
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureTransition {
    /// Frame stored, uploads are now possible
    Stored,
    /// Capture failed; the session keeps its measurement without a frame
    Failed(CaptureError),
    /// Completion does not belong to the outstanding request and was dropped
    Stale,
}

/// Everything an upload needs, borrowed from the session
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub frame: Arc<CapturedFrame>,
    pub distance_meters: f64,
}

#[derive(Debug, Clone)]
enum CaptureSlot {
    Pending(CaptureRequestId),
    Stored(Arc<CapturedFrame>),
    Failed,
}

#[derive(Debug, Clone)]
enum Phase {
    Empty,
    OneAnchor {
        first: Anchor,
    },
    Measured {
        anchors: [Anchor; MAX_ANCHORS],
        result: MeasurementResult,
        capture: CaptureSlot,
    },
}

/// Tracks up to two anchors, the measurement between them and the captured frame
#[derive(Debug, Clone)]
pub struct AnchorSession {
    phase: Phase,
    last_outcome: Option<UploadOutcome>,
    uploads_completed: u32,
}

impl AnchorSession {
    pub fn new() -> Self {
        Self {
            phase: Phase::Empty,
            last_outcome: None,
            uploads_completed: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        match self.phase {
            Phase::Empty => SessionState::Empty,
            Phase::OneAnchor { .. } => SessionState::OneAnchor,
            Phase::Measured { .. } => SessionState::Measured,
        }
    }

    /// Anchors placed so far, in placement order
    pub fn anchors(&self) -> &[Anchor] {
        match &self.phase {
            Phase::Empty => &[],
            Phase::OneAnchor { first } => std::slice::from_ref(first),
            Phase::Measured { anchors, .. } => &anchors[..],
        }
    }

    pub fn measurement(&self) -> Option<MeasurementResult> {
        match &self.phase {
            Phase::Measured { result, .. } => Some(*result),
            _ => None,
        }
    }

    /// The stored frame, once a capture has succeeded
    pub fn frame(&self) -> Option<&Arc<CapturedFrame>> {
        match &self.phase {
            Phase::Measured {
                capture: CaptureSlot::Stored(frame),
                ..
            } => Some(frame),
            _ => None,
        }
    }

    /// Id of the capture still awaiting completion, if any
    pub fn pending_capture(&self) -> Option<CaptureRequestId> {
        match &self.phase {
            Phase::Measured {
                capture: CaptureSlot::Pending(id),
                ..
            } => Some(*id),
            _ => None,
        }
    }

    pub fn last_outcome(&self) -> Option<&UploadOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn uploads_completed(&self) -> u32 {
        self.uploads_completed
    }

    /// Place an anchor at a hit-test position.
    ///
    /// The second anchor computes the distance and returns the capture the
    /// caller has to issue. Any further placement is ignored.
    pub fn place_anchor(&mut self, point: Point3) -> Placement {
        let phase = std::mem::replace(&mut self.phase, Phase::Empty);
        let (phase, placement) = match phase {
            Phase::Empty => {
                let first = Anchor::new(point);
                debug!(anchor = %first.id(), pose = %point, "First anchor placed");
                (Phase::OneAnchor { first }, Placement::First)
            }
            Phase::OneAnchor { first } => {
                let second = Anchor::new(point);
                let result = MeasurementResult {
                    distance_meters: distance(first.pose(), second.pose()),
                };
                let capture = CaptureRequest {
                    id: CaptureRequestId::new(),
                };
                info!(
                    distance_meters = result.distance_meters,
                    capture = %capture.id,
                    "Second anchor placed, measurement complete"
                );
                (
                    Phase::Measured {
                        anchors: [first, second],
                        result,
                        capture: CaptureSlot::Pending(capture.id),
                    },
                    Placement::Measured { result, capture },
                )
            }
            measured @ Phase::Measured { .. } => {
                debug!(pose = %point, "Session already measured, tap ignored");
                (measured, Placement::Ignored)
            }
        };
        self.phase = phase;
        placement
    }

    /// Feed back the result of a capture request
    pub fn on_capture_complete(
        &mut self,
        id: CaptureRequestId,
        result: Result<CapturedFrame, CaptureError>,
    ) -> CaptureTransition {
        let Phase::Measured { capture, .. } = &mut self.phase else {
            debug!(capture = %id, "Capture completed outside a measurement, dropped");
            return CaptureTransition::Stale;
        };

        match capture {
            CaptureSlot::Pending(pending) if *pending == id => {}
            _ => {
                debug!(capture = %id, "Capture completion is stale, dropped");
                return CaptureTransition::Stale;
            }
        }

        match result {
            Ok(frame) => {
                info!(
                    capture = %id,
                    width = frame.width(),
                    height = frame.height(),
                    "Frame captured"
                );
                *capture = CaptureSlot::Stored(Arc::new(frame));
                CaptureTransition::Stored
            }
            Err(error) => {
                warn!(capture = %id, %error, "Frame capture failed");
                *capture = CaptureSlot::Failed;
                CaptureTransition::Failed(error)
            }
        }
    }

    /// The frame and distance to upload, or `None` while sending is inert
    pub fn upload_request(&self) -> Option<UploadRequest> {
        match &self.phase {
            Phase::Measured {
                result,
                capture: CaptureSlot::Stored(frame),
                ..
            } => Some(UploadRequest {
                frame: Arc::clone(frame),
                distance_meters: result.distance_meters,
            }),
            _ => None,
        }
    }

    /// Record a finished upload; anchors, measurement and frame are untouched
    pub fn on_upload_complete(&mut self, outcome: &UploadOutcome) {
        self.uploads_completed += 1;
        self.last_outcome = Some(outcome.clone());
    }

    /// Drop anchors, measurement and frame and start over.
    ///
    /// Any capture still in flight becomes stale.
    pub fn reset(&mut self) {
        info!(anchors = self.anchors().len(), "Session reset");
        *self = Self::new();
    }
}

impl Default for AnchorSession {
    fn default() -> Self {
        Self::new()
    }
}
