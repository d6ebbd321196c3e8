//! In-memory frame source for tests and synthetic runs

use super::{CaptureError, CapturedFrame, FrameSource, ViewDescriptor};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Behavior {
    Solid([u8; 4]),
    Fail(CaptureError),
}

/// Produces solid-color frames, or fails every capture
#[derive(Debug)]
pub struct MockFrameSource {
    behavior: Behavior,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockFrameSource {
    /// Frames filled with `rgba`
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            behavior: Behavior::Solid(rgba),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every capture fails with `error`
    pub fn failing(error: CaptureError) -> Self {
        Self {
            behavior: Behavior::Fail(error),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Wait before completing each capture
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of captures requested so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockFrameSource {
    fn default() -> Self {
        Self::solid([0, 0, 0, 255])
    }
}

#[async_trait]
impl FrameSource for MockFrameSource {
    async fn capture(&self, view: &ViewDescriptor) -> Result<CapturedFrame, CaptureError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            Behavior::Solid(rgba) => CapturedFrame::solid(view.width, view.height, *rgba),
            Behavior::Fail(error) => Err(error.clone()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::SurfaceHandle;

    #[tokio::test]
    async fn test_mock_solid_capture() {
        let source = MockFrameSource::solid([1, 2, 3, 4]);
        let view = ViewDescriptor::new(SurfaceHandle(0), 3, 3);
        let frame = source.capture(&view).await.unwrap();
        assert_eq!(frame.pixels().len(), 36);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_failing_capture() {
        let source = MockFrameSource::failing(CaptureError::CopyDenied);
        let view = ViewDescriptor::new(SurfaceHandle(0), 3, 3);
        assert_eq!(
            source.capture(&view).await.unwrap_err(),
            CaptureError::CopyDenied
        );
        assert_eq!(source.name(), "mock");
    }
}
