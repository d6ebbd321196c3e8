//! Measurement controller
//!
//! Owns the session and presenter and applies every event to them one at a
//! time from a single queue. Captures and uploads run as spawned tasks and
//! report back by posting a completion event onto that same queue, so no
//! state is ever touched from two places at once.

use crate::capture::{CaptureError, CapturedFrame, FrameSource, ViewDescriptor};
use crate::error::{MeasureError, Result};
use crate::geometry::Point3;
use crate::presenter::{ResultPresenter, Status};
use crate::session::{AnchorSession, CaptureRequestId, CaptureTransition, Placement};
use crate::upload::{UploadOutcome, Uploader};
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// Everything that can happen to a measurement
#[derive(Debug)]
pub enum MeasureEvent {
    /// The user tapped a detected surface at this world position
    Tap(Point3),
    CaptureComplete {
        id: CaptureRequestId,
        result: std::result::Result<CapturedFrame, CaptureError>,
    },
    /// The user asked to send the measurement
    Send,
    UploadComplete {
        attempt: u64,
        outcome: UploadOutcome,
    },
    Reset,
    Shutdown,
}

/// Cloneable sender used by hosts to post user events
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    tx: UnboundedSender<MeasureEvent>,
}

impl ControllerHandle {
    pub fn tap(&self, point: Point3) -> Result<()> {
        self.post(MeasureEvent::Tap(point))
    }

    pub fn send(&self) -> Result<()> {
        self.post(MeasureEvent::Send)
    }

    pub fn reset(&self) -> Result<()> {
        self.post(MeasureEvent::Reset)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.post(MeasureEvent::Shutdown)
    }

    pub fn post(&self, event: MeasureEvent) -> Result<()> {
        self.tx.send(event).map_err(|_| MeasureError::QueueClosed)
    }
}

pub struct MeasureController {
    session: AnchorSession,
    presenter: ResultPresenter,
    view: ViewDescriptor,
    frames: Arc<dyn FrameSource>,
    uploader: Arc<dyn Uploader>,
    events_tx: UnboundedSender<MeasureEvent>,
    events_rx: UnboundedReceiver<MeasureEvent>,
    next_attempt: u64,
    /// Spawned captures and uploads whose completion has not been handled yet
    in_flight: usize,
}

impl MeasureController {
    pub fn new(
        view: ViewDescriptor,
        frames: Arc<dyn FrameSource>,
        uploader: Arc<dyn Uploader>,
    ) -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        Self {
            session: AnchorSession::new(),
            presenter: ResultPresenter::new(),
            view,
            frames,
            uploader,
            events_tx,
            events_rx,
            next_attempt: 1,
            in_flight: 0,
        }
    }

    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle {
            tx: self.events_tx.clone(),
        }
    }

    pub fn session(&self) -> &AnchorSession {
        &self.session
    }

    pub fn presenter(&self) -> &ResultPresenter {
        &self.presenter
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Wait for the next event and apply it. Returns `false` on shutdown.
    pub async fn process_next(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => self.handle_event(event),
            None => false,
        }
    }

    /// Process events until shutdown
    pub async fn run(mut self) -> Self {
        info!(
            frames = self.frames.name(),
            endpoint = %self.uploader.endpoint(),
            "Measurement controller started"
        );
        while self.process_next().await {}
        info!("Measurement controller stopped");
        self
    }

    /// Process events until the queue is empty and no task is outstanding.
    ///
    /// Returns `false` if a shutdown event was handled.
    pub async fn run_until_idle(&mut self) -> bool {
        loop {
            let event = if self.in_flight > 0 {
                match self.events_rx.recv().await {
                    Some(event) => event,
                    None => return false,
                }
            } else {
                match self.events_rx.try_recv() {
                    Ok(event) => event,
                    Err(_) => return true,
                }
            };

            if !self.handle_event(event) {
                return false;
            }
        }
    }

    /// Apply one event. Returns `false` on shutdown.
    pub fn handle_event(&mut self, event: MeasureEvent) -> bool {
        match event {
            MeasureEvent::Tap(point) => self.on_tap(point),
            MeasureEvent::CaptureComplete { id, result } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                self.on_capture_complete(id, result);
            }
            MeasureEvent::Send => self.on_send(),
            MeasureEvent::UploadComplete { attempt, outcome } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                self.on_upload_complete(attempt, outcome);
            }
            MeasureEvent::Reset => {
                self.session.reset();
                self.presenter.show(Status::Idle);
            }
            MeasureEvent::Shutdown => return false,
        }
        true
    }

    fn on_tap(&mut self, point: Point3) {
        match self.session.place_anchor(point) {
            Placement::First | Placement::Ignored => {}
            Placement::Measured { result, capture } => {
                self.presenter.show_distance(result.distance_meters);
                self.spawn_capture(capture.id);
            }
        }
    }

    fn spawn_capture(&mut self, id: CaptureRequestId) {
        debug!(capture = %id, source = self.frames.name(), "Requesting capture");
        self.in_flight += 1;

        let frames = Arc::clone(&self.frames);
        let view = self.view;
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let work = tokio::spawn(async move { frames.capture(&view).await });
            let result = match work.await {
                Ok(result) => result,
                Err(e) => {
                    warn!(capture = %id, error = %e, "Capture task aborted");
                    Err(CaptureError::CopyFailed(format!("capture task aborted: {}", e)))
                }
            };
            let _ = tx.send(MeasureEvent::CaptureComplete { id, result });
        });
    }

    fn on_capture_complete(
        &mut self,
        id: CaptureRequestId,
        result: std::result::Result<CapturedFrame, CaptureError>,
    ) {
        if let CaptureTransition::Failed(error) = self.session.on_capture_complete(id, result) {
            if let Some(measurement) = self.session.measurement() {
                self.presenter.show(Status::CaptureFailed {
                    distance_meters: measurement.distance_meters,
                    message: error.to_string(),
                });
            }
        }
    }

    fn on_send(&mut self) {
        let Some(request) = self.session.upload_request() else {
            debug!(state = ?self.session.state(), "Send ignored, nothing to upload");
            return;
        };

        let attempt = self.next_attempt;
        self.next_attempt += 1;
        self.in_flight += 1;
        info!(
            attempt,
            distance_meters = request.distance_meters,
            endpoint = %self.uploader.endpoint(),
            "Starting upload"
        );

        let uploader = Arc::clone(&self.uploader);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let work = tokio::spawn(async move {
                uploader
                    .send(&request.frame, request.distance_meters)
                    .await
            });
            let outcome = match work.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(attempt, error = %e, "Upload task aborted");
                    UploadOutcome::TransportError(format!("upload task aborted: {}", e))
                }
            };
            let _ = tx.send(MeasureEvent::UploadComplete { attempt, outcome });
        });
    }

    fn on_upload_complete(&mut self, attempt: u64, outcome: UploadOutcome) {
        if !outcome.is_success() {
            warn!(attempt, %outcome, "Upload did not succeed");
        }
        self.session.on_upload_complete(&outcome);
        self.presenter.show_outcome(&outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{MockFrameSource, SurfaceHandle};
    use crate::session::SessionState;
    use crate::upload::MockUploader;
    use async_trait::async_trait;
    use std::time::Duration;

    struct PanickingFrameSource;

    #[async_trait]
    impl FrameSource for PanickingFrameSource {
        async fn capture(&self, _view: &ViewDescriptor) -> std::result::Result<CapturedFrame, CaptureError> {
            panic!("surface went away");
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    struct PanickingUploader;

    #[async_trait]
    impl Uploader for PanickingUploader {
        async fn send(&self, _frame: &CapturedFrame, _distance_meters: f64) -> UploadOutcome {
            panic!("connection pool poisoned");
        }

        fn endpoint(&self) -> String {
            "panicking".to_string()
        }
    }

    fn view() -> ViewDescriptor {
        ViewDescriptor::new(SurfaceHandle(1), 4, 4)
    }

    fn controller_with(
        frames: MockFrameSource,
        uploader: MockUploader,
    ) -> (MeasureController, Arc<MockFrameSource>, Arc<MockUploader>) {
        let frames = Arc::new(frames);
        let uploader = Arc::new(uploader);
        let controller = MeasureController::new(view(), frames.clone(), uploader.clone());
        (controller, frames, uploader)
    }

    async fn measure(controller: &mut MeasureController) {
        let handle = controller.handle();
        handle.tap(Point3::new(0.0, 0.0, 0.0)).unwrap();
        handle.tap(Point3::new(3.0, 4.0, 0.0)).unwrap();
        assert!(controller.run_until_idle().await);
    }

    #[tokio::test]
    async fn test_two_taps_measure_and_capture() {
        let (mut controller, frames, _) = controller_with(
            MockFrameSource::default(),
            MockUploader::new(UploadOutcome::Success("ok".to_string())),
        );

        measure(&mut controller).await;

        assert_eq!(controller.session().state(), SessionState::Measured);
        assert!(controller.session().frame().is_some());
        assert_eq!(controller.presenter().text(), "Distance: 5.00 m");
        assert_eq!(frames.calls(), 1);
        assert_eq!(controller.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_third_tap_does_not_recapture() {
        let (mut controller, frames, _) = controller_with(
            MockFrameSource::default(),
            MockUploader::new(UploadOutcome::Success("ok".to_string())),
        );
        measure(&mut controller).await;

        controller.handle().tap(Point3::new(9.0, 9.0, 9.0)).unwrap();
        controller.run_until_idle().await;

        assert_eq!(controller.session().anchors().len(), 2);
        assert_eq!(
            controller.session().measurement().unwrap().distance_meters,
            5.0
        );
        assert_eq!(frames.calls(), 1);
    }

    #[tokio::test]
    async fn test_upload_success_shows_body() {
        let (mut controller, _, uploader) = controller_with(
            MockFrameSource::default(),
            MockUploader::new(UploadOutcome::Success("OK:5.0".to_string())),
        );
        measure(&mut controller).await;

        controller.handle().send().unwrap();
        controller.run_until_idle().await;

        assert!(controller.presenter().text().contains("OK:5.0"));
        assert_eq!(uploader.sent(), vec![5.0]);
        assert_eq!(controller.session().uploads_completed(), 1);
    }

    #[tokio::test]
    async fn test_upload_http_error_shows_code() {
        let (mut controller, _, _) = controller_with(
            MockFrameSource::default(),
            MockUploader::new(UploadOutcome::HttpError(500)),
        );
        measure(&mut controller).await;

        controller.handle().send().unwrap();
        controller.run_until_idle().await;

        assert!(controller.presenter().text().contains("500"));
    }

    #[tokio::test]
    async fn test_upload_transport_error_shows_message() {
        let (mut controller, _, _) = controller_with(
            MockFrameSource::default(),
            MockUploader::new(UploadOutcome::TransportError("timeout".to_string())),
        );
        measure(&mut controller).await;

        controller.handle().send().unwrap();
        controller.run_until_idle().await;

        assert!(controller.presenter().text().contains("timeout"));
    }

    #[tokio::test]
    async fn test_capture_failure_makes_send_inert() {
        let (mut controller, _, uploader) = controller_with(
            MockFrameSource::failing(CaptureError::CopyDenied),
            MockUploader::new(UploadOutcome::Success("never".to_string())),
        );
        measure(&mut controller).await;

        assert_eq!(controller.session().state(), SessionState::Measured);
        assert!(controller.session().frame().is_none());
        assert!(controller.presenter().text().contains("capture failed"));
        let updates = controller.presenter().updates();

        controller.handle().send().unwrap();
        controller.run_until_idle().await;

        assert!(uploader.sent().is_empty());
        assert_eq!(controller.presenter().updates(), updates);
        assert_eq!(controller.session().uploads_completed(), 0);
        assert_eq!(controller.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_panicking_capture_is_reported_as_failure() {
        let mut controller = MeasureController::new(
            view(),
            Arc::new(PanickingFrameSource),
            Arc::new(MockUploader::new(UploadOutcome::Success("never".to_string()))),
        );
        let handle = controller.handle();
        handle.tap(Point3::ORIGIN).unwrap();
        handle.tap(Point3::new(0.0, 2.0, 0.0)).unwrap();

        let idle = tokio::time::timeout(Duration::from_secs(2), controller.run_until_idle()).await;
        assert!(matches!(idle, Ok(true)));

        assert_eq!(controller.in_flight(), 0);
        assert!(controller.session().frame().is_none());
        assert!(controller.presenter().text().contains("capture failed"));
        assert!(controller.presenter().text().contains("2.00"));
    }

    #[tokio::test]
    async fn test_panicking_upload_is_reported_as_transport_error() {
        let mut controller = MeasureController::new(
            view(),
            Arc::new(MockFrameSource::default()),
            Arc::new(PanickingUploader),
        );
        measure(&mut controller).await;

        controller.handle().send().unwrap();
        let idle = tokio::time::timeout(Duration::from_secs(2), controller.run_until_idle()).await;
        assert!(matches!(idle, Ok(true)));

        assert_eq!(controller.in_flight(), 0);
        assert_eq!(controller.session().uploads_completed(), 1);
        assert!(matches!(
            controller.session().last_outcome(),
            Some(UploadOutcome::TransportError(message)) if message.contains("upload task aborted")
        ));
        assert!(controller.presenter().text().starts_with("Upload failed:"));
    }

    #[tokio::test]
    async fn test_send_before_measurement_is_inert() {
        let (mut controller, _, uploader) = controller_with(
            MockFrameSource::default(),
            MockUploader::new(UploadOutcome::Success("never".to_string())),
        );

        let handle = controller.handle();
        handle.send().unwrap();
        handle.tap(Point3::ORIGIN).unwrap();
        handle.send().unwrap();
        controller.run_until_idle().await;

        assert!(uploader.sent().is_empty());
        assert_eq!(controller.presenter().status(), &Status::Idle);
    }

    #[tokio::test]
    async fn test_resend_last_completed_wins() {
        let (mut controller, _, uploader) = controller_with(
            MockFrameSource::default(),
            MockUploader::new(UploadOutcome::HttpError(599))
                .then(
                    UploadOutcome::Success("slow".to_string()),
                    Some(Duration::from_millis(80)),
                )
                .then(UploadOutcome::HttpError(500), None),
        );
        measure(&mut controller).await;

        let handle = controller.handle();
        handle.send().unwrap();
        handle.send().unwrap();

        // Both uploads start before either completes.
        assert!(controller.process_next().await);
        assert!(controller.process_next().await);
        assert_eq!(controller.in_flight(), 2);

        // The fast second attempt lands first.
        assert!(controller.process_next().await);
        assert!(controller.presenter().text().contains("500"));

        assert!(controller.process_next().await);
        assert_eq!(controller.presenter().text(), "Result: slow");
        assert_eq!(controller.session().uploads_completed(), 2);
        assert_eq!(uploader.sent(), vec![5.0, 5.0]);
    }

    #[tokio::test]
    async fn test_reset_drops_in_flight_capture() {
        let (mut controller, _, _) = controller_with(
            MockFrameSource::default().with_delay(Duration::from_millis(30)),
            MockUploader::new(UploadOutcome::Success("ok".to_string())),
        );

        let handle = controller.handle();
        handle.tap(Point3::ORIGIN).unwrap();
        handle.tap(Point3::new(1.0, 0.0, 0.0)).unwrap();
        handle.reset().unwrap();
        controller.run_until_idle().await;

        assert_eq!(controller.session().state(), SessionState::Empty);
        assert!(controller.session().frame().is_none());
        assert_eq!(controller.presenter().status(), &Status::Idle);

        // A new measurement works after the reset.
        handle.tap(Point3::ORIGIN).unwrap();
        handle.tap(Point3::new(0.0, 0.0, 2.0)).unwrap();
        controller.run_until_idle().await;
        assert_eq!(controller.presenter().text(), "Distance: 2.00 m");
        assert!(controller.session().frame().is_some());
    }

    #[test]
    fn test_handle_reports_closed_queue() {
        let (controller, _, _) = controller_with(
            MockFrameSource::default(),
            MockUploader::new(UploadOutcome::Success("ok".to_string())),
        );
        let handle = controller.handle();
        drop(controller);

        assert!(matches!(handle.tap(Point3::ORIGIN), Err(MeasureError::QueueClosed)));
        assert!(matches!(handle.send(), Err(MeasureError::QueueClosed)));
    }

    #[tokio::test]
    async fn test_shutdown_stops_run() {
        let (controller, _, _) = controller_with(
            MockFrameSource::default(),
            MockUploader::new(UploadOutcome::Success("ok".to_string())),
        );
        let handle = controller.handle();
        handle.tap(Point3::ORIGIN).unwrap();
        handle.shutdown().unwrap();

        let controller = controller.run().await;
        assert_eq!(controller.session().state(), SessionState::OneAnchor);
    }
}
