//! Scripted uploader for tests

use super::{UploadOutcome, Uploader};
use crate::capture::CapturedFrame;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Replies with scripted outcomes in order, optionally after a delay each.
///
/// Once the script runs out, the last outcome repeats.
#[derive(Debug)]
pub struct MockUploader {
    script: Mutex<VecDeque<(UploadOutcome, Option<Duration>)>>,
    last: Mutex<UploadOutcome>,
    sent: Mutex<Vec<f64>>,
}

impl MockUploader {
    /// Always reply with `outcome`
    pub fn new(outcome: UploadOutcome) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            last: Mutex::new(outcome),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Queue an outcome for the next unanswered send
    pub fn then(self, outcome: UploadOutcome, delay: Option<Duration>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back((outcome, delay));
        }
        self
    }

    /// Distances received so far, in call order
    pub fn sent(&self) -> Vec<f64> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Uploader for MockUploader {
    async fn send(&self, _frame: &CapturedFrame, distance_meters: f64) -> UploadOutcome {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(distance_meters);
        }

        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        match next {
            Some((outcome, delay)) => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                if let Ok(mut last) = self.last.lock() {
                    *last = outcome.clone();
                }
                outcome
            }
            None => self
                .last
                .lock()
                .map(|o| o.clone())
                .unwrap_or_else(|e| e.into_inner().clone()),
        }
    }

    fn endpoint(&self) -> String {
        "mock://upload".to_string()
    }
}
