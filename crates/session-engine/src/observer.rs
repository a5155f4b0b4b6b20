//! Notifications emitted by a sampling session.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use punchmeter_common::error::PunchError;
use punchmeter_motion_model::ClassificationResult;

/// Receiver of session notifications. All methods default to no-ops.
pub trait SessionObserver: Send {
    /// The session started tracking.
    fn on_armed(&mut self) {}

    /// A sample was accepted; `normalized` is in `[0, 1]`.
    fn on_progress(&mut self, _normalized: f64) {}

    /// The session finished. Called exactly once per completed round.
    fn on_result(&mut self, _result: &ClassificationResult) {}

    /// `start` was refused.
    fn on_rejected(&mut self, _reason: &PunchError) {}
}

/// A notification as a value, for channels and logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionNotification {
    Armed,
    Progress { normalized: f64 },
    Result { result: ClassificationResult },
    Rejected { reason: String },
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SessionObserver for NullObserver {}

impl SessionObserver for mpsc::UnboundedSender<SessionNotification> {
    fn on_armed(&mut self) {
        self.send(SessionNotification::Armed).ok();
    }

    fn on_progress(&mut self, normalized: f64) {
        self.send(SessionNotification::Progress { normalized }).ok();
    }

    fn on_result(&mut self, result: &ClassificationResult) {
        self.send(SessionNotification::Result {
            result: result.clone(),
        })
        .ok();
    }

    fn on_rejected(&mut self, reason: &PunchError) {
        self.send(SessionNotification::Rejected {
            reason: reason.to_string(),
        })
        .ok();
    }
}

/// Keeps every notification in memory. Clones share the same log.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    log: Arc<Mutex<Vec<SessionNotification>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, notification: SessionNotification) {
        if let Ok(mut log) = self.log.lock() {
            log.push(notification);
        }
    }

    /// Copy of everything recorded so far.
    pub fn notifications(&self) -> Vec<SessionNotification> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn armed_count(&self) -> usize {
        self.notifications()
            .iter()
            .filter(|n| matches!(n, SessionNotification::Armed))
            .count()
    }

    pub fn progress(&self) -> Vec<f64> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                SessionNotification::Progress { normalized } => Some(normalized),
                _ => None,
            })
            .collect()
    }

    pub fn results(&self) -> Vec<ClassificationResult> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                SessionNotification::Result { result } => Some(result),
                _ => None,
            })
            .collect()
    }

    pub fn rejections(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                SessionNotification::Rejected { reason } => Some(reason),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut log) = self.log.lock() {
            log.clear();
        }
    }
}

impl SessionObserver for RecordingObserver {
    fn on_armed(&mut self) {
        self.push(SessionNotification::Armed);
    }

    fn on_progress(&mut self, normalized: f64) {
        self.push(SessionNotification::Progress { normalized });
    }

    fn on_result(&mut self, result: &ClassificationResult) {
        self.push(SessionNotification::Result {
            result: result.clone(),
        });
    }

    fn on_rejected(&mut self, reason: &PunchError) {
        self.push(SessionNotification::Rejected {
            reason: reason.to_string(),
        });
    }
}
