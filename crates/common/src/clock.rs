//! Session timing.
//!
//! Every sampling session is anchored to a monotonic epoch captured when the
//! session arms. Trace samples and log lines express time as offsets from
//! that epoch.

use std::time::{Duration, Instant};

/// A clock that provides monotonic offsets relative to the moment a
/// session was armed.
#[derive(Debug, Clone)]
pub struct SessionClock {
    /// The instant the session armed.
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,
}

impl SessionClock {
    /// Create a new clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Time elapsed since the epoch.
    pub fn elapsed(&self) -> Duration {
        self.epoch.elapsed()
    }

    /// Milliseconds elapsed since the epoch.
    pub fn elapsed_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Wall-clock time at epoch.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// Whether `limit` has passed since the epoch, allowing `tolerance` of slack.
    pub fn has_exceeded(&self, limit: Duration, tolerance: Duration) -> bool {
        self.elapsed() > limit + tolerance
    }
}
