//! PunchMeter Motion Sources
//!
//! Produces live 3-axis motion samples for a sampling session. Uses a
//! pluggable source architecture:
//!
//! - **IIO:** Linux Industrial I/O accelerometer via sysfs
//! - **Replay:** a recorded JSONL sample trace
//! - **Synthetic:** a generated punch-shaped pulse
//! - **Stub:** samples pushed by hand, for tests
//! - **Unavailable:** a platform without motion sensing
//!
//! Consumers register a handler with [`MotionSource::subscribe`] and hold the
//! returned [`Subscription`] for as long as they want samples. Dropping the
//! subscription releases it.

pub mod backends;
pub mod replay;
pub mod stub;
pub mod synthetic;

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use punchmeter_common::error::PunchResult;
use punchmeter_motion_model::MotionSample;

pub use backends::{detect_motion_source, IioAccelerometerSource, UnavailableSource};
pub use replay::ReplaySource;
pub use stub::{SampleFeed, StubSource};
pub use synthetic::{punch_profile, PunchProfile, SyntheticPunchSource};

/// Callback invoked once per delivered sample, in delivery order.
pub type SampleHandler = Box<dyn FnMut(MotionSample) + Send + 'static>;

/// Trait for motion sample producers.
pub trait MotionSource: Send {
    /// Source name for logging.
    fn name(&self) -> &str;

    /// Check if the source can deliver samples on this system.
    fn is_available(&self) -> bool;

    /// Request a delivery interval. Best effort: consumers must accept
    /// whatever rate actually arrives.
    fn set_sample_interval(&mut self, interval: Duration);

    /// Start delivering samples to `handler` until the returned subscription
    /// is unsubscribed or dropped.
    fn subscribe(&mut self, handler: SampleHandler) -> PunchResult<Subscription>;
}

/// Handle to a live subscription.
///
/// Unsubscribing is idempotent and also happens on drop, so a session that
/// disappears can never be called back into.
#[derive(Debug)]
pub struct Subscription {
    active: Arc<AtomicBool>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl Subscription {
    /// Wrap an activity flag owned jointly with the delivering side.
    pub fn new(active: Arc<AtomicBool>) -> Self {
        Self { active, task: None }
    }

    /// Spawn a delivery task. The task receives the activity flag and must
    /// check it before invoking the handler.
    pub fn spawn<F, Fut>(deliver: F) -> Self
    where
        F: FnOnce(Arc<AtomicBool>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let active = Arc::new(AtomicBool::new(true));
        let task = tokio::spawn(deliver(active.clone()));
        Self {
            active,
            task: Some(task),
        }
    }

    /// Whether samples may still be delivered.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Stop delivery. Calling this on an already released subscription is a
    /// no-op.
    pub fn unsubscribe(&mut self) {
        if self.active.swap(false, Ordering::SeqCst) {
            tracing::debug!("Motion subscription released");
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
