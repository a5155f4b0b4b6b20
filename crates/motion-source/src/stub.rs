//! Stub source for tests: samples are pushed by hand through a [`SampleFeed`].

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use punchmeter_common::error::{PunchError, PunchResult};
use punchmeter_motion_model::MotionSample;

use crate::{MotionSource, SampleHandler, Subscription};

#[derive(Default)]
struct Shared {
    handler: Mutex<Option<(Arc<AtomicBool>, SampleHandler)>>,
    subscribe_calls: AtomicUsize,
    interval_ms: AtomicUsize,
}

/// A source that delivers exactly the samples pushed into its feed.
pub struct StubSource {
    shared: Arc<Shared>,
    available: bool,
}

/// Test-side handle used to push samples into a [`StubSource`].
#[derive(Clone)]
pub struct SampleFeed {
    shared: Arc<Shared>,
}

impl StubSource {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            available: true,
        }
    }

    /// A stub that reports no sensor, like a platform without one.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub fn feed(&self) -> SampleFeed {
        SampleFeed {
            shared: self.shared.clone(),
        }
    }
}

impl Default for StubSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionSource for StubSource {
    fn name(&self) -> &str {
        "stub"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn set_sample_interval(&mut self, interval: Duration) {
        self.shared
            .interval_ms
            .store(interval.as_millis() as usize, Ordering::SeqCst);
    }

    fn subscribe(&mut self, handler: SampleHandler) -> PunchResult<Subscription> {
        if !self.available {
            return Err(PunchError::unsupported_platform(self.name()));
        }
        self.shared.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        let active = Arc::new(AtomicBool::new(true));
        let mut slot = self
            .shared
            .handler
            .lock()
            .map_err(|_| PunchError::motion_source("stub handler lock poisoned"))?;
        *slot = Some((active.clone(), handler));
        Ok(Subscription::new(active))
    }
}

impl SampleFeed {
    /// Deliver `sample` to the current subscriber. Returns `false` when no
    /// active subscription exists.
    pub fn push(&self, sample: MotionSample) -> bool {
        let Ok(mut slot) = self.shared.handler.lock() else {
            return false;
        };
        match slot.as_mut() {
            Some((active, handler)) if active.load(Ordering::SeqCst) => {
                handler(sample);
                true
            }
            _ => false,
        }
    }

    /// Whether a subscriber is currently receiving samples.
    pub fn is_subscribed(&self) -> bool {
        self.shared
            .handler
            .lock()
            .map(|slot| {
                slot.as_ref()
                    .is_some_and(|(active, _)| active.load(Ordering::SeqCst))
            })
            .unwrap_or(false)
    }

    /// How many times `subscribe` has been called.
    pub fn subscribe_calls(&self) -> usize {
        self.shared.subscribe_calls.load(Ordering::SeqCst)
    }

    /// Last interval requested through `set_sample_interval`, in milliseconds.
    pub fn requested_interval_ms(&self) -> usize {
        self.shared.interval_ms.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn push_reaches_subscriber_until_unsubscribed() {
        let mut source = StubSource::new();
        let feed = source.feed();
        assert!(!feed.push(MotionSample::along_x(1.0)));

        let (tx, rx) = mpsc::channel();
        let mut subscription = source
            .subscribe(Box::new(move |sample| {
                tx.send(sample).ok();
            }))
            .unwrap();
        assert!(feed.is_subscribed());
        assert!(feed.push(MotionSample::along_x(2.0)));
        assert_eq!(rx.try_recv().unwrap().magnitude(), 2.0);

        subscription.unsubscribe();
        assert!(!feed.is_subscribed());
        assert!(!feed.push(MotionSample::along_x(3.0)));
        assert!(rx.try_recv().is_err());
        assert_eq!(feed.subscribe_calls(), 1);
    }

    #[test]
    fn unavailable_stub_refuses_subscription() {
        let mut source = StubSource::unavailable();
        assert!(!source.is_available());
        let result = source.subscribe(Box::new(|_| {}));
        assert!(matches!(result, Err(PunchError::UnsupportedPlatform { .. })));
    }
}
