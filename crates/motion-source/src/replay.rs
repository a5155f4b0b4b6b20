//! Replay of recorded sample traces.

use std::path::Path;
use std::sync::atomic::Ordering;
use std::time::Duration;

use punchmeter_common::config::FAST_SAMPLE_INTERVAL_MS;
use punchmeter_common::error::{PunchError, PunchResult};
use punchmeter_motion_model::trace::{is_time_ordered, parse_trace, TraceSample};

use crate::{MotionSource, SampleHandler, Subscription};

/// Delivers a fixed trace in real time, then goes quiet.
///
/// Timed samples are delivered at their recorded offset from the moment of
/// subscription. Untimed samples follow the previous one after the sample
/// interval.
pub struct ReplaySource {
    name: String,
    samples: Vec<TraceSample>,
    interval: Duration,
}

impl ReplaySource {
    pub fn new(name: impl Into<String>, samples: Vec<TraceSample>) -> Self {
        Self {
            name: name.into(),
            samples,
            interval: Duration::from_millis(FAST_SAMPLE_INTERVAL_MS),
        }
    }

    /// Load a JSONL trace from disk.
    pub fn from_path(path: &Path) -> PunchResult<Self> {
        if !path.exists() {
            return Err(PunchError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let samples = parse_trace(&content)
            .map_err(|e| PunchError::trace(format!("{}: {e}", path.display())))?;
        if !is_time_ordered(&samples) {
            return Err(PunchError::trace(format!(
                "{}: sample offsets must not go backwards",
                path.display()
            )));
        }
        tracing::info!(path = %path.display(), samples = samples.len(), "Loaded sample trace");
        Ok(Self::new("replay", samples))
    }

    /// Delivery time of each sample relative to subscription.
    pub fn schedule(&self) -> Vec<Duration> {
        let mut next = Duration::ZERO;
        self.samples
            .iter()
            .map(|sample| {
                let due = sample
                    .offset_ms
                    .map(Duration::from_millis)
                    .unwrap_or(next)
                    .max(next.saturating_sub(self.interval));
                next = due + self.interval;
                due
            })
            .collect()
    }
}

impl MotionSource for ReplaySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        true
    }

    fn set_sample_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    fn subscribe(&mut self, mut handler: SampleHandler) -> PunchResult<Subscription> {
        let schedule = self.schedule();
        let samples = self.samples.clone();
        let name = self.name.clone();

        Ok(Subscription::spawn(move |active| async move {
            let start = tokio::time::Instant::now();
            for (due, sample) in schedule.into_iter().zip(samples) {
                tokio::time::sleep_until(start + due).await;
                if !active.load(Ordering::SeqCst) {
                    return;
                }
                handler(sample.sample);
            }
            tracing::debug!(source = %name, "Trace exhausted");
        }))
    }
}
