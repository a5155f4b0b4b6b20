//! Synthetic punch generation for demos and smoke tests.

use std::time::Duration;

use punchmeter_common::config::{FAST_SAMPLE_INTERVAL_MS, SESSION_DURATION_MS};
use punchmeter_common::error::PunchResult;
use punchmeter_motion_model::{MotionSample, TraceSample};

use crate::replay::ReplaySource;
use crate::{MotionSource, SampleHandler, Subscription};

/// Shape of a generated punch: rest, linear rise, exponential decay, rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PunchProfile {
    /// Magnitude at the apex (m/s²).
    pub peak: f64,
    /// Quiet time before the punch starts.
    pub rest_ms: u64,
    /// Time from start of the punch to the apex.
    pub rise_ms: u64,
    /// Time for the decay after the apex.
    pub decay_ms: u64,
    /// Total length of the generated trace.
    pub total_ms: u64,
    /// Amplitude of the resting jitter.
    pub noise: f64,
}

impl Default for PunchProfile {
    fn default() -> Self {
        Self {
            peak: 12.0,
            rest_ms: 400,
            rise_ms: 120,
            decay_ms: 240,
            total_ms: SESSION_DURATION_MS,
            noise: 0.05,
        }
    }
}

impl PunchProfile {
    fn apex_ms(&self) -> u64 {
        self.rest_ms + self.rise_ms
    }

    /// Magnitude of the profile at `t_ms`.
    pub fn magnitude_at(&self, t_ms: u64, index: usize) -> f64 {
        let apex = self.apex_ms();
        let jitter = self.noise * (index as f64 * 1.7).sin().abs();
        if t_ms < self.rest_ms {
            jitter
        } else if t_ms < apex {
            self.peak * (t_ms - self.rest_ms) as f64 / self.rise_ms.max(1) as f64
        } else if t_ms < apex + self.decay_ms {
            let progress = (t_ms - apex) as f64 / self.decay_ms.max(1) as f64;
            (self.peak * (-4.0 * progress).exp()).max(jitter)
        } else {
            jitter
        }
    }
}

/// Generate a trace following `profile`, one sample per `interval` plus one
/// sample exactly at the apex.
pub fn punch_profile(profile: &PunchProfile, interval: Duration) -> Vec<TraceSample> {
    let step = (interval.as_millis() as u64).max(1);
    let apex = profile.apex_ms();

    let mut times: Vec<u64> = (0..profile.total_ms).step_by(step as usize).collect();
    if apex < profile.total_ms {
        if let Err(position) = times.binary_search(&apex) {
            times.insert(position, apex);
        }
    }

    times
        .into_iter()
        .enumerate()
        .map(|(index, t_ms)| {
            let magnitude = profile.magnitude_at(t_ms, index);
            TraceSample::at(
                t_ms,
                MotionSample::new(magnitude * 0.8, magnitude * 0.6, 0.0),
            )
        })
        .collect()
}

/// A source that replays a generated punch.
pub struct SyntheticPunchSource {
    profile: PunchProfile,
    replay: ReplaySource,
}

impl SyntheticPunchSource {
    pub fn new(profile: PunchProfile) -> Self {
        let interval = Duration::from_millis(FAST_SAMPLE_INTERVAL_MS);
        let mut replay = ReplaySource::new("synthetic", punch_profile(&profile, interval));
        replay.set_sample_interval(interval);
        Self { profile, replay }
    }

    pub fn profile(&self) -> &PunchProfile {
        &self.profile
    }
}

impl Default for SyntheticPunchSource {
    fn default() -> Self {
        Self::new(PunchProfile::default())
    }
}

impl MotionSource for SyntheticPunchSource {
    fn name(&self) -> &str {
        self.replay.name()
    }

    fn is_available(&self) -> bool {
        true
    }

    fn set_sample_interval(&mut self, interval: Duration) {
        self.replay = ReplaySource::new("synthetic", punch_profile(&self.profile, interval));
        self.replay.set_sample_interval(interval);
    }

    fn subscribe(&mut self, handler: SampleHandler) -> PunchResult<Subscription> {
        self.replay.subscribe(handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_hits_apex_exactly() {
        let profile = PunchProfile::default();
        let trace = punch_profile(&profile, Duration::from_millis(16));
        let max = trace
            .iter()
            .map(|s| s.sample.magnitude())
            .fold(0.0_f64, f64::max);
        assert!((max - 12.0).abs() < 1e-9);
        assert!(trace.iter().any(|s| s.offset_ms == Some(520)));
    }

    #[test]
    fn resting_jitter_stays_below_noise_amplitude() {
        let profile = PunchProfile::default();
        let trace = punch_profile(&profile, Duration::from_millis(100));
        for sample in trace.iter().filter(|s| s.offset_ms < Some(profile.rest_ms)) {
            assert!(sample.sample.magnitude() <= profile.noise + 1e-12);
        }
    }

    #[test]
    fn trace_covers_total_duration() {
        let profile = PunchProfile {
            total_ms: 1000,
            ..PunchProfile::default()
        };
        let trace = punch_profile(&profile, Duration::from_millis(100));
        assert_eq!(trace.first().and_then(|s| s.offset_ms), Some(0));
        assert_eq!(trace.last().and_then(|s| s.offset_ms), Some(900));
        assert_eq!(trace.len(), 11);
    }
}
