//! Running peak tracking with a noise debounce.

use punchmeter_common::config::DEBOUNCE_EPSILON;
use punchmeter_motion_model::MotionSample;

/// The largest accepted magnitude seen in the current session.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PeakRecord {
    pub magnitude: f64,
}

/// Outcome of feeding one sample to a [`PeakTracker`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Magnitude of the observed sample.
    pub magnitude: f64,
    /// Running peak after the observation.
    pub peak: f64,
    /// `false` when the sample was discarded as noise.
    pub accepted: bool,
}

/// Tracks the running maximum of sample magnitudes.
///
/// Magnitudes at or below `epsilon` are noise and leave the peak untouched.
#[derive(Debug, Clone)]
pub struct PeakTracker {
    epsilon: f64,
    record: PeakRecord,
}

impl PeakTracker {
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon,
            record: PeakRecord::default(),
        }
    }

    pub fn reset(&mut self) {
        self.record = PeakRecord::default();
    }

    pub fn observe(&mut self, sample: &MotionSample) -> Observation {
        let magnitude = sample.magnitude();
        let accepted = magnitude > self.epsilon;
        if accepted {
            self.record.magnitude = self.record.magnitude.max(magnitude);
        }
        Observation {
            magnitude,
            peak: self.record.magnitude,
            accepted,
        }
    }

    pub fn peak(&self) -> f64 {
        self.record.magnitude
    }

    pub fn record(&self) -> PeakRecord {
        self.record
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl Default for PeakTracker {
    fn default() -> Self {
        Self::new(DEBOUNCE_EPSILON)
    }
}
