//! Motion samples.

use serde::{Deserialize, Serialize};

/// One instantaneous 3-axis reading from a motion source.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl MotionSample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// A sample lying on the x axis with the given magnitude.
    pub fn along_x(magnitude: f64) -> Self {
        Self::new(magnitude, 0.0, 0.0)
    }

    /// Euclidean norm of the reading.
    ///
    /// Sensor hardware cannot produce non-finite geometry, so a NaN or
    /// infinite component is treated as a zero-magnitude reading.
    pub fn magnitude(&self) -> f64 {
        let magnitude = self.x.hypot(self.y).hypot(self.z);
        if magnitude.is_finite() {
            magnitude
        } else {
            0.0
        }
    }

    /// Scale every axis by `factor` (raw device counts to m/s²).
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }
}
