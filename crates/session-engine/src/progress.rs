//! Normalized progress for display.

/// Fraction of the reference reached by `peak`, clamped to `[0, 1]`.
///
/// Display only; classification works from the raw peak.
pub fn project(peak: f64, reference: f64) -> f64 {
    let ratio = peak / reference;
    if ratio.is_nan() {
        return 0.0;
    }
    ratio.clamp(0.0, 1.0)
}

/// Projects peaks against a fixed reference speed.
#[derive(Debug, Clone, Copy)]
pub struct ProgressProjector {
    reference: f64,
}

impl ProgressProjector {
    pub fn new(reference: f64) -> Self {
        Self { reference }
    }

    pub fn project(&self, peak: f64) -> f64 {
        project(peak, self.reference)
    }

    pub fn reference(&self) -> f64 {
        self.reference
    }
}
