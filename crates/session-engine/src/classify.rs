//! Mapping a finished peak to a result tier.

use punchmeter_common::config::REFERENCE_PUNCH_SPEED;
use punchmeter_motion_model::{ClassificationResult, ResultTier};

/// Pick the first tier whose threshold `percent` strictly exceeds.
///
/// A value exactly on a threshold falls to the tier below it.
pub fn tier_for_percent(percent: f64) -> ResultTier {
    ResultTier::DESCENDING
        .into_iter()
        .find(|tier| match tier.threshold_percent() {
            Some(threshold) => percent > threshold,
            None => true,
        })
        .unwrap_or(ResultTier::Beginner)
}

/// Classify `peak` against `reference`.
pub fn classify(peak: f64, reference: f64) -> ClassificationResult {
    let percent = (peak / reference) * 100.0;
    ClassificationResult::new(tier_for_percent(percent), peak, percent)
}

/// Classifies peaks against a fixed reference speed.
#[derive(Debug, Clone, Copy)]
pub struct ResultClassifier {
    reference: f64,
}

impl ResultClassifier {
    pub fn new(reference: f64) -> Self {
        Self { reference }
    }

    pub fn classify(&self, peak: f64) -> ClassificationResult {
        classify(peak, self.reference)
    }

    pub fn reference(&self) -> f64 {
        self.reference
    }
}

impl Default for ResultClassifier {
    fn default() -> Self {
        Self::new(REFERENCE_PUNCH_SPEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_strict() {
        assert_eq!(tier_for_percent(90.0), ResultTier::Contender);
        assert_eq!(tier_for_percent(90.01), ResultTier::Champion);
        assert_eq!(tier_for_percent(70.0), ResultTier::Trainee);
        assert_eq!(tier_for_percent(70.01), ResultTier::Contender);
        assert_eq!(tier_for_percent(50.0), ResultTier::Beginner);
        assert_eq!(tier_for_percent(50.01), ResultTier::Trainee);
        assert_eq!(tier_for_percent(0.0), ResultTier::Beginner);
        assert_eq!(tier_for_percent(250.0), ResultTier::Champion);
    }

    #[test]
    fn just_under_ninety_percent_is_contender() {
        let result = ResultClassifier::default().classify(13.6);
        assert!((result.percent_of_reference - 89.947).abs() < 1e-3);
        assert_eq!(result.tier, ResultTier::Contender);
        assert_eq!(result.message, "💪 Future champion material!");
        assert_eq!(result.peak_magnitude, 13.6);
    }

    #[test]
    fn exact_reference_multiples() {
        assert_eq!(classify(7.5, 10.0).tier, ResultTier::Contender);
        assert_eq!(classify(5.0, 10.0).tier, ResultTier::Beginner);
        assert_eq!(classify(0.0, 15.12).tier, ResultTier::Beginner);
        assert_eq!(classify(20.0, 15.12).tier, ResultTier::Champion);
    }

    #[test]
    fn alternate_reference_changes_tier() {
        let classifier = ResultClassifier::new(5.12);
        assert_eq!(classifier.classify(4.8).tier, ResultTier::Champion);
        assert_eq!(classifier.reference(), 5.12);
    }
}
