//! Session outcome types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Qualitative tier of a finished punch, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultTier {
    Champion,
    Contender,
    Trainee,
    Beginner,
}

impl ResultTier {
    /// All tiers in descending order of their thresholds.
    pub const DESCENDING: [ResultTier; 4] = [
        ResultTier::Champion,
        ResultTier::Contender,
        ResultTier::Trainee,
        ResultTier::Beginner,
    ];

    /// Percentage of the reference that must be strictly exceeded to reach
    /// this tier. `Beginner` has no lower bound.
    pub fn threshold_percent(self) -> Option<f64> {
        match self {
            ResultTier::Champion => Some(90.0),
            ResultTier::Contender => Some(70.0),
            ResultTier::Trainee => Some(50.0),
            ResultTier::Beginner => None,
        }
    }

    /// Display text attached to the tier.
    pub fn message(self) -> &'static str {
        match self {
            ResultTier::Champion => "🏆 Iron Mike would be proud!",
            ResultTier::Contender => "💪 Future champion material!",
            ResultTier::Trainee => "👊 Keep training, warrior!",
            ResultTier::Beginner => "🥊 Everyone starts somewhere!",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ResultTier::Champion => "champion",
            ResultTier::Contender => "contender",
            ResultTier::Trainee => "trainee",
            ResultTier::Beginner => "beginner",
        }
    }
}

impl fmt::Display for ResultTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The immutable outcome of one sampling session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub tier: ResultTier,

    /// Raw peak magnitude (m/s²).
    pub peak_magnitude: f64,

    /// Peak as a percentage of the reference speed, unrounded.
    pub percent_of_reference: f64,

    pub message: String,
}

impl ClassificationResult {
    /// Build a result whose message is resolved from `tier`.
    pub fn new(tier: ResultTier, peak_magnitude: f64, percent_of_reference: f64) -> Self {
        Self {
            tier,
            peak_magnitude,
            percent_of_reference,
            message: tier.message().to_string(),
        }
    }
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.message)?;
        writeln!(f, "Your punch: {:.1} m/s", self.peak_magnitude)?;
        write!(f, "{:.0}% of Tyson's best!", self.percent_of_reference)
    }
}
