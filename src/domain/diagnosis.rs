//! Classification output types.
//!
//! Represents the risk class, the confidence distribution over every class
//! and the assembled result handed back to callers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Model version stamped on every classification.
pub const MODEL_VERSION: &str = "v1.0";

/// Tolerance for the distribution sum invariant.
pub const DISTRIBUTION_TOLERANCE: f64 = 1e-6;

/// Cardiac-risk category.
///
/// Variants are declared in ordinal order; callers should not attach numeric
/// meaning to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskClass {
    Healthy,
    #[serde(rename = "Moderate Risk")]
    ModerateRisk,
    #[serde(rename = "Severe Risk")]
    SevereRisk,
}

impl RiskClass {
    /// Every class, in ordinal order.
    pub const ALL: [RiskClass; 3] = [Self::Healthy, Self::ModerateRisk, Self::SevereRisk];

    #[must_use]
    pub fn ordinal(self) -> usize {
        match self {
            Self::Healthy => 0,
            Self::ModerateRisk => 1,
            Self::SevereRisk => 2,
        }
    }

    /// Get the label used on the wire and in storage.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::ModerateRisk => "Moderate Risk",
            Self::SevereRisk => "Severe Risk",
        }
    }

    /// Parse a stored label back into a class.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl std::fmt::Display for RiskClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors raised when a score vector is not a valid distribution.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DistributionError {
    #[error("Score for {class} is {value}, expected a value in [0, 1]")]
    OutOfRange { class: RiskClass, value: f64 },

    #[error("Scores sum to {0}, expected 1.0")]
    BadSum(f64),

    #[error("Missing score for {0}")]
    MissingClass(RiskClass),
}

/// Confidence per risk class.
///
/// Always holds exactly one entry per class; values lie in [0, 1] and sum to
/// 1.0 within [`DISTRIBUTION_TOLERANCE`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    into = "BTreeMap<RiskClass, f64>",
    try_from = "BTreeMap<RiskClass, f64>"
)]
pub struct ScoreDistribution {
    scores: [f64; 3],
}

impl ScoreDistribution {
    /// Build a distribution from weights indexed by class ordinal.
    ///
    /// # Errors
    /// Returns `DistributionError` if a weight is outside [0, 1] or the
    /// weights do not sum to 1.
    pub fn from_weights(scores: [f64; 3]) -> Result<Self, DistributionError> {
        for class in RiskClass::ALL {
            let value = scores[class.ordinal()];
            if !(0.0..=1.0).contains(&value) {
                return Err(DistributionError::OutOfRange { class, value });
            }
        }

        let sum: f64 = scores.iter().sum();
        if (sum - 1.0).abs() > DISTRIBUTION_TOLERANCE {
            return Err(DistributionError::BadSum(sum));
        }

        Ok(Self { scores })
    }

    /// Wrap weights already known to form a distribution.
    pub(crate) fn from_weights_unchecked(scores: [f64; 3]) -> Self {
        debug_assert!(Self::from_weights(scores).is_ok(), "invalid weights {scores:?}");
        Self { scores }
    }

    #[must_use]
    pub fn get(&self, class: RiskClass) -> f64 {
        self.scores[class.ordinal()]
    }

    /// Iterate `(class, score)` pairs in ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = (RiskClass, f64)> + '_ {
        RiskClass::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// Class with the highest score. Ties resolve to the lowest ordinal.
    #[must_use]
    pub fn argmax(&self) -> RiskClass {
        self.iter()
            .fold((RiskClass::Healthy, f64::MIN), |best, (class, score)| {
                if score > best.1 {
                    (class, score)
                } else {
                    best
                }
            })
            .0
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.scores.iter().sum()
    }
}

impl From<ScoreDistribution> for BTreeMap<RiskClass, f64> {
    fn from(dist: ScoreDistribution) -> Self {
        dist.iter().collect()
    }
}

impl TryFrom<BTreeMap<RiskClass, f64>> for ScoreDistribution {
    type Error = DistributionError;

    fn try_from(map: BTreeMap<RiskClass, f64>) -> Result<Self, Self::Error> {
        let mut scores = [0.0; 3];
        for class in RiskClass::ALL {
            scores[class.ordinal()] = *map
                .get(&class)
                .ok_or(DistributionError::MissingClass(class))?;
        }
        Self::from_weights(scores)
    }
}

/// Outcome of one classification call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    #[serde(rename = "label")]
    pub predicted_class: RiskClass,

    pub scores: ScoreDistribution,

    pub explanation: String,

    pub model_version: String,

    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ClassificationResult {
    /// Confidence assigned to the predicted class.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.scores.get(self.predicted_class)
    }

    /// Compare two results ignoring when they were produced.
    #[must_use]
    pub fn same_outcome(&self, other: &Self) -> bool {
        self.predicted_class == other.predicted_class
            && self.scores == other.scores
            && self.explanation == other.explanation
            && self.model_version == other.model_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_weights_enforces_invariants() {
        assert!(ScoreDistribution::from_weights([0.85, 0.075, 0.075]).is_ok());
        assert_eq!(
            ScoreDistribution::from_weights([0.5, 0.5, 0.5]),
            Err(DistributionError::BadSum(1.5))
        );
        assert!(matches!(
            ScoreDistribution::from_weights([1.2, -0.1, -0.1]),
            Err(DistributionError::OutOfRange {
                class: RiskClass::Healthy,
                ..
            })
        ));
    }

    #[test]
    fn test_argmax() {
        let dist = ScoreDistribution::from_weights([0.075, 0.075, 0.85]).expect("Valid");
        assert_eq!(dist.argmax(), RiskClass::SevereRisk);
        assert!((dist.total() - 1.0).abs() < DISTRIBUTION_TOLERANCE);
    }

    #[test]
    fn test_labels_roundtrip() {
        for class in RiskClass::ALL {
            assert_eq!(RiskClass::from_label(class.label()), Some(class));
        }
        assert_eq!(RiskClass::from_label("Error"), None);
    }

    #[test]
    fn test_distribution_serializes_as_label_map() {
        let dist = ScoreDistribution::from_weights([0.075, 0.85, 0.075]).expect("Valid");
        let json = serde_json::to_value(dist).expect("Should serialize");
        assert_eq!(json["Moderate Risk"], serde_json::json!(0.85));
        assert_eq!(json["Healthy"], serde_json::json!(0.075));

        let back: ScoreDistribution = serde_json::from_value(json).expect("Should parse");
        assert_eq!(back, dist);

        let partial = serde_json::json!({ "Healthy": 1.0 });
        assert!(serde_json::from_value::<ScoreDistribution>(partial).is_err());
    }
}
