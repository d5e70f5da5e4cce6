//! Fixed confidence allocation for the triage rules.
//!
//! This is a placeholder policy, not a calibrated probability: the predicted
//! class always receives the same share regardless of how close the profile
//! sits to a threshold.

use crate::domain::{RiskClass, ScoreDistribution};

/// Share assigned to the predicted class.
pub const PREDICTED_SHARE: f64 = 0.85;

/// Share split across the other classes. Kept as a literal: `1.0 - 0.85`
/// is not exactly `0.15` in binary floating point.
pub const REMAINING_SHARE: f64 = 0.15;

/// Build the distribution for a predicted class.
///
/// The predicted class gets [`PREDICTED_SHARE`]; [`REMAINING_SHARE`] is
/// split evenly across the other classes.
#[must_use]
pub fn fixed_allocation(predicted: RiskClass) -> ScoreDistribution {
    let others = (RiskClass::ALL.len() - 1) as f64;
    let rest = REMAINING_SHARE / others;

    let mut weights = [rest; 3];
    weights[predicted.ordinal()] = PREDICTED_SHARE;

    ScoreDistribution::from_weights_unchecked(weights)
}
