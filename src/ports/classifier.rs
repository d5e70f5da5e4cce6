//! Classifier port: Trait for the risk decision model.
//!
//! The rule-based triage in `adapters::rules` is the only implementation
//! today; a calibrated probabilistic model can replace it behind this trait.

use crate::domain::{ClinicalProfile, RiskClass, ScoreDistribution};

/// Trait for risk classification.
///
/// Implementations must be deterministic and free of side effects so that
/// any number of calls can run in parallel through `&self`.
pub trait RiskClassifier: Send + Sync {
    /// Short model name used in status reports.
    fn name(&self) -> &'static str;

    /// Classify a profile into a risk class with a confidence distribution.
    ///
    /// The returned class is always the argmax of the distribution.
    fn classify(&self, profile: &ClinicalProfile) -> (RiskClass, ScoreDistribution);
}
