//! Threshold rules adapter: Implementation of RiskClassifier.
//!
//! A coarse triage rule over four vitals. The remaining profile fields are
//! read only by the explanation generator.

mod confidence;

pub use confidence::{fixed_allocation, PREDICTED_SHARE};

use crate::domain::{ClinicalProfile, RiskClass, ScoreDistribution};
use crate::ports::RiskClassifier;

/// Age at or below which cholesterol and blood pressure decide the class.
pub const AGE_SPLIT: u32 = 50;
/// Highest cholesterol (mg/dL) still classified healthy for younger patients.
pub const CHOLESTEROL_LIMIT: u32 = 200;
/// Highest resting blood pressure (mmHg) still classified moderate.
pub const BLOOD_PRESSURE_LIMIT: u32 = 130;
/// Highest max heart rate classified severe for older patients.
pub const HEART_RATE_LIMIT: u32 = 130;

/// Deterministic threshold classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdClassifier;

impl ThresholdClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Apply the decision rule. All boundaries are inclusive on the lower class.
    #[must_use]
    pub fn decide(profile: &ClinicalProfile) -> RiskClass {
        if profile.age <= AGE_SPLIT {
            if profile.cholesterol <= CHOLESTEROL_LIMIT {
                RiskClass::Healthy
            } else if profile.resting_blood_pressure <= BLOOD_PRESSURE_LIMIT {
                RiskClass::ModerateRisk
            } else {
                RiskClass::SevereRisk
            }
        } else if profile.max_heart_rate <= HEART_RATE_LIMIT {
            RiskClass::SevereRisk
        } else {
            RiskClass::ModerateRisk
        }
    }
}

impl RiskClassifier for ThresholdClassifier {
    fn name(&self) -> &'static str {
        "ThresholdClassifier"
    }

    fn classify(&self, profile: &ClinicalProfile) -> (RiskClass, ScoreDistribution) {
        let predicted = Self::decide(profile);
        (predicted, fixed_allocation(predicted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BiologicalSex, ChestPainType, RestingEcg, ThalliumScan};

    fn profile(age: u32, cholesterol: u32, bp: u32, max_hr: u32) -> ClinicalProfile {
        ClinicalProfile {
            age,
            sex: BiologicalSex::Male,
            chest_pain: ChestPainType::Typical,
            resting_blood_pressure: bp,
            cholesterol,
            fasting_blood_sugar_high: false,
            resting_ecg: RestingEcg::Normal,
            max_heart_rate: max_hr,
            exercise_induced_angina: false,
            st_depression: 0.0,
            thallium_scan: ThalliumScan::Normal,
            height_m: 1.75,
            weight_kg: 70.0,
        }
    }

    #[test]
    fn test_scenarios() {
        let classifier = ThresholdClassifier::new();

        let (class, scores) = classifier.classify(&profile(45, 180, 120, 150));
        assert_eq!(class, RiskClass::Healthy);
        assert!((scores.get(RiskClass::Healthy) - 0.85).abs() < 1e-9);
        assert_eq!(scores.get(RiskClass::ModerateRisk), 0.075);
        assert!((scores.get(RiskClass::SevereRisk) - 0.075).abs() < 1e-9);

        assert_eq!(classifier.classify(&profile(45, 230, 120, 150)).0, RiskClass::ModerateRisk);
        assert_eq!(classifier.classify(&profile(45, 230, 140, 150)).0, RiskClass::SevereRisk);
        assert_eq!(classifier.classify(&profile(60, 180, 120, 120)).0, RiskClass::SevereRisk);
        assert_eq!(classifier.classify(&profile(60, 180, 120, 150)).0, RiskClass::ModerateRisk);
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let cases = [
            (profile(50, 200, 200, 100), RiskClass::Healthy),
            (profile(50, 201, 130, 100), RiskClass::ModerateRisk),
            (profile(50, 201, 131, 100), RiskClass::SevereRisk),
            (profile(51, 100, 100, 130), RiskClass::SevereRisk),
            (profile(51, 600, 300, 131), RiskClass::ModerateRisk),
        ];
        for (profile, expected) in cases {
            assert_eq!(ThresholdClassifier::decide(&profile), expected, "{profile:?}");
        }
    }

    #[test]
    fn test_ignores_non_decision_fields() {
        let base = profile(45, 230, 120, 150);
        let noisy = ClinicalProfile {
            fasting_blood_sugar_high: true,
            exercise_induced_angina: true,
            st_depression: 6.0,
            thallium_scan: ThalliumScan::ReversibleDefect,
            height_m: 0.0,
            ..base.clone()
        };
        assert_eq!(ThresholdClassifier::decide(&base), ThresholdClassifier::decide(&noisy));
    }

    #[test]
    fn test_prediction_is_argmax_over_grid() {
        let classifier = ThresholdClassifier::new();
        for age in [1, 30, 50, 51, 80, 120] {
            for chol in [100, 200, 201, 600] {
                for bp in [50, 130, 131, 300] {
                    for hr in [60, 130, 131, 220] {
                        let (class, scores) = classifier.classify(&profile(age, chol, bp, hr));
                        assert_eq!(scores.argmax(), class);
                        assert_eq!(scores.iter().count(), 3);
                        assert!((scores.total() - 1.0).abs() < 1e-6);
                    }
                }
            }
        }
    }
}
