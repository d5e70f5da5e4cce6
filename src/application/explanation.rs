//! Explanation generator: Natural-language rationale for a classification.
//!
//! Risk factors are detected with their own thresholds, which differ from
//! the classifier's decision thresholds (blood pressure 140 here, 130 there).
//! The two stay independent until the intended clinical semantics are
//! confirmed.

use crate::domain::{ClinicalProfile, RiskClass, ScoreDistribution};

/// Age above which age itself is reported as a factor.
const AGE_FACTOR: u32 = 65;
/// mmHg
const BLOOD_PRESSURE_FACTOR: u32 = 140;
/// mg/dL
const CHOLESTEROL_FACTOR: u32 = 240;
/// mm of ST depression
const ST_DEPRESSION_FACTOR: f64 = 2.0;

/// A risk factor that may be present in a profile.
///
/// Variants are declared in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskFactor {
    AgeOver65,
    HighBloodPressure,
    HighCholesterol,
    ElevatedBloodSugar,
    ExerciseInducedAngina,
    SignificantStDepression,
    ThalliumAbnormality,
}

impl RiskFactor {
    /// Every factor, in reporting order.
    pub const ALL: [RiskFactor; 7] = [
        Self::AgeOver65,
        Self::HighBloodPressure,
        Self::HighCholesterol,
        Self::ElevatedBloodSugar,
        Self::ExerciseInducedAngina,
        Self::SignificantStDepression,
        Self::ThalliumAbnormality,
    ];

    /// Whether this factor applies. All numeric thresholds are strict.
    #[must_use]
    pub fn is_present(self, profile: &ClinicalProfile) -> bool {
        match self {
            Self::AgeOver65 => profile.age > AGE_FACTOR,
            Self::HighBloodPressure => profile.resting_blood_pressure > BLOOD_PRESSURE_FACTOR,
            Self::HighCholesterol => profile.cholesterol > CHOLESTEROL_FACTOR,
            Self::ElevatedBloodSugar => profile.fasting_blood_sugar_high,
            Self::ExerciseInducedAngina => profile.exercise_induced_angina,
            Self::SignificantStDepression => profile.st_depression > ST_DEPRESSION_FACTOR,
            Self::ThalliumAbnormality => profile.thallium_scan.is_abnormal(),
        }
    }

    #[must_use]
    pub fn phrase(self) -> &'static str {
        match self {
            Self::AgeOver65 => "age over 65",
            Self::HighBloodPressure => "high blood pressure",
            Self::HighCholesterol => "high cholesterol",
            Self::ElevatedBloodSugar => "elevated blood sugar",
            Self::ExerciseInducedAngina => "exercise-induced angina",
            Self::SignificantStDepression => "significant ST depression",
            Self::ThalliumAbnormality => "thallium scan abnormalities",
        }
    }
}

impl std::fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.phrase())
    }
}

/// Builds the textual rationale attached to a classification.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplanationGenerator;

impl ExplanationGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Factors present in the profile, in reporting order.
    #[must_use]
    pub fn risk_factors(&self, profile: &ClinicalProfile) -> Vec<RiskFactor> {
        RiskFactor::ALL
            .into_iter()
            .filter(|factor| factor.is_present(profile))
            .collect()
    }

    /// Compose the explanation for a classified profile.
    #[must_use]
    pub fn explain(
        &self,
        profile: &ClinicalProfile,
        scores: &ScoreDistribution,
        predicted: RiskClass,
    ) -> String {
        let factors = self.risk_factors(profile);

        let mut text = String::from("Based on your symptoms: ");
        if factors.is_empty() {
            text.push_str("No major risk factors identified");
        } else {
            let phrases: Vec<&str> = factors.iter().map(|f| f.phrase()).collect();
            text.push_str("Key risk factors identified: ");
            text.push_str(&phrases.join(", "));
        }

        text.push_str(&format!(
            ". Confidence: {:.1}%",
            scores.get(predicted) * 100.0
        ));
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::rules::fixed_allocation;
    use crate::domain::{BiologicalSex, ChestPainType, RestingEcg, ThalliumScan};

    fn baseline() -> ClinicalProfile {
        ClinicalProfile {
            age: 45,
            sex: BiologicalSex::Male,
            chest_pain: ChestPainType::Typical,
            resting_blood_pressure: 120,
            cholesterol: 180,
            fasting_blood_sugar_high: false,
            resting_ecg: RestingEcg::Normal,
            max_heart_rate: 150,
            exercise_induced_angina: false,
            st_depression: 0.5,
            thallium_scan: ThalliumScan::Normal,
            height_m: 1.75,
            weight_kg: 70.0,
        }
    }

    #[test]
    fn test_no_factors() {
        let explainer = ExplanationGenerator::new();
        let scores = fixed_allocation(RiskClass::Healthy);
        assert_eq!(
            explainer.explain(&baseline(), &scores, RiskClass::Healthy),
            "Based on your symptoms: No major risk factors identified. Confidence: 85.0%"
        );
    }

    #[test]
    fn test_factor_order_and_join() {
        let profile = ClinicalProfile {
            age: 70,
            resting_blood_pressure: 160,
            cholesterol: 300,
            fasting_blood_sugar_high: true,
            exercise_induced_angina: true,
            st_depression: 3.1,
            thallium_scan: ThalliumScan::FixedDefect,
            ..baseline()
        };
        let scores = fixed_allocation(RiskClass::SevereRisk);
        let text = ExplanationGenerator::new().explain(&profile, &scores, RiskClass::SevereRisk);

        assert_eq!(
            text,
            "Based on your symptoms: Key risk factors identified: age over 65, \
             high blood pressure, high cholesterol, elevated blood sugar, \
             exercise-induced angina, significant ST depression, \
             thallium scan abnormalities. Confidence: 85.0%"
        );
    }

    #[test]
    fn test_boundary_values_are_strict() {
        let explainer = ExplanationGenerator::new();

        let at_limits = ClinicalProfile {
            age: 65,
            resting_blood_pressure: 140,
            cholesterol: 240,
            st_depression: 2.0,
            ..baseline()
        };
        assert!(explainer.risk_factors(&at_limits).is_empty());

        let past_limits = ClinicalProfile {
            age: 66,
            resting_blood_pressure: 141,
            cholesterol: 241,
            st_depression: 2.1,
            ..baseline()
        };
        assert_eq!(
            explainer.risk_factors(&past_limits),
            vec![
                RiskFactor::AgeOver65,
                RiskFactor::HighBloodPressure,
                RiskFactor::HighCholesterol,
                RiskFactor::SignificantStDepression,
            ]
        );
    }

    #[test]
    fn test_sample_intake_profile() {
        // bp 140 sits on the threshold and must not be reported.
        let profile = ClinicalProfile {
            resting_blood_pressure: 140,
            cholesterol: 230,
            st_depression: 2.3,
            ..baseline()
        };
        let scores = fixed_allocation(RiskClass::SevereRisk);
        let text = ExplanationGenerator::new().explain(&profile, &scores, RiskClass::SevereRisk);

        assert!(!text.contains("high blood pressure"));
        assert!(!text.contains("high cholesterol"));
        assert!(text.contains("significant ST depression"));
        assert!(text.ends_with(". Confidence: 85.0%"));
    }

    #[test]
    fn test_confidence_uses_predicted_class_score() {
        let scores = fixed_allocation(RiskClass::ModerateRisk);
        let text = ExplanationGenerator::new().explain(&baseline(), &scores, RiskClass::Healthy);
        assert!(text.ends_with("Confidence: 7.5%"));
    }

    #[test]
    fn test_reversible_defect_is_flagged() {
        let profile = ClinicalProfile {
            thallium_scan: ThalliumScan::ReversibleDefect,
            ..baseline()
        };
        assert_eq!(
            ExplanationGenerator::new().risk_factors(&profile),
            vec![RiskFactor::ThalliumAbnormality]
        );
    }
}
