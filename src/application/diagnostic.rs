//! Diagnostic service: Orchestrates classification and explanation.
//!
//! This service coordinates:
//! - Risk classification through the `RiskClassifier` port
//! - Explanation of the contributing risk factors
//! - Stamping the result with the model version and time

use crate::domain::{ClassificationResult, ClinicalProfile, RiskClass, MODEL_VERSION};
use crate::ports::RiskClassifier;

use super::explanation::ExplanationGenerator;

/// Outcome of the one-time model startup step.
///
/// Built before the service accepts requests and never changed afterwards,
/// so reading it needs no synchronization.
#[derive(Debug, Clone)]
pub struct ModelState {
    class_labels: Option<[&'static str; 3]>,
    initialized_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl ModelState {
    /// Run the startup step for a classifier.
    #[must_use]
    pub fn initialize<C: RiskClassifier + ?Sized>(classifier: &C) -> Self {
        let class_labels = RiskClass::ALL.map(RiskClass::label);
        tracing::info!(
            "Initialized {} with classes [{}]",
            classifier.name(),
            class_labels.join(", ")
        );

        Self {
            class_labels: Some(class_labels),
            initialized_at: Some(chrono::Utc::now()),
        }
    }

    /// State of a model whose startup step never ran.
    #[must_use]
    pub fn pending() -> Self {
        Self {
            class_labels: None,
            initialized_at: None,
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.class_labels.is_some()
    }

    /// Class labels in ordinal order, once initialized.
    #[must_use]
    pub fn class_labels(&self) -> Option<&[&'static str; 3]> {
        self.class_labels.as_ref()
    }

    #[must_use]
    pub fn initialized_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.initialized_at
    }
}

/// Service for classifying clinical profiles.
///
/// Holds no per-call state: `classify` takes `&self` and can be called from
/// any number of threads at once.
pub struct DiagnosticService<C>
where
    C: RiskClassifier,
{
    classifier: C,
    explainer: ExplanationGenerator,
    state: ModelState,
}

impl<C> DiagnosticService<C>
where
    C: RiskClassifier,
{
    /// Create a service from a classifier and its startup outcome.
    pub fn new(classifier: C, state: ModelState) -> Self {
        Self {
            classifier,
            explainer: ExplanationGenerator::new(),
            state,
        }
    }

    /// Initialize the classifier and build a ready service.
    pub fn initialized(classifier: C) -> Self {
        let state = ModelState::initialize(&classifier);
        Self::new(classifier, state)
    }

    /// Classify a profile.
    ///
    /// Callers must check [`is_ready`](Self::is_ready) first; this method
    /// does not repeat the check.
    #[must_use]
    pub fn classify(&self, profile: &ClinicalProfile) -> ClassificationResult {
        let (predicted_class, scores) = self.classifier.classify(profile);
        tracing::debug!("Classifier predicted {}", predicted_class);

        let explanation = self.explainer.explain(profile, &scores, predicted_class);

        let result = ClassificationResult {
            predicted_class,
            scores,
            explanation,
            model_version: MODEL_VERSION.to_string(),
            timestamp: chrono::Utc::now(),
        };

        tracing::info!(
            "Classification complete: predicted={}, confidence={:.1}%",
            result.predicted_class,
            result.confidence() * 100.0
        );

        result
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    /// Static descriptor of the decision model.
    #[must_use]
    pub fn describe_model(&self) -> String {
        if self.is_ready() {
            format!("{} ({})", self.classifier.name(), MODEL_VERSION)
        } else {
            "Model not loaded".to_string()
        }
    }

    #[must_use]
    pub fn state(&self) -> &ModelState {
        &self.state
    }

    #[must_use]
    pub fn explainer(&self) -> &ExplanationGenerator {
        &self.explainer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::rules::ThresholdClassifier;
    use crate::domain::{
        Answer, BiologicalSex, ChestPainType, ProfileBuilder, RawProfile, RestingEcg,
        ScoreDistribution, ThalliumScan, DISTRIBUTION_TOLERANCE,
    };
    use std::sync::Arc;

    fn create_test_service() -> DiagnosticService<ThresholdClassifier> {
        DiagnosticService::initialized(ThresholdClassifier::new())
    }

    fn intake(
        age: u32,
        cholesterol: u32,
        blood_pressure: u32,
        max_heart_rate: u32,
    ) -> ClinicalProfile {
        ProfileBuilder::build(&RawProfile {
            age,
            sex: BiologicalSex::Female,
            chest_pain: ChestPainType::Atypical,
            blood_pressure,
            cholesterol,
            fasting_bs: 0,
            rest_ecg: RestingEcg::LeftVentricularHypertrophy,
            max_heart_rate,
            exercise_angina: Answer::No,
            oldpeak: 1.0,
            thallium: ThalliumScan::Normal,
            height_m: 1.65,
            weight_kg: 60.0,
        })
    }

    #[test]
    fn test_readiness() {
        let service = create_test_service();
        assert!(service.is_ready());
        assert_eq!(service.describe_model(), "ThresholdClassifier (v1.0)");
        assert!(service.state().initialized_at().is_some());
        assert_eq!(
            service.state().class_labels(),
            Some(&["Healthy", "Moderate Risk", "Severe Risk"])
        );

        let pending = DiagnosticService::new(ThresholdClassifier::new(), ModelState::pending());
        assert!(!pending.is_ready());
        assert_eq!(pending.describe_model(), "Model not loaded");
    }

    #[test]
    fn test_classify_scenario_a() {
        let result = create_test_service().classify(&intake(45, 180, 120, 150));

        assert_eq!(result.predicted_class, RiskClass::Healthy);
        assert_eq!(result.model_version, "v1.0");
        assert_eq!(result.confidence(), 0.85);
        assert_eq!(result.scores.get(RiskClass::ModerateRisk), 0.075);
        assert_eq!(result.scores.get(RiskClass::SevereRisk), 0.075);
        assert_eq!(
            result.explanation,
            "Based on your symptoms: No major risk factors identified. Confidence: 85.0%"
        );

        let json = serde_json::to_value(&result).expect("Should serialize");
        assert_eq!(json["label"], serde_json::json!("Healthy"));
        assert_eq!(json["modelVersion"], serde_json::json!("v1.0"));
        assert_eq!(json["scores"]["Severe Risk"], serde_json::json!(0.075));
    }

    #[test]
    fn test_classify_scenarios() {
        let service = create_test_service();
        let cases = [
            (intake(45, 230, 120, 150), RiskClass::ModerateRisk),
            (intake(45, 230, 140, 150), RiskClass::SevereRisk),
            (intake(60, 180, 120, 120), RiskClass::SevereRisk),
            (intake(60, 180, 120, 150), RiskClass::ModerateRisk),
        ];
        for (profile, expected) in cases {
            let result = service.classify(&profile);
            assert_eq!(result.predicted_class, expected);
            assert_eq!(result.scores.argmax(), expected);
            assert!((result.scores.total() - 1.0).abs() < DISTRIBUTION_TOLERANCE);
        }
    }

    #[test]
    fn test_deterministic_except_timestamp() {
        let service = create_test_service();
        let profile = intake(67, 260, 150, 110);

        let first = service.classify(&profile);
        let second = service.classify(&profile);
        assert!(first.same_outcome(&second));
        assert!(second.timestamp >= first.timestamp);
    }

    #[test]
    fn test_zero_height_still_classifies() {
        let mut profile = intake(45, 180, 120, 150);
        profile.height_m = 0.0;
        assert!(profile.bmi().is_none());

        let result = create_test_service().classify(&profile);
        assert_eq!(result.predicted_class, RiskClass::Healthy);
    }

    #[test]
    fn test_concurrent_classification() {
        let service = Arc::new(create_test_service());
        let handles: Vec<_> = (0..8u32)
            .map(|i| {
                let service = Arc::clone(&service);
                std::thread::spawn(move || service.classify(&intake(40 + i * 5, 250, 135, 140)))
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let result = handle.join().expect("Thread should not panic");
            let expected = if 40 + i * 5 <= 50 {
                RiskClass::SevereRisk
            } else {
                RiskClass::ModerateRisk
            };
            assert_eq!(result.predicted_class, expected);
        }
    }

    struct AlwaysModerate;

    impl RiskClassifier for AlwaysModerate {
        fn name(&self) -> &'static str {
            "AlwaysModerate"
        }

        fn classify(&self, _profile: &ClinicalProfile) -> (RiskClass, ScoreDistribution) {
            (
                RiskClass::ModerateRisk,
                ScoreDistribution::from_weights([0.2, 0.6, 0.2]).expect("Valid"),
            )
        }
    }

    #[test]
    fn test_swapped_classifier() {
        let service = DiagnosticService::initialized(AlwaysModerate);
        let result = service.classify(&intake(45, 180, 120, 150));
        assert_eq!(result.predicted_class, RiskClass::ModerateRisk);
        assert!(result.explanation.ends_with("Confidence: 60.0%"));
        assert_eq!(service.describe_model(), "AlwaysModerate (v1.0)");
    }
}
