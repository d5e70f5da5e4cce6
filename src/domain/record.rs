//! Diagnosis history records and the alerts derived from them.

use serde::{Deserialize, Serialize};

use super::{ClassificationResult, RawProfile, RiskClass};

/// A classification kept in the local history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisRecord {
    /// Unique identifier
    pub id: String,

    /// Reference to patient (if available)
    pub patient_id: Option<String>,

    /// Who ran the classification (if known)
    pub performed_by: Option<String>,

    /// Input exactly as submitted
    pub input_payload: RawProfile,

    pub model_result: ClassificationResult,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl DiagnosisRecord {
    #[must_use]
    pub fn new(input_payload: RawProfile, model_result: ClassificationResult) -> Self {
        Self {
            id: uuid_v4(),
            patient_id: None,
            performed_by: None,
            input_payload,
            model_result,
            created_at: chrono::Utc::now(),
        }
    }

    #[must_use]
    pub fn with_patient(mut self, patient_id: impl Into<String>) -> Self {
        self.patient_id = Some(patient_id.into());
        self
    }

    #[must_use]
    pub fn performed_by(mut self, who: impl Into<String>) -> Self {
        self.performed_by = Some(who.into());
        self
    }

    #[must_use]
    pub fn is_severe(&self) -> bool {
        self.model_result.predicted_class == RiskClass::SevereRisk
    }
}

/// Alert raised for a record classified as severe risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyAlert {
    pub id: String,
    pub patient_id: Option<String>,
    pub diagnosis_id: String,
    /// Always `"severe"`
    pub severity: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub acknowledged: bool,
}

impl EmergencyAlert {
    /// Raise an alert for a record, or `None` if it is not severe.
    ///
    /// Each call mints a new id; storage calls this once per record and
    /// readers load the stored alert.
    #[must_use]
    pub fn for_record(record: &DiagnosisRecord) -> Option<Self> {
        if !record.is_severe() {
            return None;
        }

        Some(Self {
            id: uuid_v4(),
            patient_id: record.patient_id.clone(),
            diagnosis_id: record.id.clone(),
            severity: "severe".to_string(),
            timestamp: record.model_result.timestamp,
            acknowledged: false,
        })
    }
}

/// Generate a random UUID v4 from an OS-seeded ChaCha20 stream.
fn uuid_v4() -> String {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let bytes: [u8; 16] = rng.gen();

    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        (bytes[6] & 0x0f) | 0x40, bytes[7],
        (bytes[8] & 0x3f) | 0x80, bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Answer, BiologicalSex, ChestPainType, RestingEcg, ScoreDistribution, ThalliumScan,
        MODEL_VERSION,
    };

    fn record_for(class: RiskClass) -> DiagnosisRecord {
        let raw = RawProfile {
            age: 60,
            sex: BiologicalSex::Female,
            chest_pain: ChestPainType::Asymptomatic,
            blood_pressure: 150,
            cholesterol: 250,
            fasting_bs: 0,
            rest_ecg: RestingEcg::Normal,
            max_heart_rate: 120,
            exercise_angina: Answer::Yes,
            oldpeak: 1.5,
            thallium: ThalliumScan::FixedDefect,
            height_m: 1.6,
            weight_kg: 65.0,
        };
        let mut weights = [0.075; 3];
        weights[class.ordinal()] = 0.85;
        let result = ClassificationResult {
            predicted_class: class,
            scores: ScoreDistribution::from_weights(weights).expect("Valid"),
            explanation: String::new(),
            model_version: MODEL_VERSION.to_string(),
            timestamp: chrono::Utc::now(),
        };
        DiagnosisRecord::new(raw, result)
    }

    #[test]
    fn test_alert_only_for_severe() {
        let severe = record_for(RiskClass::SevereRisk).with_patient("p-1");
        let alert = EmergencyAlert::for_record(&severe).expect("Should alert");
        assert_eq!(alert.diagnosis_id, severe.id);
        assert_eq!(alert.patient_id.as_deref(), Some("p-1"));
        assert_eq!(alert.severity, "severe");
        assert!(!alert.acknowledged);

        assert!(EmergencyAlert::for_record(&record_for(RiskClass::ModerateRisk)).is_none());
    }

    #[test]
    fn test_uuid_generation() {
        let id1 = uuid_v4();
        let id2 = uuid_v4();
        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 36);
        assert_eq!(&id1[14..15], "4");
    }
}
