//! Health and model status reports for external responders.

use serde::Serialize;

use crate::domain::MODEL_VERSION;
use crate::ports::RiskClassifier;

use super::DiagnosticService;

/// Liveness report including model readiness.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Always `"UP"` while the process can answer
    pub status: &'static str,
    pub model_loaded: bool,
    pub model_info: String,
    /// Epoch milliseconds on the wire
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl HealthReport {
    #[must_use]
    pub fn from_service<C: RiskClassifier>(service: &DiagnosticService<C>) -> Self {
        Self {
            status: "UP",
            model_loaded: service.is_ready(),
            model_info: service.describe_model(),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Static description of the deployed model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub model_type: String,
    /// `"loaded"` or `"not loaded"`
    pub status: &'static str,
    pub version: &'static str,
}

impl ModelInfo {
    #[must_use]
    pub fn from_service<C: RiskClassifier>(service: &DiagnosticService<C>) -> Self {
        Self {
            model_type: service.describe_model(),
            status: if service.is_ready() { "loaded" } else { "not loaded" },
            version: MODEL_VERSION,
        }
    }
}
