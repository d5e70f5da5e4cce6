//! Domain layer: Core triage types.
//!
//! This module contains plain Rust values with no I/O. Everything here is
//! serializable and safe to share across threads.

mod diagnosis;
mod profile;
mod record;

pub use diagnosis::{
    ClassificationResult, DistributionError, RiskClass, ScoreDistribution,
    DISTRIBUTION_TOLERANCE, MODEL_VERSION,
};
pub use profile::{
    Answer, BiologicalSex, BmiCategory, ChestPainType, ClinicalProfile, InvalidProfileError,
    ProfileBuilder, RawProfile, RestingEcg, ThalliumScan, ValidationError,
};
pub use record::{DiagnosisRecord, EmergencyAlert};
