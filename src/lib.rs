//! # Cardiotriage
//!
//! Deterministic cardiac-risk triage with explained confidence distributions.
//!
//! This crate provides:
//! - A threshold classifier mapping a clinical profile to a risk class
//! - A fixed confidence distribution over every class
//! - A plain-language explanation of the risk factors present
//! - Health reporting and an optional SQLite diagnosis history
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core value types (ClinicalProfile, RiskClass, ClassificationResult)
//! - `ports`: Trait definitions for the classifier and history storage
//! - `adapters`: Concrete implementations (threshold rules, SQLite, log sanitizer)
//! - `application`: Services orchestrating domain and ports
//! - `config`: Environment-driven runtime settings

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::{DiagnosticService, ModelState};
pub use domain::{ClassificationResult, ClinicalProfile, ProfileBuilder, RiskClass};

/// Result type for Cardiotriage operations
pub type Result<T> = std::result::Result<T, TriageError>;

/// Main error type for Cardiotriage
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("Invalid profile: {0}")]
    InvalidProfile(#[from] domain::InvalidProfileError),

    #[error("Invalid input: {0}")]
    Validation(#[from] domain::ValidationError),

    #[error("Storage operation failed: {0}")]
    Storage(#[from] adapters::StorageError),

    #[error("Model not loaded: {0}")]
    ModelNotLoaded(String),

    #[error("No emergency alert with id {0}")]
    AlertNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
