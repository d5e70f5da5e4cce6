//! Ports layer: Trait definitions for swappable collaborators.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and its decision model and history storage.

mod classifier;
mod storage;

pub use classifier::RiskClassifier;
pub use storage::{DiagnosisStore, RecordPage};
