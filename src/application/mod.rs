//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! classification, status reporting and history.

mod diagnostic;
mod explanation;
mod health;
mod history;

pub use diagnostic::{DiagnosticService, ModelState};
pub use explanation::{ExplanationGenerator, RiskFactor};
pub use health::{HealthReport, ModelInfo};
pub use history::{HistoryService, RecordContext};
