//! Adapters layer: Concrete implementations of ports.
//!
//! - `rules`: threshold triage classifier
//! - `sqlite`: SQLite diagnosis history
//! - `sanitize`: PII and clinical-value filtering for logs

pub mod rules;
pub mod sanitize;
pub mod sqlite;

pub use sqlite::StorageError;
