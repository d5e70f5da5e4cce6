//! History service: Records classifications and derives alerts.

use std::sync::Arc;

use crate::domain::{ClassificationResult, DiagnosisRecord, EmergencyAlert, RawProfile};
use crate::ports::{DiagnosisStore, RecordPage};
use crate::TriageError;

/// Who and for whom a classification was run.
#[derive(Debug, Clone, Default)]
pub struct RecordContext {
    pub patient_id: Option<String>,
    pub performed_by: Option<String>,
}

/// Service for the local diagnosis history.
pub struct HistoryService<S>
where
    S: DiagnosisStore,
{
    storage: Arc<S>,
}

impl<S> HistoryService<S>
where
    S: DiagnosisStore,
    S::Error: Into<crate::adapters::StorageError>,
{
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Persist a classification together with the input it was made from.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    pub fn record(
        &self,
        context: RecordContext,
        input: RawProfile,
        result: ClassificationResult,
    ) -> Result<DiagnosisRecord, TriageError> {
        let mut record = DiagnosisRecord::new(input, result);
        record.patient_id = context.patient_id;
        record.performed_by = context.performed_by;

        self.storage
            .save_record(&record)
            .map_err(|e| TriageError::Storage(e.into()))?;

        if record.is_severe() {
            tracing::warn!("Severe risk recorded, raised alert for diagnosis {}", record.id);
        }

        Ok(record)
    }

    /// # Errors
    /// Returns error if storage operation fails.
    pub fn recent(&self, limit: usize) -> Result<Vec<DiagnosisRecord>, TriageError> {
        self.storage
            .load_recent(limit)
            .map_err(|e| TriageError::Storage(e.into()))
    }

    /// # Errors
    /// Returns error if storage operation fails.
    pub fn page(&self, offset: usize, limit: usize) -> Result<RecordPage, TriageError> {
        self.storage
            .load_page(offset, limit)
            .map_err(|e| TriageError::Storage(e.into()))
    }

    /// # Errors
    /// Returns error if storage operation fails.
    pub fn count(&self) -> Result<usize, TriageError> {
        self.storage
            .count()
            .map_err(|e| TriageError::Storage(e.into()))
    }

    /// Most recent stored alerts, newest first.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    pub fn emergency_alerts(&self, limit: usize) -> Result<Vec<EmergencyAlert>, TriageError> {
        self.storage
            .load_alerts(limit)
            .map_err(|e| TriageError::Storage(e.into()))
    }

    /// # Errors
    /// Returns `TriageError::AlertNotFound` if no alert has that ID, or an
    /// error if the storage operation fails.
    pub fn acknowledge_alert(&self, id: &str) -> Result<(), TriageError> {
        let found = self
            .storage
            .acknowledge_alert(id)
            .map_err(|e| TriageError::Storage(e.into()))?;
        if !found {
            return Err(TriageError::AlertNotFound(id.to_string()));
        }

        tracing::info!("Acknowledged alert {}", id);
        Ok(())
    }
}
