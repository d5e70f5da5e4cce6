//! Storage port: Trait for diagnosis history and emergency alerts.
//!
//! This trait abstracts the storage backend (SQLite) from the application logic.

use crate::domain::{DiagnosisRecord, EmergencyAlert};

/// A page of records with pagination metadata.
#[derive(Debug, Clone)]
pub struct RecordPage {
    /// Records in this page, newest first
    pub items: Vec<DiagnosisRecord>,
    /// Total count of all records
    pub total_count: usize,
    /// Current page offset
    pub offset: usize,
    /// Page size limit
    pub limit: usize,
    /// Whether there are more pages
    pub has_more: bool,
}

impl RecordPage {
    #[must_use]
    pub fn new(
        items: Vec<DiagnosisRecord>,
        total_count: usize,
        offset: usize,
        limit: usize,
    ) -> Self {
        let has_more = offset + items.len() < total_count;
        Self {
            items,
            total_count,
            offset,
            limit,
            has_more,
        }
    }

    #[must_use]
    pub fn next_offset(&self) -> Option<usize> {
        self.has_more.then(|| self.offset + self.limit)
    }

    #[must_use]
    pub fn prev_offset(&self) -> Option<usize> {
        (self.offset > 0).then(|| self.offset.saturating_sub(self.limit))
    }
}

/// Trait for local diagnosis history.
pub trait DiagnosisStore: Send + Sync {
    /// Error type for storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist one record, plus its emergency alert if it is severe.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn save_record(&self, record: &DiagnosisRecord) -> Result<(), Self::Error>;

    /// Load up to `limit` records, newest first.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn load_recent(&self, limit: usize) -> Result<Vec<DiagnosisRecord>, Self::Error>;

    /// Load records with offset pagination, newest first.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn load_page(&self, offset: usize, limit: usize) -> Result<RecordPage, Self::Error>;

    /// # Errors
    /// Returns error if storage operation fails.
    fn count(&self) -> Result<usize, Self::Error>;

    /// Delete a record and its alert by ID. Missing IDs are not an error.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn delete_record(&self, id: &str) -> Result<(), Self::Error>;

    /// # Errors
    /// Returns error if storage operation fails.
    fn clear_all(&self) -> Result<(), Self::Error>;

    /// Load up to `limit` stored alerts, newest first.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn load_alerts(&self, limit: usize) -> Result<Vec<EmergencyAlert>, Self::Error>;

    /// Mark an alert acknowledged. Returns `false` if no alert has that ID.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn acknowledge_alert(&self, id: &str) -> Result<bool, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offsets() {
        let page = RecordPage::new(Vec::new(), 25, 10, 10);
        assert!(page.has_more);
        assert_eq!(page.next_offset(), Some(20));
        assert_eq!(page.prev_offset(), Some(0));

        let first = RecordPage::new(Vec::new(), 0, 0, 10);
        assert!(!first.has_more);
        assert_eq!(first.next_offset(), None);
        assert_eq!(first.prev_offset(), None);
    }
}
