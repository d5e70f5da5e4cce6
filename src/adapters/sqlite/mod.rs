//! SQLite adapter: Implementation of DiagnosisStore.
//!
//! Keeps a local history of classifications. Raw inputs and score maps are
//! stored as JSON columns so the table does not need to change when the
//! intake form grows a field.
//!
//! Severe results also get one row in `emergencies`, written alongside the
//! diagnosis in the same transaction.
//!
//! The connection is guarded by a `Mutex`; a poisoned lock is reported as
//! `StorageError::LockPoisoned` instead of panicking.
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, Row};

use crate::domain::{
    ClassificationResult, DiagnosisRecord, EmergencyAlert, RawProfile, RiskClass,
    ScoreDistribution,
};
use crate::ports::{DiagnosisStore, RecordPage};

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Database lock poisoned")]
    LockPoisoned,
}

const ALERT_COLUMNS: &str = r"
    SELECT id, patient_id, diagnosis_id, severity, raised_at, acknowledged
    FROM emergencies
";

const SELECT_COLUMNS: &str = r"
    SELECT id, patient_id, performed_by, input_json, label, scores_json,
           explanation, model_version, classified_at, created_at
    FROM diagnoses
";

/// SQLite storage adapter.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file.
    ///
    /// # Errors
    /// Returns error if database cannot be opened or initialized.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        Self::with_connection(Connection::open(path)?)
    }

    /// Create an in-memory database (for testing).
    ///
    /// # Errors
    /// Returns error if database cannot be created.
    pub fn in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        let conn = self.lock()?;

        conn.execute_batch(
            r"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS diagnoses (
                id TEXT PRIMARY KEY,
                patient_id TEXT,
                performed_by TEXT,
                input_json TEXT NOT NULL,
                label TEXT NOT NULL,
                scores_json TEXT NOT NULL,
                explanation TEXT NOT NULL,
                model_version TEXT NOT NULL,
                classified_at TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_diagnoses_created
                ON diagnoses(created_at DESC);

            CREATE TABLE IF NOT EXISTS emergencies (
                id TEXT PRIMARY KEY,
                patient_id TEXT,
                diagnosis_id TEXT NOT NULL UNIQUE
                    REFERENCES diagnoses(id) ON DELETE CASCADE,
                severity TEXT NOT NULL,
                raised_at TEXT NOT NULL,
                acknowledged INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_emergencies_raised
                ON emergencies(raised_at DESC);
            ",
        )?;

        Ok(())
    }

    /// Columns as read from a row, before JSON and timestamp decoding.
    fn read_row(row: &Row<'_>) -> rusqlite::Result<StoredRow> {
        Ok(StoredRow {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            performed_by: row.get(2)?,
            input_json: row.get(3)?,
            label: row.get(4)?,
            scores_json: row.get(5)?,
            explanation: row.get(6)?,
            model_version: row.get(7)?,
            classified_at: row.get(8)?,
            created_at: row.get(9)?,
        })
    }

    fn read_alert(row: &Row<'_>) -> rusqlite::Result<StoredAlert> {
        Ok(StoredAlert {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            diagnosis_id: row.get(2)?,
            severity: row.get(3)?,
            raised_at: row.get(4)?,
            acknowledged: row.get(5)?,
        })
    }

    fn query_records(
        conn: &Connection,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<DiagnosisRecord>, StorageError> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY created_at DESC LIMIT ?1 OFFSET ?2");
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt
            .query_map(params![limit as i64, offset as i64], Self::read_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(StoredRow::into_record).collect()
    }
}

struct StoredRow {
    id: String,
    patient_id: Option<String>,
    performed_by: Option<String>,
    input_json: String,
    label: String,
    scores_json: String,
    explanation: String,
    model_version: String,
    classified_at: String,
    created_at: String,
}

impl StoredRow {
    fn into_record(self) -> Result<DiagnosisRecord, StorageError> {
        let input_payload: RawProfile = serde_json::from_str(&self.input_json)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let scores: ScoreDistribution = serde_json::from_str(&self.scores_json)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let predicted_class = RiskClass::from_label(&self.label)
            .ok_or_else(|| StorageError::Serialization(format!("Unknown label {:?}", self.label)))?;

        Ok(DiagnosisRecord {
            id: self.id,
            patient_id: self.patient_id,
            performed_by: self.performed_by,
            input_payload,
            model_result: ClassificationResult {
                predicted_class,
                scores,
                explanation: self.explanation,
                model_version: self.model_version,
                timestamp: parse_timestamp(&self.classified_at)?,
            },
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

struct StoredAlert {
    id: String,
    patient_id: Option<String>,
    diagnosis_id: String,
    severity: String,
    raised_at: String,
    acknowledged: bool,
}

impl StoredAlert {
    fn into_alert(self) -> Result<EmergencyAlert, StorageError> {
        Ok(EmergencyAlert {
            id: self.id,
            patient_id: self.patient_id,
            diagnosis_id: self.diagnosis_id,
            severity: self.severity,
            timestamp: parse_timestamp(&self.raised_at)?,
            acknowledged: self.acknowledged,
        })
    }
}

/// Fixed-width RFC 3339 so text ordering matches time ordering.
fn format_timestamp(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true)
}

fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>, StorageError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| StorageError::Serialization(format!("Bad timestamp {s:?}: {e}")))
}

impl DiagnosisStore for SqliteStore {
    type Error = StorageError;

    fn save_record(&self, record: &DiagnosisRecord) -> Result<(), Self::Error> {
        let input_json = serde_json::to_string(&record.input_payload)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let scores_json = serde_json::to_string(&record.model_result.scores)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            r"
            INSERT INTO diagnoses (
                id, patient_id, performed_by, input_json, label, scores_json,
                explanation, model_version, classified_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ",
            params![
                record.id,
                record.patient_id,
                record.performed_by,
                input_json,
                record.model_result.predicted_class.label(),
                scores_json,
                record.model_result.explanation,
                record.model_result.model_version,
                format_timestamp(&record.model_result.timestamp),
                format_timestamp(&record.created_at),
            ],
        )?;

        if let Some(alert) = EmergencyAlert::for_record(record) {
            tx.execute(
                r"
                INSERT INTO emergencies (
                    id, patient_id, diagnosis_id, severity, raised_at, acknowledged
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ",
                params![
                    alert.id,
                    alert.patient_id,
                    alert.diagnosis_id,
                    alert.severity,
                    format_timestamp(&alert.timestamp),
                    alert.acknowledged,
                ],
            )?;
        }
        tx.commit()?;

        tracing::debug!("Saved diagnosis record {}", record.id);
        Ok(())
    }

    fn load_recent(&self, limit: usize) -> Result<Vec<DiagnosisRecord>, Self::Error> {
        let conn = self.lock()?;
        Self::query_records(&conn, limit, 0)
    }

    fn load_page(&self, offset: usize, limit: usize) -> Result<RecordPage, Self::Error> {
        let conn = self.lock()?;

        let total_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM diagnoses", [], |row| row.get(0))?;
        let items = Self::query_records(&conn, limit, offset)?;

        Ok(RecordPage::new(items, total_count as usize, offset, limit))
    }

    fn count(&self) -> Result<usize, Self::Error> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM diagnoses", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn delete_record(&self, id: &str) -> Result<(), Self::Error> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM diagnoses WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn clear_all(&self) -> Result<(), Self::Error> {
        let conn = self.lock()?;
        conn.execute_batch("DELETE FROM emergencies; DELETE FROM diagnoses;")?;
        tracing::warn!("Cleared diagnosis history");
        Ok(())
    }

    fn load_alerts(&self, limit: usize) -> Result<Vec<EmergencyAlert>, Self::Error> {
        let conn = self.lock()?;
        let sql = format!("{ALERT_COLUMNS} ORDER BY raised_at DESC LIMIT ?1");
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt
            .query_map(params![limit as i64], Self::read_alert)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(StoredAlert::into_alert).collect()
    }

    fn acknowledge_alert(&self, id: &str) -> Result<bool, Self::Error> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE emergencies SET acknowledged = 1 WHERE id = ?1",
            params![id],
        )?;
        Ok(changed > 0)
    }
}
