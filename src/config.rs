//! Runtime configuration from `CARDIOTRIAGE_*` environment variables.

use std::path::PathBuf;

use crate::adapters::sanitize::DEFAULT_SANITIZE_MAX_BYTES;
use crate::TriageError;

const LOG_MODE_ENV: &str = "CARDIOTRIAGE_LOG_MODE";
const LOG_FILE_ENV: &str = "CARDIOTRIAGE_LOG_FILE";
const DB_PATH_ENV: &str = "CARDIOTRIAGE_DB_PATH";
const SANITIZE_MAX_BYTES_ENV: &str = "CARDIOTRIAGE_SANITIZE_MAX_BYTES";

const DEFAULT_LOG_FILE: &str = "data/cardiotriage.log";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// Resolves to `Stderr`, keeping stdout free for JSON output
    Auto,
    File,
    Stdout,
    Stderr,
}

impl std::str::FromStr for LogMode {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "file" => Ok(Self::File),
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            other => Err(TriageError::Config(format!(
                "{LOG_MODE_ENV} must be auto, file, stdout or stderr, got {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    /// History database; `None` disables recording.
    pub db_path: Option<PathBuf>,
    pub sanitize_max_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_mode: LogMode::Auto,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            db_path: None,
            sanitize_max_bytes: DEFAULT_SANITIZE_MAX_BYTES,
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns `TriageError::Config` for unparseable values.
    pub fn from_env() -> Result<Self, TriageError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns `TriageError::Config` for unparseable values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TriageError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(mode) = lookup(LOG_MODE_ENV) {
            config.log_mode = mode.parse()?;
        }
        if let Some(file) = lookup(LOG_FILE_ENV).filter(|v| !v.trim().is_empty()) {
            config.log_file = PathBuf::from(file.trim());
        }
        config.db_path = lookup(DB_PATH_ENV)
            .filter(|v| !v.trim().is_empty())
            .map(|v| PathBuf::from(v.trim()));
        if let Some(raw) = lookup(SANITIZE_MAX_BYTES_ENV) {
            config.sanitize_max_bytes = raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|&v| v > 0)
                .ok_or_else(|| {
                    TriageError::Config(format!(
                        "{SANITIZE_MAX_BYTES_ENV} must be a positive integer, got {raw:?}"
                    ))
                })?;
        }

        Ok(config)
    }

    /// Log mode with `Auto` resolved.
    #[must_use]
    pub fn effective_log_mode(&self) -> LogMode {
        match self.log_mode {
            LogMode::Auto => LogMode::Stderr,
            other => other,
        }
    }
}
