//! Cardiotriage: command-line entry point.
//!
//! # Usage
//!
//! ```bash
//! cardiotriage <profile.json | -> [--patient <id>] [--performed-by <who>]
//! cardiotriage --health
//! cardiotriage --model-info
//! cardiotriage --history <n>
//! cardiotriage --alerts <n>
//! cardiotriage --acknowledge <alert-id>
//! ```
//!
//! Results are printed as JSON on stdout. Logs go to stderr unless
//! `CARDIOTRIAGE_LOG_MODE` says otherwise.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cardiotriage::adapters::rules::ThresholdClassifier;
use cardiotriage::adapters::sanitize::SanitizingMakeWriter;
use cardiotriage::adapters::sqlite::SqliteStore;
use cardiotriage::application::{HealthReport, HistoryService, ModelInfo, RecordContext};
use cardiotriage::config::{Config, LogMode};
use cardiotriage::domain::RawProfile;
use cardiotriage::{DiagnosticService, ProfileBuilder, TriageError};

const USAGE: &str = "Usage: cardiotriage <profile.json | -> [--patient <id>] [--performed-by <who>]\n       cardiotriage --health | --model-info | --history <n> | --alerts <n>\n       cardiotriage --acknowledge <alert-id>";

enum Command {
    Classify {
        source: String,
        context: RecordContext,
    },
    Health,
    ModelInfo,
    History(usize),
    Alerts(usize),
    Acknowledge(String),
}

fn parse_count(flag: &str, value: Option<String>) -> Result<usize, String> {
    value
        .ok_or_else(|| USAGE.to_string())?
        .parse()
        .map_err(|_| format!("{flag} must be a non-negative integer"))
}

fn parse_args() -> Result<Command, String> {
    let mut args = std::env::args().skip(1);
    let mut source: Option<String> = None;
    let mut context = RecordContext::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--health" => return Ok(Command::Health),
            "--model-info" => return Ok(Command::ModelInfo),
            "--history" => return Ok(Command::History(parse_count("--history", args.next())?)),
            "--alerts" => return Ok(Command::Alerts(parse_count("--alerts", args.next())?)),
            "--acknowledge" => {
                return Ok(Command::Acknowledge(
                    args.next().ok_or_else(|| USAGE.to_string())?,
                ));
            }
            "--patient" => context.patient_id = Some(args.next().ok_or_else(|| USAGE.to_string())?),
            "--performed-by" => {
                context.performed_by = Some(args.next().ok_or_else(|| USAGE.to_string())?);
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            s if s.starts_with("--") => return Err(format!("Unknown arg: {s}\n{USAGE}")),
            _ if source.is_some() => return Err(USAGE.to_string()),
            _ => source = Some(arg.clone()),
        }
    }

    source
        .map(|source| Command::Classify { source, context })
        .ok_or_else(|| USAGE.to_string())
}

fn init_logging(config: &Config) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let (writer, guard) = match config.effective_log_mode() {
        LogMode::File => {
            if let Some(parent) = config.log_file.parent() {
                // Best-effort: an existing file in an existing directory still works.
                let _ = std::fs::create_dir_all(parent);
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&config.log_file)
                .with_context(|| format!("Failed to open log file {:?}", config.log_file))?;
            tracing_appender::non_blocking(file)
        }
        LogMode::Stdout => tracing_appender::non_blocking(std::io::stdout()),
        LogMode::Auto | LogMode::Stderr => tracing_appender::non_blocking(std::io::stderr()),
    };

    let writer = SanitizingMakeWriter::new(writer).with_max_bytes(config.sanitize_max_bytes);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .init();

    Ok(guard)
}

fn read_profile(source: &str) -> Result<RawProfile> {
    let text = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read profile from stdin")?;
        buf
    } else {
        std::fs::read_to_string(Path::new(source))
            .with_context(|| format!("Failed to read profile from {source}"))?
    };

    let raw: RawProfile = serde_json::from_str(&text).map_err(TriageError::from)?;
    raw.validate().map_err(TriageError::from)?;
    Ok(raw)
}

fn open_history(config: &Config) -> Result<Option<HistoryService<SqliteStore>>> {
    let Some(path) = &config.db_path else {
        return Ok(None);
    };
    let store = SqliteStore::new(path).map_err(TriageError::from)?;
    tracing::info!("Recording diagnosis history to {:?}", path);
    Ok(Some(HistoryService::new(Arc::new(store))))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let command = match parse_args() {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(2);
        }
    };

    let config = Config::from_env()?;
    let _guard = init_logging(&config)?;

    // The startup step completes before any request is handled.
    let service = DiagnosticService::initialized(ThresholdClassifier::new());
    let history = open_history(&config)?;

    match command {
        Command::Health => print_json(&HealthReport::from_service(&service))?,
        Command::ModelInfo => print_json(&ModelInfo::from_service(&service))?,
        Command::History(limit) => match &history {
            Some(history) => print_json(&history.recent(limit)?)?,
            None => bail!("History is disabled; set CARDIOTRIAGE_DB_PATH"),
        },
        Command::Alerts(limit) => match &history {
            Some(history) => print_json(&history.emergency_alerts(limit)?)?,
            None => bail!("History is disabled; set CARDIOTRIAGE_DB_PATH"),
        },
        Command::Acknowledge(id) => match &history {
            Some(history) => history.acknowledge_alert(&id)?,
            None => bail!("History is disabled; set CARDIOTRIAGE_DB_PATH"),
        },
        Command::Classify { source, context } => {
            if !service.is_ready() {
                return Err(TriageError::ModelNotLoaded(
                    "Model not loaded. Please try again later.".to_string(),
                )
                .into());
            }

            let raw = read_profile(&source)?;
            let profile = ProfileBuilder::build(&raw);
            match profile.bmi_category() {
                Some(category) => {
                    tracing::debug!("BMI category: {:?} ({})", category, category.range());
                }
                None => tracing::debug!("BMI unavailable, not flagged"),
            }
            tracing::debug!(
                "{} risk factors present",
                service.explainer().risk_factors(&profile).len()
            );

            let result = service.classify(&profile);
            if let Some(history) = &history {
                history.record(context, raw, result.clone())?;
            }
            print_json(&result)?;
        }
    }

    Ok(())
}
