/// Structured logging for the wind farm report service
///
/// Provides context-rich logging with station identifiers and data source
/// tags on top of the `log` facade. The binary installs `env_logger` as the
/// backend; library code only ever calls the helpers below.

use crate::model::WindError;
use log::LevelFilter;
use std::fmt;

const TARGET: &str = "windmon";

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Remote spreadsheet CSV export.
    Sheet,
    /// Local CSV files (dev mode).
    Local,
    Report,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Sheet => write!(f, "SHEET"),
            DataSource::Local => write!(f, "LOCAL"),
            DataSource::Report => write!(f, "REPORT"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - e.g. a dev-mode file that was never exported
    Expected,
    /// Unexpected failure - indicates service degradation or configuration issue
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Setup
// ---------------------------------------------------------------------------

/// Maps the CLI `-v` count to a level filter.
pub fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Installs `env_logger`. `RUST_LOG` still wins over `default_level`.
/// Calling this twice is harmless.
pub fn init_logger(default_level: LevelFilter) {
    let env = env_logger::Env::default().default_filter_or(default_level.as_str());
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_secs()
        .try_init();
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

fn format_entry(source: DataSource, station: Option<&str>, message: &str) -> String {
    match station {
        Some(station) => format!("{} [{}]: {}", source, station, message),
        None => format!("{}: {}", source, message),
    }
}

/// Log a general informational message
pub fn info(source: DataSource, station: Option<&str>, message: &str) {
    log::info!(target: TARGET, "{}", format_entry(source, station, message));
}

/// Log a warning message
pub fn warn(source: DataSource, station: Option<&str>, message: &str) {
    log::warn!(target: TARGET, "{}", format_entry(source, station, message));
}

/// Log an error message
pub fn error(source: DataSource, station: Option<&str>, message: &str) {
    log::error!(target: TARGET, "{}", format_entry(source, station, message));
}

/// Log a debug message
pub fn debug(source: DataSource, station: Option<&str>, message: &str) {
    log::debug!(target: TARGET, "{}", format_entry(source, station, message));
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a station load failure based on the error kind
pub fn classify_load_failure(err: &WindError) -> FailureType {
    match err {
        // Transport problems and server errors mean the service is degraded
        WindError::Fetch(_) | WindError::Config(_) => FailureType::Unexpected,
        WindError::HttpStatus(code) if *code >= 500 => FailureType::Unexpected,
        // A missing local export is the normal state of a partial dev setup
        WindError::Io(_) => FailureType::Expected,
        // 4xx, or a sheet whose layout changed
        WindError::HttpStatus(_)
        | WindError::Csv(_)
        | WindError::MissingColumn(_)
        | WindError::MixedTimestampKinds(_) => FailureType::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a station load failure with automatic classification
pub fn log_load_failure(source: DataSource, station: &str, operation: &str, err: &WindError) {
    let failure_type = classify_load_failure(err);
    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => debug(source, Some(station), &message),
        FailureType::Unexpected => error(source, Some(station), &message),
        FailureType::Unknown => warn(source, Some(station), &message),
    }
}

// ---------------------------------------------------------------------------
// Run Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of station loading for one run
pub fn log_load_summary(source: DataSource, total: usize, loaded: usize, failed: usize) {
    let message = format!("Load complete: {}/{} stations loaded, {} failed", loaded, total, failed);

    if failed == 0 {
        info(source, None, &message);
    } else if loaded == 0 {
        error(source, None, &message);
    } else {
        warn(source, None, &message);
    }
}
