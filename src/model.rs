/// Observation, StationSeries, ReferencePoint, Forecast, ReportModel, WindError
/// core data structures and error handling
///
/// Core data types for the wind farm report service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O and no decision logic, only types and small accessors.

use chrono::{DateTime, NaiveDate, TimeDelta};
use chrono_tz::Tz;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Observation types
// ---------------------------------------------------------------------------

/// A single row of a station sheet after normalization.
///
/// `timestamp` is already converted to the display timezone. `fields` holds
/// every column of the source row, in header order, as raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub timestamp: DateTime<Tz>,
    pub wind_speed: f64,
    pub fields: Vec<(String, String)>,
}

/// All usable observations for one station, in the order the source
/// returned them. Not sorted, not deduplicated.
#[derive(Debug, Clone, PartialEq)]
pub struct StationSeries {
    pub station: String,
    pub observations: Vec<Observation>,
    /// Data rows seen in the source, including dropped ones.
    pub rows_read: usize,
    /// Rows dropped because a timestamp or wind speed failed to coerce.
    pub rows_dropped: usize,
}

impl StationSeries {
    pub fn new(station: &str, observations: Vec<Observation>) -> Self {
        let rows_read = observations.len();
        StationSeries {
            station: station.to_string(),
            observations,
            rows_read,
            rows_dropped: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Latest timestamp in the series, regardless of source order.
    pub fn latest(&self) -> Option<DateTime<Tz>> {
        self.observations.iter().map(|o| o.timestamp).max()
    }
}

// ---------------------------------------------------------------------------
// Alignment result
// ---------------------------------------------------------------------------

/// The observation chosen by an alignment policy, with its absolute
/// distance from the target.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedObservation {
    pub observation: Observation,
    pub offset: TimeDelta,
}

/// A target timestamp and whatever observation the alignment policy matched.
/// `matched` is `None` when nothing qualified.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePoint {
    pub target: DateTime<Tz>,
    pub matched: Option<MatchedObservation>,
}

// ---------------------------------------------------------------------------
// Forecast types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastMethod {
    /// Mean of the trailing window, projected flat, one point per day.
    TrailingAverage,
    /// Per-hour-of-day means with bounded jitter.
    HourlyPattern,
    /// Future-dated rows already present in the source.
    PassThrough,
}

impl ForecastMethod {
    /// Decimal places used when the value is displayed.
    pub fn display_decimals(&self) -> usize {
        match self {
            ForecastMethod::TrailingAverage => 2,
            ForecastMethod::HourlyPattern | ForecastMethod::PassThrough => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Tz>,
    pub wind_speed: f64,
}

/// Forecast entries sharing one calendar date in the display timezone.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub entries: Vec<ForecastEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Forecast {
    /// No usable history (or no future rows); never rendered as zeros.
    Unavailable,
    Days {
        method: ForecastMethod,
        days: Vec<ForecastDay>,
    },
}

impl Forecast {
    pub fn is_available(&self) -> bool {
        matches!(self, Forecast::Days { .. })
    }

    /// All entries in day order; empty when unavailable.
    pub fn entries(&self) -> Vec<&ForecastEntry> {
        match self {
            Forecast::Unavailable => Vec::new(),
            Forecast::Days { days, .. } => days.iter().flat_map(|d| d.entries.iter()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Report model
// ---------------------------------------------------------------------------

/// Which alignment policy and forecast algorithm a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Exact-hour match one year ago, flat trailing average forecast.
    #[default]
    Historical,
    /// Nearest match to now, future rows of the sheet as the forecast.
    Current,
    /// Nearest match to now, hourly-pattern forecast with jitter.
    Estimated,
}

impl RunMode {
    pub fn default_horizon_days(&self) -> u32 {
        match self {
            RunMode::Historical | RunMode::Current => 5,
            RunMode::Estimated => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Historical => "historical",
            RunMode::Current => "current",
            RunMode::Estimated => "estimated",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "historical" => Ok(RunMode::Historical),
            "current" => Ok(RunMode::Current),
            "estimated" => Ok(RunMode::Estimated),
            other => Err(format!(
                "unknown run mode '{}' (expected historical, current or estimated)",
                other
            )),
        }
    }
}

/// Reference data for one station, already filtered for display.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentData {
    pub target: DateTime<Tz>,
    pub observed_at: DateTime<Tz>,
    /// Ordered (column, value) pairs with working columns removed.
    pub fields: Vec<(String, String)>,
    /// The match is further from the target than the configured tolerance.
    pub stale: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StationOutcome {
    /// The sheet could not be fetched or parsed at all.
    FetchFailed { reason: String },
    /// The sheet loaded; either part may still be absent.
    Loaded {
        current: Option<CurrentData>,
        forecast: Forecast,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StationReport {
    pub station: String,
    pub outcome: StationOutcome,
}

impl StationReport {
    pub fn has_forecast(&self) -> bool {
        matches!(&self.outcome, StationOutcome::Loaded { forecast, .. } if forecast.is_available())
    }
}

/// Everything the renderer needs, in station configuration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportModel {
    pub generated_at: DateTime<Tz>,
    pub mode: RunMode,
    pub horizon_days: u32,
    pub stations: Vec<StationReport>,
}

impl ReportModel {
    pub fn stations_with_forecast(&self) -> usize {
        self.stations.iter().filter(|s| s.has_forecast()).count()
    }

    pub fn failed_stations(&self) -> usize {
        self.stations
            .iter()
            .filter(|s| matches!(s.outcome, StationOutcome::FetchFailed { .. }))
            .count()
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when loading, parsing or reporting station data.
#[derive(Debug, Error)]
pub enum WindError {
    /// Non-2xx HTTP response from the sheet export.
    #[error("HTTP error: {0}")]
    HttpStatus(u16),
    /// Transport failure, including timeouts.
    #[error("Request failed: {0}")]
    Fetch(String),
    /// The body is not readable as CSV.
    #[error("CSV error: {0}")]
    Csv(String),
    /// A required column is absent from the header row.
    #[error("Missing column: {0}")]
    MissingColumn(String),
    /// One series mixes naive and offset-carrying timestamps.
    #[error("Mixed naive and zone-aware timestamps in series for {0}")]
    MixedTimestampKinds(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}
