//! Run configuration.
//!
//! Values come from three layers, later ones winning:
//!   1. built-in defaults (the station registry, Europe/Madrid, 30-day window)
//!   2. a TOML file (`windmon.toml` in the working directory, or `--config`)
//!   3. `WINDMON_*` environment variables, including those loaded from `.env`
//!
//! CLI flags are applied by the binary on top of the returned `Config`, after
//! which `validate` must be called again.

use crate::model::{RunMode, WindError};
use crate::report::Language;
use crate::stations::{self, StationSource};
use chrono_tz::Tz;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file looked up when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "windmon.toml";

/// Upper bound for `forecast.window_days` (ten years).
pub const MAX_WINDOW_DAYS: u32 = 3650;

/// Upper bound for the forecast horizon.
pub const MAX_HORIZON_DAYS: u32 = 31;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnConfig {
    /// Column holding the observation time.
    pub timestamp: String,
    /// Column holding the wind speed in m/s.
    pub wind_speed: String,
    /// Working columns never shown in the report. The timestamp column is
    /// always hidden in addition to these.
    pub hidden: Vec<String>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        ColumnConfig {
            timestamp: "timestamp".to_string(),
            wind_speed: "wind_mps".to_string(),
            hidden: vec!["fechas".to_string(), "time_diff".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    /// Trailing window length, ending at the latest observation.
    pub window_days: u32,
    /// Forecast horizon; the run mode's default when unset.
    pub horizon_days: Option<u32>,
    /// Clock hours sampled per day by the hourly-pattern forecast.
    pub clock_hours: Vec<u32>,
    pub jitter: bool,
    /// Jitter bound as a multiple of the trailing standard deviation.
    pub jitter_factor: f64,
    /// Fixed RNG seed for reproducible jitter.
    pub seed: Option<u64>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        ForecastConfig {
            window_days: 30,
            horizon_days: None,
            clock_hours: vec![0, 6, 12, 18],
            jitter: true,
            jitter_factor: 0.2,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub sheet_id: String,
    pub stations: Vec<StationSource>,
    pub mode: RunMode,
    pub output_path: PathBuf,
    /// Zone that naive source timestamps are written in.
    pub source_timezone: String,
    /// Zone used for "now", alignment and display.
    pub display_timezone: String,
    pub http_timeout_secs: u64,
    /// A nearest match further than this from its target is flagged.
    pub stale_after_minutes: u64,
    pub language: Language,
    pub columns: ColumnConfig,
    pub forecast: ForecastConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sheet_id: stations::DEFAULT_SHEET_ID.to_string(),
            stations: stations::default_sources(),
            mode: RunMode::default(),
            output_path: PathBuf::from("index.html"),
            source_timezone: "UTC".to_string(),
            display_timezone: "Europe/Madrid".to_string(),
            http_timeout_secs: 30,
            stale_after_minutes: 180,
            language: Language::default(),
            columns: ColumnConfig::default(),
            forecast: ForecastConfig::default(),
        }
    }
}

impl Config {
    /// Parses a TOML document; missing keys take their defaults.
    /// Stations listed without a `gid` take it from the built-in registry.
    pub fn from_toml_str(text: &str) -> Result<Config, WindError> {
        let mut config: Config = toml::from_str(text).map_err(|e| WindError::Config(e.to_string()))?;
        stations::resolve_gids(&mut config.stations)?;
        Ok(config)
    }

    /// Applies `WINDMON_*` overrides. `lookup` is usually `std::env::var`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), WindError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(sheet_id) = lookup("WINDMON_SHEET_ID") {
            self.sheet_id = sheet_id;
        }
        if let Some(output) = lookup("WINDMON_OUTPUT") {
            self.output_path = PathBuf::from(output);
        }
        if let Some(mode) = lookup("WINDMON_MODE") {
            self.mode = mode.parse().map_err(WindError::Config)?;
        }
        if let Some(tz) = lookup("WINDMON_SOURCE_TZ") {
            self.source_timezone = tz;
        }
        if let Some(tz) = lookup("WINDMON_DISPLAY_TZ") {
            self.display_timezone = tz;
        }
        if let Some(language) = lookup("WINDMON_LANGUAGE") {
            self.language = language.parse().map_err(WindError::Config)?;
        }
        Ok(())
    }

    pub fn source_tz(&self) -> Result<Tz, WindError> {
        parse_tz("source_timezone", &self.source_timezone)
    }

    pub fn display_tz(&self) -> Result<Tz, WindError> {
        parse_tz("display_timezone", &self.display_timezone)
    }

    pub fn horizon_days(&self) -> u32 {
        self.forecast
            .horizon_days
            .unwrap_or_else(|| self.mode.default_horizon_days())
    }

    pub fn validate(&self) -> Result<(), WindError> {
        if self.sheet_id.trim().is_empty() {
            return Err(WindError::Config("sheet_id must not be empty".to_string()));
        }
        stations::validate_sources(&self.stations)?;
        self.source_tz()?;
        self.display_tz()?;

        if self.http_timeout_secs == 0 {
            return Err(WindError::Config("http_timeout_secs must be positive".to_string()));
        }
        if self.columns.timestamp.is_empty() || self.columns.wind_speed.is_empty() {
            return Err(WindError::Config("column names must not be empty".to_string()));
        }
        let window = self.forecast.window_days;
        if window == 0 || window > MAX_WINDOW_DAYS {
            return Err(WindError::Config(format!(
                "forecast.window_days must be between 1 and {}, got {}",
                MAX_WINDOW_DAYS, window
            )));
        }
        let horizon = self.horizon_days();
        if horizon == 0 || horizon > MAX_HORIZON_DAYS {
            return Err(WindError::Config(format!(
                "forecast.horizon_days must be between 1 and {}, got {}",
                MAX_HORIZON_DAYS, horizon
            )));
        }
        if let Some(hour) = self.forecast.clock_hours.iter().find(|h| **h > 23) {
            return Err(WindError::Config(format!("clock hour {} is out of range 0-23", hour)));
        }
        if self.mode == RunMode::Estimated && self.forecast.clock_hours.is_empty() {
            return Err(WindError::Config(
                "forecast.clock_hours must not be empty in estimated mode".to_string(),
            ));
        }
        let factor = self.forecast.jitter_factor;
        if !factor.is_finite() || factor < 0.0 {
            return Err(WindError::Config(format!(
                "forecast.jitter_factor must be a non-negative number, got {}",
                factor
            )));
        }
        Ok(())
    }
}

fn parse_tz(key: &str, name: &str) -> Result<Tz, WindError> {
    name.parse::<Tz>()
        .map_err(|e| WindError::Config(format!("{} '{}': {}", key, name, e)))
}

/// Loads the configuration for a run.
///
/// An explicit `path` must exist. Without one, `windmon.toml` is read if it
/// is present and the defaults are used otherwise. Environment overrides are
/// applied last and the result is validated.
pub fn load(path: Option<&Path>) -> Result<Config, WindError> {
    let mut config = match path {
        Some(path) => Config::from_toml_str(&fs::read_to_string(path)?)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                Config::from_toml_str(&fs::read_to_string(default_path)?)?
            } else {
                Config::default()
            }
        }
    };

    config.apply_env_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}
