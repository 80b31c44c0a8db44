//! Value coercion and timezone normalization for raw sheet cells.
//!
//! Every timestamp passes through `TimeNormalizer` exactly once: naive
//! values are read in the configured source zone, offset-carrying values
//! keep their offset, and both end up in the display zone before any
//! comparison happens.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

const AWARE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%z",
];

/// A timestamp cell as written in the source, before zone handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedTimestamp {
    Naive(NaiveDateTime),
    Aware(DateTime<FixedOffset>),
}

impl ParsedTimestamp {
    pub fn is_naive(&self) -> bool {
        matches!(self, ParsedTimestamp::Naive(_))
    }
}

/// Parses a timestamp cell. Returns `None` for empty or unrecognized text;
/// callers drop such rows.
pub fn parse_timestamp(raw: &str) -> Option<ParsedTimestamp> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(ParsedTimestamp::Aware(dt));
    }
    for format in AWARE_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(ParsedTimestamp::Aware(dt));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(ParsedTimestamp::Naive(dt));
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(ParsedTimestamp::Naive)
}

/// Parses a wind speed cell, accepting a decimal comma ("12,5" → 12.5).
/// Returns `None` for empty, non-numeric or non-finite values.
pub fn parse_wind_speed(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    s.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Converts parsed timestamps into the display zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeNormalizer {
    source_tz: Tz,
    display_tz: Tz,
}

impl TimeNormalizer {
    pub fn new(source_tz: Tz, display_tz: Tz) -> Self {
        TimeNormalizer { source_tz, display_tz }
    }

    pub fn display_tz(&self) -> Tz {
        self.display_tz
    }

    /// The current instant in the display zone.
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.display_tz)
    }

    /// Returns `None` for naive times that do not exist in the source zone
    /// (spring-forward gap). Ambiguous fall-back times take the earlier
    /// instant.
    pub fn normalize(&self, parsed: ParsedTimestamp) -> Option<DateTime<Tz>> {
        match parsed {
            ParsedTimestamp::Aware(dt) => Some(dt.with_timezone(&self.display_tz)),
            ParsedTimestamp::Naive(naive) => self
                .source_tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&self.display_tz)),
        }
    }
}
