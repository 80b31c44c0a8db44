//! Data Source Verification Module
//!
//! Checks every configured station against its data source to determine
//! which sheets are reachable, parse, and carry the required columns.
//!
//! Use this after editing the station list or when a report shows
//! unexpected placeholders.

use crate::analysis::normalize::TimeNormalizer;
use crate::config::Config;
use crate::ingest::{CsvSource, table};
use crate::stations::StationSource;
use chrono::Utc;
use serde::Serialize;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub results: Vec<StationVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub working: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StationVerification {
    pub station: String,
    pub location: String,
    pub status: VerificationStatus,
    pub reachable: bool,
    pub columns_present: Vec<String>,
    pub columns_missing: Vec<String>,
    pub rows_read: usize,
    pub rows_usable: usize,
    pub latest_timestamp: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
}

// ============================================================================
// Station Verification
// ============================================================================

/// Fetches one station and reports what was found.
///
/// - `Failed`: unreachable, or a required column is missing
/// - `PartialSuccess`: parses, but no row survived coercion
/// - `Success`: at least one usable observation
pub fn verify_station(
    source: &dyn CsvSource,
    station: &StationSource,
    config: &Config,
    normalizer: &TimeNormalizer,
) -> StationVerification {
    let mut result = StationVerification {
        station: station.name.clone(),
        location: source.describe(station),
        status: VerificationStatus::Failed,
        reachable: false,
        columns_present: Vec::new(),
        columns_missing: Vec::new(),
        rows_read: 0,
        rows_usable: 0,
        latest_timestamp: None,
        error_message: None,
    };

    let text = match source.fetch_csv(station) {
        Ok(text) => text,
        Err(e) => {
            result.error_message = Some(e.to_string());
            return result;
        }
    };
    result.reachable = true;

    match table::read_headers(&text) {
        Ok(headers) => result.columns_present = headers,
        Err(e) => {
            result.error_message = Some(e.to_string());
            return result;
        }
    }
    for required in [&config.columns.timestamp, &config.columns.wind_speed] {
        if !result.columns_present.contains(required) {
            result.columns_missing.push(required.clone());
        }
    }
    if !result.columns_missing.is_empty() {
        result.error_message = Some(format!("missing columns: {}", result.columns_missing.join(", ")));
        return result;
    }

    match table::parse_station_csv(&station.name, &text, &config.columns, normalizer) {
        Ok(series) => {
            result.rows_read = series.rows_read;
            result.rows_usable = series.observations.len();
            result.latest_timestamp = series.latest().map(|t| t.to_rfc3339());
            result.status = if result.rows_usable > 0 {
                VerificationStatus::Success
            } else {
                VerificationStatus::PartialSuccess
            };
        }
        Err(e) => {
            result.error_message = Some(e.to_string());
        }
    }

    result
}

// ============================================================================
// Full Verification Runner
// ============================================================================

pub fn run_verification(
    source: &dyn CsvSource,
    config: &Config,
    normalizer: &TimeNormalizer,
) -> VerificationReport {
    let results: Vec<StationVerification> = config
        .stations
        .iter()
        .map(|station| verify_station(source, station, config, normalizer))
        .collect();

    let working = results
        .iter()
        .filter(|r| r.status != VerificationStatus::Failed)
        .count();

    VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        summary: VerificationSummary {
            total: results.len(),
            working,
            failed: results.len() - working,
        },
        results,
    }
}

/// Human-readable summary, one block per station.
pub fn format_report(report: &VerificationReport) -> String {
    let mut out = String::new();
    out.push_str("\n🔍 Station data sources:\n");
    out.push_str("═══════════════════════════════════════════════════════════\n");
    for r in &report.results {
        out.push_str(&format!("\n{} ({})\n", r.station, r.location));
        out.push_str(&format!("  Status: {:?}\n", r.status));
        out.push_str(&format!("  Columns: {}\n", r.columns_present.join(", ")));
        out.push_str(&format!("  Rows: {} usable of {}\n", r.rows_usable, r.rows_read));
        if let Some(latest) = &r.latest_timestamp {
            out.push_str(&format!("  Latest: {}\n", latest));
        }
        if let Some(error) = &r.error_message {
            out.push_str(&format!("  Error: {}\n", error));
        }
    }
    out.push_str("\n═══════════════════════════════════════════════════════════\n");
    out.push_str(&format!(
        "Summary: {}/{} working, {} failed\n",
        report.summary.working, report.summary.total, report.summary.failed
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dev_mode::DevMode;
    use chrono_tz::Europe::Madrid;
    use chrono_tz::UTC;
    use std::fs;

    fn normalizer() -> TimeNormalizer {
        TimeNormalizer::new(UTC, Madrid)
    }

    #[test]
    fn test_verification_classifies_each_station() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Badia.csv"), "timestamp,wind_mps\n2024-05-01 10:00:00,5.0\n").unwrap();
        fs::write(dir.path().join("Elgea.csv"), "timestamp,wind_mps\n2024-05-01 10:00:00,n/a\n").unwrap();
        fs::write(dir.path().join("Corrella.csv"), "fecha,viento\n").unwrap();

        let config = Config::default();
        let report = run_verification(&DevMode::new(dir.path()), &config, &normalizer());

        let statuses: Vec<&VerificationStatus> = report.results.iter().map(|r| &r.status).collect();
        assert_eq!(
            statuses,
            vec![
                &VerificationStatus::Success,
                &VerificationStatus::PartialSuccess,
                &VerificationStatus::Failed,
            ]
        );
        assert_eq!(report.results[2].columns_missing, vec!["timestamp", "wind_mps"]);
        assert_eq!(report.summary.working, 2);
        assert_eq!(report.summary.failed, 1);
    }

    #[test]
    fn test_unreachable_station_is_failed() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let station = &config.stations[0];
        let result = verify_station(&DevMode::new(dir.path()), station, &config, &normalizer());
        assert_eq!(result.status, VerificationStatus::Failed);
        assert!(!result.reachable);
        assert!(result.error_message.is_some());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let dir = tempfile::tempdir().unwrap();
        let report = run_verification(&DevMode::new(dir.path()), &Config::default(), &normalizer());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["total"], 3);
        assert_eq!(json["results"][0]["status"], "Failed");
        assert!(format_report(&report).contains("Summary: 0/3 working, 3 failed"));
    }
}
