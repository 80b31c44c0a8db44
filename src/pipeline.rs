//! Load → align/forecast → report model.
//!
//! Each station is loaded and processed on its own; a failure for one
//! becomes a `FetchFailed` entry and never stops the others. The only
//! cross-station computation is the trailing-average forecast of the
//! historical mode, which pools every station that loaded.

use crate::analysis::alignment::{align_exact_hour, align_nearest, historical_target};
use crate::analysis::forecast::{
    HourlyPatternParams, hourly_pattern_forecast, passthrough_forecast, trailing_average_forecast,
};
use crate::analysis::normalize::TimeNormalizer;
use crate::analysis::staleness::is_stale_at;
use crate::config::Config;
use crate::ingest::{self, CsvSource};
use crate::logging::{self, DataSource};
use crate::model::{
    CurrentData, Forecast, ReferencePoint, ReportModel, RunMode, StationOutcome, StationReport,
    StationSeries, WindError,
};
use crate::report;
use chrono::DateTime;
use chrono_tz::Tz;
use rand::Rng;

/// One configured station and the result of loading it.
pub struct LoadedStation {
    pub name: String,
    pub series: Result<StationSeries, WindError>,
}

/// Loads every configured station in configuration order.
pub fn load_all(source: &dyn CsvSource, config: &Config, normalizer: &TimeNormalizer) -> Vec<LoadedStation> {
    let data_source = source.data_source();
    let loaded: Vec<LoadedStation> = config
        .stations
        .iter()
        .map(|station| {
            logging::debug(data_source, Some(&station.name), &format!("loading {}", source.describe(station)));
            let series = ingest::load_station(source, station, &config.columns, normalizer);
            match &series {
                Ok(s) => logging::info(
                    data_source,
                    Some(&station.name),
                    &format!("{} observations ({} rows dropped)", s.observations.len(), s.rows_dropped),
                ),
                Err(e) => logging::log_load_failure(data_source, &station.name, "load", e),
            }
            LoadedStation { name: station.name.clone(), series }
        })
        .collect();

    let failed = loaded.iter().filter(|s| s.series.is_err()).count();
    logging::log_load_summary(data_source, loaded.len(), loaded.len() - failed, failed);
    loaded
}

fn current_data(reference: &ReferencePoint, config: &Config) -> Option<CurrentData> {
    reference.matched.as_ref().map(|m| CurrentData {
        target: reference.target,
        observed_at: m.observation.timestamp,
        fields: report::display_fields(&m.observation, &config.columns),
        stale: is_stale_at(reference, config.stale_after_minutes),
    })
}

/// Builds the report model from loaded stations.
///
/// `now` is the run's reference instant in the display zone; `rng` feeds
/// the hourly-pattern jitter and is untouched in the other modes.
pub fn build_report<R: Rng>(
    config: &Config,
    loaded: Vec<LoadedStation>,
    now: DateTime<Tz>,
    rng: &mut R,
) -> ReportModel {
    let horizon_days = config.horizon_days();

    let pooled = match config.mode {
        RunMode::Historical => {
            let series: Vec<StationSeries> = loaded
                .iter()
                .filter_map(|s| s.series.as_ref().ok().cloned())
                .collect();
            trailing_average_forecast(&series, config.forecast.window_days, horizon_days)
        }
        RunMode::Current | RunMode::Estimated => Forecast::Unavailable,
    };

    let hourly_params = HourlyPatternParams {
        window_days: config.forecast.window_days,
        horizon_days,
        clock_hours: config.forecast.clock_hours.clone(),
        jitter_factor: config.forecast.jitter.then_some(config.forecast.jitter_factor),
    };

    let stations = loaded
        .into_iter()
        .map(|station| {
            let outcome = match station.series {
                Err(e) => StationOutcome::FetchFailed { reason: e.to_string() },
                Ok(series) => {
                    let (reference, forecast) = match config.mode {
                        RunMode::Historical => {
                            (align_exact_hour(&series, historical_target(now)), pooled.clone())
                        }
                        RunMode::Current => (
                            align_nearest(&series, now),
                            passthrough_forecast(&series, now, horizon_days),
                        ),
                        RunMode::Estimated => (
                            align_nearest(&series, now),
                            hourly_pattern_forecast(&series, now, &hourly_params, rng),
                        ),
                    };
                    if reference.matched.is_none() {
                        logging::warn(
                            DataSource::Report,
                            Some(&station.name),
                            &format!("no observation for {}", reference.target.format("%Y-%m-%d %H:%M")),
                        );
                    }
                    StationOutcome::Loaded {
                        current: current_data(&reference, config),
                        forecast,
                    }
                }
            };
            StationReport { station: station.name, outcome }
        })
        .collect();

    ReportModel {
        generated_at: now,
        mode: config.mode,
        horizon_days,
        stations,
    }
}

/// Loads all stations and builds the report model.
pub fn run<R: Rng>(
    config: &Config,
    source: &dyn CsvSource,
    normalizer: &TimeNormalizer,
    now: DateTime<Tz>,
    rng: &mut R,
) -> ReportModel {
    let loaded = load_all(source, config, normalizer);
    build_report(config, loaded, now, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Observation, StationSeries};
    use chrono::{TimeDelta, TimeZone};
    use chrono_tz::Europe::Madrid;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn now() -> DateTime<Tz> {
        Madrid.with_ymd_and_hms(2025, 5, 1, 12, 20, 0).unwrap()
    }

    fn obs(timestamp: DateTime<Tz>, wind_speed: f64) -> Observation {
        Observation {
            timestamp,
            wind_speed,
            fields: vec![
                ("timestamp".to_string(), timestamp.to_rfc3339()),
                ("wind_mps".to_string(), wind_speed.to_string()),
            ],
        }
    }

    fn loaded(name: &str, observations: Vec<Observation>) -> LoadedStation {
        LoadedStation { name: name.to_string(), series: Ok(StationSeries::new(name, observations)) }
    }

    fn failed(name: &str) -> LoadedStation {
        LoadedStation { name: name.to_string(), series: Err(WindError::HttpStatus(500)) }
    }

    fn config(mode: RunMode) -> Config {
        let mut config = Config::default();
        config.mode = mode;
        config
    }

    #[test]
    fn test_historical_mode_matches_last_year_and_pools_forecast() {
        let last_year = Madrid.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let stations = vec![
            loaded("Badia", vec![obs(last_year, 6.0), obs(last_year + TimeDelta::hours(1), 8.0)]),
            loaded("Elgea", vec![obs(last_year + TimeDelta::hours(3), 4.0)]),
        ];
        let model = build_report(&config(RunMode::Historical), stations, now(), &mut StdRng::seed_from_u64(0));

        assert_eq!(model.horizon_days, 5);
        let StationOutcome::Loaded { current: Some(current), forecast } = &model.stations[0].outcome else {
            panic!("Badia should have current data");
        };
        assert_eq!(current.observed_at, last_year);
        assert_eq!(current.fields, vec![("wind_mps".to_string(), "6".to_string())]);
        assert_eq!(forecast.entries().len(), 5);
        assert_eq!(forecast.entries()[0].wind_speed, 6.0, "mean of 6, 8 and 4");

        let StationOutcome::Loaded { current: None, forecast: elgea_forecast } = &model.stations[1].outcome else {
            panic!("Elgea has no reading at 12:00 last year");
        };
        assert_eq!(elgea_forecast, forecast, "the pooled forecast is shared");
    }

    #[test]
    fn test_failed_station_does_not_stop_others() {
        let stations = vec![failed("Badia"), loaded("Elgea", vec![obs(now(), 5.0)])];
        let model = build_report(&config(RunMode::Current), stations, now(), &mut StdRng::seed_from_u64(0));

        assert_eq!(model.failed_stations(), 1);
        assert!(matches!(
            &model.stations[0].outcome,
            StationOutcome::FetchFailed { reason } if reason == "HTTP error: 500"
        ));
        assert!(matches!(&model.stations[1].outcome, StationOutcome::Loaded { current: Some(_), .. }));
    }

    #[test]
    fn test_current_mode_uses_nearest_and_future_rows() {
        let stations = vec![loaded(
            "Badia",
            vec![
                obs(now() - TimeDelta::minutes(20), 5.0),
                obs(now() + TimeDelta::minutes(40), 6.0),
                obs(now() + TimeDelta::days(1), 7.0),
            ],
        )];
        let model = build_report(&config(RunMode::Current), stations, now(), &mut StdRng::seed_from_u64(0));

        let StationOutcome::Loaded { current: Some(current), forecast } = &model.stations[0].outcome else {
            panic!("expected loaded station with data");
        };
        assert_eq!(current.observed_at, now() - TimeDelta::minutes(20));
        assert!(!current.stale);
        let values: Vec<f64> = forecast.entries().iter().map(|e| e.wind_speed).collect();
        assert_eq!(values, vec![6.0, 7.0]);
    }

    #[test]
    fn test_far_nearest_match_is_flagged_stale() {
        let stations = vec![loaded("Badia", vec![obs(now() - TimeDelta::days(2), 5.0)])];
        let model = build_report(&config(RunMode::Current), stations, now(), &mut StdRng::seed_from_u64(0));
        let StationOutcome::Loaded { current: Some(current), .. } = &model.stations[0].outcome else {
            panic!("expected current data");
        };
        assert!(current.stale);
    }

    #[test]
    fn test_estimated_mode_is_reproducible_with_seed() {
        let history: Vec<Observation> = (1..=48)
            .map(|h| obs(now() - TimeDelta::hours(h), 5.0 + (h % 6) as f64))
            .collect();
        let build = |seed| {
            build_report(
                &config(RunMode::Estimated),
                vec![loaded("Badia", history.clone())],
                now(),
                &mut StdRng::seed_from_u64(seed),
            )
        };

        let a = build(11);
        assert_eq!(a, build(11));
        assert_eq!(a.horizon_days, 3);
        let StationOutcome::Loaded { forecast, .. } = &a.stations[0].outcome else {
            panic!("expected loaded station");
        };
        assert_eq!(forecast.entries().len(), 3 * 4, "three days of four clock hours");
    }

    #[test]
    fn test_empty_series_reports_absence_without_fabricating() {
        for mode in [RunMode::Historical, RunMode::Current, RunMode::Estimated] {
            let model = build_report(&config(mode), vec![loaded("Badia", Vec::new())], now(), &mut StdRng::seed_from_u64(0));
            assert_eq!(
                model.stations[0].outcome,
                StationOutcome::Loaded { current: None, forecast: Forecast::Unavailable },
                "mode {}",
                mode
            );
        }
    }
}
