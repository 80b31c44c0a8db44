//! Short-horizon wind speed forecasts.
//!
//! Three interchangeable algorithms:
//! - `trailing_average_forecast`: flat mean of the last N days across all
//!   stations, one point per day.
//! - `hourly_pattern_forecast`: per-station hour-of-day means with bounded
//!   uniform jitter scaled by the trailing standard deviation.
//! - `passthrough_forecast`: future-dated rows already in the sheet.
//!
//! Every algorithm returns `Forecast::Unavailable` when it has nothing to
//! work from; none of them fills gaps with zeros.

use crate::model::{Forecast, ForecastDay, ForecastEntry, ForecastMethod, Observation, StationSeries};
use chrono::{DateTime, Days, TimeDelta, TimeZone, Timelike};
use chrono_tz::Tz;
use rand::Rng;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Statistics helpers
// ---------------------------------------------------------------------------

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1). Zero for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let Some(m) = mean(values) else { return 0.0 };
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Observations with `latest - window_days < timestamp <= latest`.
fn trailing_window<'a>(
    observations: &[&'a Observation],
    window_days: u32,
) -> Vec<&'a Observation> {
    let Some(latest) = observations.iter().map(|o| o.timestamp).max() else {
        return Vec::new();
    };
    // A window reaching past chrono's range covers everything up to `latest`.
    let window_start = latest.checked_sub_signed(TimeDelta::days(i64::from(window_days)));
    observations
        .iter()
        .copied()
        .filter(|o| window_start.is_none_or(|start| o.timestamp > start) && o.timestamp <= latest)
        .collect()
}

/// Groups time-ordered entries into calendar days of their own zone.
pub fn group_by_day(method: ForecastMethod, entries: Vec<ForecastEntry>) -> Forecast {
    if entries.is_empty() {
        return Forecast::Unavailable;
    }

    let mut days: Vec<ForecastDay> = Vec::new();
    for entry in entries {
        let date = entry.timestamp.date_naive();
        match days.last_mut() {
            Some(day) if day.date == date => day.entries.push(entry),
            _ => days.push(ForecastDay { date, entries: vec![entry] }),
        }
    }
    Forecast::Days { method, days }
}

// ---------------------------------------------------------------------------
// Flat trailing average
// ---------------------------------------------------------------------------

/// Mean wind speed over the trailing window of all stations combined,
/// repeated once per day for `horizon_days` days after the latest
/// observation.
pub fn trailing_average_forecast(
    series: &[StationSeries],
    window_days: u32,
    horizon_days: u32,
) -> Forecast {
    let combined: Vec<&Observation> = series.iter().flat_map(|s| s.observations.iter()).collect();
    let window = trailing_window(&combined, window_days);
    let values: Vec<f64> = window.iter().map(|o| o.wind_speed).collect();

    let (Some(average), Some(latest)) = (mean(&values), window.iter().map(|o| o.timestamp).max())
    else {
        return Forecast::Unavailable;
    };

    let entries = (1..=i64::from(horizon_days))
        .map_while(|day| latest.checked_add_signed(TimeDelta::days(day)))
        .map(|timestamp| ForecastEntry { timestamp, wind_speed: average })
        .collect();
    group_by_day(ForecastMethod::TrailingAverage, entries)
}

// ---------------------------------------------------------------------------
// Hourly pattern with jitter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct HourlyPatternParams {
    pub window_days: u32,
    pub horizon_days: u32,
    /// Clock hours (0-23) emitted for each forecast day.
    pub clock_hours: Vec<u32>,
    /// Jitter bound as a multiple of the trailing standard deviation;
    /// `None` disables jitter.
    pub jitter_factor: Option<f64>,
}

/// Hour-of-day profile of one station's trailing window before `cutoff`.
///
/// For each day after the cutoff's date and each configured clock hour the
/// value is that hour's trailing mean (or the overall trailing mean if the
/// hour never occurs in the window) plus uniform noise in
/// `[-factor * sd, +factor * sd]`, floored at zero.
pub fn hourly_pattern_forecast<R: Rng>(
    series: &StationSeries,
    cutoff: DateTime<Tz>,
    params: &HourlyPatternParams,
    rng: &mut R,
) -> Forecast {
    let history: Vec<&Observation> = series
        .observations
        .iter()
        .filter(|o| o.timestamp < cutoff)
        .collect();
    let window = trailing_window(&history, params.window_days);
    let values: Vec<f64> = window.iter().map(|o| o.wind_speed).collect();

    let Some(overall_mean) = mean(&values) else {
        return Forecast::Unavailable;
    };
    let spread = params
        .jitter_factor
        .map(|factor| factor * std_dev(&values))
        .unwrap_or(0.0);

    let mut sums: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for obs in &window {
        let slot = sums.entry(obs.timestamp.hour()).or_insert((0.0, 0));
        slot.0 += obs.wind_speed;
        slot.1 += 1;
    }
    let hourly_means: BTreeMap<u32, f64> = sums
        .into_iter()
        .map(|(hour, (sum, count))| (hour, sum / count as f64))
        .collect();

    let mut clock_hours = params.clock_hours.clone();
    clock_hours.sort_unstable();
    clock_hours.dedup();

    let tz = cutoff.timezone();
    let first_date = cutoff.date_naive();
    let mut entries = Vec::new();
    for day in 1..=u64::from(params.horizon_days) {
        let Some(date) = first_date.checked_add_days(Days::new(day)) else {
            break;
        };
        for &hour in &clock_hours {
            let Some(timestamp) = date
                .and_hms_opt(hour, 0, 0)
                .and_then(|naive| tz.from_local_datetime(&naive).earliest())
            else {
                continue;
            };
            let base = hourly_means.get(&hour).copied().unwrap_or(overall_mean);
            let noise = if spread > 0.0 {
                rng.random_range(-spread..=spread)
            } else {
                0.0
            };
            entries.push(ForecastEntry {
                timestamp,
                wind_speed: (base + noise).max(0.0),
            });
        }
    }
    group_by_day(ForecastMethod::HourlyPattern, entries)
}

// ---------------------------------------------------------------------------
// Pass-through
// ---------------------------------------------------------------------------

/// Rows dated after `now` and no later than `now + horizon_days`, sorted by
/// time and grouped by day. Every hour present is kept.
pub fn passthrough_forecast(series: &StationSeries, now: DateTime<Tz>, horizon_days: u32) -> Forecast {
    let end = now.checked_add_signed(TimeDelta::days(i64::from(horizon_days)));
    let mut entries: Vec<ForecastEntry> = series
        .observations
        .iter()
        .filter(|o| o.timestamp > now && end.is_none_or(|end| o.timestamp <= end))
        .map(|o| ForecastEntry {
            timestamp: o.timestamp,
            wind_speed: o.wind_speed,
        })
        .collect();
    entries.sort_by_key(|e| e.timestamp);
    group_by_day(ForecastMethod::PassThrough, entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use chrono_tz::Europe::Madrid;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn at(day: u32, hour: u32) -> DateTime<Tz> {
        Madrid.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    fn obs(timestamp: DateTime<Tz>, wind_speed: f64) -> Observation {
        Observation { timestamp, wind_speed, fields: Vec::new() }
    }

    fn series(observations: Vec<Observation>) -> StationSeries {
        StationSeries::new("Badia", observations)
    }

    fn no_jitter(horizon_days: u32, clock_hours: Vec<u32>) -> HourlyPatternParams {
        HourlyPatternParams { window_days: 30, horizon_days, clock_hours, jitter_factor: None }
    }

    // --- Statistics ---------------------------------------------------------

    #[test]
    fn test_mean_and_std_dev() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
        assert_eq!(std_dev(&[5.0]), 0.0);
        assert!((std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]) - 2.138).abs() < 1e-3);
    }

    // --- Trailing average ---------------------------------------------------

    #[test]
    fn test_trailing_average_is_constant_over_horizon() {
        let data = vec![series(vec![obs(at(1, 0), 4.0), obs(at(2, 0), 6.0)])];
        let forecast = trailing_average_forecast(&data, 30, 5);

        let entries = forecast.entries();
        assert_eq!(entries.len(), 5);
        assert!(entries.iter().all(|e| e.wind_speed == 5.0));
        assert_eq!(entries[0].timestamp, at(3, 0), "first point is one day after latest");
        assert_eq!(entries[4].timestamp, at(7, 0));
    }

    #[test]
    fn test_trailing_average_combines_all_stations() {
        let data = vec![
            series(vec![obs(at(10, 0), 2.0)]),
            StationSeries::new("Elgea", vec![obs(at(11, 0), 8.0)]),
        ];
        let forecast = trailing_average_forecast(&data, 30, 1);
        assert_eq!(forecast.entries()[0].wind_speed, 5.0);
        assert_eq!(forecast.entries()[0].timestamp, at(12, 0));
    }

    #[test]
    fn test_values_outside_window_do_not_change_average() {
        let recent = vec![obs(at(20, 0), 3.0), obs(at(21, 0), 5.0)];
        let mut with_old = recent.clone();
        with_old.push(obs(at(20, 0) - TimeDelta::days(40), 100.0));
        let mut with_other_old = recent.clone();
        with_other_old.push(obs(at(20, 0) - TimeDelta::days(40), 0.5));

        let a = trailing_average_forecast(&[series(with_old)], 30, 3);
        let b = trailing_average_forecast(&[series(with_other_old)], 30, 3);
        assert_eq!(a, b);
        assert_eq!(a.entries()[0].wind_speed, 4.0);
    }

    #[test]
    fn test_window_boundary_is_exclusive() {
        // Exactly window_days before latest is outside the window.
        let data = vec![series(vec![obs(at(1, 0), 10.0), obs(at(1, 0) + TimeDelta::days(30), 2.0)])];
        let forecast = trailing_average_forecast(&data, 30, 1);
        assert_eq!(forecast.entries()[0].wind_speed, 2.0);
    }

    #[test]
    fn test_trailing_average_without_data_is_unavailable() {
        assert_eq!(trailing_average_forecast(&[], 30, 5), Forecast::Unavailable);
        assert_eq!(trailing_average_forecast(&[series(Vec::new())], 30, 5), Forecast::Unavailable);
    }

    // --- Hourly pattern -----------------------------------------------------

    fn hourly_history() -> StationSeries {
        // Two days of 06:00 and 18:00 readings; no 12:00 readings.
        series(vec![
            obs(at(1, 6), 2.0),
            obs(at(1, 18), 8.0),
            obs(at(2, 6), 4.0),
            obs(at(2, 18), 10.0),
        ])
    }

    #[test]
    fn test_hourly_pattern_uses_hour_means_without_jitter() {
        let mut rng = StdRng::seed_from_u64(1);
        let forecast = hourly_pattern_forecast(&hourly_history(), at(3, 0), &no_jitter(2, vec![6, 18]), &mut rng);

        let Forecast::Days { method, days } = &forecast else {
            panic!("expected a forecast, got {:?}", forecast);
        };
        assert_eq!(*method, ForecastMethod::HourlyPattern);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 5, 4).unwrap());
        let values: Vec<f64> = days[0].entries.iter().map(|e| e.wind_speed).collect();
        assert_eq!(values, vec![3.0, 9.0]);
        assert_eq!(days[1].entries[1].timestamp, at(5, 18));
    }

    #[test]
    fn test_unseen_hour_falls_back_to_overall_mean() {
        let mut rng = StdRng::seed_from_u64(1);
        let forecast = hourly_pattern_forecast(&hourly_history(), at(3, 0), &no_jitter(1, vec![12]), &mut rng);
        assert_eq!(forecast.entries()[0].wind_speed, 6.0);
    }

    #[test]
    fn test_jitter_stays_within_bound() {
        let history = hourly_history();
        let values: Vec<f64> = history.observations.iter().map(|o| o.wind_speed).collect();
        let bound = 0.2 * std_dev(&values);
        let params = HourlyPatternParams {
            window_days: 30,
            horizon_days: 5,
            clock_hours: vec![6, 12, 18],
            jitter_factor: Some(0.2),
        };

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let forecast = hourly_pattern_forecast(&history, at(3, 0), &params, &mut rng);
            for entry in forecast.entries() {
                let base = match entry.timestamp.hour() {
                    6 => 3.0,
                    18 => 9.0,
                    _ => 6.0,
                };
                assert!(
                    (entry.wind_speed - base).abs() <= bound + 1e-9,
                    "{} strays more than {} from {}",
                    entry.wind_speed,
                    bound,
                    base
                );
            }
        }
    }

    #[test]
    fn test_same_seed_gives_same_forecast() {
        let params = HourlyPatternParams {
            window_days: 30,
            horizon_days: 3,
            clock_hours: vec![0, 6, 12, 18],
            jitter_factor: Some(0.2),
        };
        let a = hourly_pattern_forecast(&hourly_history(), at(3, 0), &params, &mut StdRng::seed_from_u64(42));
        let b = hourly_pattern_forecast(&hourly_history(), at(3, 0), &params, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_jitter_is_floored_at_zero() {
        // Calm history with one gust: the hour mean is 0 but the spread is large.
        let history = series(vec![obs(at(1, 6), 0.0), obs(at(1, 6) + TimeDelta::minutes(10), 0.0), obs(at(1, 18), 20.0)]);
        let params = HourlyPatternParams {
            window_days: 30,
            horizon_days: 3,
            clock_hours: vec![6],
            jitter_factor: Some(0.2),
        };
        for seed in 0..20 {
            let forecast = hourly_pattern_forecast(&history, at(2, 0), &params, &mut StdRng::seed_from_u64(seed));
            assert!(forecast.entries().iter().all(|e| e.wind_speed >= 0.0));
        }
    }

    #[test]
    fn test_hourly_pattern_ignores_rows_after_cutoff() {
        let mut observations = hourly_history().observations;
        observations.push(obs(at(4, 6), 100.0));
        let mut rng = StdRng::seed_from_u64(1);
        let forecast = hourly_pattern_forecast(&series(observations), at(3, 0), &no_jitter(1, vec![6]), &mut rng);
        assert_eq!(forecast.entries()[0].wind_speed, 3.0);
    }

    #[test]
    fn test_hourly_pattern_window_ends_at_latest_history() {
        let mut observations = hourly_history().observations;
        observations.push(obs(at(1, 6) - TimeDelta::days(45), 50.0));
        let mut rng = StdRng::seed_from_u64(1);
        let forecast = hourly_pattern_forecast(&series(observations), at(3, 0), &no_jitter(1, vec![6]), &mut rng);
        assert_eq!(forecast.entries()[0].wind_speed, 3.0);
    }

    #[test]
    fn test_hourly_pattern_without_history_is_unavailable() {
        let future_only = series(vec![obs(at(10, 6), 5.0)]);
        let mut rng = StdRng::seed_from_u64(1);
        let forecast = hourly_pattern_forecast(&future_only, at(3, 0), &no_jitter(3, vec![6]), &mut rng);
        assert_eq!(forecast, Forecast::Unavailable);
    }

    // --- Pass-through -------------------------------------------------------

    #[test]
    fn test_passthrough_keeps_future_rows_within_horizon() {
        let data = series(vec![
            obs(at(3, 23), 1.0),
            obs(at(5, 10), 3.0),
            obs(at(4, 9), 2.0),
            obs(at(4, 10), 2.5),
            obs(at(3, 10), 9.0),
            obs(at(9, 0), 7.0),
        ]);
        let forecast = passthrough_forecast(&data, at(3, 12), 5);

        let Forecast::Days { method, days } = &forecast else {
            panic!("expected a forecast, got {:?}", forecast);
        };
        assert_eq!(*method, ForecastMethod::PassThrough);
        let per_day: Vec<usize> = days.iter().map(|d| d.entries.len()).collect();
        assert_eq!(per_day, vec![1, 2, 1], "grouped by calendar day");
        let values: Vec<f64> = forecast.entries().iter().map(|e| e.wind_speed).collect();
        assert_eq!(values, vec![1.0, 2.0, 2.5, 3.0], "sorted, past and out-of-horizon rows removed");
    }

    #[test]
    fn test_passthrough_horizon_end_is_inclusive() {
        let data = series(vec![obs(at(8, 12), 4.0)]);
        assert!(passthrough_forecast(&data, at(3, 12), 5).is_available());
    }

    #[test]
    fn test_passthrough_without_future_rows_is_unavailable() {
        let data = series(vec![obs(at(1, 0), 4.0), obs(at(3, 12), 5.0)]);
        assert_eq!(passthrough_forecast(&data, at(3, 12), 5), Forecast::Unavailable);
    }

    #[test]
    fn test_window_past_calendar_range_does_not_panic() {
        let data = vec![series(vec![obs(at(1, 10), 4.0), obs(at(2, 10), 6.0)])];
        let forecast = trailing_average_forecast(&data, u32::MAX, 2);
        let values: Vec<f64> = forecast.entries().iter().map(|e| e.wind_speed).collect();
        assert_eq!(values, vec![5.0, 5.0], "an oversized window keeps every observation");
    }
}
