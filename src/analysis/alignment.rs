//! Alignment policies: pick the observation that stands for a target time.
//!
//! Neither policy interpolates. An exact-hour miss is reported as absence,
//! and the nearest policy only returns absence for an empty series.

use crate::model::{MatchedObservation, Observation, ReferencePoint, StationSeries};
use chrono::{DateTime, Datelike, Days, TimeDelta, TimeZone, Timelike};
use chrono_tz::Tz;

/// "Same time last year": 365 calendar days before `now`'s local date, at
/// `now`'s wall-clock hour. The subtraction is done on the local date, so a
/// DST change between the two dates does not move the hour.
///
/// A wall-clock hour that does not exist on the target date (spring-forward
/// gap) falls back to the instant exactly 365 days earlier, truncated.
pub fn historical_target(now: DateTime<Tz>) -> DateTime<Tz> {
    let tz = now.timezone();
    now.date_naive()
        .checked_sub_days(Days::new(365))
        .and_then(|date| date.and_hms_opt(now.hour(), 0, 0))
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
        .unwrap_or_else(|| truncate_to_hour(now - TimeDelta::days(365)))
}

fn truncate_to_hour(t: DateTime<Tz>) -> DateTime<Tz> {
    t.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

fn abs_offset(a: DateTime<Tz>, b: DateTime<Tz>) -> TimeDelta {
    (a - b).abs()
}

fn matched(obs: &Observation, target: DateTime<Tz>) -> MatchedObservation {
    MatchedObservation {
        observation: obs.clone(),
        offset: abs_offset(obs.timestamp, target),
    }
}

/// Selects the first observation, in series order, whose calendar hour
/// (year, month, day, hour in the observation's zone) equals the target's.
pub fn align_exact_hour(series: &StationSeries, target: DateTime<Tz>) -> ReferencePoint {
    let found = series.observations.iter().find(|obs| {
        let t = target.with_timezone(&obs.timestamp.timezone());
        let ts = obs.timestamp;
        ts.year() == t.year() && ts.month() == t.month() && ts.day() == t.day() && ts.hour() == t.hour()
    });

    ReferencePoint {
        target,
        matched: found.map(|obs| matched(obs, target)),
    }
}

/// Selects the observation closest to `target` in absolute time. Equal
/// distances keep the earliest index.
pub fn align_nearest(series: &StationSeries, target: DateTime<Tz>) -> ReferencePoint {
    let mut best: Option<(&Observation, TimeDelta)> = None;
    for obs in &series.observations {
        let distance = abs_offset(obs.timestamp, target);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((obs, distance)),
        }
    }

    ReferencePoint {
        target,
        matched: best.map(|(obs, _)| matched(obs, target)),
    }
}
