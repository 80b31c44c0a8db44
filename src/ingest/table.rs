/// CSV parsing for station sheets.
///
/// The sheet export is ordinary CSV with a header row. Values containing a
/// decimal comma arrive quoted ("12,5"), so splitting on commas by hand is
/// not an option; the `csv` crate handles quoting.
///
/// Row handling:
///   - a row with an unparseable timestamp or wind speed is dropped
///   - a series mixing naive and offset-carrying timestamps is rejected
///   - every column is kept, in header order, as raw text

use crate::analysis::normalize::{self, TimeNormalizer};
use crate::config::ColumnConfig;
use crate::logging::{self, DataSource};
use crate::model::{Observation, StationSeries, WindError};

fn csv_reader(text: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes())
}

/// Header names of a CSV document, in order.
pub fn read_headers(text: &str) -> Result<Vec<String>, WindError> {
    let mut reader = csv_reader(text);
    let headers = reader.headers().map_err(|e| WindError::Csv(e.to_string()))?;
    Ok(headers.iter().map(str::to_string).collect())
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, WindError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| WindError::MissingColumn(name.to_string()))
}

/// Parses a station's CSV export into a normalized series.
pub fn parse_station_csv(
    station: &str,
    text: &str,
    columns: &ColumnConfig,
    normalizer: &TimeNormalizer,
) -> Result<StationSeries, WindError> {
    let mut reader = csv_reader(text);
    let headers = reader
        .headers()
        .map_err(|e| WindError::Csv(e.to_string()))?
        .clone();
    let ts_idx = column_index(&headers, &columns.timestamp)?;
    let wind_idx = column_index(&headers, &columns.wind_speed)?;

    let mut observations = Vec::new();
    let mut rows_read = 0;
    let mut rows_dropped = 0;
    let mut saw_naive = false;
    let mut saw_aware = false;

    for (i, record) in reader.records().enumerate() {
        rows_read += 1;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                rows_dropped += 1;
                logging::debug(DataSource::Sheet, Some(station), &format!("row {}: {}", i + 1, e));
                continue;
            }
        };

        let Some(parsed) = record.get(ts_idx).and_then(normalize::parse_timestamp) else {
            rows_dropped += 1;
            continue;
        };
        let Some(wind_speed) = record.get(wind_idx).and_then(normalize::parse_wind_speed) else {
            rows_dropped += 1;
            continue;
        };

        if parsed.is_naive() {
            saw_naive = true;
        } else {
            saw_aware = true;
        }
        if saw_naive && saw_aware {
            return Err(WindError::MixedTimestampKinds(station.to_string()));
        }

        let Some(timestamp) = normalizer.normalize(parsed) else {
            rows_dropped += 1;
            continue;
        };

        let fields = headers
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        observations.push(Observation { timestamp, wind_speed, fields });
    }

    if rows_dropped > 0 {
        logging::debug(
            DataSource::Sheet,
            Some(station),
            &format!("dropped {} of {} rows that failed coercion", rows_dropped, rows_read),
        );
    }

    Ok(StationSeries {
        station: station.to_string(),
        observations,
        rows_read,
        rows_dropped,
    })
}
