/// Station data loading.
///
/// A `CsvSource` yields the raw CSV text for one configured station; the
/// `table` parser turns that text into a `StationSeries`. The remote
/// spreadsheet export (`gsheet`) and the local dev-mode directory
/// (`crate::dev_mode`) are the two sources.
///
/// Submodules:
/// - `gsheet`: Google Sheets CSV export client.
/// - `table`: CSV to `StationSeries` parsing with row-level coercion.

pub mod gsheet;
pub mod table;

use crate::analysis::normalize::TimeNormalizer;
use crate::config::ColumnConfig;
use crate::logging::DataSource;
use crate::model::{StationSeries, WindError};
use crate::stations::StationSource;

/// Anything that can produce the CSV export of a station's sheet.
pub trait CsvSource {
    fn fetch_csv(&self, station: &StationSource) -> Result<String, WindError>;

    /// Tag used in log lines for this source.
    fn data_source(&self) -> DataSource;

    /// Human-readable location of a station's data, for logs and verification.
    fn describe(&self, station: &StationSource) -> String;
}

/// Fetches and parses one station. Errors are per-station; callers keep
/// going with the remaining stations.
pub fn load_station(
    source: &dyn CsvSource,
    station: &StationSource,
    columns: &ColumnConfig,
    normalizer: &TimeNormalizer,
) -> Result<StationSeries, WindError> {
    let text = source.fetch_csv(station)?;
    table::parse_station_csv(&station.name, &text, columns, normalizer)
}
