/// Development mode utilities for working with exported sheet data
///
/// When the spreadsheet is unreachable, or a run must be reproducible, use
/// this module to read each station's CSV from a local directory instead
/// of the network. Combine with a pinned `--now` to replay a past day.

use crate::ingest::CsvSource;
use crate::logging::DataSource;
use crate::model::WindError;
use crate::stations::StationSource;
use std::fs;
use std::path::PathBuf;

/// Configuration for development mode data replay
#[derive(Debug, Clone)]
pub struct DevMode {
    /// Directory holding one `<station name>.csv` per station
    pub data_dir: PathBuf,
}

impl DevMode {
    /// Create a new dev mode configuration
    ///
    /// # Arguments
    /// * `data_dir` - Directory containing exported station CSV files
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    /// File a station is read from.
    pub fn station_path(&self, station: &StationSource) -> PathBuf {
        self.data_dir.join(format!("{}.csv", station.name))
    }

    /// Writes a station export into the data directory, e.g. to snapshot a
    /// live fetch for later replay.
    pub fn save_station_csv(&self, station: &StationSource, csv: &str) -> Result<PathBuf, WindError> {
        fs::create_dir_all(&self.data_dir)?;
        let path = self.station_path(station);
        fs::write(&path, csv)?;
        Ok(path)
    }
}

impl CsvSource for DevMode {
    fn fetch_csv(&self, station: &StationSource) -> Result<String, WindError> {
        Ok(fs::read_to_string(self.station_path(station))?)
    }

    fn data_source(&self) -> DataSource {
        DataSource::Local
    }

    fn describe(&self, station: &StationSource) -> String {
        self.station_path(station).display().to_string()
    }
}
