/// Station registry for the wind farm report service.
///
/// Defines the built-in list of wind farms and the spreadsheet tab (gid)
/// each one is published under. A configuration file may replace this
/// list; `validate_sources` is the single check applied to either.

use crate::model::WindError;
use serde::Deserialize;
use std::collections::HashSet;

/// Public spreadsheet holding one tab per wind farm.
pub const DEFAULT_SHEET_ID: &str = "1rcxEcpwdHDFD5bRM8gu_5xU3ZDz8nEtj";

// ---------------------------------------------------------------------------
// Station metadata
// ---------------------------------------------------------------------------

/// Metadata for a built-in wind farm.
pub struct Station {
    /// Display name, also used as the dev-mode file stem.
    pub name: &'static str,
    /// Numeric tab id inside the spreadsheet.
    pub gid: &'static str,
}

/// Built-in wind farms, in report order.
pub static STATION_REGISTRY: &[Station] = &[
    Station {
        name: "Badia",
        gid: "129655069",
    },
    Station {
        name: "Elgea",
        gid: "408081399",
    },
    Station {
        name: "Corrella",
        gid: "107505326",
    },
];

/// A station as configured for one run: its name and sheet tab.
///
/// The `gid` may be left out for a built-in station; `resolve_gids` fills
/// it in from the registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StationSource {
    pub name: String,
    #[serde(default)]
    pub gid: String,
}

/// The built-in registry as owned sources, for use as the config default.
pub fn default_sources() -> Vec<StationSource> {
    STATION_REGISTRY
        .iter()
        .map(|s| StationSource {
            name: s.name.to_string(),
            gid: s.gid.to_string(),
        })
        .collect()
}

/// Looks up a built-in station by name. Returns `None` if not found.
pub fn find_station(name: &str) -> Option<&'static Station> {
    STATION_REGISTRY.iter().find(|s| s.name == name)
}

/// Fills every missing `gid` from the built-in registry. A station with
/// neither a `gid` nor a registry entry is a configuration error.
pub fn resolve_gids(sources: &mut [StationSource]) -> Result<(), WindError> {
    for source in sources.iter_mut().filter(|s| s.gid.is_empty()) {
        let station = find_station(&source.name).ok_or_else(|| {
            WindError::Config(format!(
                "station '{}' has no gid and is not a built-in station",
                source.name
            ))
        })?;
        source.gid = station.gid.to_string();
    }
    Ok(())
}

/// Rejects an empty list, blank names, non-numeric gids and duplicate names.
/// Duplicate names would make report sections and dev-mode files ambiguous.
pub fn validate_sources(sources: &[StationSource]) -> Result<(), WindError> {
    if sources.is_empty() {
        return Err(WindError::Config("at least one station must be configured".to_string()));
    }

    let mut seen = HashSet::new();
    for source in sources {
        if source.name.trim().is_empty() {
            return Err(WindError::Config("station name must not be empty".to_string()));
        }
        if source.gid.is_empty() || !source.gid.chars().all(|c| c.is_ascii_digit()) {
            return Err(WindError::Config(format!(
                "gid for station '{}' should be numeric, got '{}'",
                source.name, source.gid
            )));
        }
        if !seen.insert(source.name.as_str()) {
            return Err(WindError::Config(format!("duplicate station name '{}'", source.name)));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
