//! Trip lookup collaborator.
//!
//! Maps a trip id to its line, headsign, and vehicle type. The table is
//! maintained externally and loaded once at startup; a missing entry causes
//! the record to be dropped upstream.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;

/// Line, headsign, and vehicle type for one trip.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TripInfo {
    pub line: String,
    #[serde(default)]
    pub headsign: Option<String>,
    /// GTFS route type; 700 marks a bus.
    #[serde(default, rename = "type")]
    pub vehicle_type: Option<u16>,
}

/// Errors loading the trip table.
#[derive(Debug, thiserror::Error)]
pub enum TripTableError {
    #[error("failed to read trip table: {0}")]
    Io(#[from] io::Error),

    #[error("trip table contained invalid JSON: {0}")]
    Format(#[from] serde_json::Error),
}

/// Synchronous trip id resolution.
pub trait TripLookup: Send + Sync {
    /// Resolve a trip id, `None` when the table has no entry.
    fn lookup(&self, trip_id: &str) -> Option<&TripInfo>;
}

/// Trip lookup backed by an in-memory table.
#[derive(Debug, Default)]
pub struct StaticTripLookup {
    entries: HashMap<String, TripInfo>,
}

impl StaticTripLookup {
    /// Build from trip id / info pairs.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, TripInfo)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Parse the table from its JSON object form
    /// (`{"tripId": {"line": ..., "headsign": ..., "type": ...}, ...}`).
    pub fn from_json_str(json: &str) -> Result<Self, TripTableError> {
        Ok(Self {
            entries: serde_json::from_str(json)?,
        })
    }

    /// Load the table from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TripTableError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    /// Number of known trips.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TripLookup for StaticTripLookup {
    fn lookup(&self, trip_id: &str) -> Option<&TripInfo> {
        self.entries.get(trip_id)
    }
}
