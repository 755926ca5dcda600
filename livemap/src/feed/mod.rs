//! Vehicle snapshot feed.
//!
//! Decodes the periodic snapshot payload, resolves each record's trip
//! against the external trip table, and produces enriched vehicles for the
//! reconciliation loop. Records that cannot be resolved (missing id or
//! coordinates, unknown trip) are dropped silently; they are data gaps, not
//! errors.

mod http;
mod trip;

pub use http::{FeedError, HttpSnapshotFeed, SnapshotFeed, DEFAULT_FETCH_TIMEOUT};
pub use trip::{StaticTripLookup, TripInfo, TripLookup, TripTableError};

#[cfg(test)]
pub use http::tests::MockSnapshotFeed;

use serde::Deserialize;

use crate::coord::LatLon;
use crate::line::{normalize, BUS_ROUTE_TYPE};

/// Identifier of a vehicle as reported by the feed.
pub type VehicleId = String;

/// One record of the snapshot payload, as received.
///
/// Everything is optional at the wire level; validation happens during
/// enrichment.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVehicle {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub bearing: Option<f64>,
    #[serde(default)]
    pub speed_kmh: Option<f64>,
    #[serde(default)]
    pub trip_id: Option<String>,
    #[serde(default)]
    pub ts: Option<i64>,
}

/// A snapshot record resolved against the trip table.
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub id: VehicleId,
    pub position: LatLon,
    pub bearing: Option<f64>,
    pub speed_kmh: Option<f64>,
    pub ts: Option<i64>,
    /// Canonical line code.
    pub line: String,
    pub headsign: Option<String>,
    /// GTFS route type; 700 marks a bus.
    pub vehicle_type: Option<u16>,
}

impl Vehicle {
    /// Whether this vehicle is a bus.
    pub fn is_bus(&self) -> bool {
        self.vehicle_type == Some(BUS_ROUTE_TYPE)
    }
}

/// Resolve a raw record into a vehicle.
///
/// Returns `None` for records missing an id or finite coordinates, and for
/// trips the lookup does not know.
pub fn enrich(raw: &RawVehicle, lookup: &dyn TripLookup) -> Option<Vehicle> {
    let id = raw.id.as_deref().filter(|id| !id.is_empty())?;
    let position = LatLon::new(raw.lat?, raw.lon?);
    if !position.is_finite() {
        return None;
    }

    let info = lookup.lookup(raw.trip_id.as_deref()?)?;
    if info.line.is_empty() {
        return None;
    }

    Some(Vehicle {
        id: id.to_string(),
        position,
        bearing: raw.bearing,
        speed_kmh: raw.speed_kmh,
        ts: raw.ts,
        line: normalize(&info.line),
        headsign: info.headsign.clone(),
        vehicle_type: info.vehicle_type,
    })
}
