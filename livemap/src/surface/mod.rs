//! Render surface collaborator.
//!
//! The map itself (tiles, projection internals, DOM) lives outside this
//! crate. The core drives it through [`RenderSurface`]: point projection for
//! animation-duration calculation, and marker add/move/re-icon/remove. Icons
//! are opaque descriptors; how they are drawn is the surface's business.

use crate::coord::{LatLon, PixelPoint};

/// Opaque handle to a marker owned by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(pub u64);

/// What a marker should look like.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerIcon {
    /// Undirected rail marker, shown while the heading is unknown.
    RailDot { color: &'static str },

    /// Directional rail marker rotated to the bearing. `appear` requests the
    /// one-shot visual cue on the tick the heading was first established.
    RailArrow {
        color: &'static str,
        bearing_deg: f64,
        appear: bool,
    },

    /// Bus marker. Rendered unrotated when no bearing is known.
    Bus { bearing_deg: Option<f64> },

    /// Floating text label attached to a vehicle. Hover and pinned labels
    /// differ only in the `pinned` style flag.
    Label {
        text: String,
        color: &'static str,
        pinned: bool,
    },
}

/// Marker and projection operations exposed by the map surface.
pub trait RenderSurface {
    /// Project a geographic position to surface pixel space.
    fn project(&self, position: LatLon) -> PixelPoint;

    /// Place a new marker, returning its handle.
    fn add_marker(&mut self, position: LatLon, icon: MarkerIcon) -> MarkerId;

    /// Reposition an existing marker.
    fn move_marker(&mut self, marker: MarkerId, position: LatLon);

    /// Replace an existing marker's icon.
    fn set_marker_icon(&mut self, marker: MarkerId, icon: MarkerIcon);

    /// Remove a marker.
    fn remove_marker(&mut self, marker: MarkerId);
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::BTreeMap;

    /// Recording surface for unit tests.
    ///
    /// Projects degrees straight to pixels at a fixed scale and keeps the
    /// current marker table so tests can assert on what is on the map.
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        next_id: u64,
        pub markers: BTreeMap<MarkerId, (LatLon, MarkerIcon)>,
        pub removed: Vec<MarkerId>,
    }

    /// Pixels per degree in the fake projection.
    pub const PX_PER_DEGREE: f64 = 1000.0;

    impl RecordingSurface {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn icon_of(&self, marker: MarkerId) -> &MarkerIcon {
            &self.markers.get(&marker).expect("marker exists").1
        }

        pub fn position_of(&self, marker: MarkerId) -> LatLon {
            self.markers.get(&marker).expect("marker exists").0
        }

        pub fn marker_count(&self) -> usize {
            self.markers.len()
        }
    }

    impl RenderSurface for RecordingSurface {
        fn project(&self, position: LatLon) -> PixelPoint {
            PixelPoint::new(position.lon * PX_PER_DEGREE, -position.lat * PX_PER_DEGREE)
        }

        fn add_marker(&mut self, position: LatLon, icon: MarkerIcon) -> MarkerId {
            self.next_id += 1;
            let id = MarkerId(self.next_id);
            self.markers.insert(id, (position, icon));
            id
        }

        fn move_marker(&mut self, marker: MarkerId, position: LatLon) {
            if let Some(entry) = self.markers.get_mut(&marker) {
                entry.0 = position;
            }
        }

        fn set_marker_icon(&mut self, marker: MarkerId, icon: MarkerIcon) {
            if let Some(entry) = self.markers.get_mut(&marker) {
                entry.1 = icon;
            }
        }

        fn remove_marker(&mut self, marker: MarkerId) {
            self.markers.remove(&marker);
            self.removed.push(marker);
        }
    }
}
