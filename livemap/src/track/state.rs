//! Track state for one vehicle.

use std::time::{Duration, Instant};

use crate::coord::LatLon;
use crate::feed::Vehicle;
use crate::heading::HeadingTracker;
use crate::surface::MarkerId;

use super::Animation;

/// Outcome of pointing a marker at a new position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retarget {
    /// Displacement was negligible; the marker was placed directly.
    Snapped,
    /// An animation towards the new position is now in flight.
    Animating,
}

/// Everything the session holds for one tracked vehicle.
///
/// Created on the first admitted sighting, destroyed on eviction. Owns at
/// most one animation; a new position update replaces it atomically.
#[derive(Debug)]
pub struct VehicleTrackState {
    /// Marker handle on the render surface.
    pub marker: MarkerId,
    /// Heading inference state. Its established bearing is monotonic for
    /// the lifetime of this record.
    pub heading: HeadingTracker,
    /// Marker position as last pushed to the surface.
    pub rendered_position: LatLon,
    /// In-flight animation, if any.
    pub animation: Option<Animation>,
    /// Whether the vehicle passed the filter on the current tick. Doubles
    /// as the per-tick "seen" mark during reconciliation.
    pub visible: bool,
    /// The enriched vehicle from the latest admitted snapshot record.
    pub last: Vehicle,
}

impl VehicleTrackState {
    /// State for a vehicle seen for the first time: marker placed at its
    /// reported position, unanimated.
    pub fn new(marker: MarkerId, heading: HeadingTracker, vehicle: Vehicle) -> Self {
        let position = vehicle.position;
        Self {
            marker,
            heading,
            rendered_position: position,
            animation: None,
            visible: true,
            last: vehicle,
        }
    }

    /// Current on-map position, sampling any in-flight animation at `now`.
    pub fn position_at(&self, now: Instant) -> LatLon {
        match &self.animation {
            Some(anim) => anim.position_at(now),
            None => self.rendered_position,
        }
    }

    /// Point the marker at a new position.
    ///
    /// Starts from the marker's current interpolated position, never from
    /// the pre-animation start, so an update arriving mid-flight continues
    /// smoothly. Near-zero displacement (`snap_epsilon` degrees on both
    /// axes) places the marker immediately with no animation.
    pub fn retarget(
        &mut self,
        to: LatLon,
        duration: Duration,
        snap_epsilon: f64,
        now: Instant,
    ) -> Retarget {
        let from = self.position_at(now);

        if !from.moved_beyond(&to, snap_epsilon) {
            self.rendered_position = to;
            self.animation = None;
            return Retarget::Snapped;
        }

        self.animation = Some(Animation::new(from, to, now, duration));
        Retarget::Animating
    }

    /// Advance the animation one frame.
    ///
    /// Returns the new marker position when an animation was active, `None`
    /// otherwise. A completed animation is dropped after its final frame.
    pub fn advance(&mut self, now: Instant) -> Option<LatLon> {
        let anim = self.animation.as_ref()?;
        let position = anim.position_at(now);
        let done = anim.is_complete(now);

        self.rendered_position = position;
        if done {
            self.animation = None;
        }
        Some(position)
    }
}
