//! Per-vehicle heading inference.
//!
//! Derives a direction of travel when the feed reports none. Reported
//! bearings use 0 as a "no data" sentinel, so only strictly positive values
//! are trusted; otherwise the bearing is computed from the displacement
//! since the previous sample, and once a heading is established it is frozen
//! while the vehicle stands still.

use crate::coord::{bearing_between, LatLon};

/// Outcome of one heading observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeadingUpdate {
    /// A reliable bearing was determined this tick.
    ///
    /// `first` is set on the tick a vehicle transitions from unknown to
    /// established, which drives the one-shot appearance cue.
    Established { bearing: f64, first: bool },

    /// Nothing new this tick; the previously established bearing holds.
    Frozen(f64),

    /// No heading has ever been established for this vehicle.
    Unknown,
}

impl HeadingUpdate {
    /// The bearing to render with, if any.
    pub fn bearing(&self) -> Option<f64> {
        match self {
            HeadingUpdate::Established { bearing, .. } => Some(*bearing),
            HeadingUpdate::Frozen(bearing) => Some(*bearing),
            HeadingUpdate::Unknown => None,
        }
    }

    /// Whether this observation established the heading for the first time.
    pub fn is_first_established(&self) -> bool {
        matches!(self, HeadingUpdate::Established { first: true, .. })
    }
}

/// Heading state for one tracked vehicle.
///
/// The established bearing is monotonic: once set it is only ever replaced
/// by a newer bearing, never cleared, for as long as the tracker exists.
#[derive(Debug, Default)]
pub struct HeadingTracker {
    /// Position from the previous observation.
    last_position: Option<LatLon>,
    /// Most recent established bearing.
    established: Option<f64>,
}

impl HeadingTracker {
    /// Create a tracker with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one position sample and optional reported bearing.
    ///
    /// `epsilon` is the minimum per-axis displacement (in degrees) treated
    /// as real movement rather than GPS jitter.
    pub fn observe(
        &mut self,
        position: LatLon,
        reported_bearing: Option<f64>,
        epsilon: f64,
    ) -> HeadingUpdate {
        let was_established = self.established.is_some();

        let mut bearing_now = match reported_bearing {
            // 0 (and anything non-finite) means "no data" upstream.
            Some(b) if b.is_finite() && b > 0.0 => Some(b),
            _ => None,
        };

        if bearing_now.is_none() {
            if let Some(prev) = self.last_position {
                if position.moved_beyond(&prev, epsilon) {
                    bearing_now = Some(bearing_between(&prev, &position));
                }
            }
        }

        self.last_position = Some(position);

        match bearing_now {
            Some(bearing) => {
                self.established = Some(bearing);
                HeadingUpdate::Established {
                    bearing,
                    first: !was_established,
                }
            }
            None => match self.established {
                Some(bearing) => HeadingUpdate::Frozen(bearing),
                None => HeadingUpdate::Unknown,
            },
        }
    }

    /// The last established bearing, if any.
    pub fn established_bearing(&self) -> Option<f64> {
        self.established
    }

    /// Whether a heading has ever been established.
    pub fn is_established(&self) -> bool {
        self.established.is_some()
    }

    /// The last observed position, if any.
    pub fn last_position(&self) -> Option<LatLon> {
        self.last_position
    }
}
