//! Fixed configuration.
//!
//! There is no config file and no command-line surface; tuning lives in a
//! handful of constants, with the animation bounds derived from the poll
//! interval.

use std::time::Duration;

use crate::track::AnimationBounds;

/// How often the snapshot endpoint is polled.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Cadence of animation advancement when driven by the runtime.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Minimum per-axis displacement (degrees) counted as real movement for
/// heading inference. Roughly a few meters.
pub const MOVEMENT_EPSILON_DEG: f64 = 0.00002;

/// Displacement (degrees) below which a marker is placed directly instead
/// of animated.
pub const SNAP_EPSILON_DEG: f64 = 1e-8;

/// Top-level configuration for a live map session.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Snapshot endpoint URL.
    pub endpoint: String,

    /// Poll interval.
    pub poll_interval: Duration,

    /// Animation frame cadence.
    pub frame_interval: Duration,

    /// Animation duration clamp, derived from the poll interval.
    pub animation: AnimationBounds,

    /// Movement-detection epsilon for heading inference.
    pub movement_epsilon_deg: f64,

    /// Snap threshold for degenerate marker moves.
    pub snap_epsilon_deg: f64,
}

impl AppConfig {
    /// Configuration for an endpoint with all defaults.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            animation: AnimationBounds::for_poll_interval(DEFAULT_POLL_INTERVAL),
            movement_epsilon_deg: MOVEMENT_EPSILON_DEG,
            snap_epsilon_deg: SNAP_EPSILON_DEG,
        }
    }

    /// Change the poll interval. The animation bounds are re-derived so
    /// animations keep finishing before the next tick.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.animation = AnimationBounds::for_poll_interval(poll_interval);
        self
    }

    /// Change the animation frame cadence.
    pub fn with_frame_interval(mut self, frame_interval: Duration) -> Self {
        self.frame_interval = frame_interval;
        self
    }
}
