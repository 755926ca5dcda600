//! Per-vehicle render and animation state.
//!
//! Owns one [`VehicleTrackState`] record per tracked vehicle and the eased
//! position interpolation that moves markers between poll ticks. All timing
//! is driven by injected [`std::time::Instant`]s so the math is testable
//! without real delays.

mod animation;
mod state;

pub use animation::{
    duration_for_pixels, ease_in_out_cubic, Animation, AnimationBounds, DEFAULT_MIN_ANIMATION,
    MAX_ANIMATION_CAP, MS_PER_PIXEL,
};
pub use state::{Retarget, VehicleTrackState};
