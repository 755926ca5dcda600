//! Marker movement animation.
//!
//! Duration scales linearly with the on-screen pixel distance, clamped to a
//! minimum (tiny moves should not snap jarringly) and a maximum derived from
//! the poll interval so an animation always completes comfortably before the
//! next tick. Interpolation is an ease-in-out cubic over elapsed wall-clock
//! time.

use std::time::{Duration, Instant};

use crate::coord::LatLon;

/// Minimum animation duration.
pub const DEFAULT_MIN_ANIMATION: Duration = Duration::from_millis(350);

/// Hard upper bound on animation duration, regardless of poll interval.
pub const MAX_ANIMATION_CAP: Duration = Duration::from_millis(2500);

/// Milliseconds of animation per pixel of on-screen movement.
pub const MS_PER_PIXEL: f64 = 7.0;

/// Poll-interval fraction an animation may occupy at most.
const POLL_FRACTION: f64 = 0.85;

/// Duration clamp for marker animations.
#[derive(Debug, Clone)]
pub struct AnimationBounds {
    /// Shortest allowed animation.
    pub min: Duration,
    /// Longest allowed animation.
    pub max: Duration,
    /// Linear scale from pixel distance to duration.
    pub ms_per_pixel: f64,
}

impl AnimationBounds {
    /// Derive bounds from the poll interval.
    ///
    /// The maximum is 85% of the interval, capped at
    /// [`MAX_ANIMATION_CAP`], so a full-length animation finishes before the
    /// next snapshot lands. The maximum never drops below the minimum, even
    /// for very short poll intervals.
    pub fn for_poll_interval(poll_interval: Duration) -> Self {
        let max = poll_interval
            .mul_f64(POLL_FRACTION)
            .min(MAX_ANIMATION_CAP)
            .max(DEFAULT_MIN_ANIMATION);
        Self {
            min: DEFAULT_MIN_ANIMATION,
            max,
            ms_per_pixel: MS_PER_PIXEL,
        }
    }
}

/// Map an on-screen pixel distance to an animation duration.
///
/// Linear in the distance, clamped to `[min, max]`. Non-decreasing.
pub fn duration_for_pixels(distance_px: f64, bounds: &AnimationBounds) -> Duration {
    let ms = distance_px.max(0.0) * bounds.ms_per_pixel;
    Duration::from_millis(ms as u64).clamp(bounds.min, bounds.max)
}

/// Ease-in-out cubic curve, `t` in [0, 1].
pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// One in-flight marker movement.
#[derive(Debug, Clone)]
pub struct Animation {
    from: LatLon,
    to: LatLon,
    started: Instant,
    duration: Duration,
}

impl Animation {
    /// Start an animation at `started`.
    pub fn new(from: LatLon, to: LatLon, started: Instant, duration: Duration) -> Self {
        Self {
            from,
            to,
            started,
            duration,
        }
    }

    /// Interpolated position at `now`.
    pub fn position_at(&self, now: Instant) -> LatLon {
        let elapsed = now.saturating_duration_since(self.started);
        let t = if self.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
        };
        self.from.lerp(&self.to, ease_in_out_cubic(t))
    }

    /// Whether the animation has run its full duration at `now`.
    pub fn is_complete(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.duration
    }

    /// Final position.
    pub fn destination(&self) -> LatLon {
        self.to
    }
}
