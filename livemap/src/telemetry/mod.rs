//! Session telemetry for observability.
//!
//! Lock-free atomic counters recording what the reconciliation loop does,
//! with a point-in-time snapshot for display. The counters are shared
//! between the session and the runtime driver.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber from the environment.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

/// Counters for one live map session.
#[derive(Debug, Default)]
pub struct SessionMetrics {
    ticks_applied: AtomicU64,
    fetch_failures: AtomicU64,
    stale_responses_dropped: AtomicU64,
    vehicles_upserted: AtomicU64,
    vehicles_evicted: AtomicU64,
    vehicles_tracked: AtomicU64,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot was reconciled into the session.
    pub fn tick_applied(&self) {
        self.ticks_applied.fetch_add(1, Ordering::Relaxed);
    }

    /// A snapshot fetch failed.
    pub fn fetch_failed(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// A response from an out-of-date poll was discarded.
    pub fn stale_dropped(&self) {
        self.stale_responses_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// A vehicle was created or updated.
    pub fn vehicle_upserted(&self) {
        self.vehicles_upserted.fetch_add(1, Ordering::Relaxed);
    }

    /// A vehicle's tracking state was torn down.
    pub fn vehicle_evicted(&self) {
        self.vehicles_evicted.fetch_add(1, Ordering::Relaxed);
    }

    /// Update the tracked-vehicles gauge.
    pub fn set_tracked(&self, count: u64) {
        self.vehicles_tracked.store(count, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ticks_applied: self.ticks_applied.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            stale_responses_dropped: self.stale_responses_dropped.load(Ordering::Relaxed),
            vehicles_upserted: self.vehicles_upserted.load(Ordering::Relaxed),
            vehicles_evicted: self.vehicles_evicted.load(Ordering::Relaxed),
            vehicles_tracked: self.vehicles_tracked.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`SessionMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub ticks_applied: u64,
    pub fetch_failures: u64,
    pub stale_responses_dropped: u64,
    pub vehicles_upserted: u64,
    pub vehicles_evicted: u64,
    pub vehicles_tracked: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = SessionMetrics::new();

        metrics.tick_applied();
        metrics.tick_applied();
        metrics.fetch_failed();
        metrics.vehicle_upserted();
        metrics.vehicle_evicted();
        metrics.stale_dropped();
        metrics.set_tracked(7);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.ticks_applied, 2);
        assert_eq!(snapshot.fetch_failures, 1);
        assert_eq!(snapshot.vehicles_upserted, 1);
        assert_eq!(snapshot.vehicles_evicted, 1);
        assert_eq!(snapshot.stale_responses_dropped, 1);
        assert_eq!(snapshot.vehicles_tracked, 7);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let metrics = SessionMetrics::new();
        let before = metrics.snapshot();
        metrics.tick_applied();

        assert_eq!(before.ticks_applied, 0);
        assert_eq!(metrics.snapshot().ticks_applied, 1);
    }
}
