//! Lock-free metrics collection and periodic reporting
//!
//! Uses atomics for hot-path operations to avoid mutex contention.
//!
//! NOTE: All atomics use Relaxed ordering intentionally; these are statistical
//! counters only. Do NOT use these atomics for coordination or logic decisions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::info;

/// Update an atomic max value using compare-and-swap loop
#[inline]
fn update_atomic_max(atomic_max: &AtomicU64, new_value: u64) {
    let mut current_max = atomic_max.load(Ordering::Relaxed);
    while new_value > current_max {
        match atomic_max.compare_exchange_weak(
            current_max,
            new_value,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => break,
            Err(actual) => current_max = actual,
        }
    }
}

/// Lock-free metrics collector
pub struct Metrics {
    /// Visited locations appended (monotonic)
    locations_tracked: AtomicU64,
    /// Locations appended since last report (reset on report)
    locations_since_report: AtomicU64,
    /// Per-traveler tracking units that failed (monotonic)
    tracking_failures: AtomicU64,
    /// Completed tracker passes (monotonic)
    tracker_passes: AtomicU64,
    /// Duration of the most recent tracker pass
    last_pass_ms: AtomicU64,
    /// Longest tracker pass seen (reset on report)
    max_pass_ms: AtomicU64,
    /// Rewards committed to travelers (monotonic)
    rewards_granted: AtomicU64,
    /// Calls made to the reward points provider (monotonic)
    points_lookups: AtomicU64,
    /// Provider calls retried after a failure (monotonic)
    provider_retries: AtomicU64,
    /// Bulk reward runs completed (monotonic)
    bulk_runs: AtomicU64,
    /// Travelers whose bulk reward unit failed (monotonic)
    bulk_failures: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            locations_tracked: AtomicU64::new(0),
            locations_since_report: AtomicU64::new(0),
            tracking_failures: AtomicU64::new(0),
            tracker_passes: AtomicU64::new(0),
            last_pass_ms: AtomicU64::new(0),
            max_pass_ms: AtomicU64::new(0),
            rewards_granted: AtomicU64::new(0),
            points_lookups: AtomicU64::new(0),
            provider_retries: AtomicU64::new(0),
            bulk_runs: AtomicU64::new(0),
            bulk_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_location_tracked(&self) {
        self.locations_tracked.fetch_add(1, Ordering::Relaxed);
        self.locations_since_report.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_tracking_failure(&self) {
        self.tracking_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tracker_pass(&self, elapsed: Duration) {
        let ms = elapsed.as_millis() as u64;
        self.tracker_passes.fetch_add(1, Ordering::Relaxed);
        self.last_pass_ms.store(ms, Ordering::Relaxed);
        update_atomic_max(&self.max_pass_ms, ms);
    }

    #[inline]
    pub fn record_rewards_granted(&self, count: usize) {
        self.rewards_granted.fetch_add(count as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_points_lookup(&self) {
        self.points_lookups.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_provider_retry(&self) {
        self.provider_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bulk_run(&self, failures: usize) {
        self.bulk_runs.fetch_add(1, Ordering::Relaxed);
        self.bulk_failures.fetch_add(failures as u64, Ordering::Relaxed);
    }

    /// Snapshot counters; windowed values are reset
    pub fn report(&self) -> MetricsSummary {
        MetricsSummary {
            locations_tracked: self.locations_tracked.load(Ordering::Relaxed),
            locations_since_report: self.locations_since_report.swap(0, Ordering::Relaxed),
            tracking_failures: self.tracking_failures.load(Ordering::Relaxed),
            tracker_passes: self.tracker_passes.load(Ordering::Relaxed),
            last_pass_ms: self.last_pass_ms.load(Ordering::Relaxed),
            max_pass_ms: self.max_pass_ms.swap(0, Ordering::Relaxed),
            rewards_granted: self.rewards_granted.load(Ordering::Relaxed),
            points_lookups: self.points_lookups.load(Ordering::Relaxed),
            provider_retries: self.provider_retries.load(Ordering::Relaxed),
            bulk_runs: self.bulk_runs.load(Ordering::Relaxed),
            bulk_failures: self.bulk_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSummary {
    pub locations_tracked: u64,
    pub locations_since_report: u64,
    pub tracking_failures: u64,
    pub tracker_passes: u64,
    pub last_pass_ms: u64,
    pub max_pass_ms: u64,
    pub rewards_granted: u64,
    pub points_lookups: u64,
    pub provider_retries: u64,
    pub bulk_runs: u64,
    pub bulk_failures: u64,
}

impl MetricsSummary {
    pub fn log(&self) {
        info!(
            locations_tracked = %self.locations_tracked,
            locations_since_report = %self.locations_since_report,
            tracking_failures = %self.tracking_failures,
            tracker_passes = %self.tracker_passes,
            last_pass_ms = %self.last_pass_ms,
            max_pass_ms = %self.max_pass_ms,
            rewards_granted = %self.rewards_granted,
            points_lookups = %self.points_lookups,
            provider_retries = %self.provider_retries,
            bulk_runs = %self.bulk_runs,
            bulk_failures = %self.bulk_failures,
            "metrics"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_resets_windowed_counters() {
        let metrics = Metrics::new();
        metrics.record_location_tracked();
        metrics.record_location_tracked();
        metrics.record_tracker_pass(Duration::from_millis(40));
        metrics.record_tracker_pass(Duration::from_millis(15));

        let first = metrics.report();
        assert_eq!(first.locations_tracked, 2);
        assert_eq!(first.locations_since_report, 2);
        assert_eq!(first.tracker_passes, 2);
        assert_eq!(first.last_pass_ms, 15);
        assert_eq!(first.max_pass_ms, 40);

        let second = metrics.report();
        assert_eq!(second.locations_tracked, 2);
        assert_eq!(second.locations_since_report, 0);
        assert_eq!(second.max_pass_ms, 0);
    }

    #[test]
    fn test_bulk_counters() {
        let metrics = Metrics::new();
        metrics.record_bulk_run(0);
        metrics.record_bulk_run(3);
        metrics.record_rewards_granted(5);
        let summary = metrics.report();
        assert_eq!(summary.bulk_runs, 2);
        assert_eq!(summary.bulk_failures, 3);
        assert_eq!(summary.rewards_granted, 5);
    }
}
