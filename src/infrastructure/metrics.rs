//! Connection pool metrics
//!
//! Lock-free counters using atomic operations.
//! Updated by the pool, read through snapshots.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Pool metrics collector
///
/// Thread-safe counters; snapshots taken for export.
#[derive(Debug)]
pub struct PoolMetrics {
    /// Leases handed out
    acquires: AtomicU64,
    /// Leases returned
    releases: AtomicU64,
    /// Successful establish calls
    establishments: AtomicU64,
    /// Failed establish calls
    establish_failures: AtomicU64,
    /// Teardown calls
    teardowns: AtomicU64,
    /// Creation time for uptime calculation
    start_time: Instant,
}

/// Metrics snapshot for export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub acquires: u64,
    pub releases: u64,
    pub establishments: u64,
    pub establish_failures: u64,
    pub teardowns: u64,
    pub uptime_seconds: u64,
}

impl MetricsSnapshot {
    /// Leases acquired and not yet released
    pub fn outstanding_leases(&self) -> u64 {
        self.acquires.saturating_sub(self.releases)
    }
}

impl PoolMetrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self {
            acquires: AtomicU64::new(0),
            releases: AtomicU64::new(0),
            establishments: AtomicU64::new(0),
            establish_failures: AtomicU64::new(0),
            teardowns: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    #[inline]
    pub fn record_acquire(&self) {
        self.acquires.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_release(&self) {
        self.releases.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_establish(&self) {
        self.establishments.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_establish_failure(&self) {
        self.establish_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_teardown(&self) {
        self.teardowns.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current snapshot of metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            acquires: self.acquires.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
            establishments: self.establishments.load(Ordering::Relaxed),
            establish_failures: self.establish_failures.load(Ordering::Relaxed),
            teardowns: self.teardowns.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for PoolMetrics {
    fn default() -> Self {
        Self::new()
    }
}
