//! Run metrics
//!
//! - Counters only
//! - Monotonic increase within a run
//! - Reset only when a new registry is created

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for one run.
///
/// Atomics keep the registry shareable by `&` reference between the
/// coordinator and the components it drives.
#[derive(Debug, Default)]
pub struct RunMetrics {
    datasets_processed: AtomicU64,
    datasets_failed: AtomicU64,
    snapshots_taken: AtomicU64,
    prunes_run: AtomicU64,
    artifacts_written: AtomicU64,
    artifacts_removed: AtomicU64,
    paths_created: AtomicU64,
    transfers_completed: AtomicU64,
    transfers_failed: AtomicU64,
}

impl RunMetrics {
    /// Create a new registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment datasets processed
    pub fn increment_datasets_processed(&self) {
        self.datasets_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment datasets with at least one failure
    pub fn increment_datasets_failed(&self) {
        self.datasets_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment snapshot-take invocations
    pub fn increment_snapshots_taken(&self) {
        self.snapshots_taken.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment prune invocations
    pub fn increment_prunes(&self) {
        self.prunes_run.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment artifacts (re)written
    pub fn increment_artifacts_written(&self) {
        self.artifacts_written.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment orphaned artifacts removed
    pub fn increment_artifacts_removed(&self) {
        self.artifacts_removed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment destination paths created
    pub fn increment_paths_created(&self) {
        self.paths_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment successful transfers
    pub fn increment_transfers_completed(&self) {
        self.transfers_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment failed transfers
    pub fn increment_transfers_failed(&self) {
        self.transfers_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            datasets_processed: self.datasets_processed.load(Ordering::Relaxed),
            datasets_failed: self.datasets_failed.load(Ordering::Relaxed),
            snapshots_taken: self.snapshots_taken.load(Ordering::Relaxed),
            prunes_run: self.prunes_run.load(Ordering::Relaxed),
            artifacts_written: self.artifacts_written.load(Ordering::Relaxed),
            artifacts_removed: self.artifacts_removed.load(Ordering::Relaxed),
            paths_created: self.paths_created.load(Ordering::Relaxed),
            transfers_completed: self.transfers_completed.load(Ordering::Relaxed),
            transfers_failed: self.transfers_failed.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of all counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub datasets_processed: u64,
    pub datasets_failed: u64,
    pub snapshots_taken: u64,
    pub prunes_run: u64,
    pub artifacts_written: u64,
    pub artifacts_removed: u64,
    pub paths_created: u64,
    pub transfers_completed: u64,
    pub transfers_failed: u64,
}
