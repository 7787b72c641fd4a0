use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Lifetime counters for one deck session.
#[derive(Debug, Default)]
pub(super) struct SwipeMetrics {
    pub(super) accepted: AtomicU64,
    pub(super) committed: AtomicU64,
    pub(super) rolled_back: AtomicU64,
    pub(super) retried_attempts: AtomicU64,
    pub(super) matches: AtomicU64,
    pub(super) cancelled_gestures: AtomicU64,
    pub(super) ignored_busy: AtomicU64,
    pub(super) ignored_exhausted: AtomicU64,
    pub(super) rewinds_applied: AtomicU64,
    pub(super) rewinds_failed: AtomicU64,
    pub(super) fetches: AtomicU64,
    pub(super) fetch_failures: AtomicU64,
}

impl SwipeMetrics {
    pub(super) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn snapshot(&self) -> SwipeMetricsSnapshot {
        let read = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        SwipeMetricsSnapshot {
            accepted: read(&self.accepted),
            committed: read(&self.committed),
            rolled_back: read(&self.rolled_back),
            retried_attempts: read(&self.retried_attempts),
            matches: read(&self.matches),
            cancelled_gestures: read(&self.cancelled_gestures),
            ignored_busy: read(&self.ignored_busy),
            ignored_exhausted: read(&self.ignored_exhausted),
            rewinds_applied: read(&self.rewinds_applied),
            rewinds_failed: read(&self.rewinds_failed),
            fetches: read(&self.fetches),
            fetch_failures: read(&self.fetch_failures),
        }
    }
}

/// Aggregate counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwipeMetricsSnapshot {
    /// Decisions accepted (optimistically applied).
    pub accepted: u64,
    /// Decisions confirmed by the backend.
    pub committed: u64,
    /// Decisions that failed and were undone.
    pub rolled_back: u64,
    /// Record attempts that were retried after a failure or timeout.
    pub retried_attempts: u64,
    /// Matches announced.
    pub matches: u64,
    /// Gestures that snapped back.
    pub cancelled_gestures: u64,
    /// Decisions ignored because another one was in flight.
    pub ignored_busy: u64,
    /// Decisions ignored because there was no card.
    pub ignored_exhausted: u64,
    /// Rewinds applied.
    pub rewinds_applied: u64,
    /// Rewinds the backend refused.
    pub rewinds_failed: u64,
    /// Pages fetched.
    pub fetches: u64,
    /// Page fetches that failed.
    pub fetch_failures: u64,
}
