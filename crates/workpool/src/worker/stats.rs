//! Pool statistics
//!
//! Lock-free counters updated by submitters and executors.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Point-in-time snapshot of pool counters
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PoolStats {
    /// Tasks accepted by an executor
    pub submitted: u64,
    /// Submissions refused because the pool was no longer open
    pub rejected: u64,
    /// Tasks whose `execute()` returned `Ok`
    pub completed: u64,
    /// Tasks whose `execute()` returned an error
    pub failed: u64,
    /// Tasks whose `execute()` panicked
    pub panicked: u64,
}

impl PoolStats {
    /// Tasks that finished executing, successfully or not
    pub fn finished(&self) -> u64 {
        self.completed + self.failed + self.panicked
    }

    /// Tasks accepted but not yet finished
    pub fn in_flight(&self) -> u64 {
        self.submitted.saturating_sub(self.finished())
    }
}

/// Shared counters backing [`PoolStats`]
///
/// Uses atomic operations for thread-safe access without locks.
#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    submitted: AtomicU64,
    rejected: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    panicked: AtomicU64,
}

impl PoolCounters {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record that an executor accepted a task
    pub(crate) fn task_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a refused submission
    pub(crate) fn task_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn task_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn task_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn task_panicked(&self) {
        self.panicked.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a snapshot
    ///
    /// Counters are read one by one, so a snapshot taken while executors are
    /// busy may be momentarily inconsistent across fields.
    pub(crate) fn snapshot(&self) -> PoolStats {
        PoolStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
        }
    }
}
