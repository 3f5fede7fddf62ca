//! Shared run counters.
//!
//! Completion is `dispatched && acknowledged + failed == enqueued`, which
//! counts a write only once the store has answered for it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Notify;

#[derive(Debug, Default)]
pub struct Progress {
    enqueued: AtomicU64,
    acknowledged: AtomicU64,
    failed: AtomicU64,
    dispatched: AtomicBool,
    settled: Notify,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub enqueued: u64,
    pub acknowledged: u64,
    pub failed: u64,
    pub dispatched: bool,
}

impl ProgressSnapshot {
    /// Writes enqueued but not yet answered by the store.
    pub fn outstanding(&self) -> u64 {
        self.enqueued.saturating_sub(self.acknowledged + self.failed)
    }
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::AcqRel);
    }

    pub fn record_acknowledged(&self) {
        self.acknowledged.fetch_add(1, Ordering::AcqRel);
        self.wake_if_complete();
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::AcqRel);
        self.wake_if_complete();
    }

    /// Mark the producer as finished; no more enqueues follow.
    pub fn mark_dispatched(&self) {
        self.dispatched.store(true, Ordering::Release);
        self.wake_if_complete();
    }

    pub fn is_complete(&self) -> bool {
        let snapshot = self.snapshot();
        snapshot.dispatched && snapshot.outstanding() == 0
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        // Read `dispatched` first: once it is set, `enqueued` is final.
        let dispatched = self.dispatched.load(Ordering::Acquire);
        ProgressSnapshot {
            enqueued: self.enqueued.load(Ordering::Acquire),
            acknowledged: self.acknowledged.load(Ordering::Acquire),
            failed: self.failed.load(Ordering::Acquire),
            dispatched,
        }
    }

    /// Resolves after some counter change made the run look complete.
    ///
    /// Callers must re-check [`Progress::is_complete`]; a stored permit can
    /// outlive the state that produced it.
    pub async fn changed(&self) {
        self.settled.notified().await;
    }

    fn wake_if_complete(&self) {
        if self.is_complete() {
            self.settled.notify_one();
        }
    }
}
