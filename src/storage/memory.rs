//! In-process store: records rows instead of sending them anywhere.
//!
//! Used for dry runs and tests. Can inject failures and latency to
//! exercise the worker error path under load.

use super::{TimelineStore, timeline_binding};
use crate::error::{Error, Result};
use crate::model::TimelineWrite;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use uuid::Uuid;

/// A stored row, named by table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineRow {
    pub userid: Uuid,
    pub time: Uuid,
    pub follower_id: Uuid,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct MemoryTimelineStore {
    rows: Mutex<Vec<TimelineRow>>,
    attempts: AtomicU64,
    fail_every: Option<u64>,
    latency: Option<Duration>,
    fail_close: bool,
    closed: AtomicBool,
}

impl MemoryTimelineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every `n`th write attempt (1-based). `n == 0` disables.
    pub fn fail_every(mut self, n: u64) -> Self {
        self.fail_every = (n > 0).then_some(n);
        self
    }

    /// Sleep this long inside every write.
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make `close` return an error (the store is still marked closed).
    pub fn fail_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn rows(&self) -> Vec<TimelineRow> {
        self.rows.lock().clone()
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl TimelineStore for MemoryTimelineStore {
    async fn insert(&self, write: &TimelineWrite) -> Result<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.fail_every.is_some_and(|n| attempt % n == 0) {
            return Err(Error::Write(format!("injected failure on attempt {attempt}")));
        }

        let (userid, time, follower_id, message) = timeline_binding(write);
        self.rows.lock().push(TimelineRow {
            userid,
            time,
            follower_id,
            message: message.to_string(),
        });
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        if self.fail_close {
            return Err(Error::Other("injected close failure".into()));
        }
        Ok(())
    }
}
