//! Unbounded multi-producer / multi-consumer work queue.
//!
//! Removal happens under a single lock, so an item is handed to at most one
//! consumer. Consumers that find the queue empty park on a [`Notify`] instead
//! of spinning.

use crate::model::WorkItem;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
pub struct WorkQueue {
    items: Mutex<VecDeque<Arc<WorkItem>>>,
    available: Notify,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an item to the back of the queue and wake one parked consumer.
    pub fn enqueue(&self, item: Arc<WorkItem>) {
        self.items.lock().push_back(item);
        self.available.notify_one();
    }

    /// Pop the front item without waiting. `None` if the queue is empty.
    pub fn try_dequeue(&self) -> Option<Arc<WorkItem>> {
        self.items.lock().pop_front()
    }

    /// Wait for the next item.
    ///
    /// Returns `None` once `shutdown` is cancelled; a cancelled token wins
    /// over pending items so workers stop taking new work promptly.
    pub async fn dequeue(&self, shutdown: &CancellationToken) -> Option<Arc<WorkItem>> {
        loop {
            if shutdown.is_cancelled() {
                return None;
            }
            // notify_one leaves a permit when nobody is parked, so an
            // enqueue racing the check below still wakes us.
            let notified = self.available.notified();
            if let Some(item) = self.try_dequeue() {
                // Pass the wake-up along in case more items are waiting.
                if !self.is_empty() {
                    self.available.notify_one();
                }
                return Some(item);
            }
            tokio::select! {
                _ = notified => {}
                _ = shutdown.cancelled() => return None,
            }
        }
    }

    /// Number of queued items. Stale as soon as it is returned.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}
