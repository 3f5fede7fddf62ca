//! Producer side: expand messages into per-follower work items.

use crate::engine::progress::Progress;
use crate::model::WorkItem;
use crate::queue::WorkQueue;
use crate::telemetry::metrics;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Build the follower list for one author.
///
/// Every follower gets a fresh random id; payloads are `Test Message {i}`.
/// The list is generated once and replayed for every message of the run.
pub fn create_followers(owner_id: Uuid, follower_count: usize) -> Vec<Arc<WorkItem>> {
    (0..follower_count)
        .map(|i| Arc::new(WorkItem::new(owner_id, Uuid::new_v4(), format!("Test Message {i}"))))
        .collect()
}

/// Enqueue every follower item once per message.
///
/// Performs exactly `message_count * followers.len()` enqueues and does not
/// wait for workers to drain between messages. Returns the number enqueued.
pub fn dispatch(
    queue: &WorkQueue,
    followers: &[Arc<WorkItem>],
    message_count: u64,
    progress: &Progress,
) -> u64 {
    let mut enqueued = 0u64;
    for message in 0..message_count {
        for item in followers {
            progress.record_enqueued();
            queue.enqueue(Arc::clone(item));
            enqueued += 1;
        }
        debug!(message, followers = followers.len(), "message fanned out");
    }
    metrics::items_enqueued().add(enqueued, &[]);
    enqueued
}
