//! Core data model.
//!
//! A work item is one fan-out write: the author of a message, the follower
//! whose timeline receives it, and the message text. Items are immutable and
//! shared by reference between the precomputed follower list and the queue.

use chrono::Utc;
use std::sync::OnceLock;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Work Item
// ---------------------------------------------------------------------------

/// A single fan-out write waiting to be issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Author of the message.
    pub owner_id: Uuid,
    /// Follower whose timeline receives the message.
    pub target_id: Uuid,
    /// Message text, without the per-write timestamp suffix.
    pub payload: String,
}

impl WorkItem {
    pub fn new(owner_id: Uuid, target_id: Uuid, payload: impl Into<String>) -> Self {
        Self {
            owner_id,
            target_id,
            payload: payload.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Run parameters
// ---------------------------------------------------------------------------

/// Immutable parameters of one benchmark run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunParams {
    /// Number of concurrent worker loops. Zero is accepted here so a run
    /// can be observed never draining; the CLI rejects it.
    pub worker_count: usize,
    /// Number of logical messages, each replayed to every follower.
    pub message_count: u64,
    /// Number of followers per message.
    pub follower_count: usize,
}

impl RunParams {
    /// Total number of writes the run will enqueue.
    pub fn total_writes(&self) -> u64 {
        self.message_count * self.follower_count as u64
    }
}

// ---------------------------------------------------------------------------
// Bound write
// ---------------------------------------------------------------------------

/// A work item bound to its per-write values, ready for a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineWrite {
    pub owner_id: Uuid,
    pub target_id: Uuid,
    /// Time-ordered id, unique per write.
    pub write_id: Uuid,
    /// Payload followed by the wall-clock time the write was issued.
    pub message: String,
}

impl TimelineWrite {
    /// Bind an item with a fresh write id and the current timestamp.
    pub fn bind(item: &WorkItem) -> Self {
        Self {
            owner_id: item.owner_id,
            target_id: item.target_id,
            write_id: time_based_id(),
            message: format!("{} {}", item.payload, wall_clock_stamp()),
        }
    }
}

/// Generate a version 1 (time-based) UUID.
///
/// The node id is drawn once per process so ids from one harness stay
/// distinguishable from another's on a shared cluster.
pub fn time_based_id() -> Uuid {
    static NODE_ID: OnceLock<[u8; 6]> = OnceLock::new();
    let node = NODE_ID.get_or_init(|| {
        let random = Uuid::new_v4();
        let mut node = [0u8; 6];
        node.copy_from_slice(&random.as_bytes()[..6]);
        node
    });
    Uuid::now_v1(node)
}

/// Current wall-clock time, e.g. `Sat Oct 17 18:30:00 UTC 2026`.
pub fn wall_clock_stamp() -> String {
    Utc::now().format("%a %b %d %H:%M:%S UTC %Y").to_string()
}
