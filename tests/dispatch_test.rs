//! Integration tests for follower generation and the producer loop.

use fanout_bench::dispatch::{create_followers, dispatch};
use fanout_bench::engine::Progress;
use fanout_bench::queue::WorkQueue;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

#[test]
fn followers_share_owner_and_have_unique_targets() {
    let owner = Uuid::new_v4();
    let followers = create_followers(owner, 100);

    assert_eq!(followers.len(), 100);
    assert!(followers.iter().all(|f| f.owner_id == owner));
    let targets: HashSet<Uuid> = followers.iter().map(|f| f.target_id).collect();
    assert_eq!(targets.len(), 100);
    assert!(!targets.contains(&owner));
}

#[test]
fn follower_payloads_are_indexed_by_position() {
    let followers = create_followers(Uuid::new_v4(), 3);
    let payloads: Vec<&str> = followers.iter().map(|f| f.payload.as_str()).collect();
    assert_eq!(payloads, ["Test Message 0", "Test Message 1", "Test Message 2"]);
}

#[test]
fn dispatch_enqueues_messages_times_followers() {
    for (messages, follower_count) in [(1, 1), (2, 3), (10, 1000), (7, 13)] {
        let queue = WorkQueue::new();
        let progress = Progress::new();
        let followers = create_followers(Uuid::new_v4(), follower_count);

        let enqueued = dispatch(&queue, &followers, messages, &progress);

        let expected = messages * follower_count as u64;
        assert_eq!(enqueued, expected);
        assert_eq!(queue.len() as u64, expected);
        assert_eq!(progress.snapshot().enqueued, expected);
    }
}

#[test]
fn dispatch_replays_the_same_follower_items() {
    let queue = WorkQueue::new();
    let progress = Progress::new();
    let followers = create_followers(Uuid::new_v4(), 3);

    dispatch(&queue, &followers, 2, &progress);

    let mut seen: HashMap<Uuid, usize> = HashMap::new();
    while let Some(item) = queue.try_dequeue() {
        assert!(
            followers.iter().any(|f| Arc::ptr_eq(f, &item)),
            "queued item is not one of the precomputed followers"
        );
        *seen.entry(item.target_id).or_default() += 1;
    }
    assert_eq!(seen.len(), 3);
    assert!(seen.values().all(|&n| n == 2));
}

#[test]
fn dispatch_does_not_mark_the_run_finished() {
    let queue = WorkQueue::new();
    let progress = Progress::new();
    let followers = create_followers(Uuid::new_v4(), 2);

    dispatch(&queue, &followers, 1, &progress);

    assert!(!progress.snapshot().dispatched);
    assert!(!progress.is_complete());
}
