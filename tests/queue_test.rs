//! Integration tests for the shared work queue.

use fanout_bench::model::WorkItem;
use fanout_bench::queue::WorkQueue;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

fn item(payload: &str) -> Arc<WorkItem> {
    Arc::new(WorkItem::new(Uuid::new_v4(), Uuid::new_v4(), payload))
}

#[test]
fn try_dequeue_returns_none_when_empty() {
    let queue = WorkQueue::new();
    assert!(queue.try_dequeue().is_none());
    assert!(queue.is_empty());
    assert_eq!(queue.len(), 0);
}

#[test]
fn dequeues_in_fifo_order_from_single_producer() {
    let queue = WorkQueue::new();
    for i in 0..5 {
        queue.enqueue(item(&format!("m{i}")));
    }
    assert_eq!(queue.len(), 5);

    let order: Vec<String> = std::iter::from_fn(|| queue.try_dequeue())
        .map(|i| i.payload.clone())
        .collect();
    assert_eq!(order, vec!["m0", "m1", "m2", "m3", "m4"]);
    assert!(queue.is_empty());
}

#[test]
fn same_item_can_be_queued_twice_by_reference() {
    let queue = WorkQueue::new();
    let shared = item("shared");
    queue.enqueue(Arc::clone(&shared));
    queue.enqueue(Arc::clone(&shared));

    let first = queue.try_dequeue().unwrap();
    let second = queue.try_dequeue().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(Arc::strong_count(&shared), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_consumers_never_share_an_item() {
    const SEEDED: usize = 10_000;
    const CONSUMERS: usize = 8;

    let queue = Arc::new(WorkQueue::new());
    let mut seeded = HashSet::new();
    for _ in 0..SEEDED {
        let it = item("seeded");
        seeded.insert(it.target_id);
        queue.enqueue(it);
    }

    let mut handles = Vec::new();
    for _ in 0..CONSUMERS {
        let queue = Arc::clone(&queue);
        handles.push(tokio::spawn(async move {
            let mut taken = Vec::new();
            while let Some(it) = queue.try_dequeue() {
                taken.push(it.target_id);
                tokio::task::yield_now().await;
            }
            taken
        }));
    }

    let mut collected = Vec::with_capacity(SEEDED);
    for handle in handles {
        collected.extend(handle.await.unwrap());
    }

    assert_eq!(collected.len(), SEEDED, "items lost or duplicated");
    let unique: HashSet<Uuid> = collected.into_iter().collect();
    assert_eq!(unique, seeded);
}

#[tokio::test]
async fn dequeue_waits_for_enqueue() {
    let queue = Arc::new(WorkQueue::new());
    let token = CancellationToken::new();

    let waiter = {
        let queue = Arc::clone(&queue);
        let token = token.clone();
        tokio::spawn(async move { queue.dequeue(&token).await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiter.is_finished());

    queue.enqueue(item("late"));
    let got = tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("dequeue should wake on enqueue")
        .unwrap();
    assert_eq!(got.unwrap().payload, "late");
}

#[tokio::test]
async fn dequeue_returns_none_on_cancellation() {
    let queue = Arc::new(WorkQueue::new());
    let token = CancellationToken::new();

    let waiter = {
        let queue = Arc::clone(&queue);
        let token = token.clone();
        tokio::spawn(async move { queue.dequeue(&token).await })
    };

    token.cancel();
    let got = tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("dequeue should return after cancellation")
        .unwrap();
    assert!(got.is_none());
}

#[tokio::test]
async fn cancelled_token_stops_taking_queued_items() {
    let queue = WorkQueue::new();
    queue.enqueue(item("left behind"));
    let token = CancellationToken::new();
    token.cancel();

    assert!(queue.dequeue(&token).await.is_none());
    assert_eq!(queue.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parked_consumers_drain_a_burst() {
    const CONSUMERS: usize = 4;
    const BURST: usize = 2_000;

    let queue = Arc::new(WorkQueue::new());
    let token = CancellationToken::new();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    for _ in 0..CONSUMERS {
        let queue = Arc::clone(&queue);
        let token = token.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            while let Some(it) = queue.dequeue(&token).await {
                let _ = tx.send(it.target_id);
            }
        });
    }
    drop(tx);

    // Consumers are parked before the burst arrives.
    tokio::time::sleep(Duration::from_millis(20)).await;
    let mut expected = HashSet::new();
    for _ in 0..BURST {
        let it = item("burst");
        expected.insert(it.target_id);
        queue.enqueue(it);
    }

    let mut received = HashSet::new();
    while received.len() < BURST {
        let id = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("burst not drained")
            .expect("consumers exited early");
        assert!(received.insert(id), "item delivered twice");
    }
    assert_eq!(received, expected);

    token.cancel();
}
