//! Worker loop: take an item, issue its write, repeat.

use crate::engine::progress::Progress;
use crate::model::TimelineWrite;
use crate::queue::WorkQueue;
use crate::storage::TimelineStore;
use crate::telemetry::metrics;
use crate::telemetry::work::{record_write_outcome, start_write_span};
use opentelemetry::KeyValue;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, trace, warn};

/// Run one consumer until `shutdown` is cancelled.
///
/// A failed write is logged and counted; the loop carries on with the next
/// item. No write is retried. An in-flight write always finishes before the
/// loop observes cancellation.
pub async fn worker_loop<S: TimelineStore>(
    worker_id: usize,
    queue: Arc<WorkQueue>,
    store: Arc<S>,
    progress: Arc<Progress>,
    shutdown: CancellationToken,
) {
    trace!(worker_id, "worker started");

    let acknowledged = metrics::writes_acknowledged();
    let failed = metrics::writes_failed();
    let duration = metrics::write_duration_ms();
    let labels = [KeyValue::new("worker", worker_id as i64)];

    while let Some(item) = queue.dequeue(&shutdown).await {
        let write = TimelineWrite::bind(&item);
        let span = start_write_span(worker_id, &write);
        let started = Instant::now();

        let result = store.insert(&write).instrument(span.clone()).await;
        duration.record(started.elapsed().as_secs_f64() * 1000.0, &labels);
        record_write_outcome(&span, result.is_ok());

        match result {
            Ok(()) => {
                acknowledged.add(1, &labels);
                progress.record_acknowledged();
            }
            Err(e) => {
                warn!(worker_id, target_id = %write.target_id, "write failed: {e}");
                failed.add(1, &labels);
                progress.record_failed();
            }
        }
    }

    trace!(worker_id, "worker stopped");
}
