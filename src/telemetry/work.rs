//! Span helpers for runs and individual writes.

use crate::model::{RunParams, TimelineWrite};
use tracing::Span;
use uuid::Uuid;

/// Start the span that wraps a whole run.
pub fn start_run_span(owner_id: &Uuid, params: &RunParams) -> Span {
    tracing::info_span!(
        "fanout.run",
        "fanout.owner_id" = %owner_id,
        "fanout.workers" = params.worker_count,
        "fanout.messages" = params.message_count,
        "fanout.followers" = params.follower_count,
    )
}

/// Start a span for one timeline write.
///
/// `fanout.outcome` is declared empty and filled by [`record_write_outcome`].
pub fn start_write_span(worker_id: usize, write: &TimelineWrite) -> Span {
    tracing::debug_span!(
        "fanout.write",
        "fanout.worker" = worker_id,
        "fanout.target_id" = %write.target_id,
        "fanout.write_id" = %write.write_id,
        "fanout.outcome" = tracing::field::Empty,
    )
}

pub fn record_write_outcome(span: &Span, acknowledged: bool) {
    span.record(
        "fanout.outcome",
        if acknowledged { "acknowledged" } else { "failed" },
    );
}
