//! One benchmark run: worker pool, producer, monitor, shutdown.

use crate::dispatch::{create_followers, dispatch};
use crate::engine::monitor::{CompletionMonitor, CompletionPolicy, MonitorOutcome};
use crate::engine::progress::Progress;
use crate::engine::timer::Timer;
use crate::engine::worker::worker_loop;
use crate::model::RunParams;
use crate::queue::WorkQueue;
use crate::storage::TimelineStore;
use crate::telemetry::metrics;
use crate::telemetry::work::start_run_span;
use opentelemetry::KeyValue;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, warn};
use uuid::Uuid;

/// Timing and completion knobs for a run.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub completion: CompletionPolicy,
    /// How often the monitor reports progress and re-checks completion.
    pub poll_interval: Duration,
    /// Pause after completion before workers are stopped.
    pub settle_delay: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            completion: CompletionPolicy::Acknowledged,
            poll_interval: Duration::from_secs(1),
            settle_delay: Duration::from_secs(1),
        }
    }
}

/// Result of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub owner_id: Uuid,
    pub message_count: u64,
    pub follower_count: usize,
    pub worker_count: usize,
    pub enqueued: u64,
    pub acknowledged: u64,
    pub failed: u64,
    pub completion: CompletionPolicy,
    /// False when the run was cancelled before completing.
    pub completed: bool,
    pub elapsed_secs: f64,
    pub writes_per_sec: f64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Completed {} messages to {} followers in {:.3}secs with {} threads.",
            self.message_count, self.follower_count, self.elapsed_secs, self.worker_count
        )
    }
}

/// Drives a run against a store.
pub struct Harness<S> {
    store: Arc<S>,
    params: RunParams,
    config: HarnessConfig,
    shutdown: CancellationToken,
}

impl<S: TimelineStore> Harness<S> {
    pub fn new(store: S, params: RunParams, config: HarnessConfig) -> Self {
        Self {
            store: Arc::new(store),
            params,
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Token that aborts the run when cancelled (e.g. on Ctrl-C).
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Access to the store, e.g. to inspect what was written.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Execute the run and close the store.
    ///
    /// A harness runs once: the shutdown token stays cancelled afterwards.
    /// Workers are started before anything is enqueued. Per-write failures
    /// are counted in the summary. A failed close is logged and the summary
    /// is still returned.
    pub async fn run(&self) -> RunSummary {
        let owner_id = Uuid::new_v4();
        let span = start_run_span(&owner_id, &self.params);
        let summary = self.run_inner(owner_id).instrument(span).await;

        if let Err(e) = self.store.close().await {
            warn!(error = %e, "failed to close store");
        }
        summary
    }

    async fn run_inner(&self, owner_id: Uuid) -> RunSummary {
        let params = self.params;
        let queue = Arc::new(WorkQueue::new());
        let progress = Arc::new(Progress::new());

        let mut workers = JoinSet::new();
        for worker_id in 0..params.worker_count {
            workers.spawn(worker_loop(
                worker_id,
                Arc::clone(&queue),
                Arc::clone(&self.store),
                Arc::clone(&progress),
                self.shutdown.clone(),
            ));
        }
        info!(workers = params.worker_count, "worker pool started");

        let followers = create_followers(owner_id, params.follower_count);

        let mut timer = Timer::start();
        let enqueued = dispatch(&queue, &followers, params.message_count, &progress);
        progress.mark_dispatched();
        info!(enqueued, "dispatch finished");

        let monitor = CompletionMonitor::new(
            Arc::clone(&queue),
            Arc::clone(&progress),
            self.config.completion,
            self.config.poll_interval,
        );
        let outcome = monitor.wait(&timer, &self.shutdown).await;
        timer.stop();

        match outcome {
            MonitorOutcome::Completed => {
                info!(elapsed_secs = timer.elapsed_secs(), "run complete, settling");
                tokio::select! {
                    _ = tokio::time::sleep(self.config.settle_delay) => {}
                    _ = self.shutdown.cancelled() => {}
                }
            }
            MonitorOutcome::Cancelled => {
                warn!(remaining = queue.len(), "run cancelled before completion");
            }
        }

        self.shutdown.cancel();
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                warn!("worker task ended abnormally: {e}");
            }
        }

        let snapshot = progress.snapshot();
        let elapsed_secs = timer.elapsed_secs();
        metrics::run_duration_s().record(
            elapsed_secs,
            &[KeyValue::new("completion", self.config.completion.to_string())],
        );

        RunSummary {
            owner_id,
            message_count: params.message_count,
            follower_count: params.follower_count,
            worker_count: params.worker_count,
            enqueued: snapshot.enqueued,
            acknowledged: snapshot.acknowledged,
            failed: snapshot.failed,
            completion: self.config.completion,
            completed: outcome == MonitorOutcome::Completed,
            elapsed_secs,
            writes_per_sec: if elapsed_secs > 0.0 {
                snapshot.acknowledged as f64 / elapsed_secs
            } else {
                0.0
            },
        }
    }
}
