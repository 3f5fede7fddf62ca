//! Completion detection.
//!
//! `QueueDrained` reproduces the classic check: the run is over once the
//! queue is observed empty. A worker may still be writing the last item it
//! took at that moment, so the measured time undercounts. `Acknowledged`
//! waits until every enqueued write has been answered by the store.

use crate::engine::progress::Progress;
use crate::engine::timer::Timer;
use crate::queue::WorkQueue;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionPolicy {
    /// Every enqueued write acknowledged or failed.
    Acknowledged,
    /// Queue observed empty; in-flight writes are not waited on.
    QueueDrained,
}

impl fmt::Display for CompletionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Acknowledged => f.write_str("acknowledged"),
            Self::QueueDrained => f.write_str("queue-drained"),
        }
    }
}

impl FromStr for CompletionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "acknowledged" | "ack" => Ok(Self::Acknowledged),
            "queue-drained" | "queue_drained" | "drained" => Ok(Self::QueueDrained),
            other => Err(format!(
                "unknown completion policy '{other}' (expected acknowledged or queue-drained)"
            )),
        }
    }
}

/// How a monitor wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorOutcome {
    Completed,
    Cancelled,
}

pub struct CompletionMonitor {
    queue: Arc<WorkQueue>,
    progress: Arc<Progress>,
    policy: CompletionPolicy,
    poll_interval: Duration,
}

impl CompletionMonitor {
    pub fn new(
        queue: Arc<WorkQueue>,
        progress: Arc<Progress>,
        policy: CompletionPolicy,
        poll_interval: Duration,
    ) -> Self {
        Self {
            queue,
            progress,
            policy,
            poll_interval,
        }
    }

    fn is_complete(&self) -> bool {
        match self.policy {
            CompletionPolicy::Acknowledged => self.progress.is_complete(),
            CompletionPolicy::QueueDrained => self.queue.is_empty(),
        }
    }

    /// Wait until the run completes under the configured policy.
    ///
    /// Reports the remaining queue depth once per poll interval. Never
    /// returns `Completed` while items are queued and nobody drains them.
    pub async fn wait(&self, timer: &Timer, shutdown: &CancellationToken) -> MonitorOutcome {
        let mut report = true;
        loop {
            if self.is_complete() {
                return MonitorOutcome::Completed;
            }

            if report {
                let snapshot = self.progress.snapshot();
                info!(
                    remaining = self.queue.len(),
                    outstanding = snapshot.outstanding(),
                    acknowledged = snapshot.acknowledged,
                    failed = snapshot.failed,
                    elapsed_secs = timer.elapsed_secs(),
                    "messages left to send"
                );
            }

            let tick = tokio::time::sleep(self.poll_interval);
            report = match self.policy {
                CompletionPolicy::Acknowledged => tokio::select! {
                    _ = self.progress.changed() => false,
                    _ = tick => true,
                    _ = shutdown.cancelled() => return MonitorOutcome::Cancelled,
                },
                CompletionPolicy::QueueDrained => tokio::select! {
                    _ = tick => true,
                    _ = shutdown.cancelled() => return MonitorOutcome::Cancelled,
                },
            };
        }
    }
}
