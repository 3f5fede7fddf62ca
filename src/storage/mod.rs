//! Timeline storage backends.
//!
//! A store receives bound timeline writes from many workers at once. Connect
//! and prepare happen in each backend's constructor; a failure there aborts
//! the run before anything is dispatched.

pub mod cql;
pub mod memory;
pub mod postgres;

pub use cql::{CqlOptions, CqlTimelineStore};
pub use memory::{MemoryTimelineStore, TimelineRow};
pub use postgres::PgTimelineStore;

use crate::error::Result;
use crate::model::TimelineWrite;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use uuid::Uuid;

/// A destination for fan-out writes, shared by every worker.
pub trait TimelineStore: Send + Sync + 'static {
    /// Perform one write and wait for the backend to acknowledge it.
    fn insert(&self, write: &TimelineWrite) -> impl Future<Output = Result<()>> + Send;

    /// Release connections. Called once, after all workers have stopped.
    fn close(&self) -> impl Future<Output = Result<()>> + Send {
        async { Ok(()) }
    }
}

/// Which store a run writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Cql,
    Postgres,
    Memory,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cql => f.write_str("cql"),
            Self::Postgres => f.write_str("postgres"),
            Self::Memory => f.write_str("memory"),
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cql" | "cassandra" | "scylla" => Ok(Self::Cql),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!(
                "unknown backend '{other}' (expected cql, postgres or memory)"
            )),
        }
    }
}

/// Values for the four timeline placeholders, in binding order.
///
/// The statement declares `(userid, time, follower_id, message)` and binds
/// `(target, write id, owner, message)`: a row lives in the follower's
/// timeline and names the author in `follower_id`. Existing timeline
/// tables are laid out this way, so the order must not change.
pub fn timeline_binding(write: &TimelineWrite) -> (Uuid, Uuid, Uuid, &str) {
    (
        write.target_id,
        write.write_id,
        write.owner_id,
        write.message.as_str(),
    )
}
