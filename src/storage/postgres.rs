//! Postgres timeline store via SQLx.
//!
//! Same table shape and binding order as the CQL store, for clusters
//! where the timeline lives in Postgres instead.

use super::{TimelineStore, timeline_binding};
use crate::error::{Error, Result};
use crate::model::TimelineWrite;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use tracing::info;

pub const INSERT_TIMELINE: &str =
    "INSERT INTO timeline (userid, time, follower_id, message) VALUES ($1, $2, $3, $4)";

pub struct PgTimelineStore {
    pool: PgPool,
}

impl PgTimelineStore {
    /// Connect, run migrations and prepare the insert once to validate it.
    ///
    /// The pool is sized to the worker count so no worker waits on another
    /// for a connection.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect(url)
            .await
            .map_err(|e| Error::Connect(e.to_string()))?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        pool.prepare(INSERT_TIMELINE)
            .await
            .map_err(|e| Error::Prepare(e.to_string()))?;

        info!(max_connections, "postgres pool created");
        Ok(Self { pool })
    }

    /// Health check: run a SELECT 1.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

impl TimelineStore for PgTimelineStore {
    async fn insert(&self, write: &TimelineWrite) -> Result<()> {
        let (userid, time, follower_id, message) = timeline_binding(write);
        sqlx::query(INSERT_TIMELINE)
            .bind(userid)
            .bind(time)
            .bind(follower_id)
            .bind(message)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Write(e.to_string()))?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}
