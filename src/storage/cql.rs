//! CQL (Cassandra / ScyllaDB) timeline store.
//!
//! One cluster-aware session is shared by all workers; the driver keeps a
//! connection pool per node and routes each write itself.

use super::{TimelineStore, timeline_binding};
use crate::config::Config;
use crate::config::secrets::{ExposeSecret, SecretString};
use crate::error::{Error, Result};
use crate::model::TimelineWrite;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::statement::prepared::PreparedStatement;
use tracing::info;

/// Connection settings for a CQL cluster.
#[derive(Debug, Clone)]
pub struct CqlOptions {
    pub contact_points: Vec<String>,
    pub keyspace: String,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    /// Replication factor used when creating the keyspace.
    pub replication_factor: u32,
}

impl CqlOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            contact_points: config.contact_points.clone(),
            keyspace: config.keyspace.clone(),
            username: config.cql_username.clone(),
            password: config.cql_password.clone(),
            replication_factor: config.replication_factor,
        }
    }
}

pub fn insert_statement(keyspace: &str) -> String {
    format!("INSERT INTO {keyspace}.timeline (userid, time, follower_id, message) VALUES (?,?,?,?);")
}

pub fn create_keyspace_statement(keyspace: &str, replication_factor: u32) -> String {
    format!(
        "CREATE KEYSPACE IF NOT EXISTS {keyspace} WITH replication = \
         {{'class': 'SimpleStrategy', 'replication_factor': {replication_factor}}};"
    )
}

pub fn create_table_statement(keyspace: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {keyspace}.timeline (\
         userid uuid, time timeuuid, follower_id uuid, message text, \
         PRIMARY KEY (userid, time)) WITH CLUSTERING ORDER BY (time DESC);"
    )
}

pub struct CqlTimelineStore {
    session: Session,
    insert: PreparedStatement,
}

impl CqlTimelineStore {
    /// Open a session against the contact points and prepare the insert.
    pub async fn connect(options: &CqlOptions) -> Result<Self> {
        let session = open_session(options).await?;
        let insert = session
            .prepare(insert_statement(&options.keyspace))
            .await
            .map_err(|e| Error::Prepare(e.to_string()))?;
        info!(
            contact_points = ?options.contact_points,
            keyspace = %options.keyspace,
            "cluster session created"
        );
        Ok(Self { session, insert })
    }

    /// Create the keyspace and timeline table if they do not exist.
    pub async fn create_schema(options: &CqlOptions) -> Result<()> {
        let session = open_session(options).await?;
        for statement in [
            create_keyspace_statement(&options.keyspace, options.replication_factor),
            create_table_statement(&options.keyspace),
        ] {
            session
                .query_unpaged(statement, ())
                .await
                .map_err(|e| Error::Other(format!("schema statement failed: {e}")))?;
        }
        info!(keyspace = %options.keyspace, "timeline schema ready");
        Ok(())
    }
}

async fn open_session(options: &CqlOptions) -> Result<Session> {
    let mut builder = SessionBuilder::new().known_nodes(&options.contact_points);
    if let (Some(user), Some(password)) = (&options.username, &options.password) {
        builder = builder.user(user.as_str(), password.expose_secret());
    }
    builder
        .build()
        .await
        .map_err(|e| Error::Connect(e.to_string()))
}

// `close` keeps the default: the session's connections are closed when the
// store is dropped.
impl TimelineStore for CqlTimelineStore {
    async fn insert(&self, write: &TimelineWrite) -> Result<()> {
        self.session
            .execute_unpaged(&self.insert, timeline_binding(write))
            .await
            .map_err(|e| Error::Write(e.to_string()))?;
        Ok(())
    }
}
