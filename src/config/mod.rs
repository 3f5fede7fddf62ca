//! Typed run configuration from environment variables.
//!
//! Loads once at startup and fails fast on malformed values. The binary
//! layers CLI overrides on top and then calls [`Config::validate`].
//! Credentials are wrapped in secrecy::SecretString to prevent log leaks.

pub mod secrets;

use crate::engine::CompletionPolicy;
use crate::error::{Error, Result};
use crate::model::RunParams;
use crate::storage::Backend;
use secrecy::SecretString;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_KEYSPACE: &str = "datastax_shared_session_demo";

#[derive(Debug)]
pub struct Config {
    pub backend: Backend,
    pub contact_points: Vec<String>,
    pub keyspace: String,
    pub replication_factor: u32,
    pub cql_username: Option<String>,
    pub cql_password: Option<SecretString>,
    pub database_url: Option<SecretString>,
    pub worker_count: usize,
    pub message_count: u64,
    pub follower_count: usize,
    pub completion: CompletionPolicy,
    pub poll_interval: Duration,
    pub settle_delay: Duration,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unset variables fall back to their defaults; set but unparsable
    /// values are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let contact_points = lookup("CONTACT_POINTS")
            .map(|raw| parse_contact_points(&raw))
            .unwrap_or_else(|| vec!["localhost".to_string()]);

        Ok(Self {
            backend: parsed(&lookup, "BACKEND", Backend::Cql)?,
            contact_points,
            keyspace: lookup("KEYSPACE").unwrap_or_else(|| DEFAULT_KEYSPACE.to_string()),
            replication_factor: parsed(&lookup, "REPLICATION_FACTOR", 1)?,
            cql_username: lookup("CQL_USERNAME"),
            cql_password: lookup("CQL_PASSWORD").map(SecretString::from),
            database_url: lookup("DATABASE_URL").map(SecretString::from),
            worker_count: parsed(&lookup, "NO_OF_THREADS", 1)?,
            message_count: parsed(&lookup, "MESSAGE_COUNT", 10)?,
            follower_count: parsed(&lookup, "NO_OF_FOLLOWERS", 1000)?,
            completion: parsed(&lookup, "COMPLETION", CompletionPolicy::Acknowledged)?,
            poll_interval: Duration::from_millis(parsed(&lookup, "POLL_INTERVAL_MS", 1000)?),
            settle_delay: Duration::from_millis(parsed(&lookup, "SETTLE_DELAY_MS", 1000)?),
            otel_endpoint: lookup("OTEL_ENDPOINT"),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Check the invariants a run depends on.
    pub fn validate(&self) -> Result<()> {
        if self.contact_points.is_empty() {
            return Err(Error::Config("at least one contact point is required".into()));
        }
        if self.worker_count == 0 {
            return Err(Error::Config("NO_OF_THREADS must be at least 1".into()));
        }
        if self.message_count == 0 {
            return Err(Error::Config("MESSAGE_COUNT must be at least 1".into()));
        }
        if self.follower_count == 0 {
            return Err(Error::Config("NO_OF_FOLLOWERS must be at least 1".into()));
        }
        if !is_cql_identifier(&self.keyspace) {
            return Err(Error::Config(format!(
                "KEYSPACE '{}' must start with a letter and contain only letters, digits and '_'",
                self.keyspace
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(Error::Config("POLL_INTERVAL_MS must be positive".into()));
        }
        if self.backend == Backend::Postgres && self.database_url.is_none() {
            return Err(Error::Config(
                "DATABASE_URL is required for the postgres backend".into(),
            ));
        }
        Ok(())
    }

    /// The immutable parameters of a single run.
    pub fn run_params(&self) -> RunParams {
        RunParams {
            worker_count: self.worker_count,
            message_count: self.message_count,
            follower_count: self.follower_count,
        }
    }

    /// Postgres pool size: one connection per worker, saturating at `u32::MAX`.
    pub fn pool_size(&self) -> u32 {
        u32::try_from(self.worker_count).unwrap_or(u32::MAX)
    }
}

/// Split a comma-separated endpoint list, dropping blanks.
pub fn parse_contact_points(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Unquoted CQL identifier, at most 48 characters.
fn is_cql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name.len() <= 48
}

fn parsed<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("invalid value for {name} ({raw:?}): {e}"))),
        None => Ok(default),
    }
}
