//! Error types for fanout-bench.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("cannot connect to storage: {0}")]
    Connect(String),

    #[error("cannot prepare write template: {0}")]
    Prepare(String),

    #[error("write failed: {0}")]
    Write(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
