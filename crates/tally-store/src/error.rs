//! Store error types.

use thiserror::Error;

/// Errors from project store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// No dataset with the given name exists.
    #[error("Dataset '{0}' not found in project")]
    DatasetNotFound(String),

    /// A stored payload could not be parsed back.
    #[error("Corrupt stored payload: {0}")]
    Payload(String),

    /// Core data model / spec error surfaced through the store.
    #[error(transparent)]
    Core(#[from] tally_core::CoreError),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
