//! Cross-cutting error types for tally.
//!
//! Domain-specific errors (`EngineError`, `StoreError`) are defined in their
//! respective crates; this module holds the errors that can originate from
//! the shared data model and spec layer.

use thiserror::Error;

/// Errors raised by the core data model and spec types.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A column name was not found in the dataset schema.
    #[error("Column '{column}' not found in dataset '{dataset}'")]
    ColumnNotFound { dataset: String, column: String },

    /// A record's column set differs from the schema fixed by the first record.
    #[error("Record {index} does not match the dataset column schema")]
    MismatchedColumns { index: usize },

    /// A row's arity differs from the column count.
    #[error("Row {index} has {got} values but the schema has {expected} columns")]
    RowArity {
        index: usize,
        got: usize,
        expected: usize,
    },

    /// A stored cell could not be read back as a scalar value.
    #[error("Row {index}, column '{column}': cell is not a scalar value")]
    InvalidCell { index: usize, column: String },

    /// An analysis key is not registered in the dispatch enum.
    #[error("Unknown analysis: '{0}'")]
    UnknownAnalysis(String),

    /// A spec document failed to parse.
    #[error("Invalid analysis spec: {0}")]
    InvalidSpec(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
