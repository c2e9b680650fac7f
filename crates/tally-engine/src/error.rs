//! Engine error taxonomy.
//!
//! Three families: malformed input shape (validation), numerical failure
//! downgraded to a structured cause, and input-role resolution failures
//! raised by the dispatcher. Degenerate-but-valid inputs (all-tied pairs,
//! single-point samples, zero total sum of squares) are *not* errors — each
//! has a defined fallback value in its module.

use thiserror::Error;

/// Errors from statistics computations and dispatch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// A required sample was empty.
    #[error("Input samples cannot be empty")]
    EmptySample,

    /// Paired or x/y inputs differ in length.
    #[error("Inputs must have the same length: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    /// Matrix dimensions are incompatible for the requested operation.
    #[error("Matrix dimensions are incompatible: {0}")]
    DimensionMismatch(String),

    /// Inversion requires a square matrix.
    #[error("Matrix must be square to be inverted ({rows}x{cols})")]
    NotSquare { rows: usize, cols: usize },

    /// A pivot fell below the 1e-12 floor during Gauss-Jordan elimination.
    #[error("Matrix is singular and cannot be inverted")]
    Singular,

    /// Too few observations for the parameter count.
    #[error("Need more observations ({n}) than parameters ({p})")]
    TooFewObservations { n: usize, p: usize },

    /// Numerical failure with a human-readable cause (e.g., OLS on
    /// collinear predictors).
    #[error("Numerical failure: {0}")]
    Numerical(String),

    /// A dispatched input role had the wrong shape or type.
    #[error("Invalid input: {0}")]
    Validation(String),
}
