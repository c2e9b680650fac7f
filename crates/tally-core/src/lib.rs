//! # tally-core
//!
//! Core types shared across all tally crates:
//! - `Value` — a lossless scalar cell (integer, float, text, or null)
//! - `TabularData` — an immutable-shape, row-oriented dataset
//! - `AnalysisKind` / `AnalysisSpec` — the declarative, replayable record of
//!   one analysis invocation
//! - Cross-cutting error types
//!
//! This crate performs no I/O. Persistence lives in `tally-store`, the
//! statistics themselves in `tally-engine`.

pub mod errors;
pub mod spec;
pub mod table;
pub mod value;

pub use errors::CoreError;
pub use spec::{AnalysisKind, AnalysisSpec};
pub use table::TabularData;
pub use value::Value;
