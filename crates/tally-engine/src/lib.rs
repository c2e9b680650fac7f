//! # tally-engine
//!
//! Pure, synchronous statistics over in-memory columns:
//! - [`descriptive`] — missing-aware summary statistics and frequency tables
//! - [`nonparametric`] — Mann-Whitney U, Wilcoxon signed-rank, Fisher's
//!   exact 2×2 test
//! - [`regression`] — simple linear regression and from-scratch OLS on the
//!   [`linalg`] kernel
//! - [`dispatch`] — maps an [`tally_core::AnalysisKind`] plus resolved
//!   inputs onto the matching engine function
//!
//! Every function is a blocking computation with no I/O and no shared
//! mutable state; inputs are never mutated in place, so concurrent callers
//! need no coordination. Expected validation failures return
//! [`EngineError`], never panic.

pub mod descriptive;
pub mod dispatch;
pub mod error;
pub mod linalg;
pub mod nonparametric;
pub mod rank;
pub mod regression;

pub use error::EngineError;
pub use rank::rank_with_ties;
