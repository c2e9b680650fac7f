//! Headless replay of stored analysis specs.
//!
//! A spec is sufficient to reproduce its analysis: replay loads the named
//! dataset, re-resolves the spec's inputs against it (column names become
//! column values, everything else passes through as literals), and
//! dispatches to the engine. Results are recomputed every time — they are
//! never read from storage.

use thiserror::Error;

use tally_core::{AnalysisSpec, CoreError};
use tally_engine::{EngineError, dispatch};

use crate::ProjectStore;
use crate::error::StoreError;

/// Errors from spec replay.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Spec parse failure, including unknown-analysis key drift.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The referenced dataset could not be loaded, or another store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The analysis itself failed.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Run a parsed spec against the store's current data.
///
/// # Errors
///
/// Fails closed with [`StoreError::DatasetNotFound`] when the spec's
/// dataset no longer exists, and propagates engine validation/numerical
/// errors unchanged.
pub async fn run_spec(
    store: &ProjectStore,
    spec: &AnalysisSpec,
) -> Result<serde_json::Value, ReplayError> {
    let table = store.load_dataset(&spec.dataset).await?;
    tracing::debug!(
        analysis = spec.analysis.as_str(),
        dataset = spec.dataset.as_str(),
        "replaying analysis spec"
    );
    let result = dispatch::run_analysis(spec.analysis, &spec.inputs, &spec.options, &table)?;
    Ok(result)
}

/// Parse an external spec document and run it.
///
/// # Errors
///
/// Fails closed with `CoreError::UnknownAnalysis` when the stored key is no
/// longer registered (schema/version drift), before touching the store.
pub async fn run_spec_json(
    store: &ProjectStore,
    document: &str,
) -> Result<serde_json::Value, ReplayError> {
    let spec = AnalysisSpec::from_json(document)?;
    run_spec(store, &spec).await
}
