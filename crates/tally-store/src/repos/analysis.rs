//! Analysis log repository.
//!
//! Append-only: specs are inserted and never edited or deleted, forming a
//! full audit trail of every analysis ever run in the project.

use chrono::Utc;

use tally_core::AnalysisSpec;

use crate::ProjectStore;
use crate::error::StoreError;

impl ProjectStore {
    /// Append an analysis spec to the log. The spec's dataset name is
    /// resolved to an id best-effort at write time — NULL when the dataset
    /// does not (yet or anymore) exist, never blocking the write.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the INSERT fails.
    pub async fn save_analysis(&self, spec: &AnalysisSpec) -> Result<(), StoreError> {
        let dataset_id = self.dataset_id(&spec.dataset).await?;
        let payload =
            serde_json::to_string(spec).map_err(|e| StoreError::Payload(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        self.conn()
            .execute(
                "INSERT INTO analyses (dataset_id, spec_payload, created_at) VALUES (?1, ?2, ?3)",
                libsql::params![dataset_id, payload.as_str(), now.as_str()],
            )
            .await?;
        tracing::debug!(
            analysis = spec.analysis.as_str(),
            dataset = spec.dataset.as_str(),
            "analysis spec appended"
        );
        Ok(())
    }

    /// Every stored spec, in insertion order.
    ///
    /// A stored spec whose analysis key is no longer registered surfaces as
    /// an `UnknownAnalysis` error (via `AnalysisSpec::from_json`) rather
    /// than being silently skipped.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or a payload is corrupt.
    pub async fn list_analyses(&self) -> Result<Vec<AnalysisSpec>, StoreError> {
        let mut rows = self
            .conn()
            .query("SELECT spec_payload FROM analyses ORDER BY id", ())
            .await?;
        let mut specs = Vec::new();
        while let Some(row) = rows.next().await? {
            let payload = row.get::<String>(0)?;
            specs.push(AnalysisSpec::from_json(&payload)?);
        }
        Ok(specs)
    }
}
