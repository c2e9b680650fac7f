//! Schema migration runner.
//!
//! Embeds the SQL migration file at compile time and executes it on store
//! open. All statements use `IF NOT EXISTS` for idempotent re-running.

use crate::ProjectStore;
use crate::error::StoreError;

/// Initial schema: datasets, rows, and the append-only analysis log.
const MIGRATION_001: &str = include_str!("../migrations/001_initial.sql");

impl ProjectStore {
    /// Run all embedded migrations in sequence.
    pub(crate) async fn run_migrations(&self) -> Result<(), StoreError> {
        self.conn()
            .execute_batch(MIGRATION_001)
            .await
            .map_err(|e| StoreError::Migration(format!("001_initial: {e}")))?;
        Ok(())
    }
}
