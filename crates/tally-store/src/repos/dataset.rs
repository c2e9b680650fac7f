//! Dataset repository: transactional save/load/list/delete of named
//! datasets as ordered row payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Map;

use tally_core::TabularData;

use crate::ProjectStore;
use crate::error::StoreError;
use crate::helpers::parse_datetime;

/// Metadata of one stored dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMeta {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectStore {
    /// Save a dataset, upserting by name. An existing dataset's row set is
    /// fully replaced and `updated_at` bumped; a new one gets
    /// `created_at = updated_at`. The metadata update and row replacement
    /// commit as one transaction, so no reader ever sees a refreshed
    /// timestamp with stale or partial rows.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if any statement fails; the transaction rolls
    /// back and prior state stays intact.
    pub async fn save_dataset(&self, table: &TabularData) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn().transaction().await?;

        let mut existing = tx
            .query(
                "SELECT id FROM datasets WHERE name = ?1",
                [table.name()],
            )
            .await?;
        let dataset_id: i64 = match existing.next().await? {
            Some(row) => {
                let id = row.get::<i64>(0)?;
                tx.execute(
                    "UPDATE datasets SET updated_at = ?1 WHERE id = ?2",
                    libsql::params![now.as_str(), id],
                )
                .await?;
                tx.execute("DELETE FROM rows WHERE dataset_id = ?1", [id])
                    .await?;
                id
            }
            None => {
                tx.execute(
                    "INSERT INTO datasets (name, created_at, updated_at) VALUES (?1, ?2, ?3)",
                    libsql::params![table.name(), now.as_str(), now.as_str()],
                )
                .await?;
                tx.last_insert_rowid()
            }
        };

        for (idx, record) in table.records().iter().enumerate() {
            let payload = serde_json::to_string(record)
                .map_err(|e| StoreError::Payload(e.to_string()))?;
            #[allow(clippy::cast_possible_wrap)]
            tx.execute(
                "INSERT INTO rows (dataset_id, row_idx, payload) VALUES (?1, ?2, ?3)",
                libsql::params![dataset_id, idx as i64, payload.as_str()],
            )
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(
            dataset = table.name(),
            rows = table.len(),
            "dataset saved"
        );
        Ok(())
    }

    /// Load a dataset by name, reconstructing rows in saved order with the
    /// column order taken from the first row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DatasetNotFound`] for an unknown name and
    /// [`StoreError::Payload`] if a stored row fails to parse.
    pub async fn load_dataset(&self, name: &str) -> Result<TabularData, StoreError> {
        let dataset_id = self
            .dataset_id(name)
            .await?
            .ok_or_else(|| StoreError::DatasetNotFound(name.to_string()))?;

        let mut rows = self
            .conn()
            .query(
                "SELECT payload FROM rows WHERE dataset_id = ?1 ORDER BY row_idx",
                [dataset_id],
            )
            .await?;

        let mut records: Vec<Map<String, serde_json::Value>> = Vec::new();
        while let Some(row) = rows.next().await? {
            let payload = row.get::<String>(0)?;
            let record = serde_json::from_str(&payload)
                .map_err(|e| StoreError::Payload(format!("row payload: {e}")))?;
            records.push(record);
        }

        Ok(TabularData::from_records(name, &records)?)
    }

    /// All dataset names, lexicographically ordered.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails.
    pub async fn list_datasets(&self) -> Result<Vec<String>, StoreError> {
        let mut rows = self
            .conn()
            .query("SELECT name FROM datasets ORDER BY name", ())
            .await?;
        let mut names = Vec::new();
        while let Some(row) = rows.next().await? {
            names.push(row.get::<String>(0)?);
        }
        Ok(names)
    }

    /// Metadata for one dataset.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DatasetNotFound`] for an unknown name.
    pub async fn dataset_meta(&self, name: &str) -> Result<DatasetMeta, StoreError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, name, created_at, updated_at FROM datasets WHERE name = ?1",
                [name],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(DatasetMeta {
                id: row.get::<i64>(0)?,
                name: row.get::<String>(1)?,
                created_at: parse_datetime(&row.get::<String>(2)?)?,
                updated_at: parse_datetime(&row.get::<String>(3)?)?,
            }),
            None => Err(StoreError::DatasetNotFound(name.to_string())),
        }
    }

    /// Delete a dataset and its rows. Analysis records referencing it are
    /// orphaned (their `dataset_id` goes NULL), never deleted — the
    /// provenance log is append-only.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DatasetNotFound`] for an unknown name.
    pub async fn delete_dataset(&self, name: &str) -> Result<(), StoreError> {
        let dataset_id = self
            .dataset_id(name)
            .await?
            .ok_or_else(|| StoreError::DatasetNotFound(name.to_string()))?;

        let tx = self.conn().transaction().await?;
        tx.execute("DELETE FROM rows WHERE dataset_id = ?1", [dataset_id])
            .await?;
        tx.execute("DELETE FROM datasets WHERE id = ?1", [dataset_id])
            .await?;
        tx.commit().await?;
        tracing::debug!(dataset = name, "dataset deleted");
        Ok(())
    }

    /// Find the id of a dataset by name, if it exists.
    pub(crate) async fn dataset_id(&self, name: &str) -> Result<Option<i64>, StoreError> {
        let mut rows = self
            .conn()
            .query("SELECT id FROM datasets WHERE name = ?1", [name])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row.get::<i64>(0)?)),
            None => Ok(None),
        }
    }
}
