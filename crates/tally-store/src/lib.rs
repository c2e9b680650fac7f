//! # tally-store
//!
//! libSQL persistence for tally projects: named datasets stored as ordered
//! row payloads, plus an append-only log of analysis specs keyed to the
//! dataset that produced them. Only the *spec* is durable, never the
//! result — replay always recomputes.
//!
//! Uses the `libsql` crate (embedded `SQLite` fork) with an
//! `include_str!` migration applied on open.

pub mod error;
pub mod helpers;
mod migrations;
pub mod replay;
pub mod repos;

use error::StoreError;
use libsql::Builder;

/// Durable store for one project file.
///
/// Wraps a libSQL database and connection. Every save operation runs as a
/// single transaction, so readers never observe a dataset mid-replacement.
pub struct ProjectStore {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl ProjectStore {
    /// Open a local project store at the given path (`":memory:"` for
    /// tests). Runs migrations automatically.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the database cannot be opened or migrations
    /// fail.
    pub async fn open_local(path: &str) -> Result<Self, StoreError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| StoreError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let store = Self { db, conn };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}
