//! Row parsing helpers.

use chrono::{DateTime, Utc};

use crate::error::StoreError;

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s
/// default format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `StoreError::Query` if the string parses as neither format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| StoreError::Query(format!("Failed to parse datetime '{s}': {e}")))
}
