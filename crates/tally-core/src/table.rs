//! In-memory tabular dataset model.
//!
//! A `TabularData` is a named, immutable-shape, row-oriented dataset. The
//! column schema is an ordered name list fixed at construction; rows are
//! fixed-arity value vectors indexed by column position, with name-based
//! access going through the schema. There is no in-place column add/remove
//! after construction.

use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::errors::CoreError;
use crate::value::Value;

/// A named dataset: ordered column schema plus positional row storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularData {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl TabularData {
    /// Build a dataset from an explicit schema and positional rows.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::RowArity`] if any row's length differs from the
    /// column count.
    pub fn new(
        name: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self, CoreError> {
        for (index, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(CoreError::RowArity {
                    index,
                    got: row.len(),
                    expected: columns.len(),
                });
            }
        }
        Ok(Self {
            name: name.into(),
            columns,
            rows,
        })
    }

    /// Build a dataset from ordered name→value records (e.g., parsed row
    /// payloads). The column order is taken from the first record; every
    /// other record must carry the identical ordered column set.
    ///
    /// An empty record set yields an empty dataset with no columns.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MismatchedColumns`] on schema drift between
    /// records, or [`CoreError::InvalidCell`] if a cell is not a scalar.
    pub fn from_records(
        name: impl Into<String>,
        records: &[Map<String, serde_json::Value>],
    ) -> Result<Self, CoreError> {
        let Some(first) = records.first() else {
            return Ok(Self {
                name: name.into(),
                columns: Vec::new(),
                rows: Vec::new(),
            });
        };
        let columns: Vec<String> = first.keys().cloned().collect();

        let mut rows = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            if record.len() != columns.len() || !record.keys().eq(columns.iter()) {
                return Err(CoreError::MismatchedColumns { index });
            }
            let mut row = Vec::with_capacity(columns.len());
            for (column, cell) in record {
                let value: Value = serde_json::from_value(cell.clone()).map_err(|_| {
                    CoreError::InvalidCell {
                        index,
                        column: column.clone(),
                    }
                })?;
                row.push(value);
            }
            rows.push(row);
        }
        Ok(Self {
            name: name.into(),
            columns,
            rows,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `(row count, column count)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Extract a column by name, in row order.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ColumnNotFound`] for an unknown name.
    pub fn column(&self, name: &str) -> Result<Vec<Value>, CoreError> {
        let idx = self
            .columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| CoreError::ColumnNotFound {
                dataset: self.name.clone(),
                column: name.to_string(),
            })?;
        Ok(self.rows.iter().map(|row| row[idx].clone()).collect())
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[Value]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Ordered name→value records, one per row, for persistence. The map
    /// iteration order matches the column schema order.
    #[must_use]
    pub fn records(&self) -> Vec<Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                let mut record = Map::new();
                for (column, value) in self.columns.iter().zip(row) {
                    // Value serialization to JSON cannot fail.
                    record.insert(
                        column.clone(),
                        serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
                    );
                }
                record
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> TabularData {
        TabularData::new(
            "heights",
            vec!["height".to_string(), "group".to_string()],
            vec![
                vec![Value::Float(1.7), Value::from("a")],
                vec![Value::Float(1.8), Value::from("b")],
                vec![Value::Null, Value::from("a")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn shape_and_columns() {
        let t = sample();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.column_names(), &["height", "group"]);
    }

    #[test]
    fn column_extraction_preserves_order_and_nulls() {
        let t = sample();
        let col = t.column("height").unwrap();
        assert_eq!(
            col,
            vec![Value::Float(1.7), Value::Float(1.8), Value::Null]
        );
        assert!(matches!(
            t.column("weight"),
            Err(CoreError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = TabularData::new(
            "bad",
            vec!["a".to_string()],
            vec![vec![Value::Int(1), Value::Int(2)]],
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::RowArity { index: 0, .. }));
    }

    #[test]
    fn records_round_trip() {
        let t = sample();
        let records = t.records();
        let back = TabularData::from_records("heights", &records).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn from_records_rejects_schema_drift() {
        let t = sample();
        let mut records = t.records();
        records[1].remove("group");
        let err = TabularData::from_records("heights", &records).unwrap_err();
        assert!(matches!(err, CoreError::MismatchedColumns { index: 1 }));
    }

    #[test]
    fn empty_record_set_yields_empty_table() {
        let t = TabularData::from_records("empty", &[]).unwrap();
        assert_eq!(t.shape(), (0, 0));
        assert!(t.is_empty());
    }
}
