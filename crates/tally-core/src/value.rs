//! Scalar cell values.
//!
//! A `Value` is one cell of a tabular dataset. The untagged serde
//! representation keeps payload round-trips lossless: integers stay
//! integers, floats stay floats, strings stay strings, null stays null.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One scalar cell of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Value {
    /// Missing / absent value. Serializes as JSON null.
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Numeric view of the cell. `Int` widens to `f64`; `Text` and `Null`
    /// have no numeric reading.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Null | Self::Text(_) => None,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Display label used for frequency bucketing. Absence maps to the
    /// literal `"Missing"` bucket.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Null => "Missing".to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn json_round_trip_preserves_types() {
        let cells = vec![
            Value::Int(42),
            Value::Float(2.5),
            Value::Text("abc".to_string()),
            Value::Null,
        ];
        let json = serde_json::to_string(&cells).unwrap();
        assert_eq!(json, r#"[42,2.5,"abc",null]"#);
        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cells);
    }

    #[test]
    fn integral_float_stays_float() {
        // 2.0 must not collapse into Int(2) through a round-trip.
        let json = serde_json::to_string(&Value::Float(2.0)).unwrap();
        assert_eq!(json, "2.0");
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Value::Float(2.0));
    }

    #[test]
    fn as_f64_views() {
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::Float(1.5).as_f64(), Some(1.5));
        assert_eq!(Value::Null.as_f64(), None);
        assert_eq!(Value::from("x").as_f64(), None);
    }

    #[test]
    fn null_labels_as_missing() {
        assert_eq!(Value::Null.label(), "Missing");
        assert_eq!(Value::Int(7).label(), "7");
    }
}
