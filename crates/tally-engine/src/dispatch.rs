//! Analysis dispatch: maps an [`AnalysisKind`] plus spec inputs onto the
//! matching engine function.
//!
//! Input resolution follows the spec contract: an input value that names an
//! existing column of the target dataset is replaced by that column's
//! extracted values; every other value passes through as a literal. That
//! lets a literal 2×2 table be embedded directly in `inputs` for Fisher's
//! test, and lets OLS take a list of predictor column names.
//!
//! The match is exhaustive — adding an `AnalysisKind` variant forces a new
//! arm here without touching any caller.

use serde_json::{Map, Value as Json};

use tally_core::{AnalysisKind, TabularData, Value};

use crate::error::EngineError;
use crate::{descriptive, nonparametric, regression};

/// Run one analysis against a dataset, with spec-style `inputs` and
/// `options`, returning the result as a JSON document.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] for missing roles, unknown columns
/// referenced as literals of the wrong shape, or non-numeric values where a
/// numeric sample is required, plus whatever the underlying analysis
/// reports.
pub fn run_analysis(
    kind: AnalysisKind,
    inputs: &Map<String, Json>,
    options: &Map<String, Json>,
    table: &TabularData,
) -> Result<Json, EngineError> {
    match kind {
        AnalysisKind::Describe => {
            let data = numeric_lenient(&resolve(inputs, "data", table)?)?;
            to_json(&descriptive::describe(&data))
        }
        AnalysisKind::FrequencyTable => {
            let data = cell_values(&resolve(inputs, "data", table)?)?;
            to_json(&descriptive::frequency_table(&data))
        }
        AnalysisKind::MannWhitneyU => {
            let x = numeric_strict(&resolve(inputs, "x", table)?, "x")?;
            let y = numeric_strict(&resolve(inputs, "y", table)?, "y")?;
            to_json(&nonparametric::mann_whitney_u(&x, &y)?)
        }
        AnalysisKind::WilcoxonSignedRank => {
            let x = numeric_strict(&resolve(inputs, "x", table)?, "x")?;
            let y = numeric_strict(&resolve(inputs, "y", table)?, "y")?;
            to_json(&nonparametric::wilcoxon_signed_rank(&x, &y)?)
        }
        AnalysisKind::FisherExact2x2 => {
            let table_2x2 = contingency_2x2(&resolve(inputs, "table", table)?)?;
            to_json(&nonparametric::fisher_exact_2x2(&table_2x2))
        }
        AnalysisKind::SimpleLinearRegression => {
            let x = numeric_strict(&resolve(inputs, "x", table)?, "x")?;
            let y = numeric_strict(&resolve(inputs, "y", table)?, "y")?;
            to_json(&regression::simple_linear_regression(&x, &y)?)
        }
        AnalysisKind::Ols => {
            let x = predictor_rows(require(inputs, "x")?, table)?;
            let y = numeric_strict(&resolve(inputs, "y", table)?, "y")?;
            let add_intercept = match options.get("add_intercept") {
                None => true,
                Some(Json::Bool(b)) => *b,
                Some(other) => {
                    return Err(EngineError::Validation(format!(
                        "Option 'add_intercept' must be a boolean, got {other}"
                    )));
                }
            };
            to_json(&regression::ols(&x, &y, add_intercept)?)
        }
    }
}

/// A resolved input role: a dataset column or a pass-through literal.
enum Resolved {
    Column(Vec<Value>),
    Literal(Json),
}

fn require<'a>(inputs: &'a Map<String, Json>, role: &str) -> Result<&'a Json, EngineError> {
    inputs
        .get(role)
        .ok_or_else(|| EngineError::Validation(format!("Missing required input '{role}'")))
}

fn resolve(
    inputs: &Map<String, Json>,
    role: &str,
    table: &TabularData,
) -> Result<Resolved, EngineError> {
    let raw = require(inputs, role)?;
    if let Json::String(name) = raw {
        if table.has_column(name) {
            // Column extraction on a known name cannot fail.
            let column = table
                .column(name)
                .map_err(|e| EngineError::Validation(e.to_string()))?;
            return Ok(Resolved::Column(column));
        }
    }
    Ok(Resolved::Literal(raw.clone()))
}

/// Numeric sample where absence is tolerated: nulls, non-numeric cells, and
/// non-finite numbers come through as `None` for `describe` to bucket as
/// missing.
fn numeric_lenient(resolved: &Resolved) -> Result<Vec<Option<f64>>, EngineError> {
    match resolved {
        Resolved::Column(values) => Ok(values.iter().map(Value::as_f64).collect()),
        Resolved::Literal(Json::Array(items)) => {
            Ok(items.iter().map(serde_json::Value::as_f64).collect())
        }
        Resolved::Literal(other) => Err(EngineError::Validation(format!(
            "Expected a column name or an array of numbers, got {other}"
        ))),
    }
}

/// Numeric sample where every entry must be a finite number — rank tests
/// and regression fail closed on missing or non-numeric cells.
fn numeric_strict(resolved: &Resolved, role: &str) -> Result<Vec<f64>, EngineError> {
    numeric_lenient(resolved)?
        .into_iter()
        .map(|v| {
            v.filter(|x| x.is_finite()).ok_or_else(|| {
                EngineError::Validation(format!(
                    "Input '{role}' contains missing or non-numeric values"
                ))
            })
        })
        .collect()
}

/// Raw cell values for frequency bucketing; a literal array is converted
/// cell by cell.
fn cell_values(resolved: &Resolved) -> Result<Vec<Value>, EngineError> {
    match resolved {
        Resolved::Column(values) => Ok(values.clone()),
        Resolved::Literal(Json::Array(items)) => items
            .iter()
            .map(|item| {
                serde_json::from_value(item.clone()).map_err(|_| {
                    EngineError::Validation(format!("Cell is not a scalar value: {item}"))
                })
            })
            .collect(),
        Resolved::Literal(other) => Err(EngineError::Validation(format!(
            "Expected a column name or an array of values, got {other}"
        ))),
    }
}

/// A literal 2×2 nonnegative-integer contingency table.
fn contingency_2x2(resolved: &Resolved) -> Result<[[u64; 2]; 2], EngineError> {
    let Resolved::Literal(json) = resolved else {
        return Err(EngineError::Validation(
            "Fisher's test takes a literal 2x2 table, not a column".to_string(),
        ));
    };
    let bad = || EngineError::Validation("Table must be 2x2 nonnegative integers".to_string());

    let rows = json.as_array().ok_or_else(bad)?;
    if rows.len() != 2 {
        return Err(bad());
    }
    let mut out = [[0_u64; 2]; 2];
    for (i, row) in rows.iter().enumerate() {
        let cells = row.as_array().ok_or_else(bad)?;
        if cells.len() != 2 {
            return Err(bad());
        }
        for (j, cell) in cells.iter().enumerate() {
            out[i][j] = cell.as_u64().ok_or_else(bad)?;
        }
    }
    Ok(out)
}

/// Predictor rows for OLS: either a list of column names (each resolved to
/// a column, then re-assembled row-wise) or a literal array of numeric rows.
fn predictor_rows(raw: &Json, table: &TabularData) -> Result<Vec<Vec<f64>>, EngineError> {
    match raw {
        // A single column name behaves as one-predictor OLS.
        Json::String(name) if table.has_column(name) => {
            let values = numeric_strict(
                &Resolved::Column(
                    table
                        .column(name)
                        .map_err(|e| EngineError::Validation(e.to_string()))?,
                ),
                name,
            )?;
            Ok(values.into_iter().map(|v| vec![v]).collect())
        }
        Json::Array(items) if items.iter().all(Json::is_string) => {
            let mut columns = Vec::with_capacity(items.len());
            for item in items {
                let name = item.as_str().unwrap_or_default();
                if !table.has_column(name) {
                    return Err(EngineError::Validation(format!(
                        "Predictor column '{name}' not found"
                    )));
                }
                let column = table
                    .column(name)
                    .map_err(|e| EngineError::Validation(e.to_string()))?;
                columns.push(numeric_strict(&Resolved::Column(column), name)?);
            }
            let n_rows = columns.first().map_or(0, Vec::len);
            Ok((0..n_rows)
                .map(|i| columns.iter().map(|col| col[i]).collect())
                .collect())
        }
        Json::Array(items) => items
            .iter()
            .map(|row| {
                row.as_array()
                    .ok_or_else(|| {
                        EngineError::Validation(
                            "Predictor rows must be arrays of numbers".to_string(),
                        )
                    })?
                    .iter()
                    .map(|cell| {
                        cell.as_f64().ok_or_else(|| {
                            EngineError::Validation(format!("Predictor cell is not numeric: {cell}"))
                        })
                    })
                    .collect()
            })
            .collect(),
        other => Err(EngineError::Validation(format!(
            "Input 'x' must be column names or numeric rows, got {other}"
        ))),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Json, EngineError> {
    serde_json::to_value(value)
        .map_err(|e| EngineError::Validation(format!("Result serialization failed: {e}")))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn table() -> TabularData {
        TabularData::new(
            "demo",
            vec!["x".to_string(), "y".to_string(), "group".to_string()],
            vec![
                vec![Value::Float(1.0), Value::Float(5.0), Value::from("a")],
                vec![Value::Float(2.0), Value::Float(8.0), Value::from("b")],
                vec![Value::Float(3.0), Value::Float(11.0), Value::from("a")],
                vec![Value::Float(4.0), Value::Float(14.0), Value::from("b")],
            ],
        )
        .unwrap()
    }

    fn inputs(pairs: &[(&str, Json)]) -> Map<String, Json> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn describe_resolves_column_by_name() {
        let result = run_analysis(
            AnalysisKind::Describe,
            &inputs(&[("data", json!("x"))]),
            &Map::new(),
            &table(),
        )
        .unwrap();
        assert_eq!(result["n"], 4);
        assert_eq!(result["mean"], 2.5);
    }

    #[test]
    fn describe_accepts_literal_array() {
        let result = run_analysis(
            AnalysisKind::Describe,
            &inputs(&[("data", json!([1.0, 2.0, null, 3.0]))]),
            &Map::new(),
            &table(),
        )
        .unwrap();
        assert_eq!(result["n"], 4);
        assert_eq!(result["missing"], 1);
    }

    #[test]
    fn frequency_table_on_categorical_column() {
        let result = run_analysis(
            AnalysisKind::FrequencyTable,
            &inputs(&[("data", json!("group"))]),
            &Map::new(),
            &table(),
        )
        .unwrap();
        assert_eq!(result[0]["value"], "a");
        assert_eq!(result[0]["count"], 2);
    }

    #[test]
    fn fisher_takes_embedded_literal_table() {
        let result = run_analysis(
            AnalysisKind::FisherExact2x2,
            &inputs(&[("table", json!([[3, 1], [1, 3]]))]),
            &Map::new(),
            &table(),
        )
        .unwrap();
        let p = result["p_value"].as_f64().unwrap();
        assert!((p - 34.0 / 70.0).abs() < 1e-9);
    }

    #[test]
    fn fisher_rejects_malformed_table() {
        let err = run_analysis(
            AnalysisKind::FisherExact2x2,
            &inputs(&[("table", json!([[3, 1, 2], [1, 3, 4]]))]),
            &Map::new(),
            &table(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn ols_resolves_column_name_list() {
        let result = run_analysis(
            AnalysisKind::Ols,
            &inputs(&[("x", json!(["x"])), ("y", json!("y"))]),
            &Map::new(),
            &table(),
        )
        .unwrap();
        let coeffs = result["coefficients"].as_array().unwrap();
        assert!((coeffs[0].as_f64().unwrap() - 2.0).abs() < 1e-9);
        assert!((coeffs[1].as_f64().unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn ols_honors_add_intercept_option() {
        let mut options = Map::new();
        options.insert("add_intercept".to_string(), json!(false));
        let result = run_analysis(
            AnalysisKind::Ols,
            &inputs(&[("x", json!(["x"])), ("y", json!("y"))]),
            &options,
            &table(),
        )
        .unwrap();
        assert_eq!(result["coefficients"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn missing_role_fails_closed() {
        let err = run_analysis(
            AnalysisKind::MannWhitneyU,
            &inputs(&[("x", json!("x"))]),
            &Map::new(),
            &table(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn strict_roles_reject_non_numeric_columns() {
        let err = run_analysis(
            AnalysisKind::MannWhitneyU,
            &inputs(&[("x", json!("group")), ("y", json!("y"))]),
            &Map::new(),
            &table(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }
}
