//! Store + replay integration tests:
//! - dataset round-trip (row order, column order, values, nulls)
//! - upsert-by-name idempotence (only `updated_at` moves)
//! - append-only analysis log and orphaned specs
//! - replay determinism and fail-closed behavior

use pretty_assertions::assert_eq;
use serde_json::{Map, json};
use tempfile::TempDir;

use tally_core::{AnalysisSpec, TabularData, Value};
use tally_store::error::StoreError;
use tally_store::replay::{ReplayError, run_spec, run_spec_json};
use tally_store::ProjectStore;

async fn test_store() -> ProjectStore {
    ProjectStore::open_local(":memory:").await.unwrap()
}

fn sample_table() -> TabularData {
    TabularData::new(
        "measurements",
        vec!["x".to_string(), "y".to_string(), "label".to_string()],
        vec![
            vec![Value::Float(1.0), Value::Float(5.0), Value::from("a")],
            vec![Value::Int(2), Value::Float(8.0), Value::Null],
            vec![Value::Float(3.0), Value::Float(11.0), Value::from("b")],
            vec![Value::Float(4.0), Value::Float(14.0), Value::from("a")],
        ],
    )
    .unwrap()
}

fn describe_spec(dataset: &str, column: &str) -> AnalysisSpec {
    let mut inputs = Map::new();
    inputs.insert("data".to_string(), json!(column));
    AnalysisSpec::new("describe", dataset, inputs, Map::new()).unwrap()
}

// ---------------------------------------------------------------------------
// Dataset round-trip
// ---------------------------------------------------------------------------

#[tokio::test]
async fn save_load_round_trip() {
    let store = test_store().await;
    let table = sample_table();

    store.save_dataset(&table).await.unwrap();
    let loaded = store.load_dataset("measurements").await.unwrap();

    // Identical row order, column order, and values, including nulls.
    assert_eq!(loaded, table);
    assert_eq!(loaded.column_names(), &["x", "y", "label"]);
    assert_eq!(loaded.row(1).unwrap()[2], Value::Null);
    assert_eq!(loaded.row(1).unwrap()[0], Value::Int(2));
}

#[tokio::test]
async fn load_missing_dataset_fails() {
    let store = test_store().await;
    let err = store.load_dataset("nope").await.unwrap_err();
    assert!(matches!(err, StoreError::DatasetNotFound(name) if name == "nope"));
}

#[tokio::test]
async fn save_is_idempotent_upsert() {
    let store = test_store().await;
    let table = sample_table();

    store.save_dataset(&table).await.unwrap();
    let before = store.dataset_meta("measurements").await.unwrap();

    store.save_dataset(&table).await.unwrap();
    let after = store.dataset_meta("measurements").await.unwrap();

    assert_eq!(store.list_datasets().await.unwrap().len(), 1);
    assert_eq!(store.load_dataset("measurements").await.unwrap(), table);
    assert_eq!(before.id, after.id);
    assert_eq!(before.created_at, after.created_at);
    assert!(after.updated_at >= before.updated_at);
}

#[tokio::test]
async fn resave_replaces_rows_without_stale_leftovers() {
    let store = test_store().await;
    store.save_dataset(&sample_table()).await.unwrap();

    // Shrink the dataset; no stale rows may survive.
    let smaller = TabularData::new(
        "measurements",
        vec!["x".to_string()],
        vec![vec![Value::Float(9.0)]],
    )
    .unwrap();
    store.save_dataset(&smaller).await.unwrap();

    let loaded = store.load_dataset("measurements").await.unwrap();
    assert_eq!(loaded.shape(), (1, 1));
    assert_eq!(loaded, smaller);
}

#[tokio::test]
async fn list_datasets_is_lexicographic() {
    let store = test_store().await;
    for name in ["zeta", "alpha", "mid"] {
        let t = TabularData::new(name, vec!["v".to_string()], vec![vec![Value::Int(1)]]).unwrap();
        store.save_dataset(&t).await.unwrap();
    }
    assert_eq!(
        store.list_datasets().await.unwrap(),
        vec!["alpha", "mid", "zeta"]
    );
}

#[tokio::test]
async fn empty_dataset_round_trips() {
    let store = test_store().await;
    let empty = TabularData::new("empty", Vec::new(), Vec::new()).unwrap();
    store.save_dataset(&empty).await.unwrap();
    let loaded = store.load_dataset("empty").await.unwrap();
    assert!(loaded.is_empty());
}

#[tokio::test]
async fn on_disk_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("project.tally");
    let path = path.to_str().unwrap();

    {
        let store = ProjectStore::open_local(path).await.unwrap();
        store.save_dataset(&sample_table()).await.unwrap();
    }

    let store = ProjectStore::open_local(path).await.unwrap();
    assert_eq!(store.load_dataset("measurements").await.unwrap(), sample_table());
}

// ---------------------------------------------------------------------------
// Analysis log
// ---------------------------------------------------------------------------

#[tokio::test]
async fn analysis_log_appends_in_order() {
    let store = test_store().await;
    store.save_dataset(&sample_table()).await.unwrap();

    let first = describe_spec("measurements", "x");
    let second = describe_spec("measurements", "y");
    store.save_analysis(&first).await.unwrap();
    store.save_analysis(&second).await.unwrap();

    let listed = store.list_analyses().await.unwrap();
    assert_eq!(listed, vec![first, second]);
}

#[tokio::test]
async fn analysis_for_missing_dataset_stores_null_reference() {
    let store = test_store().await;
    let spec = describe_spec("ghost", "x");
    store.save_analysis(&spec).await.unwrap();

    let mut rows = store
        .conn()
        .query("SELECT dataset_id FROM analyses", ())
        .await
        .unwrap();
    let row = rows.next().await.unwrap().unwrap();
    assert_eq!(row.get::<Option<i64>>(0).unwrap(), None);

    // The spec still appears in the audit trail.
    assert_eq!(store.list_analyses().await.unwrap(), vec![spec]);
}

#[tokio::test]
async fn deleting_dataset_orphans_specs_but_keeps_them() {
    let store = test_store().await;
    store.save_dataset(&sample_table()).await.unwrap();
    let spec = describe_spec("measurements", "x");
    store.save_analysis(&spec).await.unwrap();

    store.delete_dataset("measurements").await.unwrap();

    assert_eq!(store.list_analyses().await.unwrap().len(), 1);
    let err = run_spec(&store, &spec).await.unwrap_err();
    assert!(matches!(
        err,
        ReplayError::Store(StoreError::DatasetNotFound(_))
    ));
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

#[tokio::test]
async fn replay_recomputes_identical_results() {
    let store = test_store().await;
    store.save_dataset(&sample_table()).await.unwrap();

    let spec = describe_spec("measurements", "x");
    store.save_analysis(&spec).await.unwrap();

    let first = run_spec(&store, &spec).await.unwrap();
    let second = run_spec(&store, &spec).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first["mean"], 2.5);
    assert_eq!(first["n"], 4);
}

#[tokio::test]
async fn replay_from_listed_spec_matches_original() {
    let store = test_store().await;
    store.save_dataset(&sample_table()).await.unwrap();

    let spec = describe_spec("measurements", "y");
    let original = run_spec(&store, &spec).await.unwrap();
    store.save_analysis(&spec).await.unwrap();

    let stored = &store.list_analyses().await.unwrap()[0];
    let replayed = run_spec(&store, stored).await.unwrap();
    assert_eq!(replayed, original);
}

#[tokio::test]
async fn replay_regression_spec_end_to_end() {
    let store = test_store().await;
    store.save_dataset(&sample_table()).await.unwrap();

    let mut inputs = Map::new();
    inputs.insert("x".to_string(), json!(["x"]));
    inputs.insert("y".to_string(), json!("y"));
    let spec = AnalysisSpec::new("ols", "measurements", inputs, Map::new()).unwrap();

    let result = run_spec(&store, &spec).await.unwrap();
    let coeffs = result["coefficients"].as_array().unwrap();
    // y = 2 + 3x exactly.
    assert!((coeffs[0].as_f64().unwrap() - 2.0).abs() < 1e-6);
    assert!((coeffs[1].as_f64().unwrap() - 3.0).abs() < 1e-6);
    assert!((result["r_squared"].as_f64().unwrap() - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn replay_json_fails_closed_on_unknown_analysis() {
    let store = test_store().await;
    store.save_dataset(&sample_table()).await.unwrap();

    let doc = r#"{"analysis":"ttest_ind","dataset":"measurements","inputs":{},"options":{},"seed":7,"version":"tally 0.1.0"}"#;
    let err = run_spec_json(&store, doc).await.unwrap_err();
    assert!(matches!(
        err,
        ReplayError::Core(tally_core::CoreError::UnknownAnalysis(_))
    ));
}

#[tokio::test]
async fn replay_json_with_embedded_fisher_table() {
    let store = test_store().await;
    store.save_dataset(&sample_table()).await.unwrap();

    let spec = AnalysisSpec::new(
        "fisher_exact_2x2",
        "measurements",
        {
            let mut inputs = Map::new();
            inputs.insert("table".to_string(), json!([[3, 1], [1, 3]]));
            inputs
        },
        Map::new(),
    )
    .unwrap();

    let doc = serde_json::to_string(&spec).unwrap();
    let result = run_spec_json(&store, &doc).await.unwrap();
    let p = result["p_value"].as_f64().unwrap();
    assert!((p - 34.0 / 70.0).abs() < 1e-9);
}
