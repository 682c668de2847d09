use std::fs;

use execkpi_core::errors::KpiError;
use execkpi_source::{resolve_feature_table, CsvFeatureSource, FeatureSource};
use serde_json::Value;
use tempfile::TempDir;

fn write_table(dir: &TempDir, name: &str, body: &str) {
    fs::write(dir.path().join(format!("{}.csv", name)), body).unwrap();
}

#[test]
fn fetch_parses_cells_by_shape() {
    let dir = TempDir::new().unwrap();
    write_table(
        &dir,
        "features_daily",
        "user_id,score,segment,note\n1,0.25,premium,\n2,-3,free,hello\n",
    );
    let source = CsvFeatureSource::new(dir.path());

    let table = source.fetch("features_daily").unwrap();
    assert_eq!(table.name, "features_daily");
    assert_eq!(table.columns, vec!["user_id", "score", "segment", "note"]);
    assert_eq!(table.rows.len(), 2);

    let first = &table.rows[0];
    assert_eq!(first[0], serde_json::json!(1.0));
    assert_eq!(first[1], serde_json::json!(0.25));
    assert_eq!(first[2], Value::String("premium".to_string()));
    assert_eq!(first[3], Value::Null);

    let second = &table.rows[1];
    assert_eq!(second[1], serde_json::json!(-3.0));
    assert_eq!(second[3], Value::String("hello".to_string()));
}

#[test]
fn fetch_missing_table_is_source_not_found() {
    let dir = TempDir::new().unwrap();
    let source = CsvFeatureSource::new(dir.path());

    let err = source.fetch("absent").unwrap_err();
    match err {
        KpiError::Source(info) => {
            assert_eq!(info.code, "table-not-found");
            assert_eq!(info.context.get("table").map(String::as_str), Some("absent"));
        }
        other => panic!("unexpected error family: {:?}", other),
    }
}

#[test]
fn resolve_skips_missing_and_empty_candidates() {
    let dir = TempDir::new().unwrap();
    write_table(&dir, "features_v2", "user_id,score\n");
    write_table(&dir, "features_v1", "user_id,score\n1,0.5\n");
    let source = CsvFeatureSource::new(dir.path());

    let candidates = vec![
        "features_v3".to_string(),
        "features_v2".to_string(),
        "features_v1".to_string(),
    ];
    let table = resolve_feature_table(&source, &candidates).unwrap();
    assert_eq!(table.name, "features_v1");
    assert_eq!(table.rows.len(), 1);
}

#[test]
fn resolve_exhausted_reports_every_probed_name() {
    let dir = TempDir::new().unwrap();
    write_table(&dir, "features_empty", "user_id,score\n");
    let source = CsvFeatureSource::new(dir.path());

    let candidates = vec!["features_empty".to_string(), "features_gone".to_string()];
    let err = resolve_feature_table(&source, &candidates).unwrap_err();
    match err {
        KpiError::Source(info) => {
            assert_eq!(info.code, "source-unavailable");
            assert_eq!(
                info.context.get("probed").map(String::as_str),
                Some("features_empty,features_gone")
            );
            assert!(info.hint.is_some());
        }
        other => panic!("unexpected error family: {:?}", other),
    }
}
