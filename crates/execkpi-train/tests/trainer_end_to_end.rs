use execkpi_core::FeatureTable;
use execkpi_train::{select_best, train, TrainOpts};
use serde_json::{json, Value};

const TARGET: &str = "will_convert_14d";

/// Separable synthetic table with the raw-cell shapes the upstream source
/// actually produces: numbers, stringified numbers, boxed scalars.
fn synthetic_table(rows: usize) -> FeatureTable {
    let columns = vec![
        "user_id".to_string(),
        "x0".to_string(),
        "x1".to_string(),
        TARGET.to_string(),
    ];
    let data: Vec<Vec<Value>> = (0..rows)
        .map(|i| {
            let label = (i % 2) as f64;
            let x0 = label * 2.0 + i as f64 * 0.01;
            let x1 = (i % 7) as f64;
            let x1_cell = match i % 3 {
                0 => json!(x1),
                1 => json!(x1.to_string()),
                _ => json!(format!("[{}]", x1)),
            };
            vec![json!(format!("u-{}", i)), json!(x0), x1_cell, json!(label)]
        })
        .collect();
    FeatureTable::new("features_conversion", columns, data).expect("table")
}

#[test]
fn trains_selects_and_packages() {
    let table = synthetic_table(60);
    let outcome = train(&table, TARGET, &TrainOpts::default()).expect("train");

    let names: Vec<&str> = outcome.bundle.metrics.candidates.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["gradient_boosting", "logistic_regression", "random_forest"]);

    // The winner's summary mirrors its candidate entry.
    let chosen = &outcome.bundle.metrics.chosen;
    assert_eq!(chosen.name, outcome.chosen);
    let entry = &outcome.bundle.metrics.candidates[&outcome.chosen];
    assert_eq!(entry.auc, chosen.auc);
    assert_eq!(entry.accuracy, chosen.accuracy);
    assert_eq!(entry.rows, 60);
    assert_eq!(entry.target, TARGET);
    assert_eq!(entry.feature_table, "features_conversion");

    // Every candidate separates this table cleanly.
    for result in outcome.bundle.metrics.candidates.values() {
        assert!(result.auc > 0.9, "auc = {}", result.auc);
    }

    // Winner has the best (auc, accuracy) pair of the roster.
    for result in outcome.bundle.metrics.candidates.values() {
        assert!(
            result.auc < chosen.auc
                || (result.auc == chosen.auc && result.accuracy <= chosen.accuracy)
        );
    }

    assert_eq!(outcome.bundle.feature_columns, vec!["x0", "x1"]);
    assert_eq!(outcome.coercion.fallbacks, 0);

    // Tree winners carry a ranking; a linear winner carries none.
    assert_eq!(
        outcome.bundle.importance.is_some(),
        outcome.bundle.model.is_tree_based()
    );

    assert_eq!(outcome.provenance.feature_table, "features_conversion");
    assert_eq!(outcome.provenance.seed, 42);
    assert!(!outcome.provenance.input_hash.is_empty());
}

#[test]
fn trainer_winner_agrees_with_the_selection_scan() {
    let table = synthetic_table(60);
    let outcome = train(&table, TARGET, &TrainOpts::default()).expect("train");

    let (expected, _, _) = select_best(
        outcome
            .bundle
            .metrics
            .candidates
            .iter()
            .map(|(name, result)| (name.as_str(), result.auc, result.accuracy)),
    )
    .expect("at least one candidate scored");
    assert_eq!(outcome.chosen, expected);
}

#[test]
fn same_seed_reproduces_the_bundle() {
    let table = synthetic_table(60);
    let first = train(&table, TARGET, &TrainOpts::default()).expect("train");
    let second = train(&table, TARGET, &TrainOpts::default()).expect("train");
    assert_eq!(first.bundle, second.bundle);
    assert_eq!(first.chosen, second.chosen);
}

#[test]
fn metrics_serialize_flat_with_chosen_key() {
    let table = synthetic_table(60);
    let outcome = train(&table, TARGET, &TrainOpts::default()).expect("train");
    let json = serde_json::to_value(&outcome.bundle.metrics).expect("serialize");
    assert!(json.get("logistic_regression").is_some());
    assert!(json.get("random_forest").is_some());
    assert!(json.get("gradient_boosting").is_some());
    assert_eq!(json["_chosen"]["name"], outcome.chosen);
}

#[test]
fn missing_target_is_a_schema_error() {
    let table = synthetic_table(20);
    let err = train(&table, "nonexistent", &TrainOpts::default()).expect_err("must fail");
    assert_eq!(err.info().code, "missing-target");
}

#[test]
fn empty_table_is_a_schema_error() {
    let table = FeatureTable::new(
        "features_conversion",
        vec!["user_id".to_string(), "x0".to_string(), TARGET.to_string()],
        Vec::new(),
    )
    .expect("table");
    let err = train(&table, TARGET, &TrainOpts::default()).expect_err("must fail");
    assert_eq!(err.info().code, "empty-table");
}

#[test]
fn identifier_and_target_only_is_a_schema_error() {
    let table = FeatureTable::new(
        "features_conversion",
        vec!["user_id".to_string(), TARGET.to_string()],
        vec![vec![json!("u-0"), json!(1)]],
    )
    .expect("table");
    let err = train(&table, TARGET, &TrainOpts::default()).expect_err("must fail");
    assert_eq!(err.info().code, "no-feature-columns");
}

#[test]
fn non_binary_target_is_a_schema_error() {
    let table = FeatureTable::new(
        "features_conversion",
        vec!["user_id".to_string(), "x0".to_string(), TARGET.to_string()],
        vec![
            vec![json!("u-0"), json!(1.0), json!(0)],
            vec![json!("u-1"), json!(2.0), json!(2)],
        ],
    )
    .expect("table");
    let err = train(&table, TARGET, &TrainOpts::default()).expect_err("must fail");
    assert_eq!(err.info().code, "non-binary-target");
    assert_eq!(err.info().context["row"], "1");
}

#[test]
fn single_class_target_fails_training() {
    let columns = vec!["user_id".to_string(), "x0".to_string(), TARGET.to_string()];
    let rows: Vec<Vec<Value>> = (0..20)
        .map(|i| vec![json!(format!("u-{}", i)), json!(i as f64), json!(1)])
        .collect();
    let table = FeatureTable::new("features_conversion", columns, rows).expect("table");
    let err = train(&table, TARGET, &TrainOpts::default()).expect_err("must fail");
    assert_eq!(err.info().code, "no-candidates");
}
