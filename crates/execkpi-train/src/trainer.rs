//! Fixed-roster training, scoring and selection.

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use execkpi_core::errors::{ErrorInfo, KpiError};
use execkpi_core::rng::derive_substream_seed;
use execkpi_core::{FeatureTable, RunProvenance, DEFAULT_ID_COLUMN};
use serde::{Deserialize, Serialize};

use crate::coerce::{coerce_cell, coerce_columns, CoercionReport};
use crate::explain::{explain, ExplainOpts, FeatureContribution};
use crate::hash::stable_hash_string;
use crate::metrics::{accuracy, roc_auc};
use crate::model::boost::GradientBoost;
use crate::model::forest::RandomForest;
use crate::model::logistic::LogisticRegression;
use crate::model::{Classifier, TrainedModel};
use crate::split::stratified_split;

// Substream identifiers under the master seed, fixed so reruns with the
// same seed reproduce every draw.
const SUBSTREAM_SPLIT: u64 = 0;
const SUBSTREAM_FOREST: u64 = 1;
const SUBSTREAM_BOOST: u64 = 2;
const SUBSTREAM_EXPLAIN: u64 = 3;

fn schema_error(code: &str, message: impl Into<String>, table: &str) -> KpiError {
    KpiError::Schema(ErrorInfo::new(code, message.into()).with_context("table", table))
}

fn default_id_column() -> String {
    DEFAULT_ID_COLUMN.to_string()
}

fn default_eval_fraction() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

/// Options controlling one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainOpts {
    /// Identifier column excluded from the feature set.
    #[serde(default = "default_id_column")]
    pub id_column: String,
    /// Fraction of rows held out for scoring.
    #[serde(default = "default_eval_fraction")]
    pub eval_fraction: f64,
    /// Master deterministic seed for all randomness in the run.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Attribution sampling knobs.
    #[serde(default)]
    pub explain: ExplainOpts,
}

impl Default for TrainOpts {
    fn default() -> Self {
        Self {
            id_column: default_id_column(),
            eval_fraction: default_eval_fraction(),
            seed: default_seed(),
            explain: ExplainOpts::default(),
        }
    }
}

/// Scores and provenance metadata for one trained candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    /// Area under the ROC curve on the eval partition.
    pub auc: f64,
    /// Accuracy at the 0.5 threshold on the eval partition.
    pub accuracy: f64,
    /// Total rows in the source table.
    pub rows: u64,
    /// Target column the candidate was trained against.
    pub target: String,
    /// Fully qualified source table name.
    pub feature_table: String,
}

/// Synthetic summary entry recording the winning candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChosenSummary {
    /// Winning candidate name.
    pub name: String,
    /// Winning AUC.
    pub auc: f64,
    /// Winning accuracy.
    pub accuracy: f64,
    /// Fully qualified source table name.
    pub feature_table: String,
}

/// Metrics mapping keyed by candidate name, plus the `_chosen` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Per-candidate scores.
    #[serde(flatten)]
    pub candidates: BTreeMap<String, CandidateResult>,
    /// Winner summary, serialized under the `_chosen` key.
    #[serde(rename = "_chosen")]
    pub chosen: ChosenSummary,
}

/// Everything one training run persists as a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedArtifactBundle {
    /// The winning fitted model.
    pub model: TrainedModel,
    /// Feature column names defining the required input shape.
    pub feature_columns: Vec<String>,
    /// Ranked metrics for every candidate plus the winner summary.
    pub metrics: MetricsReport,
    /// Optional ranked feature importance; absent for linear winners and
    /// whenever attribution degraded.
    pub importance: Option<Vec<FeatureContribution>>,
}

/// Output of [`train`], bundling artifacts with run diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainOutcome {
    /// Winning candidate name.
    pub chosen: String,
    /// Persistable artifact set.
    pub bundle: TrainedArtifactBundle,
    /// Coercion fallback counters for the run.
    pub coercion: CoercionReport,
    /// Provenance stamped onto the persisted snapshot.
    pub provenance: RunProvenance,
}

/// Returns whether a candidate beats the running best.
///
/// Strictly higher AUC wins; an exact AUC tie is broken by higher
/// accuracy. Initialize the running best below any attainable score so the
/// first scored candidate always takes the lead.
fn improves(auc: f64, acc: f64, best_auc: f64, best_acc: f64) -> bool {
    auc > best_auc || (auc == best_auc && acc > best_acc)
}

/// Applies the selection policy as a single linear scan.
pub fn select_best<'a, I>(scored: I) -> Option<(&'a str, f64, f64)>
where
    I: IntoIterator<Item = (&'a str, f64, f64)>,
{
    let mut best: Option<(&str, f64, f64)> = None;
    let mut best_auc = -1.0;
    let mut best_acc = -1.0;
    for (name, auc, acc) in scored {
        if improves(auc, acc, best_auc, best_acc) {
            best_auc = auc;
            best_acc = acc;
            best = Some((name, auc, acc));
        }
    }
    best
}

fn roster(seed: u64) -> Vec<Box<dyn Classifier>> {
    vec![
        Box::<LogisticRegression>::default(),
        Box::new(RandomForest::new(derive_substream_seed(seed, SUBSTREAM_FOREST))),
        Box::new(GradientBoost::new(derive_substream_seed(seed, SUBSTREAM_BOOST))),
    ]
}

/// Trains the fixed candidate roster on a feature table and selects the
/// winner.
///
/// The identifier and target columns are dropped, remaining cells are
/// coerced to floats, rows are split into stratified train/eval partitions,
/// and each candidate is fitted and scored independently. Candidates that
/// fail to fit are recorded and skipped; the run aborts with a `Training`
/// error only when no candidate survives. Nothing is persisted here; the
/// caller hands the bundle to the artifact store.
pub fn train(
    table: &FeatureTable,
    target_column: &str,
    opts: &TrainOpts,
) -> Result<TrainOutcome, KpiError> {
    if table.is_empty() {
        return Err(schema_error("empty-table", "feature table has no rows", &table.name));
    }
    let target_idx = table.column_index(target_column).ok_or_else(|| {
        KpiError::Schema(
            ErrorInfo::new("missing-target", "target column not found")
                .with_context("target", target_column)
                .with_context("table", table.name.clone()),
        )
    })?;
    let feature_indices = table.feature_indices(target_column, &opts.id_column);
    if feature_indices.is_empty() {
        return Err(schema_error(
            "no-feature-columns",
            "no feature columns remain after exclusions",
            &table.name,
        ));
    }

    let mut labels = Vec::with_capacity(table.len());
    for (row_idx, row) in table.rows.iter().enumerate() {
        let label = coerce_cell(&row[target_idx]).unwrap_or(f64::NAN);
        if label != 0.0 && label != 1.0 {
            return Err(KpiError::Schema(
                ErrorInfo::new("non-binary-target", "target column must coerce to {0, 1}")
                    .with_context("target", target_column)
                    .with_context("row", row_idx.to_string()),
            ));
        }
        labels.push(label);
    }

    let (matrix, coercion) = coerce_columns(table, &feature_indices);

    let split = stratified_split(
        &labels,
        opts.eval_fraction,
        derive_substream_seed(opts.seed, SUBSTREAM_SPLIT),
    );
    if split.train.is_empty() || split.eval.is_empty() {
        return Err(schema_error(
            "too-few-rows",
            "not enough rows to form both partitions",
            &table.name,
        ));
    }
    let train_x: Vec<Vec<f64>> = split.train.iter().map(|&idx| matrix[idx].clone()).collect();
    let train_y: Vec<f64> = split.train.iter().map(|&idx| labels[idx]).collect();
    let eval_x: Vec<Vec<f64>> = split.eval.iter().map(|&idx| matrix[idx].clone()).collect();
    let eval_y: Vec<f64> = split.eval.iter().map(|&idx| labels[idx]).collect();

    let mut results: BTreeMap<String, CandidateResult> = BTreeMap::new();
    let mut failures: Vec<(String, String)> = Vec::new();
    let mut scored: Vec<(String, f64, f64, TrainedModel)> = Vec::new();

    for mut candidate in roster(opts.seed) {
        let name = candidate.name();
        if let Err(err) = candidate.fit(&train_x, &train_y) {
            failures.push((name.to_string(), err.info().message.clone()));
            continue;
        }
        let scores = candidate.positive_scores(&eval_x);
        let Some(auc) = roc_auc(&eval_y, &scores) else {
            failures.push((name.to_string(), "eval partition is single-class".to_string()));
            continue;
        };
        let acc = accuracy(&eval_y, &scores);
        results.insert(
            name.to_string(),
            CandidateResult {
                auc,
                accuracy: acc,
                rows: table.len() as u64,
                target: target_column.to_string(),
                feature_table: table.name.clone(),
            },
        );
        scored.push((name.to_string(), auc, acc, candidate.export()?));
    }

    let winner = select_best(
        scored
            .iter()
            .map(|(name, auc, acc, _)| (name.as_str(), *auc, *acc)),
    )
    .and_then(|(name, _, _)| scored.iter().position(|(n, _, _, _)| n.as_str() == name));
    let Some(winner_idx) = winner else {
        let mut info = ErrorInfo::new("no-candidates", "no candidate fit successfully")
            .with_context("table", table.name.clone());
        for (name, reason) in failures {
            info = info.with_context(name, reason);
        }
        return Err(KpiError::Training(info));
    };
    let (chosen_name, chosen_auc, chosen_acc, model) = scored.swap_remove(winner_idx);

    let feature_columns: Vec<String> = feature_indices
        .iter()
        .map(|&idx| table.columns[idx].clone())
        .collect();
    let importance = explain(
        &model,
        &feature_columns,
        &train_x,
        &opts.explain,
        derive_substream_seed(opts.seed, SUBSTREAM_EXPLAIN),
    );

    let metrics = MetricsReport {
        candidates: results,
        chosen: ChosenSummary {
            name: chosen_name.clone(),
            auc: chosen_auc,
            accuracy: chosen_acc,
            feature_table: table.name.clone(),
        },
    };

    let provenance = RunProvenance {
        input_hash: stable_hash_string(&(
            &table.name,
            &table.columns,
            table.len(),
            opts.seed,
        ))?,
        feature_table: table.name.clone(),
        seed: opts.seed,
        created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        tool_versions: [(
            "execkpi-train".to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        )]
        .into_iter()
        .collect(),
    };

    Ok(TrainOutcome {
        chosen: chosen_name,
        bundle: TrainedArtifactBundle {
            model,
            feature_columns,
            metrics,
            importance,
        },
        coercion,
        provenance,
    })
}
