//! Best-effort feature-importance ranking for tree-based winners.
//!
//! Explanation is advisory, never load-bearing: every degenerate condition
//! (linear winner, empty sample, no splits, numerical trouble) degrades to
//! `None` instead of failing the training run. Absence is a value here, not
//! an error.

use execkpi_core::rng::RngHandle;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::model::TrainedModel;

fn default_sample_cap() -> usize {
    200
}

/// Sampling knobs for the attribution pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainOpts {
    /// Upper bound on the number of training rows attributed.
    #[serde(default = "default_sample_cap")]
    pub sample_cap: usize,
}

impl Default for ExplainOpts {
    fn default() -> Self {
        Self {
            sample_cap: default_sample_cap(),
        }
    }
}

/// One entry of the ranked importance output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    /// Feature column name.
    pub feature: String,
    /// Mean absolute attributed effect on the model output.
    pub mean_absolute_contribution: f64,
}

/// Ranks features of a tree-based model by mean absolute path contribution.
///
/// A bounded, reproducibly seeded row sample is walked through every tree;
/// each split attributes its parent-to-child mean delta to the split
/// feature. Per row the tree deltas are summed (scaled by the ensemble's
/// output weight) before taking the absolute value, then averaged over the
/// sample and sorted descending. Features no split ever used do not appear.
pub fn explain(
    model: &TrainedModel,
    feature_columns: &[String],
    train_x: &[Vec<f64>],
    opts: &ExplainOpts,
    seed: u64,
) -> Option<Vec<FeatureContribution>> {
    let (trees, weight) = model.weighted_trees()?;
    if train_x.is_empty() || feature_columns.is_empty() || trees.is_empty() {
        return None;
    }

    let mut rows: Vec<usize> = (0..train_x.len()).collect();
    let mut rng = RngHandle::from_seed(seed);
    rows.shuffle(rng.inner_mut());
    rows.truncate(opts.sample_cap.max(1));

    let n_features = feature_columns.len();
    let mut totals = vec![0.0_f64; n_features];
    for &row in &rows {
        if train_x[row].len() != n_features {
            return None;
        }
        let mut contributions = vec![0.0_f64; n_features];
        for tree in trees {
            tree.attribute_row(&train_x[row], &mut contributions);
        }
        for (total, contribution) in totals.iter_mut().zip(&contributions) {
            *total += (contribution * weight).abs();
        }
    }

    if totals.iter().any(|total| !total.is_finite()) {
        return None;
    }

    let sample_size = rows.len() as f64;
    let mut ranking: Vec<FeatureContribution> = feature_columns
        .iter()
        .zip(&totals)
        .filter(|(_, total)| **total > 0.0)
        .map(|(feature, total)| FeatureContribution {
            feature: feature.clone(),
            mean_absolute_contribution: total / sample_size,
        })
        .collect();
    if ranking.is_empty() {
        return None;
    }
    ranking.sort_by(|a, b| {
        b.mean_absolute_contribution
            .total_cmp(&a.mean_absolute_contribution)
            .then_with(|| a.feature.cmp(&b.feature))
    });
    Some(ranking)
}
