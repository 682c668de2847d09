//! Bagged-tree ensemble classifier.
//!
//! Bootstrap-resampled regression trees fitted on the 0/1 labels with
//! sqrt-feature subsampling per split. A leaf's mean response is the class
//! fraction of the rows that reached it, so averaging the trees yields a
//! native probability estimate.

use execkpi_core::errors::{ErrorInfo, KpiError};
use execkpi_core::rng::RngHandle;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::tree::{RegressionTree, TreeParams};
use super::{Classifier, TrainedModel};

fn default_n_trees() -> usize {
    200
}

fn default_max_depth() -> usize {
    10
}

/// Fitted bagged ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    /// Member trees, each grown on its own bootstrap sample.
    pub trees: Vec<RegressionTree>,
}

impl ForestModel {
    /// Mean leaf response across trees, clamped into `[0, 1]`.
    pub fn positive_scores(&self, x: &[Vec<f64>]) -> Vec<f64> {
        let n_trees = self.trees.len().max(1) as f64;
        x.iter()
            .map(|row| {
                let sum: f64 = self.trees.iter().map(|tree| tree.predict_row(row)).sum();
                (sum / n_trees).clamp(0.0, 1.0)
            })
            .collect()
    }
}

/// Roster candidate growing the bagged ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    /// Number of bootstrap trees.
    #[serde(default = "default_n_trees")]
    pub n_trees: usize,
    /// Depth cap applied to every tree.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Seed for bootstrap and feature subsampling.
    pub seed: u64,
    #[serde(skip)]
    model: Option<ForestModel>,
}

impl RandomForest {
    /// Creates the candidate with default growth parameters.
    pub fn new(seed: u64) -> Self {
        Self {
            n_trees: default_n_trees(),
            max_depth: default_max_depth(),
            seed,
            model: None,
        }
    }
}

impl Classifier for RandomForest {
    fn name(&self) -> &'static str {
        "random_forest"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), KpiError> {
        if x.is_empty() || x[0].is_empty() {
            return Err(KpiError::Training(ErrorInfo::new(
                "empty-matrix",
                "random forest needs at least one row and one feature",
            )));
        }
        let n_rows = x.len();
        let n_features = x[0].len();
        let max_features = (n_features as f64).sqrt().round().max(1.0) as usize;
        let params = TreeParams {
            max_depth: self.max_depth,
            min_samples_split: 2,
            max_features: Some(max_features),
        };

        let mut rng = RngHandle::from_seed(self.seed);
        let mut trees = Vec::with_capacity(self.n_trees);
        for _ in 0..self.n_trees {
            let bootstrap: Vec<usize> = (0..n_rows)
                .map(|_| rng.inner_mut().gen_range(0..n_rows))
                .collect();
            trees.push(RegressionTree::fit(x, y, &bootstrap, &params, rng.inner_mut()));
        }
        self.model = Some(ForestModel {
            trees,
        });
        Ok(())
    }

    fn probabilities(&self, x: &[Vec<f64>]) -> Option<Vec<f64>> {
        self.model.as_ref().map(|model| model.positive_scores(x))
    }

    fn decision_scores(&self, _x: &[Vec<f64>]) -> Option<Vec<f64>> {
        None
    }

    fn predict(&self, x: &[Vec<f64>]) -> Vec<f64> {
        match &self.model {
            Some(model) => model
                .positive_scores(x)
                .into_iter()
                .map(|score| if score >= 0.5 { 1.0 } else { 0.0 })
                .collect(),
            None => vec![0.0; x.len()],
        }
    }

    fn export(&self) -> Result<TrainedModel, KpiError> {
        self.model
            .clone()
            .map(TrainedModel::Forest)
            .ok_or_else(|| KpiError::Training(ErrorInfo::new("not-fitted", "forest not fitted")))
    }
}
