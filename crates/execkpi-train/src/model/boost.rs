//! Gradient-boosted trees with logistic loss.
//!
//! Boosting starts from the base-rate log-odds and fits shallow regression
//! trees to the probability residuals, shrinking each stage by the learning
//! rate and subsampling rows without replacement. The model's native output
//! is a margin, not a probability; the selection layer squashes it through
//! the logistic function via the decision-score fallback.

use execkpi_core::errors::{ErrorInfo, KpiError};
use execkpi_core::rng::RngHandle;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::tree::{RegressionTree, TreeParams};
use super::{sigmoid, Classifier, TrainedModel};

fn default_n_rounds() -> usize {
    200
}

fn default_learning_rate() -> f64 {
    0.08
}

fn default_max_depth() -> usize {
    5
}

fn default_subsample() -> f64 {
    0.9
}

/// Fitted boosted ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostedModel {
    /// Base-rate log-odds the staging starts from.
    pub initial: f64,
    /// Shrinkage applied to every stage.
    pub learning_rate: f64,
    /// Stage trees in boosting order.
    pub trees: Vec<RegressionTree>,
}

impl BoostedModel {
    /// Raw additive margins.
    pub fn decision_scores(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter()
            .map(|row| {
                let staged: f64 = self.trees.iter().map(|tree| tree.predict_row(row)).sum();
                self.initial + self.learning_rate * staged
            })
            .collect()
    }

    /// Margins squashed into probabilities.
    pub fn positive_scores(&self, x: &[Vec<f64>]) -> Vec<f64> {
        self.decision_scores(x).into_iter().map(sigmoid).collect()
    }
}

/// Roster candidate running the boosting loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoost {
    /// Number of boosting stages.
    #[serde(default = "default_n_rounds")]
    pub n_rounds: usize,
    /// Stage shrinkage factor.
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Depth cap for stage trees.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Fraction of rows sampled per stage, without replacement.
    #[serde(default = "default_subsample")]
    pub subsample: f64,
    /// Seed for row subsampling.
    pub seed: u64,
    #[serde(skip)]
    model: Option<BoostedModel>,
}

impl GradientBoost {
    /// Creates the candidate with default boosting parameters.
    pub fn new(seed: u64) -> Self {
        Self {
            n_rounds: default_n_rounds(),
            learning_rate: default_learning_rate(),
            max_depth: default_max_depth(),
            subsample: default_subsample(),
            seed,
            model: None,
        }
    }
}

impl Classifier for GradientBoost {
    fn name(&self) -> &'static str {
        "gradient_boosting"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), KpiError> {
        if x.is_empty() || x[0].is_empty() {
            return Err(KpiError::Training(ErrorInfo::new(
                "empty-matrix",
                "gradient boosting needs at least one row and one feature",
            )));
        }
        let n_rows = x.len();
        let base_rate = (y.iter().sum::<f64>() / n_rows as f64).clamp(1e-6, 1.0 - 1e-6);
        let initial = (base_rate / (1.0 - base_rate)).ln();

        let params = TreeParams {
            max_depth: self.max_depth,
            min_samples_split: 2,
            max_features: None,
        };
        let stage_rows = ((n_rows as f64 * self.subsample).round() as usize)
            .max(1)
            .min(n_rows);

        let mut rng = RngHandle::from_seed(self.seed);
        let mut margins = vec![initial; n_rows];
        let mut trees = Vec::with_capacity(self.n_rounds);
        for _ in 0..self.n_rounds {
            let residuals: Vec<f64> = margins
                .iter()
                .zip(y)
                .map(|(margin, label)| *label - sigmoid(*margin))
                .collect();

            let mut rows: Vec<usize> = (0..n_rows).collect();
            rows.shuffle(rng.inner_mut());
            rows.truncate(stage_rows);

            let tree = RegressionTree::fit(x, &residuals, &rows, &params, rng.inner_mut());
            for (margin, row) in margins.iter_mut().zip(x) {
                *margin += self.learning_rate * tree.predict_row(row);
            }
            trees.push(tree);
        }

        self.model = Some(BoostedModel {
            initial,
            learning_rate: self.learning_rate,
            trees,
        });
        Ok(())
    }

    fn probabilities(&self, _x: &[Vec<f64>]) -> Option<Vec<f64>> {
        None
    }

    fn decision_scores(&self, x: &[Vec<f64>]) -> Option<Vec<f64>> {
        self.model.as_ref().map(|model| model.decision_scores(x))
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
            .map(TrainedModel::Boosted)
            .ok_or_else(|| KpiError::Training(ErrorInfo::new("not-fitted", "booster not fitted")))
    }
}
