//! Candidate classifier roster.
//!
//! The roster is polymorphism over a capability set, not an inheritance
//! tree: anything implementing [`Classifier`] can be added to the fixed
//! lineup without touching the selection logic. Every candidate must come
//! up with a probability-like score for the positive class; the provided
//! [`Classifier::positive_scores`] chain falls back from native
//! probabilities to logistically squashed decision scores to hard
//! predictions.

pub mod boost;
pub mod forest;
pub mod logistic;
pub mod tree;

use execkpi_core::KpiError;
use serde::{Deserialize, Serialize};

use self::boost::BoostedModel;
use self::forest::ForestModel;
use self::logistic::LogisticModel;
use self::tree::RegressionTree;

pub(crate) fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Capability bundle every roster candidate satisfies.
pub trait Classifier {
    /// Stable candidate name used as the metrics key.
    fn name(&self) -> &'static str;

    /// Fits the candidate on the training partition.
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), KpiError>;

    /// Native positive-class probabilities, when the model produces them.
    fn probabilities(&self, x: &[Vec<f64>]) -> Option<Vec<f64>>;

    /// Raw decision scores, when the model exposes them.
    fn decision_scores(&self, x: &[Vec<f64>]) -> Option<Vec<f64>>;

    /// Hard class predictions in `{0.0, 1.0}`.
    fn predict(&self, x: &[Vec<f64>]) -> Vec<f64>;

    /// Exports the fitted state for persistence.
    fn export(&self) -> Result<TrainedModel, KpiError>;

    /// Probability-like scores for the positive class.
    fn positive_scores(&self, x: &[Vec<f64>]) -> Vec<f64> {
        if let Some(probabilities) = self.probabilities(x) {
            return probabilities;
        }
        if let Some(scores) = self.decision_scores(x) {
            return scores.into_iter().map(sigmoid).collect();
        }
        self.predict(x)
    }
}

/// Fitted model owned by the artifact bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrainedModel {
    /// Linear probabilistic classifier.
    Logistic(LogisticModel),
    /// Bagged-tree ensemble.
    Forest(ForestModel),
    /// Gradient-boosted trees.
    Boosted(BoostedModel),
}

impl TrainedModel {
    /// Positive-class scores of the persisted model.
    pub fn positive_scores(&self, x: &[Vec<f64>]) -> Vec<f64> {
        match self {
            TrainedModel::Logistic(model) => model.positive_scores(x),
            TrainedModel::Forest(model) => model.positive_scores(x),
            TrainedModel::Boosted(model) => model.positive_scores(x),
        }
    }

    /// Trees with their shared output weight, for path attribution.
    /// `None` for non-tree models.
    pub fn weighted_trees(&self) -> Option<(&[RegressionTree], f64)> {
        match self {
            TrainedModel::Logistic(_) => None,
            TrainedModel::Forest(model) => {
                let weight = 1.0 / model.trees.len().max(1) as f64;
                Some((&model.trees, weight))
            }
            TrainedModel::Boosted(model) => Some((&model.trees, model.learning_rate)),
        }
    }

    /// True when the model is explainable by tree attribution.
    pub fn is_tree_based(&self) -> bool {
        self.weighted_trees().is_some()
    }
}
