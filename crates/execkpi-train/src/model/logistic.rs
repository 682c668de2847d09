//! L2-regularized logistic regression fitted by full-batch gradient descent.

use execkpi_core::errors::{ErrorInfo, KpiError};
use serde::{Deserialize, Serialize};

use super::{sigmoid, Classifier, TrainedModel};

fn default_epochs() -> usize {
    300
}

fn default_learning_rate() -> f64 {
    0.1
}

fn default_l2() -> f64 {
    1e-4
}

/// Fitted linear model with the standardization constants baked in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    /// Per-feature weights in standardized space.
    pub weights: Vec<f64>,
    /// Intercept term.
    pub bias: f64,
    /// Per-feature training means used to standardize inputs.
    pub means: Vec<f64>,
    /// Per-feature training deviations; constant columns store 1.0.
    pub stds: Vec<f64>,
}

impl LogisticModel {
    fn margin(&self, row: &[f64]) -> f64 {
        let mut acc = self.bias;
        for ((value, weight), (mean, std)) in row
            .iter()
            .zip(&self.weights)
            .zip(self.means.iter().zip(&self.stds))
        {
            acc += weight * (value - mean) / std;
        }
        acc
    }

    /// Raw linear decision scores.
    pub fn decision_scores(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| self.margin(row)).collect()
    }

    /// Native positive-class probabilities.
    pub fn positive_scores(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| sigmoid(self.margin(row))).collect()
    }
}

/// Roster candidate wrapping the gradient-descent trainer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Number of full-batch passes.
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    /// Step size for the descent.
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// L2 penalty applied to the weights (never the bias).
    #[serde(default = "default_l2")]
    pub l2: f64,
    #[serde(skip)]
    model: Option<LogisticModel>,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self {
            epochs: default_epochs(),
            learning_rate: default_learning_rate(),
            l2: default_l2(),
            model: None,
        }
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &'static str {
        "logistic_regression"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), KpiError> {
        if x.is_empty() || x[0].is_empty() {
            return Err(KpiError::Training(ErrorInfo::new(
                "empty-matrix",
                "logistic regression needs at least one row and one feature",
            )));
        }
        let n_rows = x.len() as f64;
        let n_features = x[0].len();

        let mut means = vec![0.0; n_features];
        for row in x {
            for (mean, value) in means.iter_mut().zip(row) {
                *mean += value;
            }
        }
        for mean in &mut means {
            *mean /= n_rows;
        }
        let mut stds = vec![0.0; n_features];
        for row in x {
            for ((std, value), mean) in stds.iter_mut().zip(row).zip(&means) {
                *std += (value - mean).powi(2);
            }
        }
        for std in &mut stds {
            *std = (*std / n_rows).sqrt();
            if *std == 0.0 {
                *std = 1.0;
            }
        }

        let standardized: Vec<Vec<f64>> = x
            .iter()
            .map(|row| {
                row.iter()
                    .zip(means.iter().zip(&stds))
                    .map(|(value, (mean, std))| (value - mean) / std)
                    .collect()
            })
            .collect();

        let mut weights = vec![0.0; n_features];
        let mut bias = 0.0;
        for _ in 0..self.epochs {
            let mut weight_grad = vec![0.0; n_features];
            let mut bias_grad = 0.0;
            for (row, &label) in standardized.iter().zip(y) {
                let mut margin = bias;
                for (weight, value) in weights.iter().zip(row) {
                    margin += weight * value;
                }
                let error = sigmoid(margin) - label;
                for (grad, value) in weight_grad.iter_mut().zip(row) {
                    *grad += error * value;
                }
                bias_grad += error;
            }
            for (weight, grad) in weights.iter_mut().zip(&weight_grad) {
                *weight -= self.learning_rate * (grad / n_rows + self.l2 * *weight);
            }
            bias -= self.learning_rate * bias_grad / n_rows;
        }

        self.model = Some(LogisticModel {
            weights,
            bias,
            means,
            stds,
        });
        Ok(())
    }

    fn probabilities(&self, x: &[Vec<f64>]) -> Option<Vec<f64>> {
        self.model.as_ref().map(|model| model.positive_scores(x))
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
            .map(TrainedModel::Logistic)
            .ok_or_else(|| {
                KpiError::Training(ErrorInfo::new("not-fitted", "logistic regression not fitted"))
            })
    }
}
