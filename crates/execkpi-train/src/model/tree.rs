//! Variance-reduction regression tree shared by both tree ensembles.
//!
//! Trees regress on real-valued targets. The bagged ensemble fits them on
//! 0/1 labels so a leaf's mean response is a class fraction; the boosted
//! ensemble fits them on residuals. Every node records its mean response,
//! which is what makes path attribution possible after the fact.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Minimum variance gain required to accept a split.
const MIN_GAIN: f64 = 1e-12;

/// Growth limits for one tree.
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    /// Maximum tree depth.
    pub max_depth: usize,
    /// Minimum node size eligible for splitting.
    pub min_samples_split: usize,
    /// Number of features sampled per split; `None` considers all.
    pub max_features: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Split {
    feature: usize,
    threshold: f64,
    left: usize,
    right: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Node {
    value: f64,
    split: Option<Split>,
}

/// A fitted regression tree stored as an arena with the root at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Grows a tree over the given rows of the design matrix.
    pub fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        rows: &[usize],
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
        };
        tree.grow(x, y, rows.to_vec(), 0, params, rng);
        tree
    }

    fn grow(
        &mut self,
        x: &[Vec<f64>],
        y: &[f64],
        rows: Vec<usize>,
        depth: usize,
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> usize {
        let value = rows.iter().map(|&row| y[row]).sum::<f64>() / rows.len().max(1) as f64;
        let node_id = self.nodes.len();
        self.nodes.push(Node {
            value,
            split: None,
        });

        if depth >= params.max_depth || rows.len() < params.min_samples_split {
            return node_id;
        }
        let Some((feature, threshold)) = best_split(x, y, &rows, params, rng) else {
            return node_id;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&row| x[row][feature] <= threshold);
        if left_rows.is_empty() || right_rows.is_empty() {
            return node_id;
        }

        let left = self.grow(x, y, left_rows, depth + 1, params, rng);
        let right = self.grow(x, y, right_rows, depth + 1, params, rng);
        self.nodes[node_id].split = Some(Split {
            feature,
            threshold,
            left,
            right,
        });
        node_id
    }

    /// Predicted response for one row.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut node = &self.nodes[0];
        while let Some(split) = &node.split {
            let child = if row[split.feature] <= split.threshold {
                split.left
            } else {
                split.right
            };
            node = &self.nodes[child];
        }
        node.value
    }

    /// Adds this tree's per-feature contributions for one row.
    ///
    /// Walking the decision path, each split attributes the change in mean
    /// response between parent and taken child to the split feature. The
    /// contributions sum to `predict_row(row) - root mean`.
    pub fn attribute_row(&self, row: &[f64], contributions: &mut [f64]) {
        let mut node = &self.nodes[0];
        while let Some(split) = &node.split {
            let child = if row[split.feature] <= split.threshold {
                split.left
            } else {
                split.right
            };
            let next = &self.nodes[child];
            contributions[split.feature] += next.value - node.value;
            node = next;
        }
    }
}

/// Finds the split maximizing variance reduction over a feature sample.
fn best_split(
    x: &[Vec<f64>],
    y: &[f64],
    rows: &[usize],
    params: &TreeParams,
    rng: &mut StdRng,
) -> Option<(usize, f64)> {
    let n_features = x.first().map(Vec::len).unwrap_or(0);
    if n_features == 0 || rows.len() < 2 {
        return None;
    }
    let mut pool: Vec<usize> = (0..n_features).collect();
    if let Some(limit) = params.max_features {
        if limit < n_features {
            pool.shuffle(rng);
            pool.truncate(limit.max(1));
            pool.sort_unstable();
        }
    }

    let n = rows.len() as f64;
    let total_sum: f64 = rows.iter().map(|&row| y[row]).sum();
    let baseline = total_sum * total_sum / n;

    let mut best: Option<(usize, f64)> = None;
    let mut best_gain = MIN_GAIN;
    for &feature in &pool {
        let mut pairs: Vec<(f64, f64)> = rows
            .iter()
            .map(|&row| (x[row][feature], y[row]))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_sum = 0.0;
        for (idx, pair) in pairs.iter().enumerate().take(pairs.len() - 1) {
            left_sum += pair.1;
            // Only boundaries between distinct values are valid thresholds.
            if pairs[idx + 1].0 == pair.0 {
                continue;
            }
            let left_n = (idx + 1) as f64;
            let right_n = n - left_n;
            let right_sum = total_sum - left_sum;
            let score = left_sum * left_sum / left_n + right_sum * right_sum / right_n;
            let gain = score - baseline;
            if gain > best_gain {
                best_gain = gain;
                best = Some((feature, (pair.0 + pairs[idx + 1].0) / 2.0));
            }
        }
    }
    best
}
