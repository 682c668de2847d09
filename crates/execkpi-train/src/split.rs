//! Seeded stratified train/eval partitioning.

use execkpi_core::rng::RngHandle;
use rand::seq::SliceRandom;

/// Row indices assigned to the two partitions, each in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    /// Rows used to fit the candidates.
    pub train: Vec<usize>,
    /// Rows held out for scoring.
    pub eval: Vec<usize>,
}

/// Splits rows into train/eval partitions preserving the binary target's
/// class balance.
///
/// Each class is shuffled on its own and contributes
/// `round(len * eval_fraction)` rows to the eval partition, clamped so the
/// training side keeps at least one row per class with two or more members.
/// A fixed seed reproduces the exact same partition.
pub fn stratified_split(labels: &[f64], eval_fraction: f64, seed: u64) -> SplitIndices {
    let mut split = SplitIndices {
        train: Vec::new(),
        eval: Vec::new(),
    };
    let mut rng = RngHandle::from_seed(seed);
    for class in [0.0, 1.0] {
        let mut indices: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, label)| **label == class)
            .map(|(idx, _)| idx)
            .collect();
        if indices.is_empty() {
            continue;
        }
        indices.shuffle(rng.inner_mut());
        let n_eval = if indices.len() < 2 {
            0
        } else {
            ((indices.len() as f64 * eval_fraction).round() as usize)
                .max(1)
                .min(indices.len() - 1)
        };
        split.eval.extend(indices.drain(..n_eval));
        split.train.extend(indices);
    }
    split.train.sort_unstable();
    split.eval.sort_unstable();
    split
}
