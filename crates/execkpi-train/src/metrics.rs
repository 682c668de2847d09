//! Evaluation metrics for probability-scored binary classifiers.

use std::cmp::Ordering;

/// Area under the ROC curve via the rank-sum (Mann-Whitney) statistic.
///
/// Tied scores receive their average rank, so a constant score vector comes
/// out at exactly 0.5. Returns `None` when the evaluation partition holds a
/// single class, in which case the curve is undefined.
pub fn roc_auc(labels: &[f64], scores: &[f64]) -> Option<f64> {
    debug_assert_eq!(labels.len(), scores.len());
    let n = labels.len();
    let positives = labels.iter().filter(|&&label| label == 1.0).count();
    let negatives = n - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[a].partial_cmp(&scores[b]).unwrap_or(Ordering::Equal));

    let mut ranks = vec![0.0_f64; n];
    let mut start = 0;
    while start < n {
        let mut end = start;
        while end + 1 < n && scores[order[end + 1]] == scores[order[start]] {
            end += 1;
        }
        let average_rank = (start + end) as f64 / 2.0 + 1.0;
        for &idx in &order[start..=end] {
            ranks[idx] = average_rank;
        }
        start = end + 1;
    }

    let positive_rank_sum: f64 = labels
        .iter()
        .zip(&ranks)
        .filter(|(label, _)| **label == 1.0)
        .map(|(_, rank)| *rank)
        .sum();
    let p = positives as f64;
    let q = negatives as f64;
    Some((positive_rank_sum - p * (p + 1.0) / 2.0) / (p * q))
}

/// Fraction of rows classified correctly at the 0.5 probability threshold.
pub fn accuracy(labels: &[f64], scores: &[f64]) -> f64 {
    debug_assert_eq!(labels.len(), scores.len());
    if labels.is_empty() {
        return 0.0;
    }
    let correct = labels
        .iter()
        .zip(scores)
        .filter(|(label, score)| (**score >= 0.5) == (**label == 1.0))
        .count();
    correct as f64 / labels.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_ranking_scores_one() {
        let labels = [0.0, 0.0, 1.0, 1.0];
        let scores = [0.1, 0.2, 0.8, 0.9];
        assert_eq!(roc_auc(&labels, &scores), Some(1.0));
    }

    #[test]
    fn constant_scores_score_half() {
        let labels = [0.0, 1.0, 0.0, 1.0];
        let scores = [0.5, 0.5, 0.5, 0.5];
        assert_eq!(roc_auc(&labels, &scores), Some(0.5));
    }

    #[test]
    fn inverted_ranking_scores_zero() {
        let labels = [1.0, 1.0, 0.0, 0.0];
        let scores = [0.1, 0.2, 0.8, 0.9];
        assert_eq!(roc_auc(&labels, &scores), Some(0.0));
    }

    #[test]
    fn single_class_is_undefined() {
        let labels = [1.0, 1.0];
        let scores = [0.3, 0.7];
        assert_eq!(roc_auc(&labels, &scores), None);
    }

    #[test]
    fn accuracy_thresholds_at_half() {
        let labels = [0.0, 1.0, 1.0, 0.0];
        let scores = [0.4, 0.5, 0.9, 0.6];
        assert_eq!(accuracy(&labels, &scores), 0.75);
    }
}
