//! Ranking metrics for anomaly score evaluation.

use crate::error::{EvalError, Result};

/// Area under the ROC curve of `scores` against binary `labels`.
///
/// Computed as the Mann-Whitney statistic: the probability that a randomly
/// chosen positive scores higher than a randomly chosen negative, with ties
/// counted as one half. Fails when only one class is present.
pub fn roc_auc(labels: &[u8], scores: &[f64]) -> Result<f64> {
    if labels.is_empty() {
        return Err(EvalError::EmptyData);
    }
    if labels.len() != scores.len() {
        return Err(EvalError::DimensionMismatch {
            expected: labels.len(),
            got: scores.len(),
        });
    }
    if scores.iter().any(|s| s.is_nan()) {
        return Err(EvalError::MissingValues);
    }

    let positives = labels.iter().filter(|&&l| l != 0).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(EvalError::UndefinedMetric(format!(
            "roc auc needs both classes, got {positives} positive and {negatives} negative"
        )));
    }

    // average ranks over tied scores
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));
    let mut ranks = vec![0.0; scores.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        let rank = (start + end + 1) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = rank;
        }
        start = end;
    }

    let positive_rank_sum: f64 = labels
        .iter()
        .zip(&ranks)
        .filter(|(&l, _)| l != 0)
        .map(|(_, r)| r)
        .sum();
    let p = positives as f64;
    let u = positive_rank_sum - p * (p + 1.0) / 2.0;
    Ok(u / (p * negatives as f64))
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
