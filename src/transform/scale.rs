//! Per-window scaling applied before either representation is built.

use super::window::WindowTable;
use serde::{Deserialize, Serialize};

/// Normalization applied to every window independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Keep raw values.
    #[default]
    None,
    /// Zero mean, unit (sample) standard deviation per window.
    ZScore,
}

/// Standardize data to zero mean and unit variance (z-score normalization).
///
/// x_scaled = (x - mean) / std, with a constant series mapped to zeros.
pub fn standardize(series: &[f64]) -> Vec<f64> {
    if series.is_empty() {
        return Vec::new();
    }

    let n = series.len() as f64;
    let mean = series.iter().sum::<f64>() / n;

    let variance = if series.len() > 1 {
        series.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0)
    } else {
        0.0
    };
    let std = variance.sqrt();

    let scale = if std < 1e-10 { 1.0 } else { std };
    series.iter().map(|&x| (x - mean) / scale).collect()
}

/// Apply `normalization` to each window of `table` in place.
pub fn normalize_windows(table: &mut WindowTable, normalization: Normalization) {
    match normalization {
        Normalization::None => {}
        Normalization::ZScore => {
            let matrix = table.matrix_mut();
            for i in 0..matrix.nrows() {
                let scaled = standardize(matrix.row(i));
                matrix.row_mut(i).copy_from_slice(&scaled);
            }
        }
    }
}
