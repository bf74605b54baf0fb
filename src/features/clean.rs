//! Removal of feature columns that are not usable by the detectors.

use super::FeatureMatrix;
use tracing::info;

/// Cleaned matrix plus what was removed.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanReport {
    pub matrix: FeatureMatrix,
    pub columns_before: usize,
    pub dropped: Vec<String>,
}

impl CleanReport {
    pub fn columns_after(&self) -> usize {
        self.matrix.ncols()
    }

    /// True when no feature column survived.
    pub fn is_degenerate(&self) -> bool {
        self.matrix.ncols() == 0
    }
}

/// Treats +/-inf as missing and drops every column holding a missing value.
///
/// The row count never changes.
pub fn clean_features(mut features: FeatureMatrix) -> CleanReport {
    let columns_before = features.ncols();
    info!(columns = columns_before, "feature columns before cleaning");

    features.values.map_inplace(|v| if v.is_infinite() { f64::NAN } else { v });

    let mut keep = Vec::with_capacity(columns_before);
    let mut dropped = Vec::new();
    for (j, name) in features.columns.iter().enumerate() {
        let complete = (0..features.nrows()).all(|i| !features.values[(i, j)].is_nan());
        if complete {
            keep.push(j);
        } else {
            dropped.push(name.clone());
        }
    }

    let matrix = features.select_columns(&keep);
    info!(
        columns = matrix.ncols(),
        dropped = dropped.len(),
        "feature columns after cleaning"
    );

    CleanReport {
        matrix,
        columns_before,
        dropped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Matrix;

    fn features(rows: &[Vec<f64>]) -> FeatureMatrix {
        let values = Matrix::from_rows(rows).unwrap();
        let ids = (0..values.nrows()).map(|i| format!("w{i:06}")).collect();
        let columns = (0..values.ncols()).map(|j| format!("value__f{j}")).collect();
        FeatureMatrix::new(ids, columns, values).unwrap()
    }

    #[test]
    fn drops_columns_with_missing_or_infinite_values() {
        let input = features(&[
            vec![1.0, f64::NAN, 3.0, 4.0],
            vec![1.5, 2.0, f64::INFINITY, 4.5],
            vec![2.0, 2.5, 3.5, f64::NEG_INFINITY],
        ]);
        let report = clean_features(input);
        assert_eq!(report.columns_before, 4);
        assert_eq!(report.columns_after(), 1);
        assert_eq!(report.matrix.columns, vec!["value__f0".to_string()]);
        assert_eq!(report.matrix.nrows(), 3);
        assert_eq!(report.dropped.len(), 3);
    }

    #[test]
    fn clean_input_is_untouched() {
        let input = features(&[vec![1.0, 2.0], vec![3.0, 4.0]]);
        let report = clean_features(input.clone());
        assert_eq!(report.matrix, input);
        assert!(report.dropped.is_empty());
    }

    #[test]
    fn all_columns_dropped_is_degenerate() {
        let report = clean_features(features(&[vec![f64::NAN, 1.0], vec![0.0, f64::NAN]]));
        assert!(report.is_degenerate());
        assert_eq!(report.matrix.nrows(), 2);
    }
}
