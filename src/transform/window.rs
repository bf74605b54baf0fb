//! Sliding-window subsequences and window-level label aggregation.
//!
//! A series of length `n` cut with window length `size` yields exactly
//! `n - size + 1` overlapping windows; row `i` covers offsets `[i, i + size)`.
//! [`aggregate_labels`] produces one label per window at the same offsets.

use crate::core::Matrix;
use crate::error::{EvalError, Result};

/// Windowed value table: one row per subsequence, `size` columns.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowTable {
    size: usize,
    matrix: Matrix,
}

impl WindowTable {
    /// Wrap an existing matrix whose column count is the window length.
    pub fn from_matrix(matrix: Matrix) -> Self {
        Self {
            size: matrix.ncols(),
            matrix,
        }
    }

    /// Window length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of windows.
    pub fn len(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.nrows() == 0
    }

    /// The subsequence starting at offset `i`.
    pub fn window(&self, i: usize) -> &[f64] {
        self.matrix.row(i)
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn matrix_mut(&mut self) -> &mut Matrix {
        &mut self.matrix
    }

    pub fn into_matrix(self) -> Matrix {
        self.matrix
    }

    /// Stable identifiers `w000000`, `w000001`, ... for every row.
    pub fn ids(&self) -> Vec<String> {
        (0..self.len()).map(window_id).collect()
    }
}

/// Identifier of the window starting at `offset`.
///
/// Zero-padded so that lexicographic order equals numeric order.
pub fn window_id(offset: usize) -> String {
    format!("w{offset:06}")
}

/// Number of windows produced for a series of length `n`.
pub fn window_count(n: usize, size: usize) -> Result<usize> {
    if size == 0 {
        return Err(EvalError::InvalidParameter(
            "window size must be at least 1".to_string(),
        ));
    }
    if n == 0 {
        return Err(EvalError::EmptyData);
    }
    if size > n {
        return Err(EvalError::InsufficientData {
            needed: size,
            got: n,
        });
    }
    Ok(n - size + 1)
}

/// Cut `values` into overlapping windows of length `size`.
///
/// # Arguments
/// * `values` - Input time series
/// * `size` - Window length, `1 <= size <= values.len()`
///
/// # Errors
/// `InvalidParameter` for a zero size, `EmptyData` for an empty series and
/// `InsufficientData` when the window is longer than the series.
pub fn sliding_window(values: &[f64], size: usize) -> Result<WindowTable> {
    let count = window_count(values.len(), size)?;
    let mut data = Vec::with_capacity(count * size);
    for window in values.windows(size) {
        data.extend_from_slice(window);
    }
    let matrix = Matrix::from_row_major(data, count, size)?;
    Ok(WindowTable { size, matrix })
}

/// Reduce point labels to one label per window with a logical OR.
///
/// Element `i` is 1 when any of `labels[i..i + size]` is 1, else 0.
pub fn aggregate_labels(labels: &[u8], size: usize) -> Result<Vec<u8>> {
    let count = window_count(labels.len(), size)?;

    // running count of anomalous points inside the current window
    let mut inside: usize = labels[..size].iter().filter(|&&l| l != 0).count();
    let mut aggregated = Vec::with_capacity(count);
    aggregated.push(u8::from(inside > 0));
    for i in 1..count {
        if labels[i - 1] != 0 {
            inside -= 1;
        }
        if labels[i + size - 1] != 0 {
            inside += 1;
        }
        aggregated.push(u8::from(inside > 0));
    }
    Ok(aggregated)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== sliding_window ====================

    #[test]
    fn sliding_window_rows_are_offsets() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let table = sliding_window(&values, 3).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.size(), 3);
        assert_eq!(table.window(0), &[1.0, 2.0, 3.0]);
        assert_eq!(table.window(1), &[2.0, 3.0, 4.0]);
        assert_eq!(table.window(2), &[3.0, 4.0, 5.0]);
    }

    #[test]
    fn sliding_window_full_length() {
        let values = vec![1.0, 2.0, 3.0];
        let table = sliding_window(&values, 3).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.window(0), &values[..]);
    }

    #[test]
    fn sliding_window_size_one() {
        let values = vec![4.0, 5.0];
        let table = sliding_window(&values, 1).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.window(1), &[5.0]);
    }

    #[test]
    fn sliding_window_too_long() {
        let err = sliding_window(&[1.0, 2.0], 3).unwrap_err();
        assert_eq!(err, EvalError::InsufficientData { needed: 3, got: 2 });
    }

    #[test]
    fn sliding_window_zero_size() {
        assert!(matches!(
            sliding_window(&[1.0, 2.0], 0),
            Err(EvalError::InvalidParameter(_))
        ));
    }

    #[test]
    fn sliding_window_empty() {
        assert_eq!(sliding_window(&[], 2).unwrap_err(), EvalError::EmptyData);
    }

    #[test]
    fn window_ids_sort_numerically() {
        let table = sliding_window(&vec![0.0; 12], 2).unwrap();
        let ids = table.ids();
        assert_eq!(ids[0], "w000000");
        assert_eq!(ids[10], "w000010");
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(sorted, ids);
    }

    // ==================== aggregate_labels ====================

    #[test]
    fn aggregate_labels_or_reduction() {
        let labels = vec![0, 0, 1, 0, 0, 0];
        let agg = aggregate_labels(&labels, 2).unwrap();
        // windows: [0,0] [0,1] [1,0] [0,0] [0,0]
        assert_eq!(agg, vec![0, 1, 1, 0, 0]);
    }

    #[test]
    fn aggregate_labels_all_zero_and_all_one() {
        assert_eq!(aggregate_labels(&[0; 6], 3).unwrap(), vec![0; 4]);
        assert_eq!(aggregate_labels(&[1; 6], 3).unwrap(), vec![1; 4]);
    }

    #[test]
    fn aggregate_labels_boundaries() {
        // anomaly at the very first and very last point
        let labels = vec![1, 0, 0, 0, 0, 1];
        let agg = aggregate_labels(&labels, 2).unwrap();
        assert_eq!(agg, vec![1, 0, 0, 0, 1]);
    }

    #[test]
    fn aggregate_labels_matches_window_count() {
        let labels = vec![0u8; 40];
        let values = vec![0.0; 40];
        for size in 1..=40 {
            let agg = aggregate_labels(&labels, size).unwrap();
            let table = sliding_window(&values, size).unwrap();
            assert_eq!(agg.len(), table.len());
            assert_eq!(agg.len(), 40 - size + 1);
        }
    }

    #[test]
    fn aggregate_labels_too_long() {
        assert!(matches!(
            aggregate_labels(&[0, 1], 5),
            Err(EvalError::InsufficientData { needed: 5, got: 2 })
        ));
    }
}
