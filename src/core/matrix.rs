//! Dense row-major matrix shared by the windowing, feature and detector layers.
//!
//! Rows are observations (windows), columns are variables (time offsets or
//! extracted statistics). Element `(row, col)` lives at `row * ncols + col`.

use crate::error::{EvalError, Result};
use std::ops::Index;

/// Row-major matrix of `f64` values.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: Vec<f64>,
    nrows: usize,
    ncols: usize,
}

impl Matrix {
    /// Create from flat row-major data with dimension validation.
    pub fn from_row_major(data: Vec<f64>, nrows: usize, ncols: usize) -> Result<Self> {
        if data.len() != nrows * ncols {
            return Err(EvalError::DimensionMismatch {
                expected: nrows * ncols,
                got: data.len(),
            });
        }
        Ok(Self { data, nrows, ncols })
    }

    /// Create from a list of equal-length rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(nrows * ncols);
        for row in rows {
            if row.len() != ncols {
                return Err(EvalError::DimensionMismatch {
                    expected: ncols,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self { data, nrows, ncols })
    }

    /// Matrix of zeros.
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            data: vec![0.0; nrows * ncols],
            nrows,
            ncols,
        }
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    pub fn is_empty(&self) -> bool {
        self.nrows == 0 || self.ncols == 0
    }

    /// Borrow row `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.ncols..(i + 1) * self.ncols]
    }

    /// Mutably borrow row `i`.
    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.data[i * self.ncols..(i + 1) * self.ncols]
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // zero-width matrices still yield `nrows` empty rows
        (0..self.nrows).map(move |i| self.row(i))
    }

    /// Copy column `j` into a new vector.
    pub fn column(&self, j: usize) -> Vec<f64> {
        (0..self.nrows).map(|i| self.data[i * self.ncols + j]).collect()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.nrows && col < self.ncols {
            Some(self.data[row * self.ncols + col])
        } else {
            None
        }
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.ncols + col] = value;
    }

    /// Flat row-major view of the data.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Keep only the listed columns, in the given order.
    pub fn select_columns(&self, columns: &[usize]) -> Self {
        let mut data = Vec::with_capacity(self.nrows * columns.len());
        for i in 0..self.nrows {
            let row = self.row(i);
            data.extend(columns.iter().map(|&j| row[j]));
        }
        Self {
            data,
            nrows: self.nrows,
            ncols: columns.len(),
        }
    }

    /// True when every entry is finite.
    pub fn all_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }

    /// Apply `f` to every element in place.
    pub fn map_inplace<F>(&mut self, f: F)
    where
        F: Fn(f64) -> f64,
    {
        for x in &mut self.data {
            *x = f(*x);
        }
    }

    /// Column means.
    pub fn column_means(&self) -> Vec<f64> {
        let mut means = vec![0.0; self.ncols];
        if self.nrows == 0 {
            return means;
        }
        for row in self.rows() {
            for (m, &x) in means.iter_mut().zip(row) {
                *m += x;
            }
        }
        let n = self.nrows as f64;
        means.iter_mut().for_each(|m| *m /= n);
        means
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[row * self.ncols + col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn from_row_major_validates_length() {
        assert!(Matrix::from_row_major(vec![1.0, 2.0, 3.0], 2, 2).is_err());
        let m = Matrix::from_row_major(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
        assert_eq!(m.shape(), (2, 2));
        assert_eq!(m[(1, 0)], 3.0);
    }

    #[test]
    fn from_rows_rejects_ragged() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(matches!(
            Matrix::from_rows(&rows),
            Err(EvalError::DimensionMismatch { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn select_columns_keeps_order() {
        let m = Matrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let s = m.select_columns(&[2, 0]);
        assert_eq!(s.shape(), (2, 2));
        assert_eq!(s.row(0), &[3.0, 1.0]);
        assert_eq!(s.row(1), &[6.0, 4.0]);
    }

    #[test]
    fn column_means_known() {
        let m = Matrix::from_rows(&[vec![1.0, 10.0], vec![3.0, 20.0]]).unwrap();
        let means = m.column_means();
        assert_relative_eq!(means[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(means[1], 15.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_width_matrix_still_has_rows() {
        let m = Matrix::zeros(3, 0);
        assert_eq!(m.rows().count(), 3);
        assert!(m.is_empty());
    }
}
