//! Principal component reconstruction detector.
//!
//! Rows are centered (not scaled), the leading eigenvectors of the sample
//! covariance that explain at least `variance_ratio` of the total variance
//! are kept, and each row is scored by the squared norm of its residual
//! outside that subspace.

use super::{validate_query, validate_training, AnomalyDetector};
use crate::core::Matrix;
use crate::error::{EvalError, Result};
use nalgebra::{DMatrix, DVector, SymmetricEigen};

/// PCA reconstruction-error detector.
#[derive(Debug, Clone)]
pub struct PcaDetector {
    variance_ratio: f64,
    mean: Option<DVector<f64>>,
    /// Retained eigenvectors as columns.
    components: Option<DMatrix<f64>>,
}

impl Default for PcaDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl PcaDetector {
    pub fn new() -> Self {
        Self {
            variance_ratio: 0.75,
            mean: None,
            components: None,
        }
    }

    pub fn with_variance_ratio(mut self, ratio: f64) -> Self {
        self.variance_ratio = ratio;
        self
    }

    /// Number of retained components, once fitted.
    pub fn n_components(&self) -> Option<usize> {
        self.components.as_ref().map(|c| c.ncols())
    }
}

fn to_dmatrix(data: &Matrix) -> DMatrix<f64> {
    DMatrix::from_row_slice(data.nrows(), data.ncols(), data.as_slice())
}

impl AnomalyDetector for PcaDetector {
    fn fit(&mut self, data: &Matrix) -> Result<()> {
        validate_training(data)?;
        if data.nrows() < 2 {
            return Err(EvalError::InsufficientData {
                needed: 2,
                got: data.nrows(),
            });
        }
        if !(self.variance_ratio > 0.0 && self.variance_ratio <= 1.0) {
            return Err(EvalError::InvalidParameter(format!(
                "variance ratio must lie in (0, 1], got {}",
                self.variance_ratio
            )));
        }

        let x = to_dmatrix(data);
        let mean = x.row_mean().transpose();
        let centered = DMatrix::from_fn(x.nrows(), x.ncols(), |i, j| x[(i, j)] - mean[j]);
        let covariance = centered.transpose() * &centered / (data.nrows() - 1) as f64;

        let eigen = SymmetricEigen::new(covariance);
        let mut order: Vec<usize> = (0..eigen.eigenvalues.len()).collect();
        order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

        let total: f64 = eigen.eigenvalues.iter().map(|v| v.max(0.0)).sum();
        let mut kept = 0;
        if total > 0.0 {
            let mut explained = 0.0;
            for &i in &order {
                explained += eigen.eigenvalues[i].max(0.0);
                kept += 1;
                if explained / total >= self.variance_ratio - 1e-12 {
                    break;
                }
            }
        }

        let columns: Vec<DVector<f64>> = order[..kept]
            .iter()
            .map(|&i| eigen.eigenvectors.column(i).into_owned())
            .collect();
        let components = if columns.is_empty() {
            DMatrix::zeros(data.ncols(), 0)
        } else {
            DMatrix::from_columns(&columns)
        };

        self.mean = Some(mean);
        self.components = Some(components);
        Ok(())
    }

    fn anomaly_scores(&self, data: &Matrix) -> Result<Vec<f64>> {
        let (Some(mean), Some(components)) = (&self.mean, &self.components) else {
            return Err(EvalError::FitRequired);
        };
        validate_query(data, mean.len())?;

        Ok(data
            .rows()
            .map(|row| {
                let centered = DVector::from_column_slice(row) - mean;
                let projection = components * (components.transpose() * &centered);
                (centered - projection).norm_squared()
            })
            .collect())
    }

    fn name(&self) -> &str {
        "PCA"
    }

    fn is_fitted(&self) -> bool {
        self.components.is_some()
    }
}
