//! Local outlier factor.
//!
//! Density-based detector: a row whose local reachability density is low
//! compared to that of its `k` nearest neighbours gets a large factor.
//! The native output follows the `negative_outlier_factor` convention
//! (lower = more abnormal); [`AnomalyDetector::anomaly_scores`] returns its
//! negation so that higher means more anomalous like every other detector.

use super::{squared_distance, validate_query, validate_training, AnomalyDetector};
use crate::core::Matrix;
use crate::error::{EvalError, Result};

/// Added to mean reachability distances so duplicates keep a finite density.
const DENSITY_EPS: f64 = 1e-10;

#[derive(Debug, Clone)]
struct Fitted {
    training: Matrix,
    k: usize,
    k_distance: Vec<f64>,
    lrd: Vec<f64>,
    negative_outlier_factor: Vec<f64>,
}

/// Local outlier factor detector.
#[derive(Debug, Clone)]
pub struct LocalOutlierFactor {
    n_neighbors: usize,
    fitted: Option<Fitted>,
}

impl Default for LocalOutlierFactor {
    fn default() -> Self {
        Self::new()
    }
}

/// `(distance, index)` of the `k` nearest training rows to `query`.
///
/// Ties are broken by index; `skip` excludes one training row.
fn nearest(training: &Matrix, query: &[f64], k: usize, skip: Option<usize>) -> Vec<(f64, usize)> {
    let mut dists: Vec<(f64, usize)> = training
        .rows()
        .enumerate()
        .filter(|(j, _)| Some(*j) != skip)
        .map(|(j, row)| (squared_distance(query, row).sqrt(), j))
        .collect();
    dists.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    dists.truncate(k);
    dists
}

fn local_reachability_density(neighbors: &[(f64, usize)], k_distance: &[f64]) -> f64 {
    let reach: f64 = neighbors
        .iter()
        .map(|&(d, j)| d.max(k_distance[j]))
        .sum::<f64>()
        / neighbors.len() as f64;
    1.0 / (reach + DENSITY_EPS)
}

impl LocalOutlierFactor {
    /// Twenty neighbours, capped at `n - 1` on fit.
    pub fn new() -> Self {
        Self {
            n_neighbors: 20,
            fitted: None,
        }
    }

    pub fn with_neighbors(mut self, n_neighbors: usize) -> Self {
        self.n_neighbors = n_neighbors;
        self
    }

    /// Neighbour count actually used by the last fit.
    pub fn effective_neighbors(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.k)
    }

    /// Opposite of the outlier factor of each training row.
    ///
    /// Close to -1 for inliers, much lower for outliers.
    pub fn negative_outlier_factor(&self) -> Result<&[f64]> {
        self.fitted
            .as_ref()
            .map(|f| f.negative_outlier_factor.as_slice())
            .ok_or(EvalError::FitRequired)
    }

    /// Outlier factor of rows that were not part of the training data.
    fn novelty_factor(fitted: &Fitted, data: &Matrix) -> Vec<f64> {
        data.rows()
            .map(|row| {
                let neighbors = nearest(&fitted.training, row, fitted.k, None);
                let lrd = local_reachability_density(&neighbors, &fitted.k_distance);
                neighbors.iter().map(|&(_, j)| fitted.lrd[j]).sum::<f64>()
                    / neighbors.len() as f64
                    / lrd
            })
            .collect()
    }
}

impl AnomalyDetector for LocalOutlierFactor {
    fn fit(&mut self, data: &Matrix) -> Result<()> {
        validate_training(data)?;
        let n = data.nrows();
        if n < 2 {
            return Err(EvalError::InsufficientData { needed: 2, got: n });
        }
        if self.n_neighbors == 0 {
            return Err(EvalError::InvalidParameter(
                "n_neighbors must be at least 1".to_string(),
            ));
        }
        let k = self.n_neighbors.min(n - 1);

        let neighbors: Vec<Vec<(f64, usize)>> = (0..n)
            .map(|i| nearest(data, data.row(i), k, Some(i)))
            .collect();
        let k_distance: Vec<f64> = neighbors.iter().map(|nb| nb[k - 1].0).collect();
        let lrd: Vec<f64> = neighbors
            .iter()
            .map(|nb| local_reachability_density(nb, &k_distance))
            .collect();
        let negative_outlier_factor = neighbors
            .iter()
            .enumerate()
            .map(|(i, nb)| {
                let ratio = nb.iter().map(|&(_, j)| lrd[j]).sum::<f64>() / k as f64 / lrd[i];
                -ratio
            })
            .collect();

        self.fitted = Some(Fitted {
            training: data.clone(),
            k,
            k_distance,
            lrd,
            negative_outlier_factor,
        });
        Ok(())
    }

    fn anomaly_scores(&self, data: &Matrix) -> Result<Vec<f64>> {
        let fitted = self.fitted.as_ref().ok_or(EvalError::FitRequired)?;
        validate_query(data, fitted.training.ncols())?;

        if *data == fitted.training {
            return Ok(fitted.negative_outlier_factor.iter().map(|v| -v).collect());
        }
        Ok(Self::novelty_factor(fitted, data))
    }

    fn name(&self) -> &str {
        "LOF"
    }

    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid_with_outlier() -> Matrix {
        let mut rows: Vec<Vec<f64>> = (0..25)
            .map(|i| vec![(i % 5) as f64, (i / 5) as f64])
            .collect();
        rows.push(vec![20.0, 20.0]);
        Matrix::from_rows(&rows).unwrap()
    }

    #[test]
    fn scores_are_negated_native_factor() {
        let data = grid_with_outlier();
        let mut lof = LocalOutlierFactor::new();
        let scores = lof.fit_scores(&data).unwrap();
        let native = lof.negative_outlier_factor().unwrap();
        for (s, n) in scores.iter().zip(native) {
            assert_eq!(*s, -n);
        }
    }

    #[test]
    fn outlier_has_largest_factor() {
        let data = grid_with_outlier();
        let scores = LocalOutlierFactor::new().fit_scores(&data).unwrap();
        let last = scores[scores.len() - 1];
        assert!(scores[..25].iter().all(|&s| s < last));
        assert!(last > 2.0);
    }

    #[test]
    fn uniform_grid_factors_near_one() {
        let rows: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64]).collect();
        let data = Matrix::from_rows(&rows).unwrap();
        let scores = LocalOutlierFactor::new()
            .with_neighbors(2)
            .fit_scores(&data)
            .unwrap();
        // interior points of an evenly spaced line share one density
        for &s in &scores[3..37] {
            assert_relative_eq!(s, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn neighbors_capped_by_rows() {
        let data = Matrix::from_rows(&[vec![0.0], vec![1.0], vec![3.0]]).unwrap();
        let mut lof = LocalOutlierFactor::new();
        lof.fit(&data).unwrap();
        assert_eq!(lof.effective_neighbors(), Some(2));
    }

    #[test]
    fn novelty_scoring_of_far_point() {
        let data = grid_with_outlier();
        let mut lof = LocalOutlierFactor::new().with_neighbors(5);
        lof.fit(&data).unwrap();
        let query = Matrix::from_rows(&[vec![2.0, 2.0], vec![-30.0, 40.0]]).unwrap();
        let scores = lof.anomaly_scores(&query).unwrap();
        assert!(scores[1] > scores[0]);
    }

    #[test]
    fn native_output_requires_fit() {
        assert_eq!(
            LocalOutlierFactor::new().negative_outlier_factor().err(),
            Some(EvalError::FitRequired)
        );
    }
}
