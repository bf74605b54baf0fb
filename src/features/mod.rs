//! Subsequence feature extraction.
//!
//! Computes a tsfresh-style catalog of statistics for every window of a
//! [`TidyTable`](crate::transform::TidyTable). Three profiles trade richness
//! for cost; per-window computation runs on a dedicated rayon pool.
//!
//! # Example
//!
//! ```
//! use subseq_eval::features::{extract_features, ExtractionSettings, FeatureProfile};
//! use subseq_eval::transform::{sliding_window, to_tidy};
//!
//! let values: Vec<f64> = (0..12).map(|v| v as f64).collect();
//! let tidy = to_tidy(&sliding_window(&values, 4).unwrap());
//!
//! let settings = ExtractionSettings::new(FeatureProfile::Minimal).with_lanes(2);
//! let features = extract_features(&tidy, &settings).unwrap();
//! assert_eq!(features.nrows(), 9);
//! assert_eq!(features.ncols(), 10);
//! ```

pub mod autocorrelation;
pub mod basic;
pub mod calculator;
pub mod change;
pub mod clean;
pub mod counting;
pub mod distribution;
pub mod entropy;
pub mod spectral;
pub mod trend;

pub use basic::{
    abs_energy, absolute_maximum, absolute_sum_of_changes, length, maximum, mean, mean_abs_change,
    mean_change, mean_n_absolute_max, mean_second_derivative_central, median, minimum,
    root_mean_square, standard_deviation, sum_values, variance,
    variance_larger_than_standard_deviation,
};
pub use calculator::{catalog, Calculator, WindowContext};
pub use clean::{clean_features, CleanReport};

use crate::core::Matrix;
use crate::error::{EvalError, Result};
use crate::transform::TidyTable;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Richness of the extracted feature set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureProfile {
    /// Ten summary statistics.
    Minimal,
    /// Every calculator except the quadratic-cost entropies.
    #[default]
    Efficient,
    /// Efficient plus sample and approximate entropy.
    Comprehensive,
}

/// Feature extraction settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionSettings {
    pub profile: FeatureProfile,
    /// Threads in the extraction pool.
    pub lanes: usize,
    /// Explicit calculator list used instead of the profile catalog.
    pub calculators: Option<Vec<Calculator>>,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            profile: FeatureProfile::default(),
            lanes: 1,
            calculators: None,
        }
    }
}

impl ExtractionSettings {
    pub fn new(profile: FeatureProfile) -> Self {
        Self {
            profile,
            ..Default::default()
        }
    }

    pub fn with_lanes(mut self, lanes: usize) -> Self {
        self.lanes = lanes;
        self
    }

    /// Compute exactly `calculators`, in order, ignoring the profile.
    pub fn with_calculators(mut self, calculators: Vec<Calculator>) -> Self {
        self.calculators = Some(calculators);
        self
    }

    /// Calculators that extraction will run.
    pub fn calculators(&self) -> Vec<Calculator> {
        match &self.calculators {
            Some(custom) => custom.clone(),
            None => catalog(self.profile),
        }
    }
}

/// One row per window id, one column per calculator.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub ids: Vec<String>,
    pub columns: Vec<String>,
    pub values: Matrix,
}

impl FeatureMatrix {
    pub fn new(ids: Vec<String>, columns: Vec<String>, values: Matrix) -> Result<Self> {
        if ids.len() != values.nrows() {
            return Err(EvalError::DimensionMismatch {
                expected: values.nrows(),
                got: ids.len(),
            });
        }
        if columns.len() != values.ncols() {
            return Err(EvalError::DimensionMismatch {
                expected: values.ncols(),
                got: columns.len(),
            });
        }
        Ok(Self {
            ids,
            columns,
            values,
        })
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    /// Keeps the given columns in the given order.
    pub fn select_columns(&self, keep: &[usize]) -> Self {
        Self {
            ids: self.ids.clone(),
            columns: keep.iter().map(|&j| self.columns[j].clone()).collect(),
            values: self.values.select_columns(keep),
        }
    }
}

/// Computes every calculator of the configured profile for every window.
///
/// Rows follow the id order of the tidy table. Values may be NaN or
/// infinite; see [`clean_features`].
pub fn extract_features(tidy: &TidyTable, settings: &ExtractionSettings) -> Result<FeatureMatrix> {
    if tidy.is_empty() {
        return Err(EvalError::EmptyData);
    }
    if !tidy.is_sorted() {
        return Err(EvalError::InvalidParameter(
            "tidy table must be sorted by (id, time)".to_string(),
        ));
    }
    if settings.lanes == 0 {
        return Err(EvalError::InvalidParameter(
            "extraction lanes must be at least 1".to_string(),
        ));
    }

    let calculators = settings.calculators();
    if calculators.is_empty() {
        return Err(EvalError::InvalidParameter(
            "no feature calculators selected".to_string(),
        ));
    }
    let groups = tidy.groups();
    debug!(
        windows = groups.len(),
        calculators = calculators.len(),
        lanes = settings.lanes,
        "extracting features"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(settings.lanes)
        .build()
        .map_err(|e| EvalError::ComputationError(format!("extraction pool: {e}")))?;

    let rows: Vec<Vec<f64>> = pool.install(|| {
        groups
            .par_iter()
            .map(|(_, values)| {
                let ctx = WindowContext::new(values);
                calculators.iter().map(|c| c.compute(&ctx)).collect()
            })
            .collect()
    });

    let ids = groups.iter().map(|(id, _)| id.to_string()).collect();
    let columns = calculators.iter().map(Calculator::name).collect();
    FeatureMatrix::new(ids, columns, Matrix::from_rows(&rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{sliding_window, to_tidy, TidyRow};
    use approx::assert_relative_eq;

    #[test]
    fn minimal_profile_values() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let tidy = to_tidy(&sliding_window(&values, 3).unwrap());
        let features = extract_features(&tidy, &ExtractionSettings::new(FeatureProfile::Minimal))
            .unwrap();

        assert_eq!(features.ids, vec!["w000000", "w000001", "w000002"]);
        let mean_col = features
            .columns
            .iter()
            .position(|c| c == "value__mean")
            .unwrap();
        assert_relative_eq!(features.values[(0, mean_col)], 2.0);
        assert_relative_eq!(features.values[(2, mean_col)], 4.0);
    }

    #[test]
    fn lane_count_does_not_change_result() {
        let values: Vec<f64> = (0..60).map(|i| ((i * 7) % 13) as f64).collect();
        let tidy = to_tidy(&sliding_window(&values, 16).unwrap());
        let one = extract_features(&tidy, &ExtractionSettings::default()).unwrap();
        let four =
            extract_features(&tidy, &ExtractionSettings::default().with_lanes(4)).unwrap();
        assert_eq!(one.columns, four.columns);
        for (a, b) in one.values.as_slice().iter().zip(four.values.as_slice()) {
            assert!(a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan()));
        }
    }

    #[test]
    fn unsorted_input_is_rejected() {
        let rows = vec![
            TidyRow {
                id: "w000001".into(),
                time: 0,
                value: 1.0,
            },
            TidyRow {
                id: "w000000".into(),
                time: 0,
                value: 2.0,
            },
        ];
        let tidy = TidyTable::from_rows_unchecked(rows);
        assert!(matches!(
            extract_features(&tidy, &ExtractionSettings::default()),
            Err(EvalError::InvalidParameter(_))
        ));
    }

    #[test]
    fn zero_lanes_is_rejected() {
        let tidy = to_tidy(&sliding_window(&[1.0, 2.0, 3.0], 2).unwrap());
        let settings = ExtractionSettings::default().with_lanes(0);
        assert!(extract_features(&tidy, &settings).is_err());
    }

    #[test]
    fn explicit_calculators_override_profile() {
        let tidy = to_tidy(&sliding_window(&[1.0, 4.0, 2.0, 8.0, 5.0], 4).unwrap());
        let settings = ExtractionSettings::new(FeatureProfile::Comprehensive)
            .with_calculators(vec![Calculator::Maximum, Calculator::Autocorrelation { lag: 9 }]);
        let features = extract_features(&tidy, &settings).unwrap();
        assert_eq!(
            features.columns,
            vec!["value__maximum", "value__autocorrelation__lag_9"]
        );
        assert_eq!(features.values[(1, 0)], 8.0);
        assert!(features.values[(0, 1)].is_nan());

        let none = ExtractionSettings::default().with_calculators(Vec::new());
        assert!(extract_features(&tidy, &none).is_err());
    }
}
