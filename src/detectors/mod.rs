//! Unsupervised anomaly detectors.
//!
//! Every detector is fitted on an observation matrix (rows = windows) and
//! reports one score per row where a larger score means more anomalous.
//! Detectors never see labels.
//!
//! # Example
//!
//! ```
//! use subseq_eval::core::Matrix;
//! use subseq_eval::detectors::{MethodKind, MethodRegistry};
//!
//! let rows: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64 % 3.0, 1.0]).collect();
//! let data = Matrix::from_rows(&rows).unwrap();
//!
//! let registry = MethodRegistry::from_kinds(&[MethodKind::Pca], 123).unwrap();
//! for spec in registry.iter() {
//!     let mut detector = spec.create();
//!     detector.fit(&data).unwrap();
//!     let scores = detector.anomaly_scores(&data).unwrap();
//!     assert_eq!(scores.len(), 30);
//! }
//! ```

pub mod isolation_forest;
pub mod lof;
pub mod pca;

pub use isolation_forest::IsolationForest;
pub use lof::LocalOutlierFactor;
pub use pca::PcaDetector;

use crate::core::Matrix;
use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Common interface of the anomaly detectors.
///
/// This trait is object-safe and can be used with `Box<dyn AnomalyDetector>`.
pub trait AnomalyDetector: Send {
    /// Fit the detector to the observation matrix.
    fn fit(&mut self, data: &Matrix) -> Result<()>;

    /// One score per row of `data`; higher means more anomalous.
    fn anomaly_scores(&self, data: &Matrix) -> Result<Vec<f64>>;

    fn name(&self) -> &str;

    fn is_fitted(&self) -> bool;

    /// Fit on `data` and score the same rows.
    fn fit_scores(&mut self, data: &Matrix) -> Result<Vec<f64>> {
        self.fit(data)?;
        self.anomaly_scores(data)
    }
}

pub type BoxedDetector = Box<dyn AnomalyDetector>;

/// Rejects empty or non-finite training data.
pub(crate) fn validate_training(data: &Matrix) -> Result<()> {
    if data.nrows() == 0 || data.ncols() == 0 {
        return Err(EvalError::EmptyData);
    }
    if !data.all_finite() {
        return Err(EvalError::MissingValues);
    }
    Ok(())
}

/// Rejects query data whose width differs from the training data.
pub(crate) fn validate_query(data: &Matrix, ncols: usize) -> Result<()> {
    if data.ncols() != ncols {
        return Err(EvalError::DimensionMismatch {
            expected: ncols,
            got: data.ncols(),
        });
    }
    if !data.all_finite() {
        return Err(EvalError::MissingValues);
    }
    Ok(())
}

/// Squared Euclidean distance.
pub(crate) fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Detection method identifiers, serialized by their short names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MethodKind {
    #[serde(rename = "IF")]
    IsolationForest,
    #[serde(rename = "PCA")]
    Pca,
    #[serde(rename = "LOF")]
    Lof,
}

impl MethodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodKind::IsolationForest => "IF",
            MethodKind::Pca => "PCA",
            MethodKind::Lof => "LOF",
        }
    }

    /// Fresh, unfitted detector of this kind.
    pub fn create(&self, seed: u64) -> BoxedDetector {
        match self {
            MethodKind::IsolationForest => Box::new(IsolationForest::new().with_seed(seed)),
            MethodKind::Pca => Box::new(PcaDetector::new()),
            MethodKind::Lof => Box::new(LocalOutlierFactor::new()),
        }
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named detector factory.
pub struct MethodSpec {
    pub name: &'static str,
    factory: Box<dyn Fn() -> BoxedDetector + Send + Sync>,
}

impl MethodSpec {
    pub fn new<F>(name: &'static str, factory: F) -> Self
    where
        F: Fn() -> BoxedDetector + Send + Sync + 'static,
    {
        Self {
            name,
            factory: Box::new(factory),
        }
    }

    /// Spec for a built-in method.
    pub fn from_kind(kind: MethodKind, seed: u64) -> Self {
        Self::new(kind.as_str(), move || kind.create(seed))
    }

    /// Create a new, unfitted detector.
    pub fn create(&self) -> BoxedDetector {
        (self.factory)()
    }
}

impl fmt::Debug for MethodSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodSpec").field("name", &self.name).finish()
    }
}

/// Ordered collection of method specs; order is the result column order.
#[derive(Debug, Default)]
pub struct MethodRegistry {
    methods: Vec<MethodSpec>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self {
            methods: Vec::new(),
        }
    }

    /// Registry holding the built-in methods in the given order.
    pub fn from_kinds(kinds: &[MethodKind], seed: u64) -> Result<Self> {
        let mut registry = Self::new();
        for &kind in kinds {
            registry.register(MethodSpec::from_kind(kind, seed))?;
        }
        Ok(registry)
    }

    /// Appends `spec`; names must be unique since they key result columns.
    pub fn register(&mut self, spec: MethodSpec) -> Result<()> {
        if self.methods.iter().any(|m| m.name == spec.name) {
            return Err(EvalError::InvalidParameter(format!(
                "method {} is registered twice",
                spec.name
            )));
        }
        self.methods.push(spec);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MethodSpec> {
        self.methods.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.methods.iter().map(|m| m.name).collect()
    }
}
