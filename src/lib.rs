//! # subseq-eval
//!
//! Benchmark of unsupervised anomaly detectors on labeled univariate series.
//!
//! Each series is cut into sliding windows of several sizes. Isolation
//! Forest, PCA reconstruction error and Local Outlier Factor are fitted on
//! the raw windows and on tsfresh-style features extracted from them, and
//! the ROC AUC of every combination is stored in a JSON result file.

pub mod config;
pub mod core;
pub mod detectors;
pub mod error;
pub mod evaluation;
pub mod features;
pub mod transform;
pub mod utils;

pub use error::{EvalError, Result};

pub mod prelude {
    pub use crate::config::ExperimentConfig;
    pub use crate::core::{LabeledSeries, Matrix};
    pub use crate::detectors::{AnomalyDetector, MethodKind, MethodRegistry, MethodSpec};
    pub use crate::error::{EvalError, Result};
    pub use crate::evaluation::{AucTable, Representation, ResultStore, Runner, ScoringDriver};
    pub use crate::features::{ExtractionSettings, FeatureProfile};
    pub use crate::utils::roc_auc;
}
