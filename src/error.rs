//! Error types for the subseq-eval library.

use thiserror::Error;

/// Result type alias for evaluation operations.
pub type Result<T> = std::result::Result<T, EvalError>;

/// Errors that can occur while windowing, extracting, scoring or persisting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Detector has not been fitted yet.
    #[error("detector must be fitted before scoring")]
    FitRequired,

    /// Missing or non-finite values detected when not allowed.
    #[error("missing values detected in data")]
    MissingValues,

    /// Numerical failure inside a detector or calculator.
    #[error("computation error: {0}")]
    ComputationError(String),

    /// Feature cleaning removed every column.
    #[error("no usable features left for window size {window_size}")]
    DegenerateFeatures { window_size: usize },

    /// The ranking metric is undefined for the given labels.
    #[error("metric undefined: {0}")]
    UndefinedMetric(String),

    /// Filesystem failure.
    #[error("io error: {0}")]
    Io(String),

    /// Malformed input file.
    #[error("parse error: {0}")]
    Parse(String),

    /// JSON encoding or decoding failure.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for EvalError {
    fn from(err: std::io::Error) -> Self {
        EvalError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for EvalError {
    fn from(err: serde_json::Error) -> Self {
        EvalError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for EvalError {
    fn from(err: csv::Error) -> Self {
        EvalError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = EvalError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = EvalError::InsufficientData { needed: 32, got: 20 };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 32, got 20"
        );

        let err = EvalError::DegenerateFeatures { window_size: 64 };
        assert_eq!(
            err.to_string(),
            "no usable features left for window size 64"
        );

        let err = EvalError::UndefinedMetric("only one class present".to_string());
        assert_eq!(err.to_string(), "metric undefined: only one class present");

        let err = EvalError::FitRequired;
        assert_eq!(err.to_string(), "detector must be fitted before scoring");
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
        let err: EvalError = io.into();
        assert!(matches!(err, EvalError::Io(msg) if msg.contains("missing.json")));
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = EvalError::MissingValues;
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
