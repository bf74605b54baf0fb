//! Labeled univariate series and CSV ingestion.

use crate::error::{EvalError, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

/// A univariate time series with one binary anomaly label per point.
///
/// Immutable once constructed; `labels[i] == 1` marks point `i` as anomalous.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSeries {
    id: String,
    values: Vec<f64>,
    labels: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct Record {
    value: f64,
    label: f64,
}

impl LabeledSeries {
    /// Build a series after validating lengths and label domain.
    pub fn new(id: impl Into<String>, values: Vec<f64>, labels: Vec<u8>) -> Result<Self> {
        if values.is_empty() {
            return Err(EvalError::EmptyData);
        }
        if values.len() != labels.len() {
            return Err(EvalError::DimensionMismatch {
                expected: values.len(),
                got: labels.len(),
            });
        }
        if let Some(pos) = labels.iter().position(|&l| l > 1) {
            return Err(EvalError::InvalidParameter(format!(
                "label at index {pos} must be 0 or 1, got {}",
                labels[pos]
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(EvalError::MissingValues);
        }
        Ok(Self {
            id: id.into(),
            values,
            labels,
        })
    }

    /// Read a delimited file with a header containing `value` and `label`.
    ///
    /// The file name becomes the series identifier. Additional columns are
    /// ignored. Rows are taken in file order.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let id = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| EvalError::InvalidParameter(format!("{} has no file name", path.display())))?;
        let file = File::open(path).map_err(|err| {
            EvalError::Io(format!("failed to open {}: {err}", path.display()))
        })?;
        Self::from_reader(id, file)
    }

    /// Parse CSV content from any reader.
    pub fn from_reader<R: std::io::Read>(id: impl Into<String>, reader: R) -> Result<Self> {
        let id = id.into();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut values = Vec::new();
        let mut labels = Vec::new();
        for (row, record) in reader.deserialize::<Record>().enumerate() {
            let record = record
                .map_err(|err| EvalError::Parse(format!("{id}: row {}: {err}", row + 1)))?;
            let label = match record.label {
                l if l == 0.0 => 0,
                l if l == 1.0 => 1,
                other => {
                    return Err(EvalError::Parse(format!(
                        "{id}: row {}: label must be 0 or 1, got {other}",
                        row + 1
                    )))
                }
            };
            values.push(record.value);
            labels.push(label);
        }

        Self::new(id, values, labels)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of points labeled anomalous.
    pub fn anomaly_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l == 1).count()
    }
}
