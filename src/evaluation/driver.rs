//! Scoring of one labeled series across window sizes, methods and
//! representations.

use super::results::{AucTable, Representation};
use crate::core::{LabeledSeries, Matrix};
use crate::detectors::{AnomalyDetector, MethodRegistry, MethodSpec};
use crate::error::{EvalError, Result};
use crate::features::{clean_features, extract_features, ExtractionSettings};
use crate::transform::{
    aggregate_labels, normalize_windows, sliding_window, to_tidy, Normalization, WindowTable,
};
use crate::utils::{roc_auc, round_to};
use tracing::{debug, warn};

/// Decimal places kept for stored AUC values.
pub const AUC_DECIMALS: u32 = 3;

/// Fits every registered method on both representations of a series.
#[derive(Debug)]
pub struct ScoringDriver<'a> {
    registry: &'a MethodRegistry,
    extraction: ExtractionSettings,
    normalization: Normalization,
}

impl<'a> ScoringDriver<'a> {
    pub fn new(registry: &'a MethodRegistry, extraction: ExtractionSettings) -> Self {
        Self {
            registry,
            extraction,
            normalization: Normalization::None,
        }
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    /// Empty table keyed by `window_sizes` and the registry's method names.
    pub fn empty_table(&self, window_sizes: &[usize]) -> Result<AucTable> {
        let methods = self.registry.names().into_iter().map(String::from).collect();
        AucTable::new(window_sizes.to_vec(), methods)
    }

    /// Scores `series` for every window size.
    ///
    /// A window size the series cannot support fails the whole series.
    /// Detector and metric failures only unset their own cell.
    pub fn evaluate(&self, series: &LabeledSeries, window_sizes: &[usize]) -> Result<AucTable> {
        let mut table = self.empty_table(window_sizes)?;
        for &size in window_sizes {
            self.evaluate_window_size(series, size, &mut table)?;
        }
        Ok(table)
    }

    /// Fills the row of `table` belonging to `size`.
    pub fn evaluate_window_size(
        &self,
        series: &LabeledSeries,
        size: usize,
        table: &mut AucTable,
    ) -> Result<()> {
        let mut windows = sliding_window(series.values(), size)?;
        let labels = aggregate_labels(series.labels(), size)?;
        normalize_windows(&mut windows, self.normalization);
        debug!(series = series.id(), window_size = size, windows = windows.len(), "windowed");

        let features = match self.feature_matrix(&windows, size) {
            Ok(matrix) => Some(matrix),
            Err(e) => {
                warn!(
                    series = series.id(),
                    window_size = size,
                    error = %e,
                    "feature representation unavailable"
                );
                None
            }
        };

        for spec in self.registry.iter() {
            let ts = self.score_cell(spec, windows.matrix(), &labels);
            self.record(table, series, Representation::Subsequences, size, spec, ts)?;

            if let Some(matrix) = &features {
                let fe = self.score_cell(spec, matrix, &labels);
                self.record(table, series, Representation::Features, size, spec, fe)?;
            }
        }
        Ok(())
    }

    fn feature_matrix(&self, windows: &WindowTable, size: usize) -> Result<Matrix> {
        let tidy = to_tidy(windows);
        let raw = extract_features(&tidy, &self.extraction)?;
        let report = clean_features(raw);
        if report.is_degenerate() {
            return Err(EvalError::DegenerateFeatures { window_size: size });
        }
        Ok(report.matrix.values)
    }

    /// Fresh detector, fit, score, AUC rounded for storage.
    fn score_cell(&self, spec: &MethodSpec, data: &Matrix, labels: &[u8]) -> Result<f64> {
        let mut detector = spec.create();
        let scores = detector.fit_scores(data)?;
        let auc = roc_auc(labels, &scores)?;
        Ok(round_to(auc, AUC_DECIMALS))
    }

    fn record(
        &self,
        table: &mut AucTable,
        series: &LabeledSeries,
        rep: Representation,
        size: usize,
        spec: &MethodSpec,
        outcome: Result<f64>,
    ) -> Result<()> {
        let value = match outcome {
            Ok(auc) => {
                debug!(
                    series = series.id(),
                    window_size = size,
                    method = spec.name,
                    representation = %rep,
                    auc,
                    "scored"
                );
                Some(auc)
            }
            Err(e) => {
                warn!(
                    series = series.id(),
                    window_size = size,
                    method = spec.name,
                    representation = %rep,
                    error = %e,
                    "cell failed"
                );
                None
            }
        };
        table.set(rep, size, spec.name, value)
    }
}
