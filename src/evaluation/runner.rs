//! Run lifecycle: scan inputs, evaluate series on a worker pool, persist
//! results through a single writer.

use super::driver::ScoringDriver;
use super::results::AucTable;
use super::store::ResultStore;
use crate::config::ExperimentConfig;
use crate::core::LabeledSeries;
use crate::detectors::MethodRegistry;
use crate::error::{EvalError, Result};
use rayon::prelude::*;
use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use tracing::{error, info, warn};

/// Outcome of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Series whose table was written to the store, sorted.
    pub processed: Vec<String>,
    /// `(series id, error)` for series that could not be evaluated or stored, sorted.
    pub failed: Vec<(String, String)>,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Regular files of `dir`, sorted by name.
pub fn list_series_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).map_err(|e| EvalError::Io(format!("{}: {e}", dir.display())))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause")
}

fn series_id(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Evaluates every series of a config.
#[derive(Debug)]
pub struct Runner {
    config: ExperimentConfig,
    registry: MethodRegistry,
}

impl Runner {
    pub fn new(config: ExperimentConfig) -> Result<Self> {
        config.validate()?;
        let registry = MethodRegistry::from_kinds(&config.methods, config.seed)?;
        Ok(Self { config, registry })
    }

    /// Replaces the built-in methods with a custom registry.
    pub fn with_registry(mut self, registry: MethodRegistry) -> Result<Self> {
        if registry.is_empty() {
            return Err(EvalError::InvalidParameter(
                "method registry is empty".to_string(),
            ));
        }
        self.registry = registry;
        Ok(self)
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Evaluates every regular file of the configured input directory.
    pub fn run(&self) -> Result<RunSummary> {
        let files = list_series_files(&self.config.input_dir)?;
        info!(
            files = files.len(),
            input_dir = %self.config.input_dir.display(),
            "starting evaluation"
        );
        self.run_files(&files)
    }

    /// Evaluates `files`, merging each finished table into the store.
    ///
    /// Returns once the writer has drained every result.
    pub fn run_files(&self, files: &[PathBuf]) -> Result<RunSummary> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .build()
            .map_err(|e| EvalError::ComputationError(format!("worker pool: {e}")))?;

        let (tx, rx) = mpsc::channel::<(String, AucTable)>();
        let store = ResultStore::new(&self.config.results_path);
        let writer = thread::spawn(move || {
            let mut written = Vec::new();
            let mut failed = Vec::new();
            for (id, table) in rx {
                match store.merge(&id, &table) {
                    Ok(()) => written.push(id),
                    Err(e) => {
                        error!(series = %id, error = %e, "failed to store results");
                        failed.push((id, e.to_string()));
                    }
                }
            }
            (written, failed)
        });

        let driver = ScoringDriver::new(&self.registry, self.config.extraction())
            .with_normalization(self.config.normalization);
        let window_sizes = &self.config.window_sizes;

        let mut failed: Vec<(String, String)> = pool.install(|| {
            files
                .par_iter()
                .map_with(tx, |tx, path| {
                    let id = series_id(path);
                    info!(series = %id, "evaluating series");
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                        LabeledSeries::from_csv(path)
                            .and_then(|series| driver.evaluate(&series, window_sizes))
                    }))
                    .unwrap_or_else(|payload| {
                        Err(EvalError::ComputationError(format!(
                            "evaluation panicked: {}",
                            panic_message(payload.as_ref())
                        )))
                    });
                    match outcome {
                        Ok(table) => {
                            info!(
                                series = %id,
                                computed = table.computed_cells(),
                                total = table.total_cells(),
                                "series finished"
                            );
                            tx.send((id.clone(), table)).err().map(|_| {
                                (id, "result writer stopped".to_string())
                            })
                        }
                        Err(e) => {
                            warn!(series = %id, error = %e, "series failed");
                            Some((id, e.to_string()))
                        }
                    }
                })
                .flatten()
                .collect()
        });

        let (mut processed, store_failures) = writer
            .join()
            .map_err(|_| EvalError::ComputationError("result writer panicked".to_string()))?;
        failed.extend(store_failures);

        processed.sort();
        failed.sort();
        info!(
            processed = processed.len(),
            failed = failed.len(),
            "evaluation finished"
        );
        Ok(RunSummary { processed, failed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Matrix;
    use crate::detectors::{AnomalyDetector, BoxedDetector, MethodKind, MethodSpec};
    use crate::features::FeatureProfile;
    use std::io::Write;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn write_series(dir: &Path, name: &str, anomaly_at: usize) {
        let mut file = fs::File::create(dir.join(name)).unwrap();
        writeln!(file, "value,label").unwrap();
        for i in 0..80 {
            let (value, label) = if (anomaly_at..anomaly_at + 3).contains(&i) {
                (8.0, 1)
            } else {
                ((i as f64 * 0.5).sin(), 0)
            };
            writeln!(file, "{value},{label}").unwrap();
        }
    }

    fn config(input: &Path, results: &Path) -> ExperimentConfig {
        ExperimentConfig::default()
            .input_dir(input)
            .results_path(results)
            .window_sizes(vec![8, 16])
            .methods(vec![MethodKind::Pca, MethodKind::Lof])
            .profile(FeatureProfile::Minimal)
            .feature_lanes(1)
    }

    #[test]
    fn lists_files_sorted_and_skips_directories() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.csv"), "").unwrap();
        fs::write(dir.path().join("a.csv"), "").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        let files = list_series_files(dir.path()).unwrap();
        let names: Vec<String> = files.iter().map(|p| series_id(p)).collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
    }

    #[test]
    fn bad_series_does_not_stop_the_run() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        write_series(input.path(), "good.csv", 40);
        fs::write(input.path().join("broken.csv"), "value,label\nabc,0\n").unwrap();
        write_series(input.path(), "early.csv", 2);

        let results = output.path().join("auc.json");
        let summary = Runner::new(config(input.path(), &results)).unwrap().run().unwrap();

        assert_eq!(summary.processed, vec!["early.csv", "good.csv"]);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, "broken.csv");

        let store = ResultStore::new(&results);
        let entries = store.load().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries["good.csv"]["TS"].as_array().unwrap().len(), 2);
    }

    struct Exploding;

    impl AnomalyDetector for Exploding {
        fn fit(&mut self, _data: &Matrix) -> Result<()> {
            panic!("detector exploded");
        }
        fn anomaly_scores(&self, _data: &Matrix) -> Result<Vec<f64>> {
            Err(EvalError::FitRequired)
        }
        fn name(&self) -> &str {
            "BOOM"
        }
        fn is_fitted(&self) -> bool {
            false
        }
    }

    #[test]
    fn panicking_series_is_reported_and_others_finish() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        write_series(input.path(), "a.csv", 30);
        write_series(input.path(), "b.csv", 50);

        let mut registry = MethodRegistry::new();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        // only the first detector ever created panics
        registry
            .register(MethodSpec::new("PCA", move || -> BoxedDetector {
                if flag.swap(true, Ordering::SeqCst) {
                    MethodKind::Pca.create(0)
                } else {
                    Box::new(Exploding)
                }
            }))
            .unwrap();

        let results = output.path().join("auc.json");
        let summary = Runner::new(config(input.path(), &results))
            .unwrap()
            .with_registry(registry)
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(summary.processed.len(), 1);
        assert_eq!(summary.failed.len(), 1);
        assert!(summary.failed[0].1.contains("detector exploded"));
        assert_eq!(ResultStore::new(&results).load().unwrap().len(), 1);
    }

    #[test]
    fn several_workers_write_every_series() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        for k in 0..6 {
            write_series(input.path(), &format!("s{k}.csv"), 20 + 5 * k);
        }
        let results = output.path().join("auc.json");
        let summary = Runner::new(config(input.path(), &results).workers(3))
            .unwrap()
            .run()
            .unwrap();
        assert!(summary.is_clean());
        assert_eq!(summary.processed.len(), 6);
        assert_eq!(ResultStore::new(&results).load().unwrap().len(), 6);
    }

    #[test]
    fn missing_input_directory_is_an_error() {
        let output = tempdir().unwrap();
        let cfg = config(&output.path().join("absent"), &output.path().join("auc.json"));
        assert!(Runner::new(cfg).unwrap().run().is_err());
    }

    #[test]
    fn empty_registry_is_rejected() {
        let dir = tempdir().unwrap();
        let runner = Runner::new(config(dir.path(), &dir.path().join("auc.json"))).unwrap();
        assert!(runner.with_registry(MethodRegistry::new()).is_err());
    }
}
