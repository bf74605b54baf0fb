//! Experiment configuration.
//!
//! Defaults reproduce the reference experiment: four window sizes, the three
//! built-in detectors, the efficient feature profile and no normalization.
//! A JSON file named by [`CONFIG_ENV`] overrides any subset of fields.

use crate::detectors::MethodKind;
use crate::error::{EvalError, Result};
use crate::features::{ExtractionSettings, FeatureProfile};
use crate::transform::Normalization;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the path of an optional JSON config file.
pub const CONFIG_ENV: &str = "SUBSEQ_EVAL_CONFIG";

fn available_lanes() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn first_repeat<T: PartialEq>(items: &[T]) -> Option<&T> {
    items
        .iter()
        .enumerate()
        .find(|&(i, item)| items[..i].contains(item))
        .map(|(_, item)| item)
}

/// Settings of one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
    /// Directory scanned for labeled series files
    pub input_dir: PathBuf,
    /// JSON result store
    pub results_path: PathBuf,
    /// Window sizes, in result row order
    pub window_sizes: Vec<usize>,
    /// Detection methods, in result column order
    pub methods: Vec<MethodKind>,
    pub profile: FeatureProfile,
    /// Threads used by feature extraction
    pub feature_lanes: usize,
    /// Series evaluated concurrently
    pub workers: usize,
    pub normalization: Normalization,
    /// Seed for randomized detectors
    pub seed: u64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("Data"),
            results_path: PathBuf::from("results/efficient_no_norm_auc.json"),
            window_sizes: vec![32, 64, 128, 256],
            methods: vec![MethodKind::IsolationForest, MethodKind::Pca, MethodKind::Lof],
            profile: FeatureProfile::Efficient,
            feature_lanes: available_lanes(),
            workers: 1,
            normalization: Normalization::None,
            seed: 123,
        }
    }
}

impl ExperimentConfig {
    /// Config from the file named by [`CONFIG_ENV`], or the defaults.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(path),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| EvalError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| EvalError::Parse(format!("experiment config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_sizes.is_empty() {
            return Err(EvalError::InvalidParameter(
                "at least one window size is required".to_string(),
            ));
        }
        if self.window_sizes.contains(&0) {
            return Err(EvalError::InvalidParameter(
                "window sizes must be at least 1".to_string(),
            ));
        }
        if let Some(size) = first_repeat(&self.window_sizes) {
            return Err(EvalError::InvalidParameter(format!(
                "window size {size} is listed twice"
            )));
        }
        if self.methods.is_empty() {
            return Err(EvalError::InvalidParameter(
                "at least one method is required".to_string(),
            ));
        }
        if let Some(method) = first_repeat(&self.methods) {
            return Err(EvalError::InvalidParameter(format!(
                "method {method} is listed twice"
            )));
        }
        if self.workers == 0 {
            return Err(EvalError::InvalidParameter(
                "workers must be at least 1".to_string(),
            ));
        }
        if self.feature_lanes == 0 {
            return Err(EvalError::InvalidParameter(
                "feature_lanes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Feature extraction settings derived from this config.
    pub fn extraction(&self) -> ExtractionSettings {
        ExtractionSettings::new(self.profile).with_lanes(self.feature_lanes)
    }

    /// Set the input directory.
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = dir.into();
        self
    }

    /// Set the result store path.
    pub fn results_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.results_path = path.into();
        self
    }

    pub fn window_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.window_sizes = sizes;
        self
    }

    pub fn methods(mut self, methods: Vec<MethodKind>) -> Self {
        self.methods = methods;
        self
    }

    pub fn profile(mut self, profile: FeatureProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn feature_lanes(mut self, lanes: usize) -> Self {
        self.feature_lanes = lanes;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ExperimentConfig::default();
        assert_eq!(config.window_sizes, vec![32, 64, 128, 256]);
        assert_eq!(
            config.methods,
            vec![MethodKind::IsolationForest, MethodKind::Pca, MethodKind::Lof]
        );
        assert_eq!(config.profile, FeatureProfile::Efficient);
        assert_eq!(config.workers, 1);
        assert_eq!(config.seed, 123);
        assert!(config.feature_lanes >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_overrides_defaults() {
        let config = ExperimentConfig::from_json_str(
            r#"{"window_sizes": [16], "methods": ["LOF", "IF"], "profile": "minimal",
                "normalization": "z_score", "workers": 3}"#,
        )
        .unwrap();
        assert_eq!(config.window_sizes, vec![16]);
        assert_eq!(config.methods, vec![MethodKind::Lof, MethodKind::IsolationForest]);
        assert_eq!(config.profile, FeatureProfile::Minimal);
        assert_eq!(config.normalization, Normalization::ZScore);
        assert_eq!(config.workers, 3);
        assert_eq!(config.input_dir, PathBuf::from("Data"));
    }

    #[test]
    fn invalid_configs_are_rejected() {
        assert!(ExperimentConfig::from_json_str(r#"{"window_sizes": []}"#).is_err());
        assert!(ExperimentConfig::from_json_str(r#"{"window_sizes": [0, 8]}"#).is_err());
        assert!(ExperimentConfig::from_json_str(r#"{"methods": []}"#).is_err());
        assert!(ExperimentConfig::from_json_str(r#"{"workers": 0}"#).is_err());
        assert!(ExperimentConfig::from_json_str(r#"{"methods": ["KNN"]}"#).is_err());
        assert!(ExperimentConfig::from_json_str(r#"{"window": 3}"#).is_err());
    }

    #[test]
    fn repeated_keys_are_rejected() {
        let sizes = ExperimentConfig::default().window_sizes(vec![8, 16, 8]);
        assert!(matches!(sizes.validate(), Err(EvalError::InvalidParameter(_))));

        let methods = ExperimentConfig::default().methods(vec![MethodKind::Pca, MethodKind::Pca]);
        assert!(matches!(methods.validate(), Err(EvalError::InvalidParameter(_))));

        assert!(ExperimentConfig::from_json_str(r#"{"window_sizes": [8, 8]}"#).is_err());
    }

    #[test]
    fn builder_setters() {
        let config = ExperimentConfig::default()
            .input_dir("series")
            .window_sizes(vec![8, 4])
            .feature_lanes(2)
            .seed(7);
        assert_eq!(config.input_dir, PathBuf::from("series"));
        assert_eq!(config.window_sizes, vec![8, 4]);
        assert_eq!(config.extraction().lanes, 2);
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn from_file_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"seed": 5}"#).unwrap();
        assert_eq!(ExperimentConfig::from_file(&path).unwrap().seed, 5);
        assert!(ExperimentConfig::from_file(dir.path().join("missing.json")).is_err());
    }
}
