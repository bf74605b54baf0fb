//! Utility functions shared by the evaluation layer.

pub mod metrics;

pub use metrics::{roc_auc, round_to};
