//! Evaluation of detectors on labeled series.
//!
//! [`ScoringDriver`] turns one series into an [`AucTable`], [`ResultStore`]
//! persists tables keyed by series id, and [`Runner`] drives a whole input
//! directory through both with a worker pool and a single result writer.

pub mod driver;
pub mod results;
pub mod runner;
pub mod store;

pub use driver::{ScoringDriver, AUC_DECIMALS};
pub use results::{AucTable, Representation};
pub use runner::{list_series_files, RunSummary, Runner};
pub use store::ResultStore;
