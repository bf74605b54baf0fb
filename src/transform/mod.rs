//! Data transformations from a labeled series to model-ready tables.
//!
//! Provides sliding windows, window-level label aggregation, per-window
//! normalization and the tidy reshape consumed by the feature extractor.
//!
//! # Example
//!
//! ```
//! use subseq_eval::transform::{aggregate_labels, sliding_window, to_tidy};
//!
//! let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
//! let labels = vec![0, 0, 1, 0, 0];
//!
//! let table = sliding_window(&values, 3).unwrap();
//! let window_labels = aggregate_labels(&labels, 3).unwrap();
//! assert_eq!(table.len(), window_labels.len());
//!
//! let tidy = to_tidy(&table);
//! assert_eq!(tidy.len(), 9);
//! ```

pub mod scale;
pub mod tidy;
pub mod window;

pub use scale::{normalize_windows, standardize, Normalization};
pub use tidy::{to_tidy, TidyRow, TidyTable};
pub use window::{aggregate_labels, sliding_window, window_count, window_id, WindowTable};
