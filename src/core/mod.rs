//! Core data structures: labeled series and dense matrices.

mod matrix;
mod series;

pub use matrix::Matrix;
pub use series::LabeledSeries;
