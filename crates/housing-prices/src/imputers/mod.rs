//! Imputation of missing values.
//!
//! Imputers are split into a `fit` step that learns a fill value from
//! training data and a `fill` step that applies it to any partition.

mod statistical;

pub use statistical::StatisticalImputer;
