//! Model explanation: feature importances and their chart.

pub mod chart;
pub mod importance;

pub use chart::{plot_feature_importance, top_features};
pub use importance::{PermutationOptions, extract_feature_importances, permutation_importance};
