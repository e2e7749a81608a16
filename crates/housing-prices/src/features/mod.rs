//! Feature construction: engineered domain ratios and the column-wise
//! preprocessing transform.

pub mod engineering;
pub mod preprocessor;
pub mod transformers;

pub use engineering::{ENGINEERED_COLUMNS, engineer_domain_features};
pub use preprocessor::{
    CATEGORICAL_FEATURES, ColumnSchema, Preprocessor, build_preprocessor, get_feature_names,
};
