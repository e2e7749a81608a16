//! California Housing Price Modeling
//!
//! Trains and compares regression models on a tabular housing dataset built
//! on Polars and ndarray, picks the one with the lowest held-out RMSE, and
//! explains it with a feature-importance chart.
//!
//! # Overview
//!
//! One run of the pipeline:
//!
//! - **Configuration**: YAML settings, validated once and immutable afterwards
//! - **Data Access**: CSV loading, target extraction and a seeded train/test split
//! - **Feature Engineering**: domain ratios, then median/mode imputation,
//!   standard scaling and one-hot encoding fitted on the training rows only
//! - **Modeling**: an elastic net and a histogram gradient boosting regressor,
//!   evaluated on r2, MAE, RMSE and MAPE
//! - **Explainability**: coefficient magnitudes or permutation importance,
//!   rendered as a PNG bar chart
//! - **Reporting**: `metrics.json` with every model's scores and the winner
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use housing_prices::run_pipeline;
//!
//! let result = run_pipeline("config/project.yaml")?;
//! println!("Best model: {}", result.best_model);
//! println!("Metrics written to: {}", result.metrics_path.display());
//! ```
//!
//! # Configuration
//!
//! ```yaml
//! project_name: california-housing
//! raw_data_path: data/raw/housing.csv
//! target_column: median_house_value
//! test_size: 0.2
//! random_state: 42
//! alpha: 0.001
//! l1_ratio: 0.2
//! gradient_boosting:
//!   learning_rate: 0.05
//!   max_depth: 6
//!   n_estimators: 400
//! top_feature_count: 12
//! report_dir: reports
//! ```
//!
//! See [`config::Settings`] for every key and its default.

pub mod config;
pub mod data;
pub mod error;
pub mod explain;
pub mod features;
pub mod imputers;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{DEFAULT_CONFIG_PATH, GradientBoostingSettings, Settings, load_settings};
pub use data::{TrainTestSplit, load_raw_data, make_train_test_split, split_features_targets};
pub use error::{
    ConfigError, DataError, EvaluationError, ExplainabilityError, HousingError, Result,
    ResultExt, TrainingError,
};
pub use explain::{
    PermutationOptions, extract_feature_importances, plot_feature_importance,
};
pub use features::{
    ColumnSchema, Preprocessor, build_preprocessor, engineer_domain_features, get_feature_names,
};
pub use imputers::StatisticalImputer;
pub use metrics::RegressionMetrics;
pub use models::{
    ImportanceCapability, ModelPipeline, ModelRegistry, Regressor, build_model_registry,
    evaluate_models, fit_models, select_best_model,
};
pub use pipeline::{
    ClosureProgressReporter, PipelineRunner, PipelineStage, ProgressReporter, ProgressUpdate,
    run_pipeline,
};
pub use reporting::write_metrics_report;
pub use types::PipelineResult;
