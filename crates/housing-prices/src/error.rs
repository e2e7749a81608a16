//! Error types for the housing-price modeling pipeline.
//!
//! Every stage has its own `thiserror` enum so callers can match on the
//! category that failed. [`HousingError`] wraps them all and is the error
//! type returned by the public API.
//!
//! No stage recovers from another stage's failure: errors abort the run and
//! carry the offending path, column or model name.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration document could not be turned into [`Settings`](crate::Settings).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("Configuration file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The document is not valid YAML, or not a key/value mapping.
    #[error("Failed to parse configuration '{}': {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// A required key is missing, has the wrong type, or is out of range.
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Dataset loading, splitting or schema problems.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Expected dataset at {} not found", path.display())]
    DatasetNotFound { path: PathBuf },

    #[error("Column '{0}' not present in dataframe")]
    MissingColumn(String),

    /// Column types or column set do not match what a stage expects.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The train/test partition would leave one side without rows.
    #[error("Cannot split {rows} rows with test_size {test_size}: one partition would be empty")]
    EmptySplit { rows: usize, test_size: f64 },
}

/// A candidate model failed to train.
#[derive(Error, Debug)]
pub enum TrainingError {
    #[error("Failed to fit model '{model}': {reason}")]
    Fit { model: String, reason: String },
}

#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("No metrics provided for selection")]
    EmptyMetrics,

    /// Prediction length disagrees with the number of targets.
    #[error("Model '{model}' produced {predicted} predictions for {expected} targets")]
    PredictionLength {
        model: String,
        predicted: usize,
        expected: usize,
    },
}

#[derive(Error, Debug)]
pub enum ExplainabilityError {
    /// Neither native importances nor sample data are available.
    #[error("Model '{0}' does not expose feature importances or coefficients and no data was provided for permutation importance")]
    UnsupportedModel(String),

    #[error("No feature importances to plot")]
    EmptyImportances,

    /// Importance vector and feature names disagree in length.
    #[error("Got {actual} importance scores for {expected} feature names")]
    LengthMismatch { expected: usize, actual: usize },
}

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum HousingError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Training(#[from] TrainingError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error(transparent)]
    Explainability(#[from] ExplainabilityError),

    /// A transform or estimator was used before `fit`.
    #[error("{0} has not been fitted")]
    NotFitted(&'static str),

    /// Chart rendering failed inside the plotting backend.
    #[error("Failed to render chart: {0}")]
    Chart(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<HousingError>,
    },
}

impl HousingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        HousingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code, independent of the message text.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(ConfigError::NotFound { .. }) => "CONFIG_NOT_FOUND",
            Self::Config(ConfigError::Parse { .. }) => "CONFIG_PARSE_ERROR",
            Self::Config(ConfigError::Validation(_)) => "CONFIG_VALIDATION_ERROR",
            Self::Data(DataError::DatasetNotFound { .. }) => "DATASET_NOT_FOUND",
            Self::Data(DataError::MissingColumn(_)) => "MISSING_COLUMN",
            Self::Data(DataError::SchemaMismatch(_)) => "SCHEMA_MISMATCH",
            Self::Data(DataError::EmptySplit { .. }) => "EMPTY_SPLIT",
            Self::Training(TrainingError::Fit { .. }) => "FIT_ERROR",
            Self::Evaluation(EvaluationError::EmptyMetrics) => "EMPTY_METRICS",
            Self::Evaluation(EvaluationError::PredictionLength { .. }) => "PREDICTION_LENGTH",
            Self::Explainability(ExplainabilityError::UnsupportedModel(_)) => "UNSUPPORTED_MODEL",
            Self::Explainability(ExplainabilityError::EmptyImportances) => "EMPTY_IMPORTANCES",
            Self::Explainability(ExplainabilityError::LengthMismatch { .. }) => {
                "IMPORTANCE_LENGTH_MISMATCH"
            }
            Self::NotFitted(_) => "NOT_FITTED",
            Self::Chart(_) => "CHART_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Process exit code for the command-line surface, one per category.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Data(_) | Self::Polars(_) => 3,
            Self::Training(_) => 4,
            Self::Evaluation(_) => 5,
            Self::Explainability(_) | Self::Chart(_) => 6,
            Self::Io(_) | Self::Json(_) => 7,
            Self::NotFitted(_) => 1,
            Self::WithContext { source, .. } => source.exit_code(),
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, HousingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<HousingError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }
}
