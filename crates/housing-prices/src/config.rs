//! Project configuration.
//!
//! Settings are read once per run from a YAML document and are immutable
//! afterwards. Parsing happens in two passes so that malformed YAML and a
//! well-formed document with bad keys produce different errors:
//!
//! 1. text → [`serde_yaml::Value`] ([`ConfigError::Parse`] on failure)
//! 2. value → [`Settings`] plus range checks ([`ConfigError::Validation`])
//!
//! # Example
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
//! ```

use crate::error::ConfigError;
use crate::features::CATEGORICAL_FEATURES;
use crate::utils::resolve_path;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default location of the configuration document.
pub const DEFAULT_CONFIG_PATH: &str = "config/project.yaml";

/// File name of the metrics report inside the report directory.
pub const METRICS_FILE_NAME: &str = "metrics.json";

/// Hyper-parameters for the histogram gradient boosting model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GradientBoostingSettings {
    /// Shrinkage applied to every tree's leaf values.
    /// Default: 0.1
    pub learning_rate: f64,

    /// Maximum depth of each tree (edges from root to the deepest leaf).
    /// Default: 5
    pub max_depth: usize,

    /// Number of boosting iterations.
    /// Default: 300
    pub n_estimators: usize,
}

impl Default for GradientBoostingSettings {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            max_depth: 5,
            n_estimators: 300,
        }
    }
}

/// Raw shape of the document; required keys are non-optional so serde
/// reports them by name when absent.
#[derive(Debug, Deserialize)]
struct RawSettings {
    project_name: String,
    raw_data_path: PathBuf,
    target_column: String,
    test_size: f64,
    random_state: u64,
    alpha: f64,
    l1_ratio: f64,
    #[serde(default)]
    gradient_boosting: GradientBoostingSettings,
    #[serde(default = "default_top_feature_count")]
    top_feature_count: usize,
    #[serde(default = "default_report_dir")]
    report_dir: PathBuf,
    #[serde(default = "default_permutation_seed")]
    permutation_seed: u64,
    #[serde(default = "default_permutation_repeats")]
    permutation_repeats: usize,
    #[serde(default = "default_categorical_columns")]
    categorical_columns: Vec<String>,
}

fn default_top_feature_count() -> usize {
    10
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_permutation_seed() -> u64 {
    42
}

fn default_permutation_repeats() -> usize {
    10
}

fn default_categorical_columns() -> Vec<String> {
    CATEGORICAL_FEATURES.iter().map(|c| c.to_string()).collect()
}

/// Validated, immutable project settings.
///
/// Paths are absolute: relative entries in the document are resolved against
/// the working directory at load time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub project_name: String,
    pub raw_data_path: PathBuf,
    pub target_column: String,
    /// Fraction of rows held out for evaluation, in (0, 1).
    pub test_size: f64,
    /// Seed for the train/test partition.
    pub random_state: u64,
    /// Elastic net regularization strength.
    pub alpha: f64,
    /// Elastic net L1 share, in [0, 1].
    pub l1_ratio: f64,
    pub gradient_boosting: GradientBoostingSettings,
    /// Number of features shown in the importance chart.
    pub top_feature_count: usize,
    pub report_dir: PathBuf,
    /// Seed for permutation importance, independent of `random_state`.
    pub permutation_seed: u64,
    pub permutation_repeats: usize,
    /// Columns treated as categorical; every other feature column is numeric.
    pub categorical_columns: Vec<String>,
}

static_assertions::assert_impl_all!(Settings: Send, Sync);

impl Settings {
    /// Parse settings from YAML text.
    ///
    /// `origin` is only used in error messages.
    pub fn from_yaml_str(contents: &str, origin: &Path) -> Result<Self, ConfigError> {
        let value: serde_yaml::Value =
            serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse {
                path: origin.to_path_buf(),
                reason: e.to_string(),
            })?;

        if !value.is_mapping() {
            return Err(ConfigError::Parse {
                path: origin.to_path_buf(),
                reason: "expected a key/value mapping at the document root".to_string(),
            });
        }

        let raw: RawSettings =
            serde_yaml::from_value(value).map_err(|e| ConfigError::Validation(e.to_string()))?;

        let settings = Settings {
            project_name: raw.project_name,
            raw_data_path: resolve_config_path(&raw.raw_data_path)?,
            target_column: raw.target_column,
            test_size: raw.test_size,
            random_state: raw.random_state,
            alpha: raw.alpha,
            l1_ratio: raw.l1_ratio,
            gradient_boosting: raw.gradient_boosting,
            top_feature_count: raw.top_feature_count,
            report_dir: resolve_config_path(&raw.report_dir)?,
            permutation_seed: raw.permutation_seed,
            permutation_repeats: raw.permutation_repeats,
            categorical_columns: raw.categorical_columns,
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Check value ranges that the type system cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ConfigError::Validation(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }

        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(ConfigError::Validation(format!(
                "alpha must be a non-negative number, got {}",
                self.alpha
            )));
        }

        if !(0.0..=1.0).contains(&self.l1_ratio) {
            return Err(ConfigError::Validation(format!(
                "l1_ratio must be in [0, 1], got {}",
                self.l1_ratio
            )));
        }

        let gb = &self.gradient_boosting;
        if !gb.learning_rate.is_finite() || gb.learning_rate <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "gradient_boosting.learning_rate must be positive, got {}",
                gb.learning_rate
            )));
        }
        if gb.max_depth == 0 {
            return Err(ConfigError::Validation(
                "gradient_boosting.max_depth must be at least 1".to_string(),
            ));
        }
        if gb.n_estimators == 0 {
            return Err(ConfigError::Validation(
                "gradient_boosting.n_estimators must be at least 1".to_string(),
            ));
        }

        if self.top_feature_count == 0 {
            return Err(ConfigError::Validation(
                "top_feature_count must be at least 1".to_string(),
            ));
        }

        if self.permutation_repeats == 0 {
            return Err(ConfigError::Validation(
                "permutation_repeats must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Report directory, created on access.
    pub fn report_directory(&self) -> std::io::Result<PathBuf> {
        fs::create_dir_all(&self.report_dir)?;
        Ok(self.report_dir.clone())
    }

    /// `<report_dir>/figures`, created on access.
    pub fn figures_directory(&self) -> std::io::Result<PathBuf> {
        let figures = self.report_directory()?.join("figures");
        fs::create_dir_all(&figures)?;
        Ok(figures)
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.report_dir.join(METRICS_FILE_NAME)
    }
}

fn resolve_config_path(path: &Path) -> Result<PathBuf, ConfigError> {
    resolve_path(path).map_err(|e| {
        ConfigError::Validation(format!("cannot resolve path '{}': {}", path.display(), e))
    })
}

/// Load settings from a YAML file.
///
/// A relative `path` is resolved against the current working directory.
pub fn load_settings(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    let path = path.as_ref();
    let config_path = resolve_config_path(path)?;

    if !config_path.is_file() {
        return Err(ConfigError::NotFound { path: config_path });
    }

    let contents = fs::read_to_string(&config_path).map_err(|e| ConfigError::Parse {
        path: config_path.clone(),
        reason: e.to_string(),
    })?;

    debug!("Loaded configuration from {}", config_path.display());
    Settings::from_yaml_str(&contents, &config_path)
}
