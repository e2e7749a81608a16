//! Candidate regression models.
//!
//! Every estimator works on the dense matrix produced by the
//! [`Preprocessor`](crate::features::Preprocessor) and is driven through the
//! [`Regressor`] trait, so the registry and the explainability code never
//! depend on a concrete model type.

pub mod elastic_net;
pub mod hist_gradient_boosting;
pub mod registry;

pub use elastic_net::ElasticNet;
pub use hist_gradient_boosting::{EarlyStopping, HistGradientBoostingRegressor};
pub use registry::{
    ModelPipeline, ModelRegistry, build_model_registry, evaluate_models, fit_models,
    select_best_model,
};

use crate::error::{DataError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// A regression estimator over a dense feature matrix.
pub trait Regressor: Send + Sync + std::fmt::Debug {
    /// Fit on `x` (rows are samples) and `y`. Refitting replaces the model.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Predict one value per row of `x`.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Native per-feature importances, when the estimator computes them.
    fn feature_importances(&self) -> Option<Array1<f64>> {
        None
    }

    /// Linear coefficients, one per feature, for linear estimators.
    fn coefficients(&self) -> Option<Array1<f64>> {
        None
    }
}

/// How feature importances are obtained for a registered model.
///
/// Fixed when the model is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportanceCapability {
    /// The estimator reports its own importances.
    NativeImportance,
    /// Absolute values of the linear coefficients.
    LinearCoefficient,
    /// Permutation importance on held-out data.
    PermutationOnly,
}

/// Shape and finiteness checks shared by every estimator's `fit`.
pub(crate) fn check_training_data(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(DataError::SchemaMismatch(format!(
            "{} training rows but {} targets",
            x.nrows(),
            y.len()
        ))
        .into());
    }
    if x.nrows() == 0 {
        return Err(DataError::SchemaMismatch("no training rows".to_string()).into());
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(DataError::SchemaMismatch(
            "training data contains NaN or infinite values".to_string(),
        )
        .into());
    }
    Ok(())
}

/// Column-count check shared by every estimator's `predict`.
pub(crate) fn check_prediction_width(x: &Array2<f64>, expected: usize) -> Result<()> {
    if x.ncols() != expected {
        return Err(DataError::SchemaMismatch(format!(
            "model was fitted on {} features, got {}",
            expected,
            x.ncols()
        ))
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_check_training_data() {
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        assert!(check_training_data(&x, &array![1.0, 2.0]).is_ok());
        assert!(check_training_data(&x, &array![1.0]).is_err());

        let bad = array![[1.0, f64::NAN], [3.0, 4.0]];
        let err = check_training_data(&bad, &array![1.0, 2.0]).unwrap_err();
        assert!(err.to_string().contains("NaN"));
    }

    #[test]
    fn test_capability_serializes_snake_case() {
        let json = serde_json::to_string(&ImportanceCapability::PermutationOnly).unwrap();
        assert_eq!(json, "\"permutation_only\"");
    }
}
