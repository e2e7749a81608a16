//! Feature importance extraction for fitted model pipelines.

use crate::config::Settings;
use crate::error::{ExplainabilityError, Result};
use crate::metrics::r2_score;
use crate::models::{ImportanceCapability, ModelPipeline};
use ndarray::{Array1, Array2};
use polars::prelude::DataFrame;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

/// Seed and repeat count for permutation importance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermutationOptions {
    pub seed: u64,
    pub repeats: usize,
}

impl Default for PermutationOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            repeats: 10,
        }
    }
}

impl From<&Settings> for PermutationOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            seed: settings.permutation_seed,
            repeats: settings.permutation_repeats,
        }
    }
}

/// Per-feature importance scores, paired with `feature_names` in order.
///
/// The source depends on the model's registered capability: native
/// importances, absolute linear coefficients, or permutation importance on
/// `sample` (features, target). Scores are never negative.
pub fn extract_feature_importances(
    model: &ModelPipeline,
    feature_names: &[String],
    sample: Option<(&DataFrame, &Array1<f64>)>,
    options: PermutationOptions,
) -> Result<Vec<(String, f64)>> {
    let unsupported = || ExplainabilityError::UnsupportedModel(model.name.clone());

    let scores = match model.capability {
        ImportanceCapability::NativeImportance => model
            .estimator
            .feature_importances()
            .ok_or_else(unsupported)?
            .mapv(|v| v.max(0.0)),
        ImportanceCapability::LinearCoefficient => model
            .estimator
            .coefficients()
            .ok_or_else(unsupported)?
            .mapv(f64::abs),
        ImportanceCapability::PermutationOnly => {
            let (x, y) = sample.ok_or_else(unsupported)?;
            let matrix = model.preprocessor.transform(x)?;
            permutation_importance(model, &matrix, y, options)?
        }
    };

    if scores.len() != feature_names.len() {
        return Err(ExplainabilityError::LengthMismatch {
            expected: feature_names.len(),
            actual: scores.len(),
        }
        .into());
    }

    debug!(
        "{}: {} importance scores via {:?}",
        model.name,
        scores.len(),
        model.capability
    );
    Ok(feature_names.iter().cloned().zip(scores.iter().copied()).collect())
}

/// Mean drop in R² when each column of the transformed matrix is shuffled,
/// clamped at zero.
pub fn permutation_importance(
    model: &ModelPipeline,
    matrix: &Array2<f64>,
    y: &Array1<f64>,
    options: PermutationOptions,
) -> Result<Array1<f64>> {
    let repeats = options.repeats.max(1);
    let mut rng = StdRng::seed_from_u64(options.seed);

    let baseline = r2_score(y, &model.predict_matrix(matrix)?);
    let mut shuffled = matrix.clone();
    let mut importances = Array1::<f64>::zeros(matrix.ncols());

    for (feature, original) in matrix.columns().into_iter().enumerate() {
        let mut values = original.to_vec();
        let mut total_drop = 0.0;

        for _ in 0..repeats {
            values.shuffle(&mut rng);
            shuffled
                .column_mut(feature)
                .assign(&Array1::from_vec(values.clone()));
            total_drop += baseline - r2_score(y, &model.predict_matrix(&shuffled)?);
        }

        shuffled.column_mut(feature).assign(&original);
        importances[feature] = (total_drop / repeats as f64).max(0.0);
    }

    debug!("Permutation baseline r2 = {:.4}", baseline);
    Ok(importances)
}
