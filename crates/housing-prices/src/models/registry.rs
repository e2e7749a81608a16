//! Candidate model registry: construction, training, evaluation and
//! selection.

use super::{ElasticNet, HistGradientBoostingRegressor, ImportanceCapability, Regressor};
use crate::config::Settings;
use crate::error::{EvaluationError, Result, TrainingError};
use crate::features::Preprocessor;
use crate::metrics::RegressionMetrics;
use ndarray::{Array1, Array2};
use polars::prelude::DataFrame;
use std::collections::BTreeMap;
use tracing::{debug, info};

pub const ELASTIC_NET: &str = "elastic_net";
pub const HIST_GRADIENT_BOOST: &str = "hist_gradient_boost";

/// A preprocessing transform chained with an estimator.
#[derive(Debug)]
pub struct ModelPipeline {
    pub name: String,
    pub preprocessor: Preprocessor,
    pub estimator: Box<dyn Regressor>,
    pub capability: ImportanceCapability,
}

static_assertions::assert_impl_all!(ModelPipeline: Send, Sync);

impl ModelPipeline {
    pub fn new(
        name: impl Into<String>,
        preprocessor: Preprocessor,
        estimator: Box<dyn Regressor>,
        capability: ImportanceCapability,
    ) -> Self {
        Self {
            name: name.into(),
            preprocessor,
            estimator,
            capability,
        }
    }

    /// Fit the preprocessor on `x`, then the estimator on the transformed
    /// matrix.
    pub fn fit(&mut self, x: &DataFrame, y: &Array1<f64>) -> Result<()> {
        let matrix = self.preprocessor.fit_transform(x)?;
        debug!(
            "{}: training matrix is {} x {}",
            self.name,
            matrix.nrows(),
            matrix.ncols()
        );
        self.estimator.fit(&matrix, y)
    }

    pub fn predict(&self, x: &DataFrame) -> Result<Array1<f64>> {
        let matrix = self.preprocessor.transform(x)?;
        self.predict_matrix(&matrix)
    }

    /// Predict from an already transformed matrix.
    pub fn predict_matrix(&self, matrix: &Array2<f64>) -> Result<Array1<f64>> {
        self.estimator.predict(matrix)
    }
}

/// Candidate models keyed by name, iterated in ascending name order.
pub type ModelRegistry = BTreeMap<String, ModelPipeline>;

/// Build the two candidate models. Each gets its own copy of the unfitted
/// `preprocessor`.
pub fn build_model_registry(preprocessor: &Preprocessor, settings: &Settings) -> ModelRegistry {
    let gb = &settings.gradient_boosting;
    let candidates = [
        ModelPipeline::new(
            ELASTIC_NET,
            preprocessor.clone(),
            Box::new(ElasticNet::new(settings.alpha, settings.l1_ratio)),
            ImportanceCapability::LinearCoefficient,
        ),
        ModelPipeline::new(
            HIST_GRADIENT_BOOST,
            preprocessor.clone(),
            Box::new(
                HistGradientBoostingRegressor::new(
                    gb.learning_rate,
                    gb.max_depth,
                    gb.n_estimators,
                )
                .with_random_state(settings.random_state),
            ),
            ImportanceCapability::PermutationOnly,
        ),
    ];

    candidates
        .into_iter()
        .map(|model| (model.name.clone(), model))
        .collect()
}

/// Fit every model in registry order. The first failure aborts.
pub fn fit_models(registry: &mut ModelRegistry, x: &DataFrame, y: &Array1<f64>) -> Result<()> {
    for (name, model) in registry.iter_mut() {
        info!("Fitting model: {}", name);
        model.fit(x, y).map_err(|e| TrainingError::Fit {
            model: name.clone(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

/// Score every fitted model on the held-out partition.
pub fn evaluate_models(
    registry: &ModelRegistry,
    x: &DataFrame,
    y: &Array1<f64>,
) -> Result<BTreeMap<String, RegressionMetrics>> {
    let mut report = BTreeMap::new();
    for (name, model) in registry {
        let predictions = model.predict(x)?;
        let metrics = RegressionMetrics::compute(name, y, &predictions)?;
        info!(
            "{}: rmse={:.4} mae={:.4} r2={:.4} mape={:.2}%",
            name, metrics.rmse, metrics.mae, metrics.r2, metrics.mape
        );
        report.insert(name.clone(), metrics);
    }
    Ok(report)
}

/// Name and metrics of the model with the lowest RMSE.
///
/// Ties go to the name that sorts first.
pub fn select_best_model(
    metrics: &BTreeMap<String, RegressionMetrics>,
) -> Result<(String, RegressionMetrics)> {
    let mut best: Option<(&String, &RegressionMetrics)> = None;
    for (name, entry) in metrics {
        if best.is_none_or(|(_, b)| entry.rmse.total_cmp(&b.rmse).is_lt()) {
            best = Some((name, entry));
        }
    }

    best.map(|(name, entry)| (name.clone(), *entry))
        .ok_or_else(|| EvaluationError::EmptyMetrics.into())
}
