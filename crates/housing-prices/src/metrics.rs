//! Regression metrics.

use crate::error::{EvaluationError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Held-out performance of one model.
///
/// Non-finite values (MAPE over a zero target) serialize as JSON `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub r2: f64,
    pub mae: f64,
    pub rmse: f64,
    /// Mean absolute percentage error, in percent.
    pub mape: f64,
}

impl RegressionMetrics {
    pub fn compute(model: &str, y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(EvaluationError::PredictionLength {
                model: model.to_string(),
                predicted: y_pred.len(),
                expected: y_true.len(),
            }
            .into());
        }

        Ok(Self {
            r2: r2_score(y_true, y_pred),
            mae: mean_absolute_error(y_true, y_pred),
            rmse: root_mean_squared_error(y_true, y_pred),
            mape: mean_absolute_percentage_error(y_true, y_pred),
        })
    }
}

/// Coefficient of determination.
///
/// A constant target gives 1.0 for a perfect fit and 0.0 otherwise.
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let mean = y_true.mean().unwrap_or(0.0);
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        if ss_res == 0.0 { 1.0 } else { 0.0 }
    } else {
        1.0 - ss_res / ss_tot
    }
}

pub fn mean_absolute_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    (y_true - y_pred).mapv(f64::abs).mean().unwrap_or(f64::NAN)
}

pub fn root_mean_squared_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    (y_true - y_pred)
        .mapv(|d| d * d)
        .mean()
        .unwrap_or(f64::NAN)
        .sqrt()
}

/// `mean(|(t - p) / t|) * 100`. Zero targets are not guarded.
pub fn mean_absolute_percentage_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let ratios: Array1<f64> = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| ((t - p) / t).abs())
        .collect();
    ratios.mean().unwrap_or(f64::NAN) * 100.0
}
