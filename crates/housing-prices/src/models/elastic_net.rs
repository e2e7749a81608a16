//! Elastic net regression fitted by cyclic coordinate descent.
//!
//! Minimises
//!
//! ```text
//! 1/(2n) * ||y - Xw - b||^2 + alpha * l1_ratio * ||w||_1
//!     + 0.5 * alpha * (1 - l1_ratio) * ||w||^2
//! ```
//!
//! with an unpenalised intercept `b`, obtained by centring `X` and `y`.

use super::{Regressor, check_prediction_width, check_training_data};
use crate::error::{DataError, HousingError, Result};
use ndarray::{Array1, Array2, Axis};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ElasticNet {
    pub alpha: f64,
    pub l1_ratio: f64,
    pub max_iter: usize,
    pub tol: f64,
    coefficients: Option<Array1<f64>>,
    intercept: f64,
}

impl ElasticNet {
    pub const DEFAULT_MAX_ITER: usize = 10_000;
    pub const DEFAULT_TOL: f64 = 1e-4;

    pub fn new(alpha: f64, l1_ratio: f64) -> Self {
        Self {
            alpha,
            l1_ratio,
            max_iter: Self::DEFAULT_MAX_ITER,
            tol: Self::DEFAULT_TOL,
            coefficients: None,
            intercept: 0.0,
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    fn soft_threshold(value: f64, threshold: f64) -> f64 {
        if value > threshold {
            value - threshold
        } else if value < -threshold {
            value + threshold
        } else {
            0.0
        }
    }
}

impl Regressor for ElasticNet {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_training_data(x, y)?;

        let n_samples = x.nrows();
        let n_features = x.ncols();
        let n = n_samples as f64;

        let x_mean = x
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(n_features));
        let y_mean = y.mean().unwrap_or(0.0);
        let x_c = x - &x_mean.view().insert_axis(Axis(0));
        let y_c = y - y_mean;

        let col_norms: Vec<f64> = x_c
            .columns()
            .into_iter()
            .map(|col| col.dot(&col))
            .collect();

        let l1_penalty = self.alpha * self.l1_ratio * n;
        let l2_penalty = self.alpha * (1.0 - self.l1_ratio) * n;

        let mut w = Array1::<f64>::zeros(n_features);
        let mut residual = y_c.clone();
        let mut converged = false;
        let mut sweeps = 0;

        for _ in 0..self.max_iter {
            sweeps += 1;
            let mut max_update = 0.0f64;
            let mut max_weight = 0.0f64;

            for j in 0..n_features {
                let denom = col_norms[j] + l2_penalty;
                if denom == 0.0 {
                    continue;
                }

                let column = x_c.column(j);
                let old = w[j];
                // correlation with the partial residual that excludes feature j
                let rho = column.dot(&residual) + col_norms[j] * old;
                let new = Self::soft_threshold(rho, l1_penalty) / denom;

                if new != old {
                    residual.scaled_add(old - new, &column);
                    w[j] = new;
                }
                max_update = max_update.max((new - old).abs());
                max_weight = max_weight.max(new.abs());
            }

            if max_weight == 0.0 || max_update <= self.tol * max_weight {
                converged = true;
                break;
            }
        }

        if !w.iter().all(|v| v.is_finite()) {
            return Err(DataError::SchemaMismatch("coordinate descent diverged".to_string()).into());
        }
        if !converged {
            warn!(
                "Elastic net did not converge after {} iterations",
                self.max_iter
            );
        }

        self.intercept = y_mean - w.dot(&x_mean);
        debug!(
            "Elastic net fitted in {} sweeps; {} of {} coefficients non-zero",
            sweeps,
            w.iter().filter(|v| **v != 0.0).count(),
            n_features
        );
        self.coefficients = Some(w);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coefficients = self
            .coefficients
            .as_ref()
            .ok_or(HousingError::NotFitted("ElasticNet"))?;
        check_prediction_width(x, coefficients.len())?;
        Ok(x.dot(coefficients) + self.intercept)
    }

    fn coefficients(&self) -> Option<Array1<f64>> {
        self.coefficients.clone()
    }
}
