use crate::metrics::RegressionMetrics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Summary of a completed pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Held-out metrics per model, in ascending name order.
    pub metrics: BTreeMap<String, RegressionMetrics>,
    pub best_model: String,
    pub feature_figure_path: PathBuf,
    pub metrics_path: PathBuf,
}

impl PipelineResult {
    /// Metrics of the selected model.
    pub fn best_metrics(&self) -> Option<&RegressionMetrics> {
        self.metrics.get(&self.best_model)
    }
}
