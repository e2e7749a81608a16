//! Metrics report persistence.
//!
//! The report is a pretty-printed JSON document:
//!
//! ```json
//! {
//!   "best_model": "hist_gradient_boost",
//!   "metrics": {
//!     "elastic_net": { "r2": 0.64, "mae": 50412.3, "rmse": 69120.8, "mape": 28.9 },
//!     "hist_gradient_boost": { "r2": 0.83, "mae": 31204.6, "rmse": 47311.2, "mape": 17.4 }
//!   }
//! }
//! ```
//!
//! Models appear in ascending name order, so identical runs produce
//! byte-identical files.

use crate::error::Result;
use crate::metrics::RegressionMetrics;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Serialize)]
pub struct MetricsReport<'a> {
    pub best_model: &'a str,
    pub metrics: &'a BTreeMap<String, RegressionMetrics>,
}

/// Write the metrics report to `path`, replacing any previous file.
pub fn write_metrics_report(
    path: &Path,
    best_model: &str,
    metrics: &BTreeMap<String, RegressionMetrics>,
) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let report = MetricsReport {
        best_model,
        metrics,
    };
    let mut file = File::create(path)?;
    file.write_all(serde_json::to_string_pretty(&report)?.as_bytes())?;

    info!("Metrics written to: {}", path.display());
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn metrics() -> BTreeMap<String, RegressionMetrics> {
        BTreeMap::from([
            (
                "hist_gradient_boost".to_string(),
                RegressionMetrics {
                    r2: 0.8,
                    mae: 30000.0,
                    rmse: 45000.0,
                    mape: 17.5,
                },
            ),
            (
                "elastic_net".to_string(),
                RegressionMetrics {
                    r2: 0.6,
                    mae: 50000.0,
                    rmse: 70000.0,
                    mape: f64::INFINITY,
                },
            ),
        ])
    }

    #[test]
    fn test_write_metrics_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("metrics.json");

        write_metrics_report(&path, "hist_gradient_boost", &metrics()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "best_model": "hist_gradient_boost",
                "metrics": {
                    "elastic_net": { "r2": 0.6, "mae": 50000.0, "rmse": 70000.0, "mape": null },
                    "hist_gradient_boost": { "r2": 0.8, "mae": 30000.0, "rmse": 45000.0, "mape": 17.5 }
                }
            })
        );
    }

    #[test]
    fn test_report_is_overwritten_and_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");

        fs::write(&path, "stale content that is longer than nothing").unwrap();
        write_metrics_report(&path, "elastic_net", &metrics()).unwrap();
        let first = fs::read(&path).unwrap();
        write_metrics_report(&path, "elastic_net", &metrics()).unwrap();
        let second = fs::read(&path).unwrap();

        assert_eq!(first, second);
        assert!(String::from_utf8(first).unwrap().starts_with("{\n  \"best_model\""));
    }
}
