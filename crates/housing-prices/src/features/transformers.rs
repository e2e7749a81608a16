//! Column-level transformers used by the preprocessor.

use serde::{Deserialize, Serialize};

/// Zero-mean, unit-variance scaling learned from one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: f64,
    /// Population standard deviation; 1.0 for constant columns.
    pub scale: f64,
}

impl StandardScaler {
    pub fn fit(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                mean: 0.0,
                scale: 1.0,
            };
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();

        Self {
            mean,
            scale: if std > f64::EPSILON * mean.abs().max(1.0) {
                std
            } else {
                1.0
            },
        }
    }

    #[inline]
    pub fn transform(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }
}

/// One-hot encoding over the categories seen at fit time.
///
/// Categories are kept sorted; values never seen during fitting encode to an
/// all-zero block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    categories: Vec<String>,
}

impl OneHotEncoder {
    pub fn fit<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut categories: Vec<String> = values.into_iter().map(str::to_string).collect();
        categories.sort();
        categories.dedup();
        Self { categories }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Number of output columns.
    pub fn width(&self) -> usize {
        self.categories.len()
    }

    /// Output column for `value`, `None` for unknown categories.
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
    }

    /// Output names in the form `<column>_<category>`.
    pub fn feature_names(&self, column: &str) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| format!("{column}_{c}"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_scaler() {
        let scaler = StandardScaler::fit(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(scaler.mean, 3.0);
        assert!((scaler.scale - 2.0f64.sqrt()).abs() < 1e-12);
        assert_eq!(scaler.transform(3.0), 0.0);
    }

    #[test]
    fn test_standard_scaler_constant_column() {
        let scaler = StandardScaler::fit(&[7.0, 7.0, 7.0]);
        assert_eq!(scaler.scale, 1.0);
        assert_eq!(scaler.transform(7.0), 0.0);
    }

    #[test]
    fn test_one_hot_sorted_categories() {
        let encoder = OneHotEncoder::fit(["NEAR BAY", "INLAND", "NEAR BAY", "<1H OCEAN"]);
        assert_eq!(encoder.categories(), ["<1H OCEAN", "INLAND", "NEAR BAY"]);
        assert_eq!(encoder.index_of("INLAND"), Some(1));
        assert_eq!(encoder.index_of("ISLAND"), None);
        assert_eq!(
            encoder.feature_names("ocean_proximity"),
            vec![
                "ocean_proximity_<1H OCEAN",
                "ocean_proximity_INLAND",
                "ocean_proximity_NEAR BAY"
            ]
        );
    }
}
