//! Statistical imputation methods.
//!
//! Median for numeric columns, most-frequent value for categorical ones.

use std::collections::BTreeMap;

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Median of the non-missing values, `None` if there are none.
    ///
    /// With an even count the two middle values are averaged.
    pub fn median(values: &[Option<f64>]) -> Option<f64> {
        let mut present: Vec<f64> = values.iter().flatten().copied().collect();
        if present.is_empty() {
            return None;
        }
        present.sort_by(f64::total_cmp);

        let mid = present.len() / 2;
        if present.len() % 2 == 0 {
            Some((present[mid - 1] + present[mid]) / 2.0)
        } else {
            Some(present[mid])
        }
    }

    /// Most frequent non-missing value; ties go to the smallest value.
    pub fn most_frequent(values: &[Option<String>]) -> Option<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for value in values.iter().flatten() {
            *counts.entry(value.as_str()).or_insert(0) += 1;
        }

        let mut best: Option<(&str, usize)> = None;
        for (value, count) in counts {
            // BTreeMap iterates in ascending order, so strict `>` keeps the
            // smallest value among equal counts.
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((value, count));
            }
        }
        best.map(|(value, _)| value.to_string())
    }

    /// Replace missing numeric entries with `fill`.
    pub fn fill_numeric(values: &[Option<f64>], fill: f64) -> Vec<f64> {
        values.iter().map(|v| v.unwrap_or(fill)).collect()
    }

    /// Replace missing categorical entries with `fill`.
    pub fn fill_categorical<'a>(values: &'a [Option<String>], fill: &'a str) -> Vec<&'a str> {
        values
            .iter()
            .map(|v| v.as_deref().unwrap_or(fill))
            .collect()
    }
}
