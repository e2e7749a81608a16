//! Column-wise preprocessing shared by every candidate model.
//!
//! The column schema is declared up front instead of being inferred from
//! dtypes at fit time, so a numeric-looking category code can never silently
//! switch branches between runs.

use crate::error::{DataError, HousingError, Result};
use crate::features::transformers::{OneHotEncoder, StandardScaler};
use crate::imputers::StatisticalImputer;
use crate::utils::{column_names, finite_or_missing, numeric_values, string_values};
use ndarray::Array2;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Categorical columns of the housing dataset.
pub const CATEGORICAL_FEATURES: [&str; 1] = ["ocean_proximity"];

/// Fill value for a categorical column with no observed value at fit time.
const MISSING_CATEGORY: &str = "missing";

/// Ordered numeric and categorical column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl ColumnSchema {
    pub fn new(numeric: Vec<String>, categorical: Vec<String>) -> Self {
        Self {
            numeric,
            categorical,
        }
    }

    /// Freeze the schema of `df`: listed columns are categorical, every other
    /// column is numeric. Both lists keep frame order.
    pub fn from_frame(df: &DataFrame, categorical: &[String]) -> Self {
        let (categorical, numeric): (Vec<String>, Vec<String>) = column_names(df)
            .into_iter()
            .partition(|name| categorical.contains(name));
        Self {
            numeric,
            categorical,
        }
    }

    /// Verify that `df` has exactly this schema's column set.
    fn check_frame(&self, df: &DataFrame) -> Result<()> {
        let expected: BTreeSet<&str> = self
            .numeric
            .iter()
            .chain(&self.categorical)
            .map(String::as_str)
            .collect();
        let names = column_names(df);
        let actual: BTreeSet<&str> = names.iter().map(String::as_str).collect();

        if expected == actual {
            return Ok(());
        }

        let missing: Vec<&str> = expected.difference(&actual).copied().collect();
        let unexpected: Vec<&str> = actual.difference(&expected).copied().collect();
        Err(DataError::SchemaMismatch(format!(
            "missing columns {:?}, unexpected columns {:?}",
            missing, unexpected
        ))
        .into())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct NumericColumn {
    name: String,
    median: f64,
    scaler: StandardScaler,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CategoricalColumn {
    name: String,
    mode: String,
    encoder: OneHotEncoder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FittedState {
    numeric: Vec<NumericColumn>,
    categorical: Vec<CategoricalColumn>,
}

/// Impute, scale and one-hot encode a feature frame into a dense matrix.
///
/// Numeric columns come first in schema order, followed by one block per
/// categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    schema: ColumnSchema,
    fitted: Option<FittedState>,
}

static_assertions::assert_impl_all!(Preprocessor: Send, Sync);

impl Preprocessor {
    /// Create an unfitted preprocessor for `schema`.
    pub fn new(schema: ColumnSchema) -> Self {
        Self {
            schema,
            fitted: None,
        }
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Learn imputation values, scaling statistics and categories from `df`.
    ///
    /// Refitting replaces any previous state.
    pub fn fit(&mut self, df: &DataFrame) -> Result<()> {
        self.schema.check_frame(df)?;

        let mut numeric = Vec::with_capacity(self.schema.numeric.len());
        for name in &self.schema.numeric {
            let values: Vec<Option<f64>> = numeric_values(df, name)?
                .into_iter()
                .map(finite_or_missing)
                .collect();
            let median = StatisticalImputer::median(&values).unwrap_or_else(|| {
                warn!("Column '{}' has no observed values; imputing 0.0", name);
                0.0
            });
            let filled = StatisticalImputer::fill_numeric(&values, median);
            let scaler = StandardScaler::fit(&filled);
            debug!(
                "{}: median={:.4}, mean={:.4}, scale={:.4}",
                name, median, scaler.mean, scaler.scale
            );
            numeric.push(NumericColumn {
                name: name.clone(),
                median,
                scaler,
            });
        }

        let mut categorical = Vec::with_capacity(self.schema.categorical.len());
        for name in &self.schema.categorical {
            let values = string_values(df, name)?;
            let mode = StatisticalImputer::most_frequent(&values).unwrap_or_else(|| {
                warn!(
                    "Column '{}' has no observed values; imputing '{}'",
                    name, MISSING_CATEGORY
                );
                MISSING_CATEGORY.to_string()
            });
            let encoder =
                OneHotEncoder::fit(StatisticalImputer::fill_categorical(&values, &mode));
            debug!("{}: mode='{}', {} categories", name, mode, encoder.width());
            categorical.push(CategoricalColumn {
                name: name.clone(),
                mode,
                encoder,
            });
        }

        self.fitted = Some(FittedState {
            numeric,
            categorical,
        });
        Ok(())
    }

    /// Apply the fitted transform. `df` is not modified.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let fitted = self.fitted_state()?;
        self.schema.check_frame(df)?;

        let n_rows = df.height();
        let mut matrix = Array2::<f64>::zeros((n_rows, self.width(fitted)));

        let mut offset = 0;
        for column in &fitted.numeric {
            let values = numeric_values(df, &column.name)?;
            for (row, value) in values.into_iter().enumerate() {
                let value = finite_or_missing(value).unwrap_or(column.median);
                matrix[[row, offset]] = column.scaler.transform(value);
            }
            offset += 1;
        }

        for column in &fitted.categorical {
            let values = string_values(df, &column.name)?;
            for (row, value) in values.iter().enumerate() {
                let value = value.as_deref().unwrap_or(&column.mode);
                if let Some(index) = column.encoder.index_of(value) {
                    matrix[[row, offset + index]] = 1.0;
                }
            }
            offset += column.encoder.width();
        }

        Ok(matrix)
    }

    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Output column names: numeric names unchanged, categorical columns
    /// expanded as `<column>_<value>`.
    pub fn feature_names(&self) -> Result<Vec<String>> {
        let fitted = self.fitted_state()?;
        let mut names: Vec<String> = fitted.numeric.iter().map(|c| c.name.clone()).collect();
        for column in &fitted.categorical {
            names.extend(column.encoder.feature_names(&column.name));
        }
        Ok(names)
    }

    /// Width of the transformed matrix.
    pub fn n_output_features(&self) -> Result<usize> {
        Ok(self.width(self.fitted_state()?))
    }

    fn width(&self, fitted: &FittedState) -> usize {
        fitted.numeric.len()
            + fitted
                .categorical
                .iter()
                .map(|c| c.encoder.width())
                .sum::<usize>()
    }

    fn fitted_state(&self) -> Result<&FittedState> {
        self.fitted
            .as_ref()
            .ok_or(HousingError::NotFitted("Preprocessor"))
    }
}

/// Build an unfitted preprocessor whose schema is frozen from `features`.
pub fn build_preprocessor(features: &DataFrame, categorical: &[String]) -> Preprocessor {
    let schema = ColumnSchema::from_frame(features, categorical);
    debug!(
        "Preprocessor schema: {} numeric, {} categorical",
        schema.numeric.len(),
        schema.categorical.len()
    );
    Preprocessor::new(schema)
}

/// Feature names of a fitted preprocessor, in output column order.
pub fn get_feature_names(preprocessor: &Preprocessor) -> Result<Vec<String>> {
    preprocessor.feature_names()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::s;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn categorical() -> Vec<String> {
        CATEGORICAL_FEATURES.iter().map(|c| c.to_string()).collect()
    }

    fn train_frame() -> DataFrame {
        df![
            "median_income" => [Some(1.0), Some(3.0), None, Some(5.0)],
            "ocean_proximity" => [Some("NEAR BAY"), Some("INLAND"), Some("NEAR BAY"), None],
            "households" => [10i64, 20, 30, 40],
        ]
        .unwrap()
    }

    #[test]
    fn test_schema_from_frame_keeps_frame_order() {
        let schema = ColumnSchema::from_frame(&train_frame(), &categorical());
        assert_eq!(schema.numeric, vec!["median_income", "households"]);
        assert_eq!(schema.categorical, vec!["ocean_proximity"]);
    }

    #[test]
    fn test_fit_transform_layout() {
        let mut preprocessor = build_preprocessor(&train_frame(), &categorical());
        let matrix = preprocessor.fit_transform(&train_frame()).unwrap();

        assert_eq!(matrix.dim(), (4, 4));
        assert_eq!(
            preprocessor.feature_names().unwrap(),
            vec![
                "median_income",
                "households",
                "ocean_proximity_INLAND",
                "ocean_proximity_NEAR BAY",
            ]
        );

        // median of [1, 3, 5] fills row 2; the scaled column is centred.
        let income = matrix.column(0);
        assert!(income.sum().abs() < 1e-12);
        assert!((income[2] - income[1]).abs() < 1e-12);

        // missing category is imputed with the mode
        assert_eq!(matrix.slice(s![3, 2..]).to_vec(), vec![0.0, 1.0]);
        assert_eq!(matrix.slice(s![1, 2..]).to_vec(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_unknown_category_encodes_to_zeros() {
        let mut preprocessor = build_preprocessor(&train_frame(), &categorical());
        preprocessor.fit(&train_frame()).unwrap();

        let test = df![
            "households" => [25i64],
            "median_income" => [2.0],
            "ocean_proximity" => ["ISLAND"],
        ]
        .unwrap();
        let matrix = preprocessor.transform(&test).unwrap();
        assert_eq!(matrix.dim(), (1, 4));
        assert_eq!(matrix.slice(s![0, 2..]).to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_transform_does_not_refit() {
        let mut preprocessor = build_preprocessor(&train_frame(), &categorical());
        preprocessor.fit(&train_frame()).unwrap();
        let before = preprocessor.clone();

        let shifted = df![
            "median_income" => [100.0, 200.0],
            "ocean_proximity" => ["INLAND", "INLAND"],
            "households" => [1i64, 2],
        ]
        .unwrap();
        preprocessor.transform(&shifted).unwrap();
        assert_eq!(preprocessor, before);
    }

    #[test]
    fn test_all_missing_columns_are_filled() {
        let df = df![
            "total_bedrooms" => [None::<f64>, None],
            "ocean_proximity" => [None::<&str>, None],
        ]
        .unwrap();
        let mut preprocessor = build_preprocessor(&df, &categorical());
        let matrix = preprocessor.fit_transform(&df).unwrap();
        assert_eq!(
            preprocessor.feature_names().unwrap(),
            vec!["total_bedrooms", "ocean_proximity_missing"]
        );
        assert_eq!(matrix.column(0).to_vec(), vec![0.0, 0.0]);
        assert_eq!(matrix.column(1).to_vec(), vec![1.0, 1.0]);
    }

    #[test]
    fn test_schema_mismatch() {
        let mut preprocessor = build_preprocessor(&train_frame(), &categorical());
        preprocessor.fit(&train_frame()).unwrap();

        let df = train_frame().drop("households").unwrap();
        let err = preprocessor.transform(&df).unwrap_err();
        assert_eq!(err.error_code(), "SCHEMA_MISMATCH");
        assert!(err.to_string().contains("households"));
    }

    #[test]
    fn test_not_fitted() {
        let preprocessor = build_preprocessor(&train_frame(), &categorical());
        assert!(!preprocessor.is_fitted());
        assert_eq!(
            get_feature_names(&preprocessor).unwrap_err().error_code(),
            "NOT_FITTED"
        );
        assert_eq!(
            preprocessor.transform(&train_frame()).unwrap_err().error_code(),
            "NOT_FITTED"
        );
    }

    #[test]
    fn test_two_numeric_one_categorical_round_trip() {
        let df = df![
            "latitude" => [34.1, 36.2, 37.8],
            "ocean_proximity" => ["NEAR OCEAN", "INLAND", "<1H OCEAN"],
            "population" => [300.0, 450.0, 800.0],
        ]
        .unwrap();
        let mut preprocessor = build_preprocessor(&df, &categorical());
        let matrix = preprocessor.fit_transform(&df).unwrap();

        assert_eq!(
            get_feature_names(&preprocessor).unwrap(),
            vec![
                "latitude",
                "population",
                "ocean_proximity_<1H OCEAN",
                "ocean_proximity_INLAND",
                "ocean_proximity_NEAR OCEAN",
            ]
        );
        assert_eq!(matrix.ncols(), 5);
    }

    #[test]
    fn test_feature_name_count_matches_width() {
        let mut preprocessor = build_preprocessor(&train_frame(), &categorical());
        let matrix = preprocessor.fit_transform(&train_frame()).unwrap();
        assert_eq!(preprocessor.feature_names().unwrap().len(), matrix.ncols());
        assert_eq!(preprocessor.n_output_features().unwrap(), matrix.ncols());
    }
}
