//! Shared helpers for reading columns out of a DataFrame.
//!
//! Missing values are `None`. For numeric columns both nulls and NaN count
//! as missing, since CSV input yields nulls while arithmetic yields NaN.

use crate::error::{DataError, HousingError, Result};
use polars::prelude::*;
use std::path::{Path, PathBuf};

/// Resolve `path` against the current working directory when relative.
pub fn resolve_path(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Fetch a column as a Series, mapping absence to [`DataError::MissingColumn`].
pub fn column_series<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|col| col.as_materialized_series())
        .map_err(|_| DataError::MissingColumn(name.to_string()).into())
}

/// Read a column as optional floats.
///
/// Integer columns are widened. Text that cannot be parsed as a number is a
/// [`DataError::SchemaMismatch`] rather than a silent null.
pub fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = column_series(df, name)?;
    let floats = series.strict_cast(&DataType::Float64).map_err(|e| {
        HousingError::from(DataError::SchemaMismatch(format!(
            "column '{}' ({}) is not numeric: {}",
            name,
            series.dtype(),
            e
        )))
    })?;

    Ok(floats
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Read a column as optional strings. Any dtype is accepted.
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = column_series(df, name)?;
    let strings = series.cast(&DataType::String)?;

    Ok(strings
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Turn ±infinity and NaN into missing.
pub fn finite_or_missing(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Owned column names in frame order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}
