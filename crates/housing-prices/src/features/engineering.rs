//! Domain feature engineering for the housing dataset.

use crate::error::{DataError, Result};
use crate::utils::{column_names, finite_or_missing, numeric_values, string_values};
use polars::prelude::*;
use tracing::debug;

/// Raw columns the derived features are computed from.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "households",
    "total_rooms",
    "total_bedrooms",
    "population",
    "housing_median_age",
    "median_income",
    "ocean_proximity",
];

/// Columns added by [`engineer_domain_features`], in insertion order.
pub const ENGINEERED_COLUMNS: [&str; 5] = [
    "rooms_per_household",
    "bedrooms_per_room",
    "population_per_household",
    "income_to_age_ratio",
    "coastal_flag",
];

/// `ocean_proximity` values that set `coastal_flag`.
pub const COASTAL_CATEGORIES: [&str; 2] = ["<1H OCEAN", "NEAR OCEAN"];

/// Division that yields missing instead of a fault or infinity.
fn safe_ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => finite_or_missing(Some(n / d)),
        _ => None,
    }
}

fn ratio_column(name: &str, numerators: &[Option<f64>], denominators: &[Option<f64>]) -> Series {
    let values: Vec<Option<f64>> = numerators
        .iter()
        .zip(denominators)
        .map(|(&n, &d)| safe_ratio(n, d))
        .collect();
    Series::new(name.into(), values)
}

/// Create ratio-based features with zero-division guards.
///
/// Returns a new frame; `df` is left untouched. Zero denominators produce
/// missing values, and any infinite float left in the frame afterwards is
/// replaced by missing too. The preprocessor imputes these downstream.
pub fn engineer_domain_features(df: &DataFrame) -> Result<DataFrame> {
    let present = column_names(df);
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .into_iter()
        .filter(|required| !present.iter().any(|name| name == required))
        .collect();
    if !missing.is_empty() {
        return Err(DataError::MissingColumn(missing.join(", ")).into());
    }

    let households = numeric_values(df, "households")?;
    let rooms = numeric_values(df, "total_rooms")?;
    let bedrooms = numeric_values(df, "total_bedrooms")?;
    let population = numeric_values(df, "population")?;
    let age = numeric_values(df, "housing_median_age")?;
    let income = numeric_values(df, "median_income")?;
    let proximity = string_values(df, "ocean_proximity")?;

    let age_plus_one: Vec<Option<f64>> = age.iter().map(|a| a.map(|a| a + 1.0)).collect();
    let coastal_flag: Vec<i32> = proximity
        .iter()
        .map(|p| match p {
            Some(p) if COASTAL_CATEGORIES.contains(&p.as_str()) => 1,
            _ => 0,
        })
        .collect();

    let mut engineered = df.clone();
    engineered.with_column(ratio_column("rooms_per_household", &rooms, &households))?;
    engineered.with_column(ratio_column("bedrooms_per_room", &bedrooms, &rooms))?;
    engineered.with_column(ratio_column(
        "population_per_household",
        &population,
        &households,
    ))?;
    engineered.with_column(ratio_column("income_to_age_ratio", &income, &age_plus_one))?;
    engineered.with_column(Series::new("coastal_flag".into(), coastal_flag))?;

    replace_infinities(&mut engineered)?;

    debug!(
        "Engineered features added; frame is now {} x {}",
        engineered.height(),
        engineered.width()
    );
    Ok(engineered)
}

/// Post-pass: every ±inf in a float column becomes missing.
fn replace_infinities(df: &mut DataFrame) -> Result<()> {
    for name in column_names(df) {
        let is_float = df.column(&name)?.dtype().is_float();
        if !is_float {
            continue;
        }

        let values = numeric_values(df, &name)?;
        if values.iter().flatten().all(|v| v.is_finite()) {
            continue;
        }

        let cleaned: Vec<Option<f64>> = values.into_iter().map(finite_or_missing).collect();
        df.replace(&name, Series::new(name.as_str().into(), cleaned))?;
    }
    Ok(())
}
