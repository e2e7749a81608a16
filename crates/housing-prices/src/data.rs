//! Dataset loading and partitioning.

use crate::config::Settings;
use crate::error::{DataError, HousingError, Result};
use crate::utils::{numeric_values, resolve_path};
use ndarray::Array1;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

/// A fixed train/test partition shared by every candidate model.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train_x: DataFrame,
    pub test_x: DataFrame,
    pub train_y: Array1<f64>,
    pub test_y: Array1<f64>,
}

/// Load the housing dataset from `settings.raw_data_path`.
pub fn load_raw_data(settings: &Settings) -> Result<DataFrame> {
    let dataset_path = resolve_path(&settings.raw_data_path)?;
    if !dataset_path.is_file() {
        return Err(DataError::DatasetNotFound { path: dataset_path }.into());
    }

    info!("Loading dataset from: {}", dataset_path.display());
    // Scan every row so a late decimal widens the column instead of failing the parse.
    let df = CsvReadOptions::default()
        .with_infer_schema_length(None)
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(dataset_path))?
        .finish()?;

    info!("Dataset loaded: {} rows, {} columns", df.height(), df.width());
    Ok(df)
}

/// Split a frame into the feature frame and the target vector.
///
/// Row order is preserved on both sides. The target must be numeric and
/// complete.
pub fn split_features_targets(
    df: &DataFrame,
    target_column: &str,
) -> Result<(DataFrame, Array1<f64>)> {
    if df.column(target_column).is_err() {
        return Err(DataError::MissingColumn(target_column.to_string()).into());
    }

    let values = numeric_values(df, target_column)?;
    let missing = values.iter().filter(|v| v.is_none()).count();
    if missing > 0 {
        return Err(DataError::SchemaMismatch(format!(
            "target column '{}' has {} missing values",
            target_column, missing
        ))
        .into());
    }

    let target: Array1<f64> = values.into_iter().flatten().collect();
    let features = df.drop(target_column)?;
    Ok((features, target))
}

/// Shuffle row indices with `seed` and cut off the first
/// `ceil(test_size * n)` as the test partition.
pub fn shuffled_partition(
    n_rows: usize,
    test_size: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    let n_test = (test_size * n_rows as f64).ceil() as usize;
    if n_test == 0 || n_test >= n_rows {
        return Err(DataError::EmptySplit {
            rows: n_rows,
            test_size,
        }
        .into());
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..n_rows).collect();
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok((train, indices))
}

/// Deterministic train/test split driven by `settings.test_size` and
/// `settings.random_state`.
pub fn make_train_test_split(
    features: &DataFrame,
    target: &Array1<f64>,
    settings: &Settings,
) -> Result<TrainTestSplit> {
    if features.height() != target.len() {
        return Err(HousingError::from(DataError::SchemaMismatch(format!(
            "{} feature rows but {} target values",
            features.height(),
            target.len()
        ))));
    }

    let (train_idx, test_idx) =
        shuffled_partition(features.height(), settings.test_size, settings.random_state)?;
    debug!(
        "Partitioned {} rows into {} train / {} test",
        features.height(),
        train_idx.len(),
        test_idx.len()
    );

    Ok(TrainTestSplit {
        train_x: take_rows(features, &train_idx)?,
        test_x: take_rows(features, &test_idx)?,
        train_y: train_idx.iter().map(|&i| target[i]).collect(),
        test_y: test_idx.iter().map(|&i| target[i]).collect(),
    })
}

fn take_rows(df: &DataFrame, rows: &[usize]) -> Result<DataFrame> {
    let idx = IdxCa::from_vec(
        "idx".into(),
        rows.iter().map(|&i| i as IdxSize).collect(),
    );
    Ok(df.take(&idx)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn settings(test_size: f64, random_state: u64) -> Settings {
        let yaml = format!(
            "project_name: t\nraw_data_path: /nonexistent/housing.csv\n\
             target_column: y\ntest_size: {test_size}\nrandom_state: {random_state}\n\
             alpha: 0.1\nl1_ratio: 0.5\n"
        );
        Settings::from_yaml_str(&yaml, Path::new("inline.yaml")).unwrap()
    }

    fn frame() -> DataFrame {
        df![
            "x" => (0..10).map(|i| i as f64).collect::<Vec<_>>(),
            "y" => (0..10).map(|i| (i * 10) as f64).collect::<Vec<_>>(),
        ]
        .unwrap()
    }

    #[test]
    fn test_load_raw_data_missing_file() {
        let err = load_raw_data(&settings(0.2, 0)).unwrap_err();
        assert!(matches!(err, HousingError::Data(DataError::DatasetNotFound { .. })));
    }

    #[test]
    fn test_load_raw_data_late_decimal_in_integer_column() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("housing.csv");
        let mut csv = String::from("housing_median_age,median_house_value\n");
        for i in 0..150 {
            let age = if i == 140 { "33.5".to_string() } else { (10 + i % 40).to_string() };
            csv.push_str(&format!("{age},{}\n", 100_000 + i));
        }
        std::fs::write(&dataset, csv).unwrap();

        let yaml = format!(
            "project_name: t\nraw_data_path: {}\ntarget_column: median_house_value\n\
             test_size: 0.2\nrandom_state: 0\nalpha: 0.1\nl1_ratio: 0.5\n",
            dataset.display()
        );
        let settings = Settings::from_yaml_str(&yaml, Path::new("inline.yaml")).unwrap();

        let df = load_raw_data(&settings).unwrap();
        assert_eq!(df.height(), 150);
        let ages = numeric_values(&df, "housing_median_age").unwrap();
        assert_eq!(ages[140], Some(33.5));
        assert_eq!(ages[0], Some(10.0));
    }

    #[test]
    fn test_split_features_targets() {
        let (x, y) = split_features_targets(&frame(), "y").unwrap();
        assert_eq!(crate::utils::column_names(&x), vec!["x".to_string()]);
        assert_eq!(y.len(), 10);
        assert_eq!(y[3], 30.0);
    }

    #[test]
    fn test_split_features_targets_missing_target() {
        let err = split_features_targets(&frame(), "median_house_value").unwrap_err();
        assert_eq!(err.error_code(), "MISSING_COLUMN");
        assert!(err.to_string().contains("median_house_value"));
    }

    #[test]
    fn test_split_features_targets_rejects_null_target() {
        let df = df!["x" => [1.0, 2.0], "y" => [Some(1.0), None]].unwrap();
        let err = split_features_targets(&df, "y").unwrap_err();
        assert_eq!(err.error_code(), "SCHEMA_MISMATCH");
    }

    #[test]
    fn test_split_is_deterministic() {
        let (x, y) = split_features_targets(&frame(), "y").unwrap();
        let first = make_train_test_split(&x, &y, &settings(0.3, 7)).unwrap();
        let second = make_train_test_split(&x, &y, &settings(0.3, 7)).unwrap();

        assert!(first.train_x.equals(&second.train_x));
        assert!(first.test_x.equals(&second.test_x));
        assert_eq!(first.train_y, second.train_y);
        assert_eq!(first.test_y, second.test_y);
    }

    #[test]
    fn test_split_sizes_and_alignment() {
        let (x, y) = split_features_targets(&frame(), "y").unwrap();
        let split = make_train_test_split(&x, &y, &settings(0.25, 0)).unwrap();

        // ceil(0.25 * 10) = 3
        assert_eq!(split.test_x.height(), 3);
        assert_eq!(split.train_x.height(), 7);

        // y = 10 * x holds row by row after the shuffle.
        let train_x = numeric_values(&split.train_x, "x").unwrap();
        for (xi, yi) in train_x.iter().zip(split.train_y.iter()) {
            assert_eq!(xi.unwrap() * 10.0, *yi);
        }
    }

    #[test]
    fn test_partition_covers_every_row_once() {
        let (mut train, test) = shuffled_partition(20, 0.25, 0).unwrap();
        assert_eq!(test.len(), 5);
        train.extend(test);
        train.sort_unstable();
        assert_eq!(train, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_partition_rejects_empty_side() {
        assert!(shuffled_partition(1, 0.5, 0).is_err());
        assert!(shuffled_partition(0, 0.5, 0).is_err());
    }
}
