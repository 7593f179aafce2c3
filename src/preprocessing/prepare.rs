//! Raw table → scaled train/test files

#![allow(non_snake_case)]

use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2, Axis};
use thiserror::Error;

use super::normalization::{ScalerError, StandardScaler};
use super::split::{stratified_split, SplitError};
use crate::config::processed_file;
use crate::data::table::{self, TableError};
use crate::types::{FeatureScale, PreparedSplit, Table};

#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    #[error("label column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    #[error("label column '{column}' holds non-integer value {value} at row {row}")]
    NonIntegerLabel { column: String, row: usize, value: f64 },

    #[error("split failed: {0}")]
    Split(#[from] SplitError),

    #[error("scaling failed: {0}")]
    Scale(#[from] ScalerError),

    #[error(transparent)]
    Table(TableError),
}

impl From<TableError> for PrepareError {
    fn from(e: TableError) -> Self {
        match e {
            TableError::NotFound(path) => PrepareError::NotFound(path),
            other => PrepareError::Table(other),
        }
    }
}

/// Parameters of one preparation run.
#[derive(Debug, Clone)]
pub struct PrepareOptions {
    /// Output file prefix, e.g. `pima` → `pima_X_train.csv`.
    pub prefix: String,
    pub label_column: String,
    pub test_fraction: f64,
    pub seed: u64,
}

impl PrepareOptions {
    pub fn new(prefix: &str, label_column: &str, test_fraction: f64, seed: u64) -> Self {
        Self {
            prefix: prefix.to_string(),
            label_column: label_column.to_string(),
            test_fraction,
            seed,
        }
    }
}

/// Loads `raw_path`, splits off the label, performs a stratified split,
/// standardizes with statistics fitted on the training rows only and writes
/// `{prefix}_{X_train,X_test,y_train,y_test}.csv` into `out_dir`.
pub fn prepare(raw_path: &Path, options: &PrepareOptions, out_dir: &Path) -> Result<PreparedSplit, PrepareError> {
    tracing::info!("Processing '{}'...", raw_path.display());

    let raw = table::read_table(raw_path)?;
    let label_idx = raw
        .column_index(&options.label_column)
        .ok_or_else(|| PrepareError::MissingColumn {
            column: options.label_column.clone(),
            path: raw_path.to_path_buf(),
        })?;

    // Separate label from features
    let labels = integer_labels(&raw, label_idx, &options.label_column)?;
    let feature_idx: Vec<usize> = (0..raw.columns.len()).filter(|&j| j != label_idx).collect();
    let feature_names: Vec<String> = feature_idx.iter().map(|&j| raw.columns[j].clone()).collect();
    let features = raw.values.select(Axis(1), &feature_idx);

    let split = stratified_split(&labels.to_vec(), options.test_fraction, options.seed)?;

    let X_train = features.select(Axis(0), &split.train);
    let X_test = features.select(Axis(0), &split.test);
    let y_train = labels.select(Axis(0), &split.train);
    let y_test = labels.select(Axis(0), &split.test);

    // Statistics come from the training rows only
    let mut scaler = StandardScaler::new();
    let X_train_scaled = scaler.fit_transform(&X_train)?;
    let X_test_scaled = scaler.transform(&X_test)?;

    std::fs::create_dir_all(out_dir).map_err(TableError::from)?;
    let out = |part: &str| processed_file(out_dir, &options.prefix, part);

    table::write_table(&out("X_train"), &Table::new(feature_names.clone(), X_train_scaled))?;
    table::write_table(&out("X_test"), &Table::new(feature_names.clone(), X_test_scaled))?;
    table::write_labels(&out("y_train"), &options.label_column, &y_train)?;
    table::write_labels(&out("y_test"), &options.label_column, &y_test)?;

    let scales = match (scaler.mean(), scaler.std()) {
        (Some(mean), Some(std)) => feature_names
            .iter()
            .zip(mean.iter().zip(std.iter()))
            .map(|(name, (&mean, &std))| FeatureScale {
                name: name.clone(),
                mean,
                std,
            })
            .collect(),
        _ => Vec::new(),
    };

    tracing::info!(
        "'{}' processing complete: {} train rows, {} test rows",
        options.prefix,
        y_train.len(),
        y_test.len()
    );

    Ok(PreparedSplit {
        prefix: options.prefix.clone(),
        train_rows: y_train.len(),
        test_rows: y_test.len(),
        scales,
    })
}

/// The four files written by [`prepare`], loaded back for training.
#[derive(Debug, Clone)]
pub struct ProcessedData {
    pub feature_names: Vec<String>,
    pub X_train: Array2<f64>,
    pub X_test: Array2<f64>,
    pub y_train: Array1<i64>,
    pub y_test: Array1<i64>,
}

/// Reads `{prefix}_{X_train,X_test,y_train,y_test}.csv` from `dir`.
pub fn load_processed(dir: &Path, prefix: &str) -> Result<ProcessedData, PrepareError> {
    let path = |part: &str| processed_file(dir, prefix, part);

    let train = table::read_table(&path("X_train"))?;
    let test = table::read_table(&path("X_test"))?;
    let y_train = table::read_labels(&path("y_train"))?;
    let y_test = table::read_labels(&path("y_test"))?;

    Ok(ProcessedData {
        feature_names: train.columns,
        X_train: train.values,
        X_test: test.values,
        y_train,
        y_test,
    })
}

fn integer_labels(raw: &Table, label_idx: usize, column: &str) -> Result<Array1<i64>, PrepareError> {
    raw.values
        .column(label_idx)
        .iter()
        .enumerate()
        .map(|(row, &value)| {
            if value.fract() == 0.0 && value.is_finite() {
                Ok(value as i64)
            } else {
                Err(PrepareError::NonIntegerLabel {
                    column: column.to_string(),
                    row,
                    value,
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_raw(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("raw.csv");
        fs::write(&path, content).unwrap();
        path
    }

    const EIGHT_ROWS: &str = "a,b,label\n\
        1,10,1\n2,20,1\n3,30,0\n4,40,1\n5,50,1\n6,60,0\n7,70,1\n8,80,1\n";

    #[test]
    fn test_writes_four_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let raw = write_raw(dir.path(), EIGHT_ROWS);
        let out_dir = dir.path().join("processed");

        let summary = prepare(&raw, &PrepareOptions::new("toy", "label", 0.25, 42), &out_dir).unwrap();
        assert_eq!(summary.train_rows, 6);
        assert_eq!(summary.test_rows, 2);
        assert_eq!(summary.scales.len(), 2);

        for part in ["X_train", "X_test", "y_train", "y_test"] {
            assert!(out_dir.join(format!("toy_{part}.csv")).exists(), "{part}");
        }

        let y_test = table::read_table(&out_dir.join("toy_y_test.csv")).unwrap();
        assert_eq!(y_test.columns, vec!["label"]);
        assert!(y_test.values.iter().any(|&v| v == 0.0));
        let X_train = table::read_table(&out_dir.join("toy_X_train.csv")).unwrap();
        assert_eq!(X_train.columns, vec!["a", "b"]);
    }

    #[test]
    fn test_load_processed_matches_summary() {
        let dir = tempfile::tempdir().unwrap();
        let raw = write_raw(dir.path(), EIGHT_ROWS);
        let out_dir = dir.path().join("processed");
        prepare(&raw, &PrepareOptions::new("toy", "label", 0.25, 42), &out_dir).unwrap();

        let data = load_processed(&out_dir, "toy").unwrap();
        assert_eq!(data.feature_names, vec!["a", "b"]);
        assert_eq!(data.X_train.dim(), (6, 2));
        assert_eq!(data.X_test.dim(), (2, 2));
        assert_eq!(data.y_train.len(), 6);
        assert_eq!(data.y_test.iter().filter(|&&y| y == 0).count(), 1);

        let err = load_processed(&out_dir, "other").unwrap_err();
        assert!(matches!(err, PrepareError::NotFound(_)));
    }

    /// Undoes the scaling of one output row with the summary statistics.
    fn unscale(row: ndarray::ArrayView1<f64>, scales: &[FeatureScale]) -> Vec<f64> {
        row.iter().zip(scales).map(|(&v, s)| v * s.std + s.mean).collect()
    }

    #[test]
    fn test_feature_rows_stay_aligned_with_labels() {
        // code = 100 * label + id, so every row carries its own label
        let labels = [1, 0, 1, 1, 0, 1, 1, 0, 1, 1, 1, 0, 1, 1, 0, 1, 1, 1, 0, 1];
        let mut raw_text = String::from("id,code,label\n");
        for (id, label) in labels.iter().enumerate() {
            raw_text.push_str(&format!("{},{},{}\n", id, 100 * label + id as i64, label));
        }

        let dir = tempfile::tempdir().unwrap();
        let raw = write_raw(dir.path(), &raw_text);
        let out_dir = dir.path().join("processed");
        let summary = prepare(&raw, &PrepareOptions::new("toy", "label", 0.25, 42), &out_dir).unwrap();
        let data = load_processed(&out_dir, "toy").unwrap();

        let mut seen = Vec::new();
        for (X, y) in [(&data.X_train, &data.y_train), (&data.X_test, &data.y_test)] {
            for (row, &label) in X.rows().into_iter().zip(y.iter()) {
                let values = unscale(row, &summary.scales);
                let id = values[0].round() as i64;
                let code = values[1].round() as i64;
                assert_eq!(code, 100 * label + id, "row id {id}");
                assert_eq!(labels[id as usize], label, "row id {id}");
                seen.push(id);
            }
        }

        seen.sort_unstable();
        assert_eq!(seen, (0..labels.len() as i64).collect::<Vec<_>>());
    }

    #[test]
    fn test_missing_label_column() {
        let dir = tempfile::tempdir().unwrap();
        let raw = write_raw(dir.path(), EIGHT_ROWS);

        let err = prepare(&raw, &PrepareOptions::new("toy", "Outcome", 0.25, 42), dir.path()).unwrap_err();
        assert!(matches!(err, PrepareError::MissingColumn { ref column, .. } if column == "Outcome"));
    }

    #[test]
    fn test_missing_raw_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = prepare(
            &dir.path().join("absent.csv"),
            &PrepareOptions::new("toy", "label", 0.25, 42),
            dir.path(),
        )
        .unwrap_err();
        assert!(matches!(err, PrepareError::NotFound(_)));
    }

    #[test]
    fn test_fractional_label_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let raw = write_raw(dir.path(), "a,label\n1,0.5\n2,1\n");
        let err = prepare(&raw, &PrepareOptions::new("toy", "label", 0.5, 1), dir.path()).unwrap_err();
        assert!(matches!(err, PrepareError::NonIntegerLabel { row: 0, .. }));
    }
}
