//! CSV persistence for numeric tables

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::types::Table;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: expected {expected} fields, got {actual}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("row {row}, column '{column}': '{value}' is not a number")]
    NonNumeric {
        row: usize,
        column: String,
        value: String,
    },

    #[error("table has no rows")]
    Empty,
}

/// Reads a comma-separated file whose first line is the header.
pub fn read_table(path: &Path) -> Result<Table, TableError> {
    if !path.exists() {
        return Err(TableError::NotFound(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;
    let columns: Vec<String> = reader.headers()?.iter().map(String::from).collect();

    parse_records(reader, columns)
}

/// Reads a single-column label file written by [`write_labels`].
pub fn read_labels(path: &Path) -> Result<Array1<i64>, TableError> {
    let table = read_table(path)?;
    if table.columns.len() != 1 {
        return Err(TableError::RaggedRow {
            row: 0,
            expected: 1,
            actual: table.columns.len(),
        });
    }

    table
        .values
        .column(0)
        .iter()
        .enumerate()
        .map(|(row, &v)| {
            if v.fract() == 0.0 && v.is_finite() {
                Ok(v as i64)
            } else {
                Err(TableError::NonNumeric {
                    row,
                    column: table.columns[0].clone(),
                    value: v.to_string(),
                })
            }
        })
        .collect()
}

/// Parses comma-separated text without a header line, naming columns in order.
pub fn parse_headerless(text: &str, columns: &[&str]) -> Result<Table, TableError> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    parse_records(reader, columns.iter().map(|c| c.to_string()).collect())
}

fn parse_records<R: io::Read>(
    mut reader: csv::Reader<R>,
    columns: Vec<String>,
) -> Result<Table, TableError> {
    let n_cols = columns.len();
    let mut flat = Vec::new();
    let mut n_rows = 0;

    for (row, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() != n_cols {
            return Err(TableError::RaggedRow {
                row,
                expected: n_cols,
                actual: record.len(),
            });
        }

        for (j, field) in record.iter().enumerate() {
            let value = field.parse::<f64>().map_err(|_| TableError::NonNumeric {
                row,
                column: columns[j].clone(),
                value: field.to_string(),
            })?;
            flat.push(value);
        }
        n_rows += 1;
    }

    if n_rows == 0 {
        return Err(TableError::Empty);
    }

    let values = Array2::from_shape_vec((n_rows, n_cols), flat)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    Ok(Table::new(columns, values))
}

/// Writes a table with header and no index column.
pub fn write_table(path: &Path, table: &Table) -> Result<(), TableError> {
    write_atomic(path, |writer| {
        writer.write_record(&table.columns)?;
        for row in table.values.rows() {
            writer.write_record(row.iter().map(|v| v.to_string()))?;
        }
        Ok(())
    })
}

/// Writes a single-column label file.
pub fn write_labels(path: &Path, name: &str, labels: &Array1<i64>) -> Result<(), TableError> {
    write_atomic(path, |writer| {
        writer.write_record([name])?;
        for label in labels {
            writer.write_record([label.to_string()])?;
        }
        Ok(())
    })
}

/// Writes into a temporary file next to `path` and renames it into place,
/// so readers never observe a partially written file.
fn write_atomic<F>(path: &Path, fill: F) -> Result<(), TableError>
where
    F: FnOnce(&mut csv::Writer<&mut NamedTempFile>) -> Result<(), TableError>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = csv::Writer::from_writer(&mut tmp);
        fill(&mut writer)?;
        writer.flush()?;
    }
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    tracing::debug!("Wrote {}", path.display());
    Ok(())
}
