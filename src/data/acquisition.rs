//! Raw dataset acquisition
//!
//! Every source produces a [`Table`] which is written once to its output
//! path. An existing file is never touched again.

use std::io;
use std::path::Path;
use std::time::Duration;

use ndarray::{s, Array2};
use thiserror::Error;

use super::reference::{ReferenceDataset, ReferenceError};
use super::table::{self, TableError};
use crate::types::Table;

/// Failures a source can report. Only the transient ones (see
/// [`FetchError::is_transient`]) are swallowed by [`fetch_or_build`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server answered with status {0}")]
    Status(reqwest::StatusCode),

    #[error("could not decode response: {0}")]
    Decode(#[source] TableError),

    #[error("reference dataset is invalid: {0}")]
    Invalid(#[from] ReferenceError),
}

impl FetchError {
    /// Network and decode failures may succeed on a later run; a malformed
    /// bundled dataset will not.
    pub fn is_transient(&self) -> bool {
        !matches!(self, FetchError::Invalid(_))
    }
}

/// Failures that propagate to the caller.
#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to write table: {0}")]
    Write(#[from] TableError),

    #[error("source failed: {0}")]
    Source(#[source] FetchError),
}

/// Outcome of one acquisition attempt.
#[derive(Debug)]
pub enum Acquisition {
    /// Output already existed, nothing was fetched.
    Skipped,
    Written { rows: usize },
    /// Source failed; no file was created and a later run may retry.
    Unavailable(FetchError),
}

/// Anything able to produce a raw table.
pub trait TableSource {
    fn describe(&self) -> String;
    fn fetch(&self) -> Result<Table, FetchError>;
}

/// Remote client settings.
#[derive(Debug, Clone, Default)]
pub struct FetchConfig {
    /// Request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

/// Headerless comma-separated text fetched over HTTP.
pub struct RemoteCsv {
    url: String,
    columns: Vec<&'static str>,
    config: FetchConfig,
}

impl RemoteCsv {
    pub fn new(url: impl Into<String>, columns: &[&'static str]) -> Self {
        Self::with_config(url, columns, FetchConfig::default())
    }

    pub fn with_config(url: impl Into<String>, columns: &[&'static str], config: FetchConfig) -> Self {
        Self {
            url: url.into(),
            columns: columns.to_vec(),
            config,
        }
    }

    fn client(&self) -> Result<reqwest::blocking::Client, reqwest::Error> {
        reqwest::blocking::Client::builder()
            .timeout(self.config.timeout)
            .build()
    }
}

impl TableSource for RemoteCsv {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> Result<Table, FetchError> {
        let response = self.client()?.get(&self.url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let text = response.text()?;
        table::parse_headerless(&text, &self.columns).map_err(FetchError::Decode)
    }
}

/// Reference dataset converted to a table with a trailing `target` column.
pub struct Bundled<D> {
    dataset: D,
}

impl<D: ReferenceDataset> Bundled<D> {
    pub fn new(dataset: D) -> Self {
        Self { dataset }
    }
}

impl<D: ReferenceDataset> TableSource for Bundled<D> {
    fn describe(&self) -> String {
        self.dataset.name().to_string()
    }

    fn fetch(&self) -> Result<Table, FetchError> {
        let data = self.dataset.load()?;

        let (rows, n_features) = data.features.dim();
        if data.target.len() != rows || data.feature_names.len() != n_features {
            return Err(ReferenceError::Malformed(format!(
                "{} rows, {} labels, {} features, {} names",
                rows,
                data.target.len(),
                n_features,
                data.feature_names.len()
            ))
            .into());
        }

        // Features first, label last
        let mut values = Array2::zeros((rows, n_features + 1));
        values.slice_mut(s![.., ..n_features]).assign(&data.features);
        values.column_mut(n_features).assign(&data.target.mapv(|t| t as f64));

        let mut columns = data.feature_names;
        columns.push("target".to_string());

        Ok(Table::new(columns, values))
    }
}

/// Writes the table produced by `source` to `output_path` unless the file
/// already exists.
pub fn fetch_or_build(output_path: &Path, source: &dyn TableSource) -> Result<Acquisition, AcquireError> {
    let file_name = output_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| output_path.display().to_string());

    if output_path.exists() {
        tracing::info!("'{}' already exists. Skipping acquisition.", file_name);
        return Ok(Acquisition::Skipped);
    }

    tracing::info!("Acquiring '{}' from {}...", file_name, source.describe());
    let table = match source.fetch() {
        Ok(table) => table,
        Err(e) if e.is_transient() => {
            tracing::error!("Failed to acquire '{}'. Error: {}", file_name, e);
            return Ok(Acquisition::Unavailable(e));
        }
        Err(e) => return Err(AcquireError::Source(e)),
    };

    table::write_table(output_path, &table)?;
    tracing::info!(
        "Successfully saved {} rows to '{}'",
        table.nrows(),
        output_path.display()
    );

    Ok(Acquisition::Written { rows: table.nrows() })
}
