//! Feature standardization

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, Axis};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ScalerError {
    #[error("cannot fit on an empty matrix")]
    Empty,

    #[error("scaler not fitted")]
    NotFitted,

    #[error("expected {expected} features, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },
}

/// Zero mean, unit variance per feature.
///
/// Statistics come from `fit` only; `transform` never updates them.
#[derive(Debug, Clone, Default)]
pub struct StandardScaler {
    mean: Option<Array1<f64>>,
    std: Option<Array1<f64>>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, X: &Array2<f64>) -> Result<(), ScalerError> {
        if X.nrows() == 0 {
            return Err(ScalerError::Empty);
        }

        // Per-feature mean and population standard deviation
        let mean = X.mean_axis(Axis(0)).ok_or(ScalerError::Empty)?;
        let mut std = X.std_axis(Axis(0), 0.0);

        // Constant features are left unscaled.
        for val in std.iter_mut() {
            if *val < 1e-10 {
                *val = 1.0;
            }
        }

        self.mean = Some(mean);
        self.std = Some(std);
        Ok(())
    }

    pub fn transform(&self, X: &Array2<f64>) -> Result<Array2<f64>, ScalerError> {
        let (mean, std) = match (&self.mean, &self.std) {
            (Some(mean), Some(std)) => (mean, std),
            _ => return Err(ScalerError::NotFitted),
        };

        if X.ncols() != mean.len() {
            return Err(ScalerError::FeatureMismatch {
                expected: mean.len(),
                actual: X.ncols(),
            });
        }

        // (X - mean) / std, broadcast over rows
        Ok((X - mean) / std)
    }

    pub fn fit_transform(&mut self, X: &Array2<f64>) -> Result<Array2<f64>, ScalerError> {
        self.fit(X)?;
        self.transform(X)
    }

    pub fn mean(&self) -> Option<&Array1<f64>> {
        self.mean.as_ref()
    }

    pub fn std(&self) -> Option<&Array1<f64>> {
        self.std.as_ref()
    }
}
