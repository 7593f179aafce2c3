/// Binary classifiers

use ndarray::{Array1, Array2};
use thiserror::Error;

pub mod logistic;
pub mod tree;

pub use logistic::LogisticRegression;
pub use tree::DecisionTreeClassifier;

/// Label of the positive class.
pub const POSITIVE: i64 = 1;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("model not fitted")]
    NotFitted,

    #[error("empty training set")]
    Empty,

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Capability set required by evaluation.
pub trait Classifier {
    /// Hard class label per row.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<i64>, ModelError>;

    /// Probability of the positive class per row.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError>;
}

pub(crate) fn check_rows(x: &Array2<f64>, y: &Array1<i64>) -> Result<(), ModelError> {
    if x.nrows() == 0 {
        return Err(ModelError::Empty);
    }
    if x.nrows() != y.len() {
        return Err(ModelError::DimensionMismatch {
            expected: x.nrows(),
            actual: y.len(),
        });
    }
    Ok(())
}

pub(crate) fn threshold(proba: Array1<f64>) -> Array1<i64> {
    proba.mapv(|p| if p >= 0.5 { POSITIVE } else { 0 })
}
