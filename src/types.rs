/// Data types shared by the pipeline stages

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Numeric table with named columns, one row per observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub values: Array2<f64>,
}

impl Table {
    pub fn new(columns: Vec<String>, values: Array2<f64>) -> Self {
        debug_assert_eq!(columns.len(), values.ncols());
        Self { columns, values }
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Output of a bundled reference dataset provider.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub features: Array2<f64>,
    pub feature_names: Vec<String>,
    pub target: Array1<i64>,
}

/// Per-feature statistics of a fitted scaler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureScale {
    pub name: String,
    pub mean: f64,
    pub std: f64,
}

/// Summary of one preparation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreparedSplit {
    pub prefix: String,
    pub train_rows: usize,
    pub test_rows: usize,
    pub scales: Vec<FeatureScale>,
}

/// Receiver operating characteristic curve.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    pub thresholds: Vec<f64>,
}

/// Metrics for one (model, dataset) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEvaluation {
    pub name: String,
    pub f1: f64,
    pub precision: f64,
    pub recall: f64,
    pub auc: f64,
    #[serde(skip)]
    pub roc: RocCurve,
}
