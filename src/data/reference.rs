//! Bundled reference dataset providers

use ndarray::{Array1, Array2};
use thiserror::Error;

use crate::types::ReferenceData;

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("malformed reference data: {0}")]
    Malformed(String),
}

/// In-process dataset provider: feature matrix, feature names, label vector.
pub trait ReferenceDataset {
    fn name(&self) -> &str;
    fn load(&self) -> Result<ReferenceData, ReferenceError>;
}

/// Breast Cancer Wisconsin (Diagnostic): 569 observations, 30 features.
///
/// Label 0 is malignant, 1 benign. The table is the one embedded in
/// `smartcore`'s dataset module.
#[derive(Debug, Clone, Copy, Default)]
pub struct BreastCancerReference;

/// Stored as `f32`; widening through the decimal form keeps `17.99` from
/// turning into `17.989999771118164` in the written CSV.
fn widen(value: f32) -> f64 {
    value.to_string().parse().unwrap_or(f64::from(value))
}

impl ReferenceDataset for BreastCancerReference {
    fn name(&self) -> &str {
        "breast cancer wisconsin (diagnostic)"
    }

    fn load(&self) -> Result<ReferenceData, ReferenceError> {
        let dataset = smartcore::dataset::breast_cancer::load_dataset();

        let values: Vec<f64> = dataset.data.iter().copied().map(widen).collect();
        let features = Array2::from_shape_vec((dataset.num_samples, dataset.num_features), values)
            .map_err(|e| ReferenceError::Malformed(e.to_string()))?;
        let target: Array1<i64> = dataset.target.iter().map(|&t| i64::from(t)).collect();

        Ok(ReferenceData {
            features,
            feature_names: dataset.feature_names,
            target,
        })
    }
}
