/// Splitting, scaling and the preparation stage

pub mod normalization;
pub mod prepare;
pub mod split;

pub use normalization::{ScalerError, StandardScaler};
pub use prepare::{load_processed, prepare, PrepareError, PrepareOptions, ProcessedData};
pub use split::{stratified_split, SplitError, SplitIndices};
