//! Clinical ML pipeline: acquisition, preparation and evaluation stages

pub mod config;
pub mod data;
pub mod evaluation;
pub mod logging;
pub mod models;
pub mod preprocessing;
pub mod types;

pub use types::*;

pub use data::{fetch_or_build, Acquisition};
pub use evaluation::evaluate;
pub use models::Classifier;
pub use preprocessing::{prepare, PrepareOptions};
