/// Splits and scales the raw datasets into `data/02_processed`

use anyhow::Context;

use clinical_ml::config::{DatasetSpec, ProjectLayout, BREAST_CANCER, PIMA, SPLIT_SEED};
use clinical_ml::logging::{self, LogConfig};
use clinical_ml::preprocessing::{prepare, PrepareOptions};

fn process(layout: &ProjectLayout, spec: &DatasetSpec) -> anyhow::Result<()> {
    let options = PrepareOptions::new(spec.prefix, spec.label_column, spec.test_fraction, SPLIT_SEED);
    let summary = prepare(&layout.raw_path(spec), &options, &layout.processed_dir())
        .with_context(|| format!("processing '{}' dataset", spec.prefix))?;

    for scale in &summary.scales {
        tracing::debug!(feature = %scale.name, mean = scale.mean, std = scale.std, "Scaler statistics");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    logging::init(&LogConfig::default());

    let layout = ProjectLayout::from_current_dir().context("resolving project root")?;

    process(&layout, &PIMA)?;
    process(&layout, &BREAST_CANCER)?;

    Ok(())
}
