/// Downloads and builds the raw datasets into `data/01_raw`

use anyhow::Context;

use clinical_ml::config::{ProjectLayout, BREAST_CANCER, PIMA, PIMA_COLUMNS, PIMA_URL};
use clinical_ml::data::{fetch_or_build, BreastCancerReference, Bundled, RemoteCsv};
use clinical_ml::logging::{self, LogConfig};

fn main() -> anyhow::Result<()> {
    logging::init(&LogConfig::default());

    let layout = ProjectLayout::from_current_dir().context("resolving project root")?;
    let raw_dir = layout.raw_dir();
    std::fs::create_dir_all(&raw_dir)
        .with_context(|| format!("creating {}", raw_dir.display()))?;

    fetch_or_build(&layout.raw_path(&PIMA), &RemoteCsv::new(PIMA_URL, &PIMA_COLUMNS))
        .context("acquiring Pima dataset")?;

    fetch_or_build(
        &layout.raw_path(&BREAST_CANCER),
        &Bundled::new(BreastCancerReference),
    )
    .context("acquiring breast cancer dataset")?;

    Ok(())
}
