/// Trains the classifiers on the processed splits and writes ROC charts and metrics

use std::fs;
use std::io;

use anyhow::Context;

use clinical_ml::config::{DatasetSpec, ProjectLayout, BREAST_CANCER, PIMA};
use clinical_ml::evaluation::{evaluate, SvgChart, CHART_TITLE};
use clinical_ml::logging::{self, LogConfig};
use clinical_ml::models::{DecisionTreeClassifier, LogisticRegression};
use clinical_ml::preprocessing::load_processed;

fn run(layout: &ProjectLayout, spec: &DatasetSpec) -> anyhow::Result<()> {
    let data = load_processed(&layout.processed_dir(), spec.prefix)
        .with_context(|| format!("loading processed '{}' dataset", spec.prefix))?;

    let mut logistic = LogisticRegression::default();
    logistic
        .fit(&data.X_train, &data.y_train)
        .context("fitting logistic regression")?;

    let mut tree = DecisionTreeClassifier::default();
    tree.fit(&data.X_train, &data.y_train)
        .context("fitting decision tree")?;

    let figures = layout.figures_dir();
    fs::create_dir_all(&figures).with_context(|| format!("creating {}", figures.display()))?;
    let mut chart = SvgChart::new(figures.join(format!("{}_roc.svg", spec.prefix)), CHART_TITLE);

    println!("=== {} ===\n", spec.prefix);
    let results = evaluate(
        &[&logistic, &tree],
        &["Logistic Regression", "Decision Tree"],
        &data.X_test,
        &data.y_test,
        &mut chart,
        &mut io::stdout().lock(),
    )
    .with_context(|| format!("evaluating models on '{}'", spec.prefix))?;

    let metrics_path = figures.join(format!("{}_metrics.json", spec.prefix));
    fs::write(&metrics_path, serde_json::to_string_pretty(&results)?)
        .with_context(|| format!("writing {}", metrics_path.display()))?;
    tracing::info!("Metrics written to '{}'", metrics_path.display());

    Ok(())
}

fn main() -> anyhow::Result<()> {
    logging::init(&LogConfig::default());

    let layout = ProjectLayout::from_current_dir().context("resolving project root")?;

    run(&layout, &PIMA)?;
    run(&layout, &BREAST_CANCER)?;

    Ok(())
}
