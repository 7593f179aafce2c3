//! Model evaluation on a held-out test set

use std::io::{self, Write};

use ndarray::{Array1, Array2};
use thiserror::Error;

pub mod chart;
pub mod metrics;
pub mod roc;

pub use chart::{ChartError, ChartSurface, Curve, CurveRecorder, CurveStyle, SvgChart};
pub use metrics::ConfusionMatrix;
pub use roc::{auc, roc_auc, roc_curve};

use crate::models::{Classifier, ModelError, POSITIVE};
use crate::types::ModelEvaluation;

pub const CHART_TITLE: &str = "Comparative ROC Curves";
pub const REFERENCE_LABEL: &str = "Random Chance (AUC = 0.5)";

#[derive(Debug, Error)]
pub enum EvaluateError {
    #[error("{models} models but {names} names")]
    LengthMismatch { models: usize, names: usize },

    #[error("test features have {features} rows but labels have {labels}")]
    RowMismatch { features: usize, labels: usize },

    #[error("test labels must contain both classes to compute ROC AUC")]
    SingleClass,

    #[error("model '{name}' failed: {source}")]
    Model {
        name: String,
        #[source]
        source: ModelError,
    },

    #[error("model '{name}' returned {actual} predictions for {expected} rows")]
    PredictionCount {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("model '{name}' produced a non-finite score")]
    NonFiniteScore { name: String },

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),
}

/// Scores every model on the test set, writes one report block per model to
/// `out` and adds each ROC curve, plus the chance diagonal, to `chart`.
///
/// `models` and `names` are parallel lists and must have equal length; this
/// is checked before any model is run.
pub fn evaluate<W: Write>(
    models: &[&dyn Classifier],
    names: &[&str],
    x_test: &Array2<f64>,
    y_test: &Array1<i64>,
    chart: &mut dyn ChartSurface,
    out: &mut W,
) -> Result<Vec<ModelEvaluation>, EvaluateError> {
    if models.len() != names.len() {
        return Err(EvaluateError::LengthMismatch {
            models: models.len(),
            names: names.len(),
        });
    }
    if x_test.nrows() != y_test.len() {
        return Err(EvaluateError::RowMismatch {
            features: x_test.nrows(),
            labels: y_test.len(),
        });
    }
    let positives = y_test.iter().filter(|&&y| y == POSITIVE).count();
    if positives == 0 || positives == y_test.len() {
        return Err(EvaluateError::SingleClass);
    }

    let mut results = Vec::with_capacity(models.len());

    for (model, &name) in models.iter().zip(names) {
        let model_err = |source| EvaluateError::Model {
            name: name.to_string(),
            source,
        };
        let y_pred = model.predict(x_test).map_err(model_err)?;
        let y_prob = model.predict_proba(x_test).map_err(model_err)?;
        for actual in [y_pred.len(), y_prob.len()] {
            if actual != y_test.len() {
                return Err(EvaluateError::PredictionCount {
                    name: name.to_string(),
                    expected: y_test.len(),
                    actual,
                });
            }
        }

        if y_prob.iter().any(|p| !p.is_finite()) {
            return Err(EvaluateError::NonFiniteScore {
                name: name.to_string(),
            });
        }

        let cm = ConfusionMatrix::from_predictions(y_test, &y_pred);
        let (roc, area) = roc_auc(y_test, &y_prob);

        let evaluation = ModelEvaluation {
            name: name.to_string(),
            f1: cm.f1(),
            precision: cm.precision(),
            recall: cm.recall(),
            auc: area,
            roc,
        };

        write_report(out, &evaluation)?;
        tracing::debug!(model = name, auc = area, "Model evaluated");

        chart.add_curve(
            &evaluation.roc.fpr,
            &evaluation.roc.tpr,
            &format!("{} (AUC = {:.3})", name, area),
            CurveStyle::Model,
        )?;

        results.push(evaluation);
    }

    chart.add_curve(&[0.0, 1.0], &[0.0, 1.0], REFERENCE_LABEL, CurveStyle::Reference)?;
    chart.flush()?;

    Ok(results)
}

pub fn write_report<W: Write>(out: &mut W, evaluation: &ModelEvaluation) -> io::Result<()> {
    writeln!(out, "--- Results for {} ---", evaluation.name)?;
    writeln!(out, "F1-score : {:.4}", evaluation.f1)?;
    writeln!(out, "Precision: {:.4}", evaluation.precision)?;
    writeln!(out, "Recall   : {:.4}", evaluation.recall)?;
    writeln!(out, "AUC      : {:.4}", evaluation.auc)?;
    writeln!(out, "{}\n", "-".repeat(30))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::cell::Cell;

    /// Scores each row by its first feature.
    struct FirstFeature {
        calls: Cell<usize>,
    }

    impl FirstFeature {
        fn new() -> Self {
            Self { calls: Cell::new(0) }
        }
    }

    impl Classifier for FirstFeature {
        fn predict(&self, x: &Array2<f64>) -> Result<Array1<i64>, ModelError> {
            self.calls.set(self.calls.get() + 1);
            Ok(x.column(0).mapv(|v| (v >= 0.5) as i64))
        }

        fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
            self.calls.set(self.calls.get() + 1);
            Ok(x.column(0).to_owned())
        }
    }

    struct Unfitted;

    impl Classifier for Unfitted {
        fn predict(&self, _: &Array2<f64>) -> Result<Array1<i64>, ModelError> {
            Err(ModelError::NotFitted)
        }

        fn predict_proba(&self, _: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
            Err(ModelError::NotFitted)
        }
    }

    /// Scores every row as NaN.
    struct Diverged;

    impl Classifier for Diverged {
        fn predict(&self, x: &Array2<f64>) -> Result<Array1<i64>, ModelError> {
            Ok(Array1::zeros(x.nrows()))
        }

        fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
            Ok(Array1::from_elem(x.nrows(), f64::NAN))
        }
    }

    fn test_set() -> (Array2<f64>, Array1<i64>) {
        (array![[0.1], [0.4], [0.35], [0.8]], array![0, 0, 1, 1])
    }

    #[test]
    fn test_mismatched_names_fail_before_scoring() {
        let (x, y) = test_set();
        let model = FirstFeature::new();
        let mut chart = CurveRecorder::default();
        let mut out = Vec::new();

        let err = evaluate(&[&model], &["a", "b"], &x, &y, &mut chart, &mut out).unwrap_err();

        assert!(matches!(err, EvaluateError::LengthMismatch { models: 1, names: 2 }));
        assert_eq!(model.calls.get(), 0);
        assert!(chart.curves.is_empty());
        assert!(out.is_empty());
    }

    #[test]
    fn test_metrics_report_and_curves() {
        let (x, y) = test_set();
        let model = FirstFeature::new();
        let mut chart = CurveRecorder::default();
        let mut out = Vec::new();

        let results = evaluate(&[&model], &["first"], &x, &y, &mut chart, &mut out).unwrap();

        assert_eq!(results.len(), 1);
        let r = &results[0];
        // predictions: 0, 0, 0, 1
        assert!((r.precision - 1.0).abs() < 1e-12);
        assert!((r.recall - 0.5).abs() < 1e-12);
        assert!((r.f1 - 2.0 / 3.0).abs() < 1e-12);
        assert!((r.auc - 0.75).abs() < 1e-12);

        let report = String::from_utf8(out).unwrap();
        assert_eq!(
            report,
            "--- Results for first ---\n\
             F1-score : 0.6667\n\
             Precision: 1.0000\n\
             Recall   : 0.5000\n\
             AUC      : 0.7500\n\
             ------------------------------\n\n"
        );

        assert_eq!(chart.curves.len(), 2);
        assert_eq!(chart.curves[0].label, "first (AUC = 0.750)");
        assert_eq!(chart.curves[1].label, REFERENCE_LABEL);
        assert_eq!(chart.curves[1].x, vec![0.0, 1.0]);
        assert_eq!(chart.curves[1].style, CurveStyle::Reference);
        assert_eq!(chart.flushes, 1);
    }

    #[test]
    fn test_diagonal_present_without_models() {
        let (x, y) = test_set();
        let mut chart = CurveRecorder::default();
        let results = evaluate(&[], &[], &x, &y, &mut chart, &mut io::sink()).unwrap();
        assert!(results.is_empty());
        assert_eq!(chart.curves.len(), 1);
    }

    #[test]
    fn test_single_class_rejected() {
        let x = array![[0.1], [0.9]];
        let y = array![1, 1];
        let model = FirstFeature::new();
        let err = evaluate(
            &[&model],
            &["m"],
            &x,
            &y,
            &mut CurveRecorder::default(),
            &mut io::sink(),
        )
        .unwrap_err();
        assert!(matches!(err, EvaluateError::SingleClass));
    }

    #[test]
    fn test_model_failure_names_model() {
        let (x, y) = test_set();
        let err = evaluate(
            &[&Unfitted],
            &["broken"],
            &x,
            &y,
            &mut CurveRecorder::default(),
            &mut io::sink(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_non_finite_score_rejected() {
        let (x, y) = test_set();
        let mut chart = CurveRecorder::default();
        let mut out = Vec::new();
        let err = evaluate(&[&Diverged], &["nan"], &x, &y, &mut chart, &mut out).unwrap_err();

        assert!(matches!(err, EvaluateError::NonFiniteScore { ref name } if name == "nan"));
        assert!(out.is_empty());
        assert_eq!(chart.flushes, 0);
    }
}
