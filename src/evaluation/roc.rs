//! ROC curve and area under it

use ndarray::Array1;

use crate::models::POSITIVE;
use crate::types::RocCurve;

/// False/true positive rates at every distinct score, highest first.
///
/// The curve starts at (0, 0) with an infinite threshold and ends at (1, 1).
/// Tied scores move the curve diagonally in one step.
pub fn roc_curve(y_true: &Array1<i64>, scores: &Array1<f64>) -> RocCurve {
    let mut pairs: Vec<(f64, bool)> = scores
        .iter()
        .zip(y_true.iter())
        .map(|(&s, &t)| (s, t == POSITIVE))
        .collect();
    pairs.sort_by(|a, b| b.0.total_cmp(&a.0));

    let n_pos = pairs.iter().filter(|(_, p)| *p).count() as f64;
    let n_neg = pairs.len() as f64 - n_pos;

    let mut curve = RocCurve {
        fpr: vec![0.0],
        tpr: vec![0.0],
        thresholds: vec![f64::INFINITY],
    };

    let (mut tp, mut fp) = (0.0, 0.0);
    let mut i = 0;
    while i < pairs.len() {
        let score = pairs[i].0;
        // Tied scores form one step; total_cmp also groups NaN with itself
        while i < pairs.len() && pairs[i].0.total_cmp(&score).is_eq() {
            if pairs[i].1 {
                tp += 1.0;
            } else {
                fp += 1.0;
            }
            i += 1;
        }

        curve.fpr.push(if n_neg > 0.0 { fp / n_neg } else { 0.0 });
        curve.tpr.push(if n_pos > 0.0 { tp / n_pos } else { 0.0 });
        curve.thresholds.push(score);
    }

    curve
}

/// Trapezoidal area under a curve given by monotone `x`.
pub fn auc(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[0] + ys[1]) / 2.0)
        .sum()
}

pub fn roc_auc(y_true: &Array1<i64>, scores: &Array1<f64>) -> (RocCurve, f64) {
    let curve = roc_curve(y_true, scores);
    let area = auc(&curve.fpr, &curve.tpr);
    (curve, area)
}
