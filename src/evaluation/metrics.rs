//! Binary classification metrics with respect to the positive class

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::models::POSITIVE;

/// Confusion matrix for binary classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tp: usize,
    pub tn: usize,
    pub fp: usize,
    pub fn_: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(y_true: &Array1<i64>, y_pred: &Array1<i64>) -> Self {
        let mut cm = Self::default();
        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            match (t == POSITIVE, p == POSITIVE) {
                (true, true) => cm.tp += 1,
                (false, false) => cm.tn += 1,
                (false, true) => cm.fp += 1,
                (true, false) => cm.fn_ += 1,
            }
        }
        cm
    }

    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }

    /// TP / (TP + FP), 0 when nothing was predicted positive.
    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    /// TP / (TP + FN), 0 when there are no positives.
    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    pub fn f1(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        if precision + recall < 1e-12 {
            return 0.0;
        }
        2.0 * precision * recall / (precision + recall)
    }
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}
