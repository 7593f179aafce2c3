//! Decision tree classifier (Gini impurity)

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, ArrayView1};

use super::{check_rows, threshold, Classifier, ModelError, POSITIVE};

enum TreeNode {
    Leaf {
        /// Fraction of positive training rows that reached this leaf.
        probability: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

pub struct DecisionTreeClassifier {
    max_depth: usize,
    min_samples_split: usize,
    n_features: usize,
    root: Option<TreeNode>,
}

impl DecisionTreeClassifier {
    pub fn new(max_depth: usize, min_samples_split: usize) -> Self {
        Self {
            max_depth,
            min_samples_split,
            n_features: 0,
            root: None,
        }
    }

    pub fn fit(&mut self, X: &Array2<f64>, y: &Array1<i64>) -> Result<(), ModelError> {
        check_rows(X, y)?;

        let positive: Vec<bool> = y.iter().map(|&label| label == POSITIVE).collect();
        self.n_features = X.ncols();
        self.root = Some(self.build_tree(X, &positive, 0, (0..X.nrows()).collect()));
        Ok(())
    }

    fn build_tree(&self, X: &Array2<f64>, positive: &[bool], depth: usize, indices: Vec<usize>) -> TreeNode {
        let n_pos = indices.iter().filter(|&&i| positive[i]).count();
        let probability = n_pos as f64 / indices.len() as f64;

        // Stop on depth, size or a pure node
        if depth >= self.max_depth
            || indices.len() < self.min_samples_split
            || n_pos == 0
            || n_pos == indices.len()
        {
            return TreeNode::Leaf { probability };
        }

        // Weighted Gini of the unsplit node is the score to beat
        let mut best: Option<(usize, f64)> = None;
        let mut best_score = gini(n_pos, indices.len()) * indices.len() as f64;

        for feature in 0..X.ncols() {
            let mut values: Vec<(f64, bool)> = indices
                .iter()
                .map(|&i| (X[[i, feature]], positive[i]))
                .collect();
            values.sort_by(|a, b| a.0.total_cmp(&b.0));

            // Sweep candidate thresholds at midpoints between distinct values.
            let mut left_pos = 0;
            for k in 1..values.len() {
                if values[k - 1].1 {
                    left_pos += 1;
                }
                if values[k].0 - values[k - 1].0 < 1e-12 {
                    continue;
                }

                let left_n = k;
                let right_n = values.len() - k;
                let score = gini(left_pos, left_n) * left_n as f64
                    + gini(n_pos - left_pos, right_n) * right_n as f64;

                if score < best_score - 1e-12 {
                    best_score = score;
                    best = Some((feature, (values[k - 1].0 + values[k].0) / 2.0));
                }
            }
        }

        let Some((feature, threshold)) = best else {
            return TreeNode::Leaf { probability };
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| X[[i, feature]] < threshold);

        TreeNode::Split {
            feature,
            threshold,
            left: Box::new(self.build_tree(X, positive, depth + 1, left_indices)),
            right: Box::new(self.build_tree(X, positive, depth + 1, right_indices)),
        }
    }

    fn predict_single(node: &TreeNode, sample: ArrayView1<f64>) -> f64 {
        match node {
            TreeNode::Leaf { probability } => *probability,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if sample[*feature] < *threshold {
                    Self::predict_single(left, sample)
                } else {
                    Self::predict_single(right, sample)
                }
            }
        }
    }
}

impl Default for DecisionTreeClassifier {
    fn default() -> Self {
        Self::new(5, 10)
    }
}

impl Classifier for DecisionTreeClassifier {
    fn predict(&self, X: &Array2<f64>) -> Result<Array1<i64>, ModelError> {
        Ok(threshold(self.predict_proba(X)?))
    }

    fn predict_proba(&self, X: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let root = self.root.as_ref().ok_or(ModelError::NotFitted)?;
        if X.ncols() != self.n_features {
            return Err(ModelError::DimensionMismatch {
                expected: self.n_features,
                actual: X.ncols(),
            });
        }

        Ok(X.rows()
            .into_iter()
            .map(|row| Self::predict_single(root, row))
            .collect())
    }
}

fn gini(positives: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = positives as f64 / total as f64;
    2.0 * p * (1.0 - p)
}
