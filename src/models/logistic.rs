//! Logistic regression trained by batch gradient descent

use ndarray::{Array1, Array2};

use super::{check_rows, threshold, Classifier, ModelError, POSITIVE};

#[derive(Debug, Clone)]
pub struct LogisticRegression {
    learning_rate: f64,
    max_iter: usize,
    tolerance: f64,
    /// L2 penalty strength.
    alpha: f64,
    weights: Option<Array1<f64>>,
    bias: f64,
    pub cost_history: Vec<f64>,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(0.1, 2000, 1e-7, 0.01)
    }
}

impl LogisticRegression {
    pub fn new(learning_rate: f64, max_iter: usize, tolerance: f64, alpha: f64) -> Self {
        Self {
            learning_rate,
            max_iter,
            tolerance,
            alpha,
            weights: None,
            bias: 0.0,
            cost_history: Vec::new(),
        }
    }

    fn sigmoid(z: f64) -> f64 {
        if z >= 0.0 {
            1.0 / (1.0 + (-z).exp())
        } else {
            let exp_z = z.exp();
            exp_z / (1.0 + exp_z)
        }
    }

    fn log_loss(y: &Array1<f64>, p: &Array1<f64>) -> f64 {
        let eps = 1e-15;
        -y.iter()
            .zip(p.iter())
            .map(|(&y, &p)| {
                let p = p.clamp(eps, 1.0 - eps);
                y * p.ln() + (1.0 - y) * (1.0 - p).ln()
            })
            .sum::<f64>()
            / y.len() as f64
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<i64>) -> Result<(), ModelError> {
        check_rows(x, y)?;

        let n_samples = x.nrows() as f64;
        let target = y.mapv(|label| if label == POSITIVE { 1.0 } else { 0.0 });
        let mut weights = Array1::<f64>::zeros(x.ncols());
        let mut bias = 0.0;

        self.cost_history.clear();

        for iter in 0..self.max_iter {
            // Forward pass
            let predictions = (x.dot(&weights) + bias).mapv(Self::sigmoid);

            // Log-loss gradient plus L2 term (bias is not penalized)
            let errors = &predictions - &target;
            let dw = x.t().dot(&errors) / n_samples + &weights * self.alpha;
            let db = errors.sum() / n_samples;

            weights = weights - dw * self.learning_rate;
            bias -= self.learning_rate * db;

            // Stop once the loss stops moving
            let cost = Self::log_loss(&target, &predictions);
            self.cost_history.push(cost);

            if iter > 0 && (self.cost_history[iter - 1] - cost).abs() < self.tolerance {
                tracing::debug!("Logistic regression converged at iteration {}", iter);
                break;
            }
        }

        self.weights = Some(weights);
        self.bias = bias;
        Ok(())
    }
}

impl Classifier for LogisticRegression {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<i64>, ModelError> {
        Ok(threshold(self.predict_proba(x)?))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let weights = self.weights.as_ref().ok_or(ModelError::NotFitted)?;
        if x.ncols() != weights.len() {
            return Err(ModelError::DimensionMismatch {
                expected: weights.len(),
                actual: x.ncols(),
            });
        }
        Ok((x.dot(weights) + self.bias).mapv(Self::sigmoid))
    }
}
