//! Logistic regression for binary classification.
//!
//! Sigmoid activation with binary cross-entropy loss, optimized by batch
//! gradient descent. This is the "simplest is best" contender in the model
//! comparison; the labels must be 0 or 1.

use crate::error::Result;
use crate::primitives::{Matrix, Vector};
use crate::traits::Classifier;
use serde::{Deserialize, Serialize};

/// Logistic regression classifier for binary classification.
///
/// # Examples
///
/// ```
/// use genero::prelude::*;
///
/// let x = Matrix::from_vec(4, 1, vec![-2.0, -1.0, 1.0, 2.0])
///     .expect("valid matrix dimensions");
/// let y = vec![0, 0, 1, 1];
///
/// let mut model = LogisticRegression::new()
///     .with_learning_rate(0.5)
///     .with_max_iter(500);
/// model.fit(&x, &y).expect("valid training data");
///
/// for pred in model.predict(&x) {
///     assert!(pred == 0 || pred == 1);
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Model coefficients (weights).
    coefficients: Option<Vector<f32>>,
    /// Intercept (bias) term.
    intercept: f32,
    /// Learning rate for gradient descent.
    learning_rate: f32,
    /// Maximum number of iterations.
    max_iter: usize,
    /// Convergence tolerance on the gradient.
    tol: f32,
}

impl LogisticRegression {
    /// Creates a new logistic regression classifier with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
            learning_rate: 0.1,
            max_iter: 1000,
            tol: 1e-4,
        }
    }

    /// Sets the learning rate.
    #[must_use]
    pub fn with_learning_rate(mut self, lr: f32) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Sets the maximum number of iterations.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Sets the convergence tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tol: f32) -> Self {
        self.tol = tol;
        self
    }

    /// Sigmoid activation: σ(z) = 1 / (1 + e^(-z))
    fn sigmoid(z: f32) -> f32 {
        1.0 / (1.0 + (-z).exp())
    }

    /// Probability of class 1 for each sample.
    ///
    /// # Panics
    ///
    /// Panics if the model is not fitted.
    #[must_use]
    pub fn predict_proba(&self, x: &Matrix<f32>) -> Vector<f32> {
        let coef = self.coefficients.as_ref().expect("Model not fitted yet");
        let (n_samples, _) = x.shape();

        let mut probas = Vec::with_capacity(n_samples);
        for row in 0..n_samples {
            let mut z = self.intercept;
            for col in 0..coef.len() {
                z += coef[col] * x.get(row, col);
            }
            probas.push(Self::sigmoid(z));
        }

        Vector::from_vec(probas)
    }

    /// Fitted coefficients (weights).
    ///
    /// # Panics
    ///
    /// Panics if the model is not fitted.
    #[must_use]
    pub fn coefficients(&self) -> &Vector<f32> {
        self.coefficients.as_ref().expect("Model not fitted")
    }

    /// Intercept (bias) term.
    #[must_use]
    pub fn intercept(&self) -> f32 {
        self.intercept
    }
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        let (n_samples, n_features) = x.shape();

        if n_samples != y.len() {
            return Err("Number of samples in X and y must match".into());
        }
        if n_samples == 0 {
            return Err("Cannot fit with zero samples".into());
        }
        for &label in y {
            if label != 0 && label != 1 {
                return Err("Labels must be 0 or 1 for binary classification".into());
            }
        }

        self.coefficients = Some(Vector::from_vec(vec![0.0; n_features]));
        self.intercept = 0.0;

        // Batch gradient descent
        for _ in 0..self.max_iter {
            let probas = self.predict_proba(x);

            let mut coef_grad = vec![0.0; n_features];
            let mut intercept_grad = 0.0;

            for i in 0..n_samples {
                let error = probas[i] - y[i] as f32;
                intercept_grad += error;
                for (j, grad) in coef_grad.iter_mut().enumerate() {
                    *grad += error * x.get(i, j);
                }
            }

            let n = n_samples as f32;
            intercept_grad /= n;
            for grad in &mut coef_grad {
                *grad /= n;
            }

            self.intercept -= self.learning_rate * intercept_grad;
            if let Some(ref mut coef) = self.coefficients {
                for j in 0..n_features {
                    coef[j] -= self.learning_rate * coef_grad[j];
                }
            }

            if intercept_grad.abs() < self.tol && coef_grad.iter().all(|&g| g.abs() < self.tol) {
                break;
            }
        }

        Ok(())
    }

    /// Predicts 0 or 1 per sample at a probability threshold of 0.5.
    fn predict(&self, x: &Matrix<f32>) -> Vec<usize> {
        self.predict_proba(x)
            .as_slice()
            .iter()
            .map(|&p| usize::from(p >= 0.5))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linearly_separable() -> (Matrix<f32>, Vec<usize>) {
        let x = Matrix::from_vec(6, 1, vec![-3.0, -2.0, -1.0, 1.0, 2.0, 3.0])
            .expect("valid matrix dimensions");
        let y = vec![0, 0, 0, 1, 1, 1];
        (x, y)
    }

    #[test]
    fn test_fit_predict_separable() {
        let (x, y) = linearly_separable();
        let mut model = LogisticRegression::new()
            .with_learning_rate(0.5)
            .with_max_iter(2000);
        model.fit(&x, &y).expect("fit should succeed");
        assert_eq!(model.predict(&x), y);
        assert!((model.score(&x, &y) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_probabilities_ordered_by_feature() {
        let (x, y) = linearly_separable();
        let mut model = LogisticRegression::new()
            .with_learning_rate(0.5)
            .with_max_iter(2000);
        model.fit(&x, &y).expect("fit should succeed");

        let probas = model.predict_proba(&x);
        // Monotone feature, positive class on the right: probabilities
        // should increase with the feature value.
        for i in 1..probas.len() {
            assert!(probas[i] >= probas[i - 1]);
        }
        assert!(probas[0] < 0.5);
        assert!(probas[5] > 0.5);
    }

    #[test]
    fn test_coefficient_sign() {
        let (x, y) = linearly_separable();
        let mut model = LogisticRegression::new()
            .with_learning_rate(0.5)
            .with_max_iter(2000);
        model.fit(&x, &y).expect("fit should succeed");
        assert!(model.coefficients()[0] > 0.0);
    }

    #[test]
    fn test_rejects_non_binary_labels() {
        let x = Matrix::from_vec(3, 1, vec![1.0, 2.0, 3.0]).expect("valid");
        let mut model = LogisticRegression::new();
        assert!(model.fit(&x, &[0, 1, 2]).is_err());
    }

    #[test]
    fn test_rejects_mismatched_lengths() {
        let x = Matrix::from_vec(2, 1, vec![1.0, 2.0]).expect("valid");
        let mut model = LogisticRegression::new();
        assert!(model.fit(&x, &[0]).is_err());
    }

    #[test]
    fn test_rejects_empty() {
        let x = Matrix::from_vec(0, 1, vec![]).expect("valid");
        let mut model = LogisticRegression::new();
        assert!(model.fit(&x, &[]).is_err());
    }

    #[test]
    fn test_determinism() {
        let (x, y) = linearly_separable();
        let mut a = LogisticRegression::new().with_max_iter(500);
        let mut b = LogisticRegression::new().with_max_iter(500);
        a.fit(&x, &y).expect("fit");
        b.fit(&x, &y).expect("fit");
        assert_eq!(a.coefficients().as_slice(), b.coefficients().as_slice());
        assert!((a.intercept() - b.intercept()).abs() < 1e-12);
    }
}
