//! Core traits: the seams between the pipeline and its models/transforms.

use crate::error::Result;
use crate::primitives::Matrix;

/// Trait for supervised classifiers over class-index labels.
///
/// All three models in the comparison (decision tree, logistic regression,
/// random forest) implement this; cross-validation is generic over it.
///
/// # Examples
///
/// ```
/// use genero::prelude::*;
///
/// let x = Matrix::from_vec(4, 1, vec![0.0, 1.0, 10.0, 11.0]).unwrap();
/// let y = vec![0, 0, 1, 1];
///
/// let mut model = DecisionTreeClassifier::new();
/// model.fit(&x, &y).unwrap();
/// assert_eq!(model.predict(&x), y);
/// assert!((model.score(&x, &y) - 1.0).abs() < 1e-6);
/// ```
pub trait Classifier {
    /// Fits the model to training data.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails (dimension mismatch, invalid labels, etc.).
    fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()>;

    /// Predicts class labels for input data.
    fn predict(&self, x: &Matrix<f32>) -> Vec<usize>;

    /// Computes classification accuracy on the given data.
    fn score(&self, x: &Matrix<f32>, y: &[usize]) -> f32 {
        crate::metrics::accuracy(&self.predict(x), y)
    }
}

/// Trait for fitted data transforms (scaler, principal components).
///
/// A transform is fitted once, from one row population, and is immutable
/// afterwards: applying it to a different population always uses the fit
/// set's statistics. Transforming a *changed* population (e.g. after class
/// balancing) means fitting a new value — there is no refit entry point.
pub trait Transformer: Sized {
    /// Fits the transform to data, consuming nothing and returning the
    /// fitted value.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails.
    fn fit(x: &Matrix<f32>) -> Result<Self>;

    /// Transforms data using the fitted parameters.
    ///
    /// # Errors
    ///
    /// Returns an error on dimension mismatch.
    fn transform(&self, x: &Matrix<f32>) -> Result<Matrix<f32>>;

    /// Fits on `x` and transforms `x` in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails.
    fn fit_transform(x: &Matrix<f32>) -> Result<(Self, Matrix<f32>)> {
        let fitted = Self::fit(x)?;
        let transformed = fitted.transform(x)?;
        Ok((fitted, transformed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeneroError;

    // Mock transformer to exercise the trait default method.
    struct HalvingTransform {
        n_cols: usize,
    }

    impl Transformer for HalvingTransform {
        fn fit(x: &Matrix<f32>) -> Result<Self> {
            if x.n_rows() == 0 {
                return Err(GeneroError::DimensionMismatch {
                    expected: "non-empty matrix".to_string(),
                    actual: "0 rows".to_string(),
                });
            }
            Ok(Self { n_cols: x.n_cols() })
        }

        fn transform(&self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
            if x.n_cols() != self.n_cols {
                return Err(GeneroError::DimensionMismatch {
                    expected: format!("{} columns", self.n_cols),
                    actual: format!("{} columns", x.n_cols()),
                });
            }
            let data = x.as_slice().iter().map(|v| v / 2.0).collect();
            Matrix::from_vec(x.n_rows(), x.n_cols(), data).map_err(Into::into)
        }
    }

    #[test]
    fn test_fit_transform_default() {
        let x = Matrix::from_vec(2, 2, vec![2.0, 4.0, 6.0, 8.0]).expect("matrix");
        let (fitted, transformed) = HalvingTransform::fit_transform(&x).expect("should succeed");
        assert_eq!(fitted.n_cols, 2);
        assert_eq!(transformed.get(1, 1), 4.0);
    }

    #[test]
    fn test_fit_transform_propagates_fit_error() {
        let x = Matrix::from_vec(0, 2, vec![]).expect("matrix");
        assert!(HalvingTransform::fit_transform(&x).is_err());
    }

    #[test]
    fn test_transform_dimension_mismatch() {
        let train = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).expect("matrix");
        let other = Matrix::from_vec(2, 3, vec![1.0; 6]).expect("matrix");
        let fitted = HalvingTransform::fit(&train).expect("fit");
        assert!(fitted.transform(&other).is_err());
    }
}
