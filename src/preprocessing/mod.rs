//! Preprocessing transforms: feature standardization and label encoding.
//!
//! # Example
//!
//! ```
//! use genero::prelude::*;
//!
//! let data = Matrix::from_vec(4, 2, vec![
//!     1.0, 100.0,
//!     2.0, 200.0,
//!     3.0, 300.0,
//!     4.0, 400.0,
//! ]).expect("valid matrix dimensions");
//!
//! // Standardize to zero mean and unit variance
//! let (scaler, scaled) = StandardScaler::fit_transform(&data).expect("non-degenerate data");
//! assert_eq!(scaled.shape(), (4, 2));
//!
//! // New data is transformed with the *fitted* statistics
//! let more = Matrix::from_vec(1, 2, vec![5.0, 500.0]).expect("valid matrix dimensions");
//! let projected = scaler.transform(&more).expect("matching column count");
//! assert!(projected.get(0, 0) > 0.0);
//! ```

use crate::error::{GeneroError, Result};
use crate::primitives::Matrix;
use crate::traits::Transformer;
use serde::{Deserialize, Serialize};

/// Standardizes features by removing the mean and scaling to unit variance.
///
/// The standard score of a sample x is: z = (x - mean) / std
///
/// A fitted scaler is immutable; transforming rows it was not fitted on
/// always uses the fit set's statistics. A column with zero standard
/// deviation is rejected at fit time as a data-quality error — the
/// transform would otherwise divide by zero for that feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Mean of each feature (computed during fit).
    mean: Vec<f32>,
    /// Standard deviation of each feature (computed during fit).
    std: Vec<f32>,
}

impl StandardScaler {
    /// Returns the mean of each feature.
    #[must_use]
    pub fn mean(&self) -> &[f32] {
        &self.mean
    }

    /// Returns the standard deviation of each feature.
    #[must_use]
    pub fn std(&self) -> &[f32] {
        &self.std
    }
}

impl Transformer for StandardScaler {
    /// Computes the mean and population standard deviation of each feature.
    fn fit(x: &Matrix<f32>) -> Result<Self> {
        let (n_samples, n_features) = x.shape();

        if n_samples == 0 {
            return Err(GeneroError::data_quality(
                "standardization",
                "cannot fit a scaler with zero samples",
            ));
        }

        let mut mean = vec![0.0; n_features];
        for (j, mean_j) in mean.iter_mut().enumerate() {
            let mut sum = 0.0;
            for i in 0..n_samples {
                sum += x.get(i, j);
            }
            *mean_j = sum / n_samples as f32;
        }

        let mut std = vec![0.0; n_features];
        for (j, std_j) in std.iter_mut().enumerate() {
            let mut sum_sq = 0.0;
            for i in 0..n_samples {
                let diff = x.get(i, j) - mean[j];
                sum_sq += diff * diff;
            }
            // Population std (divide by n, not n-1)
            *std_j = (sum_sq / n_samples as f32).sqrt();
        }

        if let Some(j) = std.iter().position(|&s| s <= f32::EPSILON) {
            return Err(GeneroError::data_quality(
                "standardization",
                format!("feature column {j} has zero standard deviation"),
            ));
        }

        Ok(Self { mean, std })
    }

    /// Standardizes the data using fitted mean and std.
    fn transform(&self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
        let (n_samples, n_features) = x.shape();
        if n_features != self.mean.len() {
            return Err(GeneroError::DimensionMismatch {
                expected: format!("{} features", self.mean.len()),
                actual: format!("{n_features} features"),
            });
        }

        let mut result = vec![0.0; n_samples * n_features];
        for i in 0..n_samples {
            for j in 0..n_features {
                result[i * n_features + j] = (x.get(i, j) - self.mean[j]) / self.std[j];
            }
        }

        Matrix::from_vec(n_samples, n_features, result).map_err(Into::into)
    }
}

/// Maps string class labels to contiguous class indices.
///
/// Classes are sorted on fit, so the index assignment is deterministic
/// regardless of row order ("Hip-Hop" before "Rock").
///
/// # Examples
///
/// ```
/// use genero::preprocessing::LabelEncoder;
///
/// let labels = vec!["Rock".to_string(), "Hip-Hop".to_string(), "Rock".to_string()];
/// let encoder = LabelEncoder::fit(&labels);
/// assert_eq!(encoder.classes(), &["Hip-Hop".to_string(), "Rock".to_string()]);
/// assert_eq!(encoder.transform(&labels).unwrap(), vec![1, 0, 1]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Learns the sorted set of distinct classes from the labels.
    #[must_use]
    pub fn fit(labels: &[String]) -> Self {
        let mut classes: Vec<String> = labels.to_vec();
        classes.sort_unstable();
        classes.dedup();
        Self { classes }
    }

    /// Returns the known classes, in index order.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of distinct classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Maps labels to class indices.
    ///
    /// # Errors
    ///
    /// Returns an error if a label was not seen during fit.
    pub fn transform(&self, labels: &[String]) -> Result<Vec<usize>> {
        labels
            .iter()
            .map(|label| {
                self.classes
                    .binary_search(label)
                    .map_err(|_| GeneroError::data_quality(
                        "label encoding",
                        format!("unknown class label '{label}'"),
                    ))
            })
            .collect()
    }
}
