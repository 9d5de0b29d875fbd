//! Principal component analysis for dimensionality reduction.
//!
//! Two modes of use, matching the exploration-then-selection flow:
//!
//! 1. **Explore**: fit with all components ([`PrincipalComponents::fit`])
//!    and inspect the explained-variance spectrum.
//! 2. **Select and project**: pick the smallest component count whose
//!    cumulative explained variance clears a threshold
//!    ([`select_component_count`]), refit restricted to that count
//!    ([`PrincipalComponents::fit_k`]), and project.
//!
//! A fitted value is immutable. When the row population changes (say,
//! after class balancing), the caller fits a new value; the old projection
//! is simply a different transform and is never mutated into the new one.

use crate::error::{GeneroError, Result};
use crate::primitives::Matrix;
use crate::traits::Transformer;

/// A fitted principal-component transform.
///
/// Components are ranked by the fraction of total variance they explain,
/// descending. Explained-variance ratios are always measured against the
/// *total* variance of the fit data, so a restricted fit still reports
/// how much of the full spectrum it covers.
///
/// # Examples
///
/// ```
/// use genero::prelude::*;
///
/// let data = Matrix::from_vec(4, 3, vec![
///     1.0, 2.0, 0.5,
///     4.0, 5.0, 9.0,
///     7.0, 8.0, 2.5,
///     10.0, 11.0, 4.0,
/// ]).expect("valid matrix dimensions");
///
/// let pca = PrincipalComponents::fit_k(&data, 2).expect("fit should succeed");
/// let projected = pca.transform(&data).expect("same feature count");
/// assert_eq!(projected.shape(), (4, 2));
/// ```
#[derive(Debug, Clone)]
pub struct PrincipalComponents {
    /// Number of retained components.
    n_components: usize,
    /// Mean of each input feature (computed during fit).
    mean: Vec<f32>,
    /// Principal axes, one row per component (n_components x n_features).
    components: Matrix<f32>,
    /// Variance explained by each retained component.
    explained_variance: Vec<f32>,
    /// Fraction of total variance explained by each retained component.
    explained_variance_ratio: Vec<f32>,
}

impl PrincipalComponents {
    /// Fits with as many components as input features (explore mode).
    ///
    /// # Errors
    ///
    /// Returns an error if the input has fewer than two rows or no columns.
    pub fn fit(x: &Matrix<f32>) -> Result<Self> {
        Self::fit_k(x, x.n_cols())
    }

    /// Fits a transform restricted to the top `n_components` components.
    ///
    /// # Errors
    ///
    /// Returns an error if `n_components` is zero or exceeds the feature
    /// count, or if the input has fewer than two rows.
    pub fn fit_k(x: &Matrix<f32>, n_components: usize) -> Result<Self> {
        use nalgebra::{DMatrix, SymmetricEigen};

        let (n_samples, n_features) = x.shape();

        if n_components == 0 || n_components > n_features {
            return Err(GeneroError::invalid_config(
                "n_components",
                n_components,
                &format!("1..={n_features}"),
            ));
        }
        if n_samples < 2 {
            return Err(GeneroError::data_quality(
                "dimensionality reduction",
                format!("need at least 2 rows to estimate covariance, got {n_samples}"),
            ));
        }

        // Feature means
        let mut mean = vec![0.0; n_features];
        #[allow(clippy::needless_range_loop)]
        for j in 0..n_features {
            let mut sum = 0.0;
            for i in 0..n_samples {
                sum += x.get(i, j);
            }
            mean[j] = sum / n_samples as f32;
        }

        // Center the data
        let mut centered = vec![0.0; n_samples * n_features];
        for i in 0..n_samples {
            for j in 0..n_features {
                centered[i * n_features + j] = x.get(i, j) - mean[j];
            }
        }

        // Covariance matrix: Σ = (X^T X) / (n-1)
        let mut cov = vec![0.0; n_features * n_features];
        for i in 0..n_features {
            for j in 0..n_features {
                let mut sum = 0.0;
                for k in 0..n_samples {
                    sum += centered[k * n_features + i] * centered[k * n_features + j];
                }
                cov[i * n_features + j] = sum / (n_samples - 1) as f32;
            }
        }

        let cov_matrix = DMatrix::from_row_slice(n_features, n_features, &cov);
        let eigen = SymmetricEigen::new(cov_matrix);
        let eigenvalues = eigen.eigenvalues;
        let eigenvectors = eigen.eigenvectors;

        // Rank components by eigenvalue, descending
        let mut indices: Vec<usize> = (0..n_features).collect();
        indices.sort_by(|&a, &b| {
            eigenvalues[b]
                .partial_cmp(&eigenvalues[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut components_data = vec![0.0; n_components * n_features];
        let mut explained_variance = vec![0.0; n_components];

        for (i, &idx) in indices.iter().take(n_components).enumerate() {
            explained_variance[i] = eigenvalues[idx];
            for j in 0..n_features {
                components_data[i * n_features + j] = eigenvectors[(j, idx)];
            }
        }

        // Ratios against the full spectrum, not just retained components
        let total_variance: f32 = eigenvalues.iter().copied().sum();
        let explained_variance_ratio: Vec<f32> = explained_variance
            .iter()
            .map(|&v| v / total_variance)
            .collect();

        Ok(Self {
            n_components,
            mean,
            components: Matrix::from_vec(n_components, n_features, components_data)?,
            explained_variance,
            explained_variance_ratio,
        })
    }

    /// Number of retained components.
    #[must_use]
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// Variance explained by each retained component, descending.
    #[must_use]
    pub fn explained_variance(&self) -> &[f32] {
        &self.explained_variance
    }

    /// Fraction of total variance explained by each retained component.
    #[must_use]
    pub fn explained_variance_ratio(&self) -> &[f32] {
        &self.explained_variance_ratio
    }

    /// Running sum of the explained-variance ratios, in rank order.
    #[must_use]
    pub fn cumulative_explained_variance(&self) -> Vec<f32> {
        self.explained_variance_ratio
            .iter()
            .scan(0.0, |acc, &r| {
                *acc += r;
                Some(*acc)
            })
            .collect()
    }

    /// Projects data onto the retained components.
    ///
    /// # Errors
    ///
    /// Returns an error if the column count differs from the fit data.
    pub fn transform(&self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
        <Self as Transformer>::transform(self, x)
    }
}

impl Transformer for PrincipalComponents {
    fn fit(x: &Matrix<f32>) -> Result<Self> {
        PrincipalComponents::fit(x)
    }

    /// X_pca = (X - mean) @ components^T
    fn transform(&self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
        let (n_samples, n_features) = x.shape();

        if n_features != self.mean.len() {
            return Err(GeneroError::DimensionMismatch {
                expected: format!("{} features", self.mean.len()),
                actual: format!("{n_features} features"),
            });
        }

        let mut result = vec![0.0; n_samples * self.n_components];
        for i in 0..n_samples {
            for j in 0..self.n_components {
                let mut value = 0.0;
                #[allow(clippy::needless_range_loop)]
                for k in 0..n_features {
                    value += (x.get(i, k) - self.mean[k]) * self.components.get(j, k);
                }
                result[i * self.n_components + j] = value;
            }
        }

        Matrix::from_vec(n_samples, self.n_components, result).map_err(Into::into)
    }
}

/// Chooses the smallest component count whose cumulative explained-variance
/// ratio strictly exceeds `threshold`.
///
/// # Errors
///
/// Returns a configuration error if the threshold is not in (0, 1), or if
/// no prefix of the spectrum exceeds it (a threshold at or beyond the total
/// variance must fail loudly rather than silently keeping everything).
///
/// # Examples
///
/// ```
/// use genero::decomposition::select_component_count;
///
/// let ratios = [0.5, 0.3, 0.15, 0.05];
/// assert_eq!(select_component_count(&ratios, 0.75).unwrap(), 2);
/// assert_eq!(select_component_count(&ratios, 0.80).unwrap(), 3);
/// // A spectrum that never clears the threshold is a configuration error.
/// assert!(select_component_count(&ratios[..2], 0.9).is_err());
/// ```
pub fn select_component_count(ratios: &[f32], threshold: f32) -> Result<usize> {
    if !threshold.is_finite() || threshold <= 0.0 || threshold >= 1.0 {
        return Err(GeneroError::invalid_config(
            "variance_threshold",
            threshold,
            "a value strictly between 0 and 1",
        ));
    }

    let mut cumulative = 0.0f32;
    for (i, &ratio) in ratios.iter().enumerate() {
        cumulative += ratio;
        if cumulative > threshold {
            return Ok(i + 1);
        }
    }

    Err(GeneroError::invalid_config(
        "variance_threshold",
        threshold,
        &format!(
            "below the total explained variance {:.6} of the {} available components",
            cumulative,
            ratios.len()
        ),
    ))
}
