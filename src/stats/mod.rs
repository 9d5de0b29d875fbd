//! Descriptive statistics over the feature table.
//!
//! Only what the exploration step needs: the pairwise Pearson correlation
//! summary across feature columns.

use crate::error::{GeneroError, Result};
use crate::primitives::Matrix;

/// Pairwise Pearson correlations between feature columns, with the column
/// names carried along for display.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    /// Feature names, in column order.
    pub names: Vec<String>,
    /// Symmetric matrix of correlation coefficients; diagonal is 1.0.
    pub values: Matrix<f32>,
}

impl CorrelationMatrix {
    /// Returns the strongest off-diagonal correlation as
    /// `(name_a, name_b, r)`, by absolute value.
    #[must_use]
    pub fn strongest_pair(&self) -> Option<(&str, &str, f32)> {
        let n = self.names.len();
        let mut best: Option<(usize, usize, f32)> = None;
        for i in 0..n {
            for j in (i + 1)..n {
                let r = self.values.get(i, j);
                if best.is_none() || r.abs() > best.expect("just checked").2.abs() {
                    best = Some((i, j, r));
                }
            }
        }
        best.map(|(i, j, r)| (self.names[i].as_str(), self.names[j].as_str(), r))
    }
}

/// Computes the Pearson correlation matrix of the columns of `x`.
///
/// # Errors
///
/// Returns an error if `names` doesn't match the column count, if there are
/// fewer than two rows, or if any column has zero variance (the coefficient
/// is undefined there, and a constant feature is a data-quality problem this
/// pipeline refuses to paper over).
///
/// # Examples
///
/// ```
/// use genero::primitives::Matrix;
/// use genero::stats::correlation_matrix;
///
/// // Second column is the first scaled by -2: perfectly anti-correlated.
/// let x = Matrix::from_vec(3, 2, vec![1.0, -2.0, 2.0, -4.0, 3.0, -6.0]).unwrap();
/// let names = vec!["a".to_string(), "b".to_string()];
/// let corr = correlation_matrix(&x, &names).unwrap();
/// assert!((corr.values.get(0, 1) + 1.0).abs() < 1e-5);
/// ```
pub fn correlation_matrix(x: &Matrix<f32>, names: &[String]) -> Result<CorrelationMatrix> {
    let (n_rows, n_cols) = x.shape();

    if names.len() != n_cols {
        return Err(GeneroError::DimensionMismatch {
            expected: format!("{n_cols} column names"),
            actual: format!("{}", names.len()),
        });
    }
    if n_rows < 2 {
        return Err(GeneroError::data_quality(
            "correlation",
            format!("need at least 2 rows, got {n_rows}"),
        ));
    }

    // Column means and centered values
    let mut means = vec![0.0f32; n_cols];
    for (j, mean_j) in means.iter_mut().enumerate() {
        let mut sum = 0.0;
        for i in 0..n_rows {
            sum += x.get(i, j);
        }
        *mean_j = sum / n_rows as f32;
    }

    // Column standard deviations (population)
    let mut stds = vec![0.0f32; n_cols];
    for (j, std_j) in stds.iter_mut().enumerate() {
        let mut sum_sq = 0.0;
        for i in 0..n_rows {
            let d = x.get(i, j) - means[j];
            sum_sq += d * d;
        }
        *std_j = (sum_sq / n_rows as f32).sqrt();
    }

    if let Some(j) = stds.iter().position(|&s| s <= f32::EPSILON) {
        return Err(GeneroError::data_quality(
            "correlation",
            format!("column '{}' has zero variance", names[j]),
        ));
    }

    let mut values = Matrix::zeros(n_cols, n_cols);
    for i in 0..n_cols {
        values.set(i, i, 1.0);
        for j in (i + 1)..n_cols {
            let mut cov = 0.0;
            for row in 0..n_rows {
                cov += (x.get(row, i) - means[i]) * (x.get(row, j) - means[j]);
            }
            cov /= n_rows as f32;
            let r = cov / (stds[i] * stds[j]);
            values.set(i, j, r);
            values.set(j, i, r);
        }
    }

    Ok(CorrelationMatrix {
        names: names.to_vec(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{i}")).collect()
    }

    #[test]
    fn test_perfect_positive_correlation() {
        let x = Matrix::from_vec(4, 2, vec![1.0, 2.0, 2.0, 4.0, 3.0, 6.0, 4.0, 8.0])
            .expect("valid matrix");
        let corr = correlation_matrix(&x, &names(2)).expect("correlation");
        assert!((corr.values.get(0, 1) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_diagonal_is_one_and_symmetric() {
        let x = Matrix::from_vec(4, 3, vec![
            1.0, 5.0, 2.0,
            2.0, 3.0, 8.0,
            3.0, 4.0, 1.0,
            4.0, 9.0, 3.0,
        ])
        .expect("valid matrix");
        let corr = correlation_matrix(&x, &names(3)).expect("correlation");
        for i in 0..3 {
            assert!((corr.values.get(i, i) - 1.0).abs() < 1e-6);
            for j in 0..3 {
                assert!((corr.values.get(i, j) - corr.values.get(j, i)).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_coefficients_bounded() {
        let x = Matrix::from_vec(5, 2, vec![
            1.0, 9.0,
            2.0, 2.0,
            3.0, 7.0,
            4.0, 1.0,
            5.0, 5.0,
        ])
        .expect("valid matrix");
        let corr = correlation_matrix(&x, &names(2)).expect("correlation");
        let r = corr.values.get(0, 1);
        assert!((-1.0..=1.0).contains(&r));
    }

    #[test]
    fn test_zero_variance_column_rejected() {
        let x = Matrix::from_vec(3, 2, vec![1.0, 5.0, 2.0, 5.0, 3.0, 5.0]).expect("valid matrix");
        let err = correlation_matrix(&x, &names(2)).unwrap_err();
        assert!(err.to_string().contains("zero variance"));
    }

    #[test]
    fn test_too_few_rows_rejected() {
        let x = Matrix::from_vec(1, 2, vec![1.0, 2.0]).expect("valid matrix");
        assert!(correlation_matrix(&x, &names(2)).is_err());
    }

    #[test]
    fn test_name_count_mismatch_rejected() {
        let x = Matrix::from_vec(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("valid matrix");
        assert!(correlation_matrix(&x, &names(3)).is_err());
    }

    #[test]
    fn test_strongest_pair() {
        // f0/f1 perfectly correlated, f2 noisy
        let x = Matrix::from_vec(4, 3, vec![
            1.0, 2.0, 9.0,
            2.0, 4.0, 1.0,
            3.0, 6.0, 5.0,
            4.0, 8.0, 2.0,
        ])
        .expect("valid matrix");
        let corr = correlation_matrix(&x, &names(3)).expect("correlation");
        let (a, b, r) = corr.strongest_pair().expect("pair");
        assert_eq!((a, b), ("f0", "f1"));
        assert!((r - 1.0).abs() < 1e-5);
    }
}
