//! Model selection utilities: train/test splitting and k-fold
//! cross-validation.
//!
//! Splits are seeded and therefore reproducible; folds are contiguous and
//! unshuffled — the order of the rows is the order of the folds.

use crate::error::{GeneroError, Result};
use crate::primitives::Matrix;
use crate::traits::Classifier;
use tracing::debug;

/// Scores from cross-validation, one per fold.
#[derive(Debug, Clone)]
pub struct CrossValidationResult {
    /// Accuracy for each fold.
    pub scores: Vec<f32>,
}

impl CrossValidationResult {
    /// Mean score across folds.
    #[must_use]
    pub fn mean(&self) -> f32 {
        if self.scores.is_empty() {
            return 0.0;
        }
        self.scores.iter().sum::<f32>() / self.scores.len() as f32
    }

    /// Standard deviation of the fold scores.
    #[must_use]
    pub fn std(&self) -> f32 {
        if self.scores.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        let variance = self
            .scores
            .iter()
            .map(|&score| (score - mean).powi(2))
            .sum::<f32>()
            / self.scores.len() as f32;
        variance.sqrt()
    }
}

/// K-fold cross-validator over contiguous, unshuffled folds.
///
/// Splits `n_samples` rows into `k` disjoint folds of roughly equal size,
/// in the order given. Each fold serves once as the held-out test set while
/// the remaining folds form the training set.
///
/// # Examples
///
/// ```
/// use genero::model_selection::KFold;
///
/// let kfold = KFold::new(3);
/// let splits = kfold.split(7).unwrap();
/// assert_eq!(splits.len(), 3);
///
/// // Every row is held out exactly once.
/// let mut held_out: Vec<usize> = splits.iter().flat_map(|(_, test)| test.clone()).collect();
/// held_out.sort_unstable();
/// assert_eq!(held_out, (0..7).collect::<Vec<_>>());
/// ```
#[derive(Debug, Clone)]
pub struct KFold {
    n_splits: usize,
}

impl KFold {
    /// Creates a new k-fold cross-validator.
    #[must_use]
    pub fn new(n_splits: usize) -> Self {
        Self { n_splits }
    }

    /// Number of folds.
    #[must_use]
    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Generates (train indices, test indices) for each fold.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the fold count is below 2 or
    /// exceeds the row count.
    pub fn split(&self, n_samples: usize) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
        if self.n_splits < 2 {
            return Err(GeneroError::invalid_config(
                "n_folds",
                self.n_splits,
                "at least 2",
            ));
        }
        if self.n_splits > n_samples {
            return Err(GeneroError::invalid_config(
                "n_folds",
                self.n_splits,
                &format!("at most the number of samples ({n_samples})"),
            ));
        }

        let indices: Vec<usize> = (0..n_samples).collect();

        let fold_size = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;

        let mut result = Vec::with_capacity(self.n_splits);
        let mut start = 0;

        for i in 0..self.n_splits {
            // The remainder is spread over the first folds
            let current_fold_size = if i < remainder {
                fold_size + 1
            } else {
                fold_size
            };
            let end = start + current_fold_size;

            let test_indices: Vec<usize> = indices[start..end].to_vec();

            let mut train_indices = Vec::with_capacity(n_samples - current_fold_size);
            train_indices.extend_from_slice(&indices[..start]);
            train_indices.extend_from_slice(&indices[end..]);

            result.push((train_indices, test_indices));
            start = end;
        }

        Ok(result)
    }
}

/// Row subset of (x, y) by index.
fn extract_samples(x: &Matrix<f32>, y: &[usize], indices: &[usize]) -> (Matrix<f32>, Vec<usize>) {
    let x_subset = x.select_rows(indices);
    let y_subset = indices.iter().map(|&idx| y[idx]).collect();
    (x_subset, y_subset)
}

/// Run k-fold cross-validation on a classifier.
///
/// Clones the (unfitted) model for each fold, trains on the remaining
/// folds, and scores accuracy on the held-out fold.
///
/// # Errors
///
/// Returns an error if the fold configuration is invalid or any fold's
/// training fails.
pub fn cross_validate<C>(
    model: &C,
    x: &Matrix<f32>,
    y: &[usize],
    cv: &KFold,
) -> Result<CrossValidationResult>
where
    C: Classifier + Clone,
{
    if x.n_rows() != y.len() {
        return Err(GeneroError::DimensionMismatch {
            expected: format!("{} labels", x.n_rows()),
            actual: format!("{}", y.len()),
        });
    }

    let splits = cv.split(x.n_rows())?;
    let mut scores = Vec::with_capacity(splits.len());

    for (fold, (train_idx, test_idx)) in splits.into_iter().enumerate() {
        let (x_train, y_train) = extract_samples(x, y, &train_idx);
        let (x_test, y_test) = extract_samples(x, y, &test_idx);

        let mut fold_model = model.clone();
        fold_model.fit(&x_train, &y_train)?;

        let score = fold_model.score(&x_test, &y_test);
        debug!(fold, score, "cross-validation fold scored");
        scores.push(score);
    }

    Ok(CrossValidationResult { scores })
}

/// Checks split arguments and returns (n_train, n_test).
fn validate_split_inputs(x: &Matrix<f32>, y: &[usize], test_size: f32) -> Result<(usize, usize)> {
    if !(0.0..1.0).contains(&test_size) || test_size == 0.0 {
        return Err(GeneroError::invalid_config(
            "test_size",
            test_size,
            "a fraction strictly between 0 and 1",
        ));
    }

    let (n_samples, _) = x.shape();
    if n_samples != y.len() {
        return Err(GeneroError::DimensionMismatch {
            expected: format!("{n_samples} labels"),
            actual: format!("{}", y.len()),
        });
    }

    let n_test = (n_samples as f32 * test_size).round() as usize;
    let n_train = n_samples - n_test;

    if n_test == 0 || n_train == 0 {
        return Err(GeneroError::invalid_config(
            "test_size",
            test_size,
            &format!("a split leaving both sides non-empty (n_train={n_train}, n_test={n_test})"),
        ));
    }

    Ok((n_train, n_test))
}

/// Seeded shuffle of `0..n_samples`.
fn shuffle_indices(n_samples: usize, seed: u64) -> Vec<usize> {
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    indices
}

/// Split features and labels into random train and test subsets.
///
/// The split is a seeded shuffle: train and test are disjoint and their
/// union is the input, and the same seed always produces the same split.
///
/// # Errors
///
/// Returns a configuration error if `test_size` is outside (0, 1) or either
/// side of the split would be empty.
///
/// # Examples
///
/// ```
/// use genero::model_selection::train_test_split;
/// use genero::primitives::Matrix;
///
/// let x = Matrix::from_vec(8, 1, (0..8).map(|i| i as f32).collect()).unwrap();
/// let y = vec![0, 1, 0, 1, 0, 1, 0, 1];
///
/// let (x_train, x_test, y_train, y_test) =
///     train_test_split(&x, &y, 0.25, 42).unwrap();
/// assert_eq!(x_train.n_rows(), 6);
/// assert_eq!(x_test.n_rows(), 2);
/// assert_eq!(y_train.len(), 6);
/// assert_eq!(y_test.len(), 2);
/// ```
#[allow(clippy::type_complexity)]
pub fn train_test_split(
    x: &Matrix<f32>,
    y: &[usize],
    test_size: f32,
    seed: u64,
) -> Result<(Matrix<f32>, Matrix<f32>, Vec<usize>, Vec<usize>)> {
    let (n_train, _) = validate_split_inputs(x, y, test_size)?;
    let n_samples = x.n_rows();

    let indices = shuffle_indices(n_samples, seed);
    let train_indices = &indices[..n_train];
    let test_indices = &indices[n_train..];

    let (x_train, y_train) = extract_samples(x, y, train_indices);
    let (x_test, y_test) = extract_samples(x, y, test_indices);

    Ok((x_train, x_test, y_train, y_test))
}
