//! Ensemble classification: random forest over bootstrap samples.

use crate::error::Result;
use crate::primitives::Matrix;
use crate::traits::Classifier;
use crate::tree::DecisionTreeClassifier;

/// Random forest classifier: bagged decision trees with majority voting.
///
/// Each tree trains on a bootstrap sample (drawn with replacement, same
/// size as the input). Seeding is per-tree (base seed + tree index) so a
/// fitted forest is reproducible for a fixed random state, and voting ties
/// break toward the lowest class index.
///
/// # Examples
///
/// ```
/// use genero::prelude::*;
///
/// let x = Matrix::from_vec(6, 2, vec![
///     0.0, 0.1,
///     0.2, 0.0,
///     0.1, 0.3,
///     5.0, 5.1,
///     5.2, 5.0,
///     5.1, 5.3,
/// ]).expect("valid matrix dimensions");
/// let y = vec![0, 0, 0, 1, 1, 1];
///
/// let mut forest = RandomForestClassifier::new(5).with_random_state(10);
/// forest.fit(&x, &y).expect("valid training data");
/// assert_eq!(forest.predict(&x).len(), 6);
/// ```
#[derive(Debug, Clone)]
pub struct RandomForestClassifier {
    trees: Vec<DecisionTreeClassifier>,
    n_estimators: usize,
    max_depth: Option<usize>,
    random_state: u64,
    /// Number of classes seen at fit time (for vote tallies).
    n_classes: usize,
}

impl RandomForestClassifier {
    /// Creates a new random forest with `n_estimators` trees.
    #[must_use]
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            random_state: 0,
            n_classes: 0,
        }
    }

    /// Sets the maximum depth for each tree.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Sets the base random seed for bootstrap sampling.
    #[must_use]
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = random_state;
        self
    }

    /// Number of trees in the forest.
    #[must_use]
    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }
}

impl Classifier for RandomForestClassifier {
    fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        let (n_samples, _) = x.shape();
        if n_samples != y.len() {
            return Err("Number of samples in X and y must match".into());
        }
        if n_samples == 0 {
            return Err("Cannot fit with zero samples".into());
        }
        if self.n_estimators == 0 {
            return Err("Forest needs at least one tree".into());
        }

        self.n_classes = y.iter().max().copied().unwrap_or(0) + 1;
        self.trees = Vec::with_capacity(self.n_estimators);

        for i in 0..self.n_estimators {
            let seed = self.random_state.wrapping_add(i as u64);
            let indices = bootstrap_sample(n_samples, seed);

            let bootstrap_x = x.select_rows(&indices);
            let bootstrap_y: Vec<usize> = indices.iter().map(|&idx| y[idx]).collect();

            let mut tree = match self.max_depth {
                Some(depth) => DecisionTreeClassifier::new().with_max_depth(depth),
                None => DecisionTreeClassifier::new(),
            };
            tree.fit(&bootstrap_x, &bootstrap_y)?;
            self.trees.push(tree);
        }

        Ok(())
    }

    /// # Panics
    ///
    /// Panics if called before `fit()`.
    fn predict(&self, x: &Matrix<f32>) -> Vec<usize> {
        assert!(!self.trees.is_empty(), "Model not fitted yet");

        let n_samples = x.n_rows();
        let per_tree: Vec<Vec<usize>> = self.trees.iter().map(|t| t.predict(x)).collect();

        let mut predictions = Vec::with_capacity(n_samples);
        for sample_idx in 0..n_samples {
            let mut votes = vec![0usize; self.n_classes];
            for tree_preds in &per_tree {
                let class = tree_preds[sample_idx];
                if class < self.n_classes {
                    votes[class] += 1;
                }
            }

            // argmax; first (lowest) class wins ties
            let mut best_class = 0;
            let mut best_votes = 0;
            for (class, &count) in votes.iter().enumerate() {
                if count > best_votes {
                    best_votes = count;
                    best_class = class;
                }
            }
            predictions.push(best_class);
        }

        predictions
    }
}

/// Bootstrap sample: `n_samples` indices drawn uniformly with replacement.
fn bootstrap_sample(n_samples: usize, seed: u64) -> Vec<usize> {
    use rand::distributions::{Distribution, Uniform};
    use rand::SeedableRng;

    let dist = Uniform::from(0..n_samples);
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

    (0..n_samples).map(|_| dist.sample(&mut rng)).collect()
}
