//! Decision tree classification using the CART algorithm.
//!
//! Uses Gini impurity for the splitting criterion and builds trees
//! recursively. Ties in leaf majority votes break toward the lowest class
//! index, so a fitted tree is fully determined by its training data.

use crate::error::Result;
use crate::primitives::Matrix;
use crate::traits::Classifier;
use std::collections::{BTreeMap, HashSet};

/// Internal split node.
#[derive(Debug, Clone)]
pub struct Node {
    /// Feature column the split tests.
    pub feature_idx: usize,
    /// Samples with value <= threshold go left.
    pub threshold: f32,
    /// Left subtree.
    pub left: Box<TreeNode>,
    /// Right subtree.
    pub right: Box<TreeNode>,
}

/// Leaf node carrying the majority class of its training samples.
#[derive(Debug, Clone)]
pub struct Leaf {
    /// Predicted class index.
    pub class_label: usize,
    /// Number of training samples that reached this leaf.
    pub n_samples: usize,
}

/// A node in the fitted tree.
#[derive(Debug, Clone)]
pub enum TreeNode {
    /// Terminal node.
    Leaf(Leaf),
    /// Internal split.
    Node(Node),
}

impl TreeNode {
    /// Depth of the subtree rooted at this node (a leaf has depth 0).
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 0,
            TreeNode::Node(n) => 1 + n.left.depth().max(n.right.depth()),
        }
    }
}

/// Decision tree classifier using the CART algorithm.
///
/// # Examples
///
/// ```
/// use genero::prelude::*;
///
/// let x = Matrix::from_vec(6, 2, vec![
///     0.0, 0.0,
///     0.2, 0.1,
///     0.1, 0.3,
///     5.0, 5.0,
///     5.2, 4.9,
///     4.8, 5.1,
/// ]).expect("valid matrix dimensions");
/// let y = vec![0, 0, 0, 1, 1, 1];
///
/// let mut tree = DecisionTreeClassifier::new().with_max_depth(4);
/// tree.fit(&x, &y).expect("valid training data");
/// assert_eq!(tree.predict(&x), y);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DecisionTreeClassifier {
    tree: Option<TreeNode>,
    max_depth: Option<usize>,
    /// Number of features the model was trained on (for validation).
    n_features: Option<usize>,
}

impl DecisionTreeClassifier {
    /// Creates a new decision tree classifier with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: None,
            max_depth: None,
            n_features: None,
        }
    }

    /// Sets the maximum depth of the tree (root has depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Returns the fitted tree, if any.
    #[must_use]
    pub fn tree(&self) -> Option<&TreeNode> {
        self.tree.as_ref()
    }

    /// Predicts the class label for a single sample.
    fn predict_one(&self, x: &[f32]) -> usize {
        let tree = self.tree.as_ref().expect("Model not fitted yet");

        let mut node = tree;
        loop {
            match node {
                TreeNode::Leaf(leaf) => return leaf.class_label,
                TreeNode::Node(internal) => {
                    if x[internal.feature_idx] <= internal.threshold {
                        node = &internal.left;
                    } else {
                        node = &internal.right;
                    }
                }
            }
        }
    }
}

impl Classifier for DecisionTreeClassifier {
    fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        let (n_rows, n_cols) = x.shape();
        if n_rows != y.len() {
            return Err("Number of samples in X and y must match".into());
        }
        if n_rows == 0 {
            return Err("Cannot fit with zero samples".into());
        }

        self.n_features = Some(n_cols);
        self.tree = Some(build_tree(x, y, 0, self.max_depth));
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if called before `fit()` or if the feature count doesn't match
    /// the training data.
    fn predict(&self, x: &Matrix<f32>) -> Vec<usize> {
        let (n_samples, n_features) = x.shape();

        if let Some(expected) = self.n_features {
            assert!(
                n_features == expected,
                "Feature count mismatch: model was trained with {expected} features but input has {n_features}"
            );
        }

        let mut predictions = Vec::with_capacity(n_samples);
        for row in 0..n_samples {
            let mut sample = Vec::with_capacity(n_features);
            for col in 0..n_features {
                sample.push(x.get(row, col));
            }
            predictions.push(self.predict_one(&sample));
        }

        predictions
    }
}

// Tree building helpers

/// Gini impurity: 1 - Σ(p_i²) over the class proportions p_i.
fn gini_impurity(labels: &[usize]) -> f32 {
    if labels.is_empty() {
        return 0.0;
    }

    let mut counts = BTreeMap::new();
    for &label in labels {
        *counts.entry(label).or_insert(0usize) += 1;
    }

    let n = labels.len() as f32;
    let mut gini = 1.0;
    for count in counts.values() {
        let p = *count as f32 / n;
        gini -= p * p;
    }

    gini
}

/// Weighted Gini impurity of a two-way split.
fn gini_split(left_labels: &[usize], right_labels: &[usize]) -> f32 {
    let n_left = left_labels.len() as f32;
    let n_right = right_labels.len() as f32;
    let n_total = n_left + n_right;

    if n_total == 0.0 {
        return 0.0;
    }

    (n_left / n_total) * gini_impurity(left_labels)
        + (n_right / n_total) * gini_impurity(right_labels)
}

/// Sorted unique values of a feature column (values closer than 1e-10 merged).
fn sorted_unique_values(x: &[f32]) -> Vec<f32> {
    let mut sorted: Vec<f32> = x.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("feature values are comparable"));

    let mut unique: Vec<f32> = Vec::with_capacity(sorted.len());
    for v in sorted {
        if unique.last().map_or(true, |&prev| (v - prev).abs() > 1e-10) {
            unique.push(v);
        }
    }
    unique
}

/// Partition labels on a threshold; None if one side would be empty.
fn split_labels_by_threshold(x: &[f32], y: &[usize], threshold: f32) -> Option<(Vec<usize>, Vec<usize>)> {
    let mut left = Vec::new();
    let mut right = Vec::new();

    for (idx, &val) in x.iter().enumerate() {
        if val <= threshold {
            left.push(y[idx]);
        } else {
            right.push(y[idx]);
        }
    }

    if left.is_empty() || right.is_empty() {
        None
    } else {
        Some((left, right))
    }
}

/// Best (threshold, gain) for one feature, trying each midpoint.
fn find_best_split_for_feature(x: &[f32], y: &[usize]) -> Option<(f32, f32)> {
    if x.len() < 2 {
        return None;
    }

    let unique = sorted_unique_values(x);
    if unique.len() < 2 {
        return None;
    }

    let current_impurity = gini_impurity(y);
    let mut best_gain = 0.0;
    let mut best_threshold = 0.0;

    for i in 0..unique.len() - 1 {
        let threshold = (unique[i] + unique[i + 1]) / 2.0;
        if let Some((left, right)) = split_labels_by_threshold(x, y, threshold) {
            let gain = current_impurity - gini_split(&left, &right);
            if gain > best_gain {
                best_gain = gain;
                best_threshold = threshold;
            }
        }
    }

    (best_gain > 0.0).then_some((best_threshold, best_gain))
}

/// Best (feature, threshold, gain) across all features.
fn find_best_split(x: &Matrix<f32>, y: &[usize]) -> Option<(usize, f32, f32)> {
    let (n_samples, n_features) = x.shape();

    if n_samples < 2 {
        return None;
    }

    let mut best: Option<(usize, f32, f32)> = None;
    for feature_idx in 0..n_features {
        let mut values = Vec::with_capacity(n_samples);
        for row in 0..n_samples {
            values.push(x.get(row, feature_idx));
        }

        if let Some((threshold, gain)) = find_best_split_for_feature(&values, y) {
            if best.map_or(true, |(_, _, g)| gain > g) {
                best = Some((feature_idx, threshold, gain));
            }
        }
    }

    best
}

/// Majority class with deterministic tie-breaking (lowest class index wins).
fn majority_class(labels: &[usize]) -> usize {
    let mut counts = BTreeMap::new();
    for &label in labels {
        *counts.entry(label).or_insert(0usize) += 1;
    }
    // BTreeMap iterates in key order, and max_by_key keeps the last maximum,
    // so reverse the order to make the lowest class win ties.
    counts
        .into_iter()
        .rev()
        .max_by_key(|&(_, count)| count)
        .expect("at least one label should exist")
        .0
}

/// Row subset of (x, y) by index.
fn split_data_by_indices(x: &Matrix<f32>, y: &[usize], indices: &[usize]) -> (Matrix<f32>, Vec<usize>) {
    let matrix = x.select_rows(indices);
    let labels = indices.iter().map(|&idx| y[idx]).collect();
    (matrix, labels)
}

/// Leaf if the node is pure or max depth is reached.
fn check_stopping_criteria(y: &[usize], depth: usize, max_depth: Option<usize>) -> Option<TreeNode> {
    let n_samples = y.len();

    let unique_labels: HashSet<_> = y.iter().collect();
    if unique_labels.len() == 1 {
        return Some(TreeNode::Leaf(Leaf {
            class_label: y[0],
            n_samples,
        }));
    }

    if let Some(max_d) = max_depth {
        if depth >= max_d {
            return Some(TreeNode::Leaf(Leaf {
                class_label: majority_class(y),
                n_samples,
            }));
        }
    }

    None
}

/// Row indices on each side of a threshold; None if one side would be empty.
fn split_indices_by_threshold(
    x: &Matrix<f32>,
    feature_idx: usize,
    threshold: f32,
    n_samples: usize,
) -> Option<(Vec<usize>, Vec<usize>)> {
    let mut left = Vec::new();
    let mut right = Vec::new();

    for row in 0..n_samples {
        if x.get(row, feature_idx) <= threshold {
            left.push(row);
        } else {
            right.push(row);
        }
    }

    if left.is_empty() || right.is_empty() {
        None
    } else {
        Some((left, right))
    }
}

/// Build a decision tree recursively.
fn build_tree(x: &Matrix<f32>, y: &[usize], depth: usize, max_depth: Option<usize>) -> TreeNode {
    let n_samples = y.len();

    if let Some(leaf) = check_stopping_criteria(y, depth, max_depth) {
        return leaf;
    }

    let Some((feature_idx, threshold, _gain)) = find_best_split(x, y) else {
        return TreeNode::Leaf(Leaf {
            class_label: majority_class(y),
            n_samples,
        });
    };

    let Some((left_indices, right_indices)) =
        split_indices_by_threshold(x, feature_idx, threshold, n_samples)
    else {
        return TreeNode::Leaf(Leaf {
            class_label: majority_class(y),
            n_samples,
        });
    };

    let (left_matrix, left_labels) = split_data_by_indices(x, y, &left_indices);
    let (right_matrix, right_labels) = split_data_by_indices(x, y, &right_indices);

    let left_child = build_tree(&left_matrix, &left_labels, depth + 1, max_depth);
    let right_child = build_tree(&right_matrix, &right_labels, depth + 1, max_depth);

    TreeNode::Node(Node {
        feature_idx,
        threshold,
        left: Box::new(left_child),
        right: Box::new(right_child),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable_data() -> (Matrix<f32>, Vec<usize>) {
        let x = Matrix::from_vec(8, 2, vec![
            0.0, 0.1,
            0.3, 0.0,
            0.1, 0.4,
            0.2, 0.2,
            5.0, 5.1,
            5.3, 5.0,
            5.1, 5.4,
            5.2, 5.2,
        ])
        .expect("valid matrix dimensions");
        let y = vec![0, 0, 0, 0, 1, 1, 1, 1];
        (x, y)
    }

    #[test]
    fn test_gini_pure() {
        assert!((gini_impurity(&[1, 1, 1]) - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_gini_balanced_binary() {
        assert!((gini_impurity(&[0, 0, 1, 1]) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_gini_empty() {
        assert_eq!(gini_impurity(&[]), 0.0);
    }

    #[test]
    fn test_majority_class_tie_breaks_low() {
        assert_eq!(majority_class(&[1, 0, 1, 0]), 0);
        assert_eq!(majority_class(&[2, 2, 1]), 2);
    }

    #[test]
    fn test_sorted_unique_values() {
        let vals = sorted_unique_values(&[3.0, 1.0, 3.0, 2.0, 1.0]);
        assert_eq!(vals, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_find_best_split_separates_classes() {
        let x = vec![1.0, 2.0, 10.0, 11.0];
        let y = vec![0, 0, 1, 1];
        let (threshold, gain) = find_best_split_for_feature(&x, &y).expect("split exists");
        assert!(threshold > 2.0 && threshold < 10.0);
        assert!(gain > 0.4);
    }

    #[test]
    fn test_find_best_split_none_for_constant_feature() {
        let x = vec![1.0, 1.0, 1.0];
        let y = vec![0, 1, 0];
        assert!(find_best_split_for_feature(&x, &y).is_none());
    }

    #[test]
    fn test_fit_predict_separable() {
        let (x, y) = separable_data();
        let mut tree = DecisionTreeClassifier::new();
        tree.fit(&x, &y).expect("fit should succeed");
        assert_eq!(tree.predict(&x), y);
        assert!((tree.score(&x, &y) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_max_depth_zero_yields_majority_leaf() {
        let x = Matrix::from_vec(4, 1, vec![0.0, 1.0, 2.0, 3.0]).expect("valid");
        let y = vec![0, 0, 0, 1];
        let mut tree = DecisionTreeClassifier::new().with_max_depth(0);
        tree.fit(&x, &y).expect("fit should succeed");
        assert_eq!(tree.predict(&x), vec![0, 0, 0, 0]);
        assert_eq!(tree.tree().expect("fitted").depth(), 0);
    }

    #[test]
    fn test_max_depth_bounds_tree() {
        let (x, y) = separable_data();
        let mut tree = DecisionTreeClassifier::new().with_max_depth(2);
        tree.fit(&x, &y).expect("fit should succeed");
        assert!(tree.tree().expect("fitted").depth() <= 2);
    }

    #[test]
    fn test_fit_mismatched_lengths_rejected() {
        let x = Matrix::from_vec(2, 1, vec![1.0, 2.0]).expect("valid");
        let mut tree = DecisionTreeClassifier::new();
        assert!(tree.fit(&x, &[0]).is_err());
    }

    #[test]
    fn test_fit_empty_rejected() {
        let x = Matrix::from_vec(0, 1, vec![]).expect("valid");
        let mut tree = DecisionTreeClassifier::new();
        assert!(tree.fit(&x, &[]).is_err());
    }

    #[test]
    fn test_determinism() {
        let (x, y) = separable_data();
        let mut a = DecisionTreeClassifier::new();
        let mut b = DecisionTreeClassifier::new();
        a.fit(&x, &y).expect("fit");
        b.fit(&x, &y).expect("fit");
        assert_eq!(a.predict(&x), b.predict(&x));
    }
}
