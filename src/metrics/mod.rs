//! Classification metrics for comparing the trained models.
//!
//! Provides accuracy plus the structured per-class classification report
//! (precision, recall, F1, support) the evaluator emits for each
//! model/experiment pair.

use crate::error::{GeneroError, Result};
use std::fmt;

/// Compute classification accuracy.
///
/// accuracy = `correct_predictions` / `total_predictions`
///
/// # Panics
///
/// Panics if vectors have different lengths or are empty.
///
/// # Examples
///
/// ```
/// use genero::metrics::accuracy;
///
/// let y_true = vec![0, 1, 1, 0];
/// let y_pred = vec![0, 1, 0, 0];
/// assert!((accuracy(&y_pred, &y_true) - 0.75).abs() < 1e-6);
/// ```
#[must_use]
pub fn accuracy(y_pred: &[usize], y_true: &[usize]) -> f32 {
    assert_eq!(y_pred.len(), y_true.len(), "Vectors must have same length");
    assert!(!y_true.is_empty(), "Vectors cannot be empty");

    let correct = y_pred
        .iter()
        .zip(y_true.iter())
        .filter(|(p, t)| p == t)
        .count();

    correct as f32 / y_true.len() as f32
}

/// Per-class counts underlying precision/recall: TP, FP, FN and support.
fn compute_tp_fp_fn(
    y_pred: &[usize],
    y_true: &[usize],
    n_classes: usize,
) -> (Vec<usize>, Vec<usize>, Vec<usize>, Vec<usize>) {
    let mut tp = vec![0usize; n_classes];
    let mut fp = vec![0usize; n_classes];
    let mut fn_counts = vec![0usize; n_classes];
    let mut support = vec![0usize; n_classes];

    for (&true_label, &pred_label) in y_true.iter().zip(y_pred.iter()) {
        support[true_label] += 1;

        if true_label == pred_label {
            tp[true_label] += 1;
        } else {
            fp[pred_label] += 1;
            fn_counts[true_label] += 1;
        }
    }

    (tp, fp, fn_counts, support)
}

fn class_precision(tp: usize, fp: usize) -> f32 {
    if tp + fp == 0 {
        0.0
    } else {
        tp as f32 / (tp + fp) as f32
    }
}

fn class_recall(tp: usize, fn_count: usize) -> f32 {
    if tp + fn_count == 0 {
        0.0
    } else {
        tp as f32 / (tp + fn_count) as f32
    }
}

fn f1_from_prec_rec(precision: f32, recall: f32) -> f32 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Metrics for a single class within a [`ClassificationReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    /// Class name (e.g. "Rock").
    pub label: String,
    /// TP / (TP + FP).
    pub precision: f32,
    /// TP / (TP + FN).
    pub recall: f32,
    /// Harmonic mean of precision and recall.
    pub f1: f32,
    /// Number of true instances of this class.
    pub support: usize,
}

/// An averaged row of a classification report (macro or weighted).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageRow {
    /// Averaged precision.
    pub precision: f32,
    /// Averaged recall.
    pub recall: f32,
    /// Averaged F1.
    pub f1: f32,
}

/// Structured classification report: per-class precision/recall/F1/support
/// plus aggregate accuracy and macro/weighted averages.
///
/// This is a plain value; rendering it as the familiar text table is the
/// `Display` impl's job.
///
/// # Examples
///
/// ```
/// use genero::metrics::ClassificationReport;
///
/// let y_true = vec![0, 0, 1, 1];
/// let y_pred = vec![0, 1, 1, 1];
/// let names = vec!["Hip-Hop".to_string(), "Rock".to_string()];
/// let report = ClassificationReport::compute(&y_true, &y_pred, &names).unwrap();
/// assert!((report.accuracy - 0.75).abs() < 1e-6);
/// assert_eq!(report.per_class[0].support, 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    /// One row per class, in class-index order.
    pub per_class: Vec<ClassMetrics>,
    /// Fraction of correct predictions.
    pub accuracy: f32,
    /// Unweighted mean over classes.
    pub macro_avg: AverageRow,
    /// Support-weighted mean over classes.
    pub weighted_avg: AverageRow,
    /// Total number of samples.
    pub total_support: usize,
}

impl ClassificationReport {
    /// Computes the report from aligned true/predicted label vectors.
    ///
    /// `class_names` maps class indices to display names; every label in
    /// `y_true`/`y_pred` must index into it.
    ///
    /// # Errors
    ///
    /// Returns an error if the vectors are empty, misaligned, or contain a
    /// label outside `class_names`.
    pub fn compute(y_true: &[usize], y_pred: &[usize], class_names: &[String]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(GeneroError::DimensionMismatch {
                expected: format!("{} predictions", y_true.len()),
                actual: format!("{}", y_pred.len()),
            });
        }
        if y_true.is_empty() {
            return Err(GeneroError::data_quality(
                "evaluation",
                "cannot build a classification report from zero samples",
            ));
        }

        let n_classes = class_names.len();
        if let Some(&bad) = y_true.iter().chain(y_pred.iter()).find(|&&l| l >= n_classes) {
            return Err(GeneroError::data_quality(
                "evaluation",
                format!("label index {bad} outside the {n_classes} known classes"),
            ));
        }

        let (tp, fp, fn_counts, support) = compute_tp_fp_fn(y_pred, y_true, n_classes);
        let total_support: usize = support.iter().sum();

        let per_class: Vec<ClassMetrics> = (0..n_classes)
            .map(|i| {
                let precision = class_precision(tp[i], fp[i]);
                let recall = class_recall(tp[i], fn_counts[i]);
                ClassMetrics {
                    label: class_names[i].clone(),
                    precision,
                    recall,
                    f1: f1_from_prec_rec(precision, recall),
                    support: support[i],
                }
            })
            .collect();

        let n = n_classes as f32;
        let macro_avg = AverageRow {
            precision: per_class.iter().map(|c| c.precision).sum::<f32>() / n,
            recall: per_class.iter().map(|c| c.recall).sum::<f32>() / n,
            f1: per_class.iter().map(|c| c.f1).sum::<f32>() / n,
        };

        let total = total_support as f32;
        let weighted_avg = AverageRow {
            precision: per_class
                .iter()
                .map(|c| c.precision * c.support as f32)
                .sum::<f32>()
                / total,
            recall: per_class
                .iter()
                .map(|c| c.recall * c.support as f32)
                .sum::<f32>()
                / total,
            f1: per_class.iter().map(|c| c.f1 * c.support as f32).sum::<f32>() / total,
        };

        Ok(Self {
            per_class,
            accuracy: accuracy(y_pred, y_true),
            macro_avg,
            weighted_avg,
            total_support,
        })
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .per_class
            .iter()
            .map(|c| c.label.len())
            .max()
            .unwrap_or(0)
            .max("weighted avg".len());

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for c in &self.per_class {
            writeln!(
                f,
                "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                c.label, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.total_support
        )?;
        writeln!(
            f,
            "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
            "macro avg",
            self.macro_avg.precision,
            self.macro_avg.recall,
            self.macro_avg.f1,
            self.total_support
        )?;
        writeln!(
            f,
            "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
            "weighted avg",
            self.weighted_avg.precision,
            self.weighted_avg.recall,
            self.weighted_avg.f1,
            self.total_support
        )
    }
}
