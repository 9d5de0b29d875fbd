//! Text rendering of pipeline outputs.
//!
//! The pipeline returns plain values; everything display-shaped lives
//! here so formatting can change without touching analysis correctness.

use crate::dataset::ColumnStats;
use crate::pipeline::{AnalysisReport, CvScore};
use crate::stats::CorrelationMatrix;
use std::fmt::Write;

const BAR_WIDTH: usize = 40;

/// Renders the per-feature descriptive statistics table.
#[must_use]
pub fn describe_table(stats: &[ColumnStats]) -> String {
    let mut out = String::new();
    let width = stats
        .iter()
        .map(|s| s.name.len())
        .max()
        .unwrap_or(0)
        .max("feature".len());

    let _ = writeln!(
        out,
        "{:<width$}  {:>6} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "feature", "count", "mean", "std", "min", "median", "max"
    );
    for s in stats {
        let _ = writeln!(
            out,
            "{:<width$}  {:>6} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>10.4}",
            s.name, s.count, s.mean, s.std, s.min, s.median, s.max
        );
    }
    out
}

/// Renders the correlation matrix with abbreviated column headers.
#[must_use]
pub fn correlation_table(corr: &CorrelationMatrix) -> String {
    let mut out = String::new();
    let width = corr
        .names
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0);

    let _ = write!(out, "{:<width$}", "");
    for name in &corr.names {
        let _ = write!(out, " {:>6}", abbreviate(name));
    }
    let _ = writeln!(out);

    for (i, name) in corr.names.iter().enumerate() {
        let _ = write!(out, "{name:<width$}");
        for j in 0..corr.names.len() {
            let _ = write!(out, " {:>6.2}", corr.values.get(i, j));
        }
        let _ = writeln!(out);
    }

    if let Some((a, b, r)) = corr.strongest_pair() {
        let _ = writeln!(out, "\nstrongest pair: {a} / {b} (r = {r:.3})");
    }
    out
}

/// Renders the scree chart: one bar per component, scaled to the largest
/// explained-variance ratio.
#[must_use]
pub fn scree_chart(ratios: &[f32]) -> String {
    let mut out = String::new();
    let max_ratio = ratios.iter().copied().fold(f32::MIN, f32::max).max(1e-9);

    for (i, &ratio) in ratios.iter().enumerate() {
        let filled = ((ratio / max_ratio) * BAR_WIDTH as f32).round() as usize;
        let _ = writeln!(
            out,
            "PC{:<2} {:<bar$} {:.4}",
            i + 1,
            "#".repeat(filled),
            ratio,
            bar = BAR_WIDTH
        );
    }
    out
}

/// Renders the cumulative-variance curve with a marker on the first
/// component count that clears the threshold.
#[must_use]
pub fn cumulative_chart(cumulative: &[f32], threshold: f32, selected: usize) -> String {
    let mut out = String::new();

    for (i, &value) in cumulative.iter().enumerate() {
        let filled = (value.min(1.0) * BAR_WIDTH as f32).round() as usize;
        let marker = if i + 1 == selected { "  <- selected" } else { "" };
        let _ = writeln!(
            out,
            "PC1..{:<2} {:<bar$} {:.4}{}",
            i + 1,
            "#".repeat(filled),
            value,
            marker,
            bar = BAR_WIDTH
        );
    }
    let _ = writeln!(out, "threshold: {threshold:.2}");
    out
}

/// Renders the mean cross-validation scores, one line per model.
#[must_use]
pub fn cv_scores(scores: &[CvScore]) -> String {
    let mut out = String::new();
    let width = scores
        .iter()
        .map(|s| s.model.len())
        .max()
        .unwrap_or(0);

    for s in scores {
        let _ = writeln!(
            out,
            "{:<width$}  mean accuracy {:.4} (+/- {:.4})",
            s.model, s.mean, s.std
        );
    }
    out
}

/// Renders the join/balance row accounting line.
#[must_use]
pub fn table_summary(report: &AnalysisReport) -> String {
    let counts: Vec<String> = report
        .class_counts
        .iter()
        .map(|(name, count)| format!("{name}: {count}"))
        .collect();
    format!(
        "{} tracks joined ({} unmatched rows dropped): {}",
        report.n_tracks,
        report.dropped_rows,
        counts.join(", ")
    )
}

fn abbreviate(name: &str) -> String {
    name.chars().take(6).collect()
}
