//! The analysis pipeline: one seeded forward pass from joined table to
//! report.
//!
//! Order of operations mirrors the exploration flow: inspect and correlate
//! the features, standardize, reduce with PCA, train and evaluate the
//! baseline models, rebalance the classes and re-run, then cross-validate
//! all three models on the balanced projection. Any failure aborts the
//! run; nothing is retried and nothing is persisted.

use crate::classification::LogisticRegression;
use crate::dataset::{ColumnStats, TrackTable};
use crate::decomposition::{select_component_count, PrincipalComponents};
use crate::ensemble::RandomForestClassifier;
use crate::error::{GeneroError, Result};
use crate::metrics::ClassificationReport;
use crate::model_selection::{cross_validate, train_test_split, KFold};
use crate::preprocessing::{LabelEncoder, StandardScaler};
use crate::stats::{correlation_matrix, CorrelationMatrix};
use crate::traits::{Classifier, Transformer};
use crate::tree::DecisionTreeClassifier;
use tracing::info;

/// Number of trees in the random forest comparison model.
const FOREST_SIZE: usize = 10;

/// Tunable knobs of a pipeline run.
///
/// The defaults reproduce the reference analysis: 90% variance coverage,
/// a 75/25 train/test split, 10-fold cross-validation, seed 10.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Cumulative explained-variance coverage the projection must exceed.
    pub variance_threshold: f32,
    /// Fraction of rows held out for testing.
    pub test_fraction: f32,
    /// Fold count for cross-validation.
    pub n_folds: usize,
    /// Seed for every random decision in the run.
    pub random_state: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            variance_threshold: 0.90,
            test_fraction: 0.25,
            n_folds: 10,
            random_state: 10,
        }
    }
}

/// Held-out evaluation of the tree and logistic models on one feature set.
#[derive(Debug, Clone)]
pub struct ExperimentReport {
    /// Decision tree classification report.
    pub tree: ClassificationReport,
    /// Logistic regression classification report.
    pub logistic: ClassificationReport,
}

/// Mean cross-validated accuracy for one model.
#[derive(Debug, Clone)]
pub struct CvScore {
    /// Model name for display.
    pub model: String,
    /// Mean accuracy across folds.
    pub mean: f32,
    /// Standard deviation across folds.
    pub std: f32,
}

/// Everything a pipeline run produces, as plain values.
///
/// Rendering is a separate concern; see the `render` module.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// Rows in the joined table.
    pub n_tracks: usize,
    /// Source rows dropped by the inner join.
    pub dropped_rows: usize,
    /// Rows per genre before balancing.
    pub class_counts: Vec<(String, usize)>,
    /// Per-feature descriptive statistics.
    pub column_stats: Vec<ColumnStats>,
    /// Pairwise feature correlations.
    pub correlation: CorrelationMatrix,
    /// Explained-variance ratio per component (all components).
    pub explained_variance_ratio: Vec<f32>,
    /// Running sum of the ratios.
    pub cumulative_explained_variance: Vec<f32>,
    /// The coverage threshold the selection used.
    pub variance_threshold: f32,
    /// Selected component count.
    pub selected_components: usize,
    /// Model reports on the unbalanced projection.
    pub baseline: ExperimentReport,
    /// Model reports on the balanced projection.
    pub balanced: ExperimentReport,
    /// Rows in the balanced table (2 x minority count).
    pub balanced_n_tracks: usize,
    /// Track ids retained by the balanced sample, in row order.
    pub balanced_track_ids: Vec<i64>,
    /// Mean cross-validated accuracy per model, on the balanced projection.
    pub cross_validation: Vec<CvScore>,
}

/// Runs the full analysis over a joined track table.
///
/// # Errors
///
/// Fails fast on the first violated precondition: degenerate feature
/// columns, a class count other than two, an unreachable variance
/// threshold, or a fold count incompatible with the balanced row count.
pub fn run(table: &TrackTable, config: &PipelineConfig) -> Result<AnalysisReport> {
    let feature_names = table.feature_names();

    // 1. Inspection: descriptive stats + feature correlations
    let column_stats = table.describe();
    let correlation = correlation_matrix(table.features(), &feature_names)?;

    // 2. Labels; the dataset contract is exactly two genres
    let encoder = LabelEncoder::fit(table.genres());
    if encoder.n_classes() != 2 {
        return Err(GeneroError::data_quality(
            "label encoding",
            format!("expected exactly 2 genres, found {}", encoder.n_classes()),
        ));
    }
    let labels = encoder.transform(table.genres())?;

    // 3. Standardize, then explore the full variance spectrum
    let (_, scaled) = StandardScaler::fit_transform(table.features())?;
    let explore = PrincipalComponents::fit(&scaled)?;
    let explained_variance_ratio = explore.explained_variance_ratio().to_vec();
    let cumulative = explore.cumulative_explained_variance();

    // 4. Select the minimal component count covering the threshold
    let k = select_component_count(&explained_variance_ratio, config.variance_threshold)?;
    info!(
        selected_components = k,
        threshold = config.variance_threshold,
        "selected PCA dimensionality"
    );

    // 5. Project and evaluate the baseline models
    let projector = PrincipalComponents::fit_k(&scaled, k)?;
    let projection = projector.transform(&scaled)?;
    let baseline = evaluate_models(&projection, &labels, encoder.classes(), config)?;

    // 6. Balance the classes and refit scaler + projection on the new
    //    population (same k, freshly fitted transforms)
    let balanced_table = table.balance(config.random_state)?;
    let balanced_labels = encoder.transform(balanced_table.genres())?;
    let (_, balanced_scaled) = StandardScaler::fit_transform(balanced_table.features())?;
    let balanced_projector = PrincipalComponents::fit_k(&balanced_scaled, k)?;
    let balanced_projection = balanced_projector.transform(&balanced_scaled)?;
    let balanced = evaluate_models(&balanced_projection, &balanced_labels, encoder.classes(), config)?;

    // 7. Cross-validate all three models on the balanced projection
    let kfold = KFold::new(config.n_folds);
    let seed = config.random_state;

    let tree_cv = cross_validate(
        &DecisionTreeClassifier::new(),
        &balanced_projection,
        &balanced_labels,
        &kfold,
    )?;
    let logit_cv = cross_validate(
        &LogisticRegression::new(),
        &balanced_projection,
        &balanced_labels,
        &kfold,
    )?;
    let forest_cv = cross_validate(
        &RandomForestClassifier::new(FOREST_SIZE).with_random_state(seed),
        &balanced_projection,
        &balanced_labels,
        &kfold,
    )?;

    let cross_validation = vec![
        CvScore {
            model: "Decision Tree".to_string(),
            mean: tree_cv.mean(),
            std: tree_cv.std(),
        },
        CvScore {
            model: "Logistic Regression".to_string(),
            mean: logit_cv.mean(),
            std: logit_cv.std(),
        },
        CvScore {
            model: "Random Forest".to_string(),
            mean: forest_cv.mean(),
            std: forest_cv.std(),
        },
    ];

    Ok(AnalysisReport {
        n_tracks: table.n_tracks(),
        dropped_rows: table.dropped_rows(),
        class_counts: table.class_counts(),
        column_stats,
        correlation,
        explained_variance_ratio,
        cumulative_explained_variance: cumulative,
        variance_threshold: config.variance_threshold,
        selected_components: k,
        baseline,
        balanced,
        balanced_n_tracks: balanced_table.n_tracks(),
        balanced_track_ids: balanced_table.track_ids().to_vec(),
        cross_validation,
    })
}

/// Splits, trains the tree and logistic models, and reports both.
fn evaluate_models(
    x: &crate::primitives::Matrix<f32>,
    y: &[usize],
    class_names: &[String],
    config: &PipelineConfig,
) -> Result<ExperimentReport> {
    let (x_train, x_test, y_train, y_test) =
        train_test_split(x, y, config.test_fraction, config.random_state)?;

    let mut tree = DecisionTreeClassifier::new();
    tree.fit(&x_train, &y_train)?;
    let tree_report = ClassificationReport::compute(&y_test, &tree.predict(&x_test), class_names)?;

    let mut logistic = LogisticRegression::new();
    logistic.fit(&x_train, &y_train)?;
    let logistic_report =
        ClassificationReport::compute(&y_test, &logistic.predict(&x_test), class_names)?;

    Ok(ExperimentReport {
        tree: tree_report,
        logistic: logistic_report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{TrackGenre, TrackMetrics};

    /// Synthetic but separable dataset: hip-hop tracks score high on
    /// speechiness/danceability, rock tracks on energy/liveness. A touch of
    /// deterministic wobble keeps every column non-degenerate.
    fn synthetic_table(n_rock: usize, n_hop: usize) -> TrackTable {
        let mut metrics = Vec::new();
        let mut genres = Vec::new();

        for i in 0..(n_rock + n_hop) {
            let id = i as i64;
            let is_rock = i < n_rock;
            let wobble = ((i as f32) * 0.7).sin() * 0.05;

            let (speech, dance, energy, live) = if is_rock {
                (0.1, 0.3, 0.8, 0.6)
            } else {
                (0.7, 0.8, 0.4, 0.2)
            };

            metrics.push(TrackMetrics {
                track_id: id,
                acousticness: 0.3 + wobble,
                danceability: dance + wobble,
                energy: energy - wobble,
                instrumentalness: 0.2 + wobble * 2.0,
                liveness: live + wobble,
                speechiness: speech - wobble,
                tempo: if is_rock { 140.0 } else { 95.0 } + wobble * 40.0,
                valence: 0.5 - wobble,
            });
            genres.push(TrackGenre {
                track_id: id,
                genre_top: if is_rock { "Rock" } else { "Hip-Hop" }.to_string(),
            });
        }

        TrackTable::join(&metrics, &genres).expect("valid join")
    }

    fn small_config() -> PipelineConfig {
        PipelineConfig {
            n_folds: 5,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_run_produces_complete_report() {
        let table = synthetic_table(40, 20);
        let report = run(&table, &small_config()).expect("pipeline should succeed");

        assert_eq!(report.n_tracks, 60);
        assert_eq!(report.class_counts[0], ("Hip-Hop".to_string(), 20));
        assert_eq!(report.class_counts[1], ("Rock".to_string(), 40));
        assert_eq!(report.explained_variance_ratio.len(), 8);
        assert_eq!(report.cumulative_explained_variance.len(), 8);
        assert!(report.selected_components >= 1);
        assert!(report.selected_components < 8);
        assert_eq!(report.balanced_n_tracks, 40);
        assert_eq!(report.cross_validation.len(), 3);
    }

    #[test]
    fn test_balanced_experiment_has_equal_support() {
        let table = synthetic_table(40, 20);
        let report = run(&table, &small_config()).expect("pipeline");

        // 25% of 40 balanced rows held out
        assert_eq!(report.balanced.tree.total_support, 10);
        assert_eq!(report.balanced.logistic.total_support, 10);
    }

    #[test]
    fn test_cumulative_variance_monotone() {
        let table = synthetic_table(30, 15);
        let report = run(&table, &small_config()).expect("pipeline");

        for w in report.cumulative_explained_variance.windows(2) {
            assert!(w[1] >= w[0] - 1e-6);
        }
        let last = report
            .cumulative_explained_variance
            .last()
            .copied()
            .expect("non-empty");
        assert!((last - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_selected_components_minimal() {
        let table = synthetic_table(30, 15);
        let report = run(&table, &small_config()).expect("pipeline");

        let k = report.selected_components;
        let cumulative = &report.cumulative_explained_variance;
        assert!(cumulative[k - 1] > report.variance_threshold);
        if k > 1 {
            assert!(cumulative[k - 2] <= report.variance_threshold);
        }
    }

    #[test]
    fn test_run_reproducible_for_fixed_seed() {
        let table = synthetic_table(40, 20);
        let config = small_config();

        let a = run(&table, &config).expect("pipeline");
        let b = run(&table, &config).expect("pipeline");

        assert_eq!(a.selected_components, b.selected_components);
        assert_eq!(a.balanced_track_ids, b.balanced_track_ids);
        for (x, y) in a.cross_validation.iter().zip(b.cross_validation.iter()) {
            assert_eq!(x.mean, y.mean);
        }
    }

    #[test]
    fn test_run_rejects_three_genres() {
        let mut metrics = Vec::new();
        let mut genres = Vec::new();
        for i in 0..9i64 {
            let wobble = (i as f32) * 0.1;
            metrics.push(TrackMetrics {
                track_id: i,
                acousticness: 0.1 + wobble,
                danceability: 0.2 + wobble,
                energy: 0.3 + wobble,
                instrumentalness: 0.4 - wobble,
                liveness: 0.5 - wobble,
                speechiness: 0.6 - wobble,
                tempo: 100.0 + wobble,
                valence: 0.7 + wobble,
            });
            genres.push(TrackGenre {
                track_id: i,
                genre_top: ["Rock", "Hip-Hop", "Jazz"][(i % 3) as usize].to_string(),
            });
        }
        let table = TrackTable::join(&metrics, &genres).expect("join");

        let err = run(&table, &small_config()).unwrap_err();
        assert!(err.to_string().contains("2 genres"));
    }

    #[test]
    fn test_run_rejects_excessive_folds() {
        let table = synthetic_table(10, 5);
        let config = PipelineConfig {
            n_folds: 50,
            ..PipelineConfig::default()
        };
        let err = run(&table, &config).unwrap_err();
        assert!(err.to_string().contains("n_folds"));
    }

    #[test]
    fn test_run_rejects_unreachable_threshold() {
        let table = synthetic_table(20, 10);
        let config = PipelineConfig {
            variance_threshold: 1.5,
            ..small_config()
        };
        assert!(run(&table, &config).is_err());
    }
}
