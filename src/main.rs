//! Command-line entry point: run the full analysis over the two source
//! files and print every report section.

use anyhow::Context;
use clap::Parser;
use genero::dataset::{load_track_genres, load_track_metrics, TrackTable};
use genero::pipeline::{self, PipelineConfig};
use genero::render;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Classify tracks as Rock or Hip-Hop from audio-derived features.
#[derive(Debug, Parser)]
#[command(name = "genero", version, about)]
struct Cli {
    /// CSV file of track metadata (track_id, genre_top, ...)
    tracks: PathBuf,

    /// Record-oriented JSON file of per-track audio metrics
    metrics: PathBuf,

    /// Cumulative explained-variance coverage for component selection
    #[arg(long, default_value_t = 0.90)]
    variance_threshold: f32,

    /// Held-out fraction for the train/test split
    #[arg(long, default_value_t = 0.25)]
    test_fraction: f32,

    /// Fold count for cross-validation
    #[arg(long, default_value_t = 10)]
    folds: usize,

    /// Seed for every random decision in the run
    #[arg(long, default_value_t = 10)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let genres = load_track_genres(&cli.tracks)
        .with_context(|| format!("loading track metadata from {}", cli.tracks.display()))?;
    let metrics = load_track_metrics(&cli.metrics)
        .with_context(|| format!("loading track metrics from {}", cli.metrics.display()))?;
    let table = TrackTable::join(&metrics, &genres).context("joining the two sources")?;

    let config = PipelineConfig {
        variance_threshold: cli.variance_threshold,
        test_fraction: cli.test_fraction,
        n_folds: cli.folds,
        random_state: cli.seed,
    };
    let report = pipeline::run(&table, &config).context("running the analysis pipeline")?;

    println!("== Joined track table ==");
    println!("{}", render::table_summary(&report));
    println!();
    println!("{}", render::describe_table(&report.column_stats));

    println!("== Pairwise feature correlations ==");
    println!("{}", render::correlation_table(&report.correlation));

    println!("== Explained variance by principal component ==");
    println!("{}", render::scree_chart(&report.explained_variance_ratio));

    println!("== Cumulative explained variance ==");
    println!(
        "{}",
        render::cumulative_chart(
            &report.cumulative_explained_variance,
            report.variance_threshold,
            report.selected_components,
        )
    );
    println!(
        "selected {} of {} components\n",
        report.selected_components,
        report.explained_variance_ratio.len()
    );

    println!("== Baseline models (unbalanced, {} tracks) ==", report.n_tracks);
    println!("Decision Tree:\n{}", report.baseline.tree);
    println!("Logistic Regression:\n{}", report.baseline.logistic);

    println!(
        "== Balanced models ({} tracks after down-sampling) ==",
        report.balanced_n_tracks
    );
    println!("Decision Tree:\n{}", report.balanced.tree);
    println!("Logistic Regression:\n{}", report.balanced.logistic);

    println!("== Cross-validated accuracy (balanced projection) ==");
    println!("{}", render::cv_scores(&report.cross_validation));

    Ok(())
}
