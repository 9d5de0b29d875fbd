//! Loading and shaping the track data.
//!
//! Two read-only sources feed the pipeline: a CSV of track metadata with
//! the genre label, and a record-oriented JSON file of per-track audio
//! metrics. They are inner-joined on `track_id` into a [`TrackTable`],
//! the single in-memory analysis table everything downstream consumes.

use crate::error::{GeneroError, Result};
use crate::primitives::Matrix;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

/// The audio feature columns, in table order.
pub const FEATURE_NAMES: [&str; 8] = [
    "acousticness",
    "danceability",
    "energy",
    "instrumentalness",
    "liveness",
    "speechiness",
    "tempo",
    "valence",
];

/// One row of the track metadata CSV. Extra columns are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackGenre {
    /// Track identifier, the join key.
    pub track_id: i64,
    /// Genre label ("Rock" or "Hip-Hop" in this dataset).
    pub genre_top: String,
}

/// One record of the audio metrics JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackMetrics {
    /// Track identifier, the join key.
    pub track_id: i64,
    /// Acoustic (vs. electric) confidence, 0..1.
    pub acousticness: f32,
    /// Danceability estimate, 0..1.
    pub danceability: f32,
    /// Perceptual intensity, 0..1.
    pub energy: f32,
    /// Likelihood of no vocals, 0..1.
    pub instrumentalness: f32,
    /// Live-audience presence, 0..1.
    pub liveness: f32,
    /// Spoken-word content, 0..1.
    pub speechiness: f32,
    /// Estimated tempo in BPM.
    pub tempo: f32,
    /// Musical positiveness, 0..1.
    pub valence: f32,
}

impl TrackMetrics {
    fn feature_row(&self) -> [f32; 8] {
        [
            self.acousticness,
            self.danceability,
            self.energy,
            self.instrumentalness,
            self.liveness,
            self.speechiness,
            self.tempo,
            self.valence,
        ]
    }
}

/// Loads the track metadata CSV (at least `track_id` and `genre_top`).
///
/// # Errors
///
/// Returns an input error if the file can't be opened or a row can't be
/// deserialized (including a missing required column).
pub fn load_track_genres<P: AsRef<Path>>(path: P) -> Result<Vec<TrackGenre>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| GeneroError::input(path, format!("failed to open CSV: {e}")))?;

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: TrackGenre =
            record.map_err(|e| GeneroError::input(path, format!("failed to parse CSV row: {e}")))?;
        rows.push(row);
    }

    info!(path = %path.display(), rows = rows.len(), "loaded track metadata");
    Ok(rows)
}

/// Loads the record-oriented JSON file of per-track audio metrics.
///
/// # Errors
///
/// Returns an input error if the file can't be opened or the JSON doesn't
/// deserialize into the expected records.
pub fn load_track_metrics<P: AsRef<Path>>(path: P) -> Result<Vec<TrackMetrics>> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| GeneroError::input(path, format!("failed to open JSON: {e}")))?;

    let rows: Vec<TrackMetrics> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| GeneroError::input(path, format!("failed to parse JSON records: {e}")))?;

    info!(path = %path.display(), rows = rows.len(), "loaded track metrics");
    Ok(rows)
}

/// Descriptive statistics for one feature column.
#[derive(Debug, Clone)]
pub struct ColumnStats {
    /// Column name.
    pub name: String,
    /// Number of values.
    pub count: usize,
    /// Mean value.
    pub mean: f32,
    /// Population standard deviation.
    pub std: f32,
    /// Minimum value.
    pub min: f32,
    /// Median value.
    pub median: f32,
    /// Maximum value.
    pub max: f32,
}

/// The joined analysis table: one row per track present in both sources.
///
/// Column alignment is the core invariant: `track_ids`, `genres` and the
/// rows of `features` line up index-for-index, and ids are unique.
#[derive(Debug, Clone)]
pub struct TrackTable {
    track_ids: Vec<i64>,
    genres: Vec<String>,
    features: Matrix<f32>,
    /// Source rows without a partner in the other source, dropped by the
    /// inner join.
    dropped_rows: usize,
}

impl TrackTable {
    /// Inner-joins audio metrics with genre labels on `track_id`.
    ///
    /// Metric-table order is preserved. Rows present in only one source are
    /// dropped, and the number of dropped rows is recorded on the table —
    /// silent shrinkage would skew the class balance downstream.
    ///
    /// # Errors
    ///
    /// Returns an input error on duplicate ids in either source or if the
    /// join comes up empty.
    pub fn join(metrics: &[TrackMetrics], genres: &[TrackGenre]) -> Result<Self> {
        let mut genre_by_id: HashMap<i64, &str> = HashMap::with_capacity(genres.len());
        for row in genres {
            if genre_by_id.insert(row.track_id, &row.genre_top).is_some() {
                return Err(GeneroError::Input {
                    path: "track metadata".to_string(),
                    message: format!("duplicate track_id {} in genre table", row.track_id),
                });
            }
        }

        let mut seen_metric_ids: HashSet<i64> = HashSet::with_capacity(metrics.len());
        let mut track_ids = Vec::new();
        let mut joined_genres = Vec::new();
        let mut feature_data = Vec::new();

        for row in metrics {
            if !seen_metric_ids.insert(row.track_id) {
                return Err(GeneroError::Input {
                    path: "track metrics".to_string(),
                    message: format!("duplicate track_id {} in metrics table", row.track_id),
                });
            }
            if let Some(&genre) = genre_by_id.get(&row.track_id) {
                track_ids.push(row.track_id);
                joined_genres.push(genre.to_string());
                feature_data.extend_from_slice(&row.feature_row());
            }
        }

        if track_ids.is_empty() {
            return Err(GeneroError::Input {
                path: "joined table".to_string(),
                message: "no track ids are present in both sources".to_string(),
            });
        }

        let matched = track_ids.len();
        let dropped_rows = (metrics.len() - matched) + (genres.len() - matched);
        info!(
            joined = matched,
            dropped = dropped_rows,
            "inner join on track_id complete"
        );

        let features = Matrix::from_vec(matched, FEATURE_NAMES.len(), feature_data)?;

        Ok(Self {
            track_ids,
            genres: joined_genres,
            features,
            dropped_rows,
        })
    }

    /// Number of tracks in the table.
    #[must_use]
    pub fn n_tracks(&self) -> usize {
        self.track_ids.len()
    }

    /// Track identifiers, in row order.
    #[must_use]
    pub fn track_ids(&self) -> &[i64] {
        &self.track_ids
    }

    /// Genre labels, aligned with the feature rows.
    #[must_use]
    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    /// The feature matrix (rows = tracks, columns = [`FEATURE_NAMES`]).
    #[must_use]
    pub fn features(&self) -> &Matrix<f32> {
        &self.features
    }

    /// Feature column names.
    #[must_use]
    pub fn feature_names(&self) -> Vec<String> {
        FEATURE_NAMES.iter().map(|&n| n.to_string()).collect()
    }

    /// Rows dropped by the inner join.
    #[must_use]
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    /// Rows per genre, in label order.
    #[must_use]
    pub fn class_counts(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for genre in &self.genres {
            *counts.entry(genre.as_str()).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .map(|(name, count)| (name.to_string(), count))
            .collect()
    }

    /// Descriptive statistics for each feature column.
    #[must_use]
    pub fn describe(&self) -> Vec<ColumnStats> {
        FEATURE_NAMES
            .iter()
            .enumerate()
            .map(|(j, &name)| {
                let col = self.features.column(j);
                ColumnStats {
                    name: name.to_string(),
                    count: col.len(),
                    mean: col.mean(),
                    std: col.std(),
                    min: col.min(),
                    median: col.median(),
                    max: col.max(),
                }
            })
            .collect()
    }

    /// Down-samples the majority class to the minority class count.
    ///
    /// Keeps every minority-class row and a seeded, without-replacement
    /// sample of the majority class, minority rows first. The output has
    /// exactly `2 * n_min` rows with equal class counts.
    ///
    /// # Errors
    ///
    /// Returns a data-quality error unless the table has exactly two label
    /// classes — this balancing step does not generalize beyond binary
    /// labels.
    pub fn balance(&self, seed: u64) -> Result<TrackTable> {
        use rand::seq::SliceRandom;
        use rand::SeedableRng;

        let counts = self.class_counts();
        if counts.len() != 2 {
            return Err(GeneroError::data_quality(
                "balancing",
                format!("expected exactly 2 label classes, found {}", counts.len()),
            ));
        }

        // Identify minority/majority by count; ties make sampling a no-op.
        let (minority_label, n_min) = counts
            .iter()
            .min_by_key(|(_, count)| *count)
            .map(|(label, count)| (label.clone(), *count))
            .expect("two classes present");

        let minority_indices: Vec<usize> = (0..self.n_tracks())
            .filter(|&i| self.genres[i] == minority_label)
            .collect();
        let mut majority_indices: Vec<usize> = (0..self.n_tracks())
            .filter(|&i| self.genres[i] != minority_label)
            .collect();

        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        majority_indices.shuffle(&mut rng);
        majority_indices.truncate(n_min);

        debug!(
            minority = %minority_label,
            n_min,
            sampled_majority = majority_indices.len(),
            "down-sampled majority class"
        );

        let keep: Vec<usize> = minority_indices
            .into_iter()
            .chain(majority_indices)
            .collect();

        Ok(TrackTable {
            track_ids: keep.iter().map(|&i| self.track_ids[i]).collect(),
            genres: keep.iter().map(|&i| self.genres[i].clone()).collect(),
            features: self.features.select_rows(&keep),
            dropped_rows: self.dropped_rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn metrics_row(track_id: i64, base: f32) -> TrackMetrics {
        TrackMetrics {
            track_id,
            acousticness: base,
            danceability: base + 0.1,
            energy: base + 0.2,
            instrumentalness: base + 0.3,
            liveness: base + 0.4,
            speechiness: base + 0.5,
            tempo: 100.0 + base,
            valence: base + 0.6,
        }
    }

    fn sample_table(n_rock: usize, n_hop: usize) -> TrackTable {
        let mut metrics = Vec::new();
        let mut genres = Vec::new();
        for i in 0..(n_rock + n_hop) {
            let id = i as i64;
            metrics.push(metrics_row(id, i as f32 * 0.01));
            genres.push(TrackGenre {
                track_id: id,
                genre_top: if i < n_rock { "Rock" } else { "Hip-Hop" }.to_string(),
            });
        }
        TrackTable::join(&metrics, &genres).expect("valid join")
    }

    #[test]
    fn test_join_matches_on_track_id() {
        let metrics = vec![metrics_row(1, 0.1), metrics_row(2, 0.2), metrics_row(3, 0.3)];
        let genres = vec![
            TrackGenre { track_id: 2, genre_top: "Rock".to_string() },
            TrackGenre { track_id: 3, genre_top: "Hip-Hop".to_string() },
            TrackGenre { track_id: 9, genre_top: "Rock".to_string() },
        ];

        let table = TrackTable::join(&metrics, &genres).expect("join");
        assert_eq!(table.n_tracks(), 2);
        assert_eq!(table.track_ids(), &[2, 3]);
        assert_eq!(table.genres(), &["Rock".to_string(), "Hip-Hop".to_string()]);
        // One unmatched metric row + one unmatched genre row
        assert_eq!(table.dropped_rows(), 2);
    }

    #[test]
    fn test_join_preserves_feature_alignment() {
        let metrics = vec![metrics_row(5, 0.5), metrics_row(6, 0.9)];
        let genres = vec![
            TrackGenre { track_id: 5, genre_top: "Rock".to_string() },
            TrackGenre { track_id: 6, genre_top: "Hip-Hop".to_string() },
        ];
        let table = TrackTable::join(&metrics, &genres).expect("join");
        assert!((table.features().get(0, 0) - 0.5).abs() < 1e-6);
        assert!((table.features().get(1, 6) - 100.9).abs() < 1e-4);
    }

    #[test]
    fn test_join_rejects_duplicate_genre_ids() {
        let metrics = vec![metrics_row(1, 0.1)];
        let genres = vec![
            TrackGenre { track_id: 1, genre_top: "Rock".to_string() },
            TrackGenre { track_id: 1, genre_top: "Hip-Hop".to_string() },
        ];
        assert!(TrackTable::join(&metrics, &genres).is_err());
    }

    #[test]
    fn test_join_rejects_duplicate_metric_ids() {
        let metrics = vec![metrics_row(1, 0.1), metrics_row(1, 0.2)];
        let genres = vec![TrackGenre { track_id: 1, genre_top: "Rock".to_string() }];
        assert!(TrackTable::join(&metrics, &genres).is_err());
    }

    #[test]
    fn test_join_rejects_empty_overlap() {
        let metrics = vec![metrics_row(1, 0.1)];
        let genres = vec![TrackGenre { track_id: 2, genre_top: "Rock".to_string() }];
        assert!(TrackTable::join(&metrics, &genres).is_err());
    }

    #[test]
    fn test_class_counts() {
        let table = sample_table(5, 3);
        assert_eq!(
            table.class_counts(),
            vec![("Hip-Hop".to_string(), 3), ("Rock".to_string(), 5)]
        );
    }

    #[test]
    fn test_describe_has_one_entry_per_feature() {
        let table = sample_table(3, 2);
        let stats = table.describe();
        assert_eq!(stats.len(), FEATURE_NAMES.len());
        assert_eq!(stats[0].name, "acousticness");
        assert_eq!(stats[0].count, 5);
        assert!(stats[6].mean > 100.0); // tempo column
    }

    #[test]
    fn test_balance_equalizes_classes() {
        let table = sample_table(10, 4);
        let balanced = table.balance(10).expect("balance");

        assert_eq!(balanced.n_tracks(), 8);
        let counts = balanced.class_counts();
        assert_eq!(counts[0].1, 4);
        assert_eq!(counts[1].1, 4);
    }

    #[test]
    fn test_balance_keeps_all_minority_rows() {
        let table = sample_table(10, 4);
        let balanced = table.balance(10).expect("balance");

        let minority_ids: HashSet<i64> = table
            .track_ids()
            .iter()
            .zip(table.genres())
            .filter(|(_, g)| g.as_str() == "Hip-Hop")
            .map(|(&id, _)| id)
            .collect();
        let balanced_ids: HashSet<i64> = balanced.track_ids().iter().copied().collect();
        assert!(minority_ids.is_subset(&balanced_ids));
    }

    #[test]
    fn test_balance_samples_without_replacement() {
        let table = sample_table(10, 4);
        let balanced = table.balance(10).expect("balance");
        let unique: HashSet<i64> = balanced.track_ids().iter().copied().collect();
        assert_eq!(unique.len(), balanced.n_tracks());
    }

    #[test]
    fn test_balance_deterministic_per_seed() {
        let table = sample_table(20, 6);
        let a = table.balance(10).expect("balance");
        let b = table.balance(10).expect("balance");
        assert_eq!(a.track_ids(), b.track_ids());

        let c = table.balance(11).expect("balance");
        assert_ne!(a.track_ids(), c.track_ids());
    }

    #[test]
    fn test_balance_rejects_more_than_two_classes() {
        let metrics = vec![metrics_row(1, 0.1), metrics_row(2, 0.2), metrics_row(3, 0.3)];
        let genres = vec![
            TrackGenre { track_id: 1, genre_top: "Rock".to_string() },
            TrackGenre { track_id: 2, genre_top: "Hip-Hop".to_string() },
            TrackGenre { track_id: 3, genre_top: "Jazz".to_string() },
        ];
        let table = TrackTable::join(&metrics, &genres).expect("join");
        let err = table.balance(10).unwrap_err();
        assert!(err.to_string().contains("2 label classes"));
    }

    #[test]
    fn test_balance_rejects_single_class() {
        let table = sample_table(4, 0);
        assert!(table.balance(10).is_err());
    }

    #[test]
    fn test_load_track_genres_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "track_id,album,genre_top").expect("write");
        writeln!(file, "10,Some Album,Rock").expect("write");
        writeln!(file, "11,Other,Hip-Hop").expect("write");
        file.flush().expect("flush");

        let rows = load_track_genres(file.path()).expect("load");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].track_id, 10);
        assert_eq!(rows[1].genre_top, "Hip-Hop");
    }

    #[test]
    fn test_load_track_genres_missing_column() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "track_id,album").expect("write");
        writeln!(file, "10,Some Album").expect("write");
        file.flush().expect("flush");

        let err = load_track_genres(file.path()).unwrap_err();
        assert!(matches!(err, GeneroError::Input { .. }));
    }

    #[test]
    fn test_load_track_genres_missing_file() {
        let err = load_track_genres("/nonexistent/tracks.csv").unwrap_err();
        assert!(matches!(err, GeneroError::Input { .. }));
    }

    #[test]
    fn test_load_track_metrics_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(
            file,
            r#"[{{"track_id": 3, "acousticness": 0.4, "danceability": 0.5,
                 "energy": 0.6, "instrumentalness": 0.1, "liveness": 0.2,
                 "speechiness": 0.3, "tempo": 120.5, "valence": 0.7}}]"#
        )
        .expect("write");
        file.flush().expect("flush");

        let rows = load_track_metrics(file.path()).expect("load");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].track_id, 3);
        assert!((rows[0].tempo - 120.5).abs() < 1e-6);
    }

    #[test]
    fn test_load_track_metrics_missing_field() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, r#"[{{"track_id": 3, "acousticness": 0.4}}]"#).expect("write");
        file.flush().expect("flush");

        let err = load_track_metrics(file.path()).unwrap_err();
        assert!(matches!(err, GeneroError::Input { .. }));
    }
}
