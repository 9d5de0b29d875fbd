//! Genero: rock vs. hip-hop track classification from audio features.
//!
//! A single-pass analysis pipeline: two tabular sources are inner-joined
//! into one track table, features are standardized and reduced with PCA,
//! the class imbalance is removed by down-sampling, and three classifiers
//! (decision tree, logistic regression, random forest) are trained,
//! compared on held-out reports, and cross-validated.
//!
//! Everything is seeded: the same inputs and seed give bit-identical
//! component selections, balanced samples, and scores.
//!
//! # Quick Start
//!
//! ```
//! use genero::prelude::*;
//!
//! // Two well-separated clusters in two features
//! let x = Matrix::from_vec(6, 2, vec![
//!     0.0, 0.1,
//!     0.2, 0.0,
//!     0.1, 0.3,
//!     5.0, 5.1,
//!     5.2, 5.0,
//!     5.1, 5.3,
//! ]).unwrap();
//! let y = vec![0, 0, 0, 1, 1, 1];
//!
//! let mut tree = DecisionTreeClassifier::new();
//! tree.fit(&x, &y).unwrap();
//! assert!((tree.score(&x, &y) - 1.0).abs() < 1e-6);
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Core Vector and Matrix types
//! - [`dataset`]: Loading, joining, inspecting and balancing the track table
//! - [`stats`]: Feature correlation summary
//! - [`preprocessing`]: Standard scaler and label encoder
//! - [`decomposition`]: Principal component analysis and component selection
//! - [`tree`]: Decision tree classifier
//! - [`classification`]: Logistic regression
//! - [`ensemble`]: Random forest
//! - [`model_selection`]: Train/test splitting and k-fold cross-validation
//! - [`metrics`]: Accuracy and structured classification reports
//! - [`pipeline`]: The end-to-end analysis pass
//! - [`render`]: Text rendering of pipeline outputs

pub mod classification;
pub mod dataset;
pub mod decomposition;
pub mod ensemble;
pub mod error;
pub mod metrics;
pub mod model_selection;
pub mod pipeline;
pub mod preprocessing;
pub mod primitives;
pub mod render;
pub mod stats;
pub mod traits;
pub mod tree;

pub use error::{GeneroError, Result};
pub use primitives::{Matrix, Vector};
pub use traits::{Classifier, Transformer};

/// Commonly used types, importable in one line.
pub mod prelude {
    pub use crate::classification::LogisticRegression;
    pub use crate::dataset::TrackTable;
    pub use crate::decomposition::{select_component_count, PrincipalComponents};
    pub use crate::ensemble::RandomForestClassifier;
    pub use crate::error::{GeneroError, Result};
    pub use crate::metrics::ClassificationReport;
    pub use crate::model_selection::{cross_validate, train_test_split, KFold};
    pub use crate::pipeline::{AnalysisReport, PipelineConfig};
    pub use crate::preprocessing::{LabelEncoder, StandardScaler};
    pub use crate::primitives::{Matrix, Vector};
    pub use crate::traits::{Classifier, Transformer};
    pub use crate::tree::DecisionTreeClassifier;
}
