//! Error types for genero operations.
//!
//! Every failure in the pipeline is fatal to the run; these variants exist
//! to tell the caller which step and which precondition failed.

use std::fmt;

/// Main error type for genero operations.
///
/// # Examples
///
/// ```
/// use genero::error::GeneroError;
///
/// let err = GeneroError::DataQuality {
///     step: "standardization".to_string(),
///     message: "column 'energy' has zero standard deviation".to_string(),
/// };
/// assert!(err.to_string().contains("standardization"));
/// ```
#[derive(Debug)]
pub enum GeneroError {
    /// A source file is unreadable, unparsable, or missing required columns.
    Input {
        /// Path of the offending source
        path: String,
        /// What went wrong
        message: String,
    },

    /// The data violates an assumption a step depends on (degenerate column,
    /// unexpected class count).
    DataQuality {
        /// Pipeline step that detected the problem
        step: String,
        /// Description of the violated precondition
        message: String,
    },

    /// A requested parameter is incompatible with the data.
    InvalidConfig {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Matrix/vector dimensions don't match for the operation.
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// I/O error (file not found, permission denied, etc.).
    Io(std::io::Error),

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for GeneroError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneroError::Input { path, message } => {
                write!(f, "Input error reading {path}: {message}")
            }
            GeneroError::DataQuality { step, message } => {
                write!(f, "Data quality error in {step}: {message}")
            }
            GeneroError::InvalidConfig {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid configuration: {param} = {value}, expected {constraint}"
                )
            }
            GeneroError::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "Matrix dimension mismatch: expected {expected}, got {actual}"
                )
            }
            GeneroError::Io(e) => write!(f, "I/O error: {e}"),
            GeneroError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for GeneroError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeneroError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GeneroError {
    fn from(err: std::io::Error) -> Self {
        GeneroError::Io(err)
    }
}

impl From<&str> for GeneroError {
    fn from(msg: &str) -> Self {
        GeneroError::Other(msg.to_string())
    }
}

impl From<String> for GeneroError {
    fn from(msg: String) -> Self {
        GeneroError::Other(msg)
    }
}

impl GeneroError {
    /// Create an input error with path context.
    #[must_use]
    pub fn input(path: &std::path::Path, message: impl Into<String>) -> Self {
        Self::Input {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    /// Create a data-quality error naming the pipeline step that caught it.
    #[must_use]
    pub fn data_quality(step: &str, message: impl Into<String>) -> Self {
        Self::DataQuality {
            step: step.to_string(),
            message: message.into(),
        }
    }

    /// Create a configuration error from a parameter and its constraint.
    #[must_use]
    pub fn invalid_config(param: &str, value: impl fmt::Display, constraint: &str) -> Self {
        Self::InvalidConfig {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, GeneroError>;
