//! Error types for driftcheck.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for driftcheck operations.
///
/// SQL text that fails to match any known statement shape is not an error;
/// the fact is simply not extracted. Only missing or unreadable inputs are
/// fatal.
#[derive(Debug, Error)]
pub enum DriftError {
    /// A required input path does not exist.
    #[error("Input not found: {path}")]
    MissingInput { path: PathBuf },

    /// Config file could not be parsed.
    #[error("Config error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DriftError {
    /// Create a missing-input error for the given path.
    pub fn missing(path: impl Into<PathBuf>) -> Self {
        Self::MissingInput { path: path.into() }
    }
}

/// Result type alias for driftcheck operations.
pub type DriftResult<T> = Result<T, DriftError>;
