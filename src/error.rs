//! Error types for the morph-bulk library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum MorphError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed report {}: {reason}", .path.display())]
    Report { path: PathBuf, reason: String },

    #[error("Invalid null-distribution table: {0}")]
    NullTable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Empty data: {0}")]
    EmptyData(String),
}

impl MorphError {
    /// Build a report grammar error pointing at the offending file.
    pub fn report(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        MorphError::Report {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, MorphError>;
