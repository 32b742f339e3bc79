//! Error types for the KALDRA kernels

use thiserror::Error;

/// Result type alias for kernel operations
pub type KaldraResult<T> = Result<T, KaldraError>;

/// Errors surfaced by the bias pipeline and its collaborators.
///
/// Degraded conditions (missing classifier artifact, missing cultural weights)
/// are not errors: they are logged and the pipeline continues.
#[derive(Error, Debug)]
pub enum KaldraError {
    /// Caller handed the pipeline something it cannot work with
    /// (non-array batch, wrong-length Δ12, empty or non-finite embedding).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Reference table (locales, archetypes, Δ144 grid, weights) could not be parsed.
    #[error("Reference data error: {0}")]
    Reference(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<config::ConfigError> for KaldraError {
    fn from(err: config::ConfigError) -> Self {
        KaldraError::Config(err.to_string())
    }
}
