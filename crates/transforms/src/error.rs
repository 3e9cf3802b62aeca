use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or applying a fitted transform.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The artifact parsed but its contents are unusable (ragged matrix, NaN, ...).
    #[error("invalid artifact: {0}")]
    Invalid(String),

    #[error("{context}: expected {expected} values, got {actual}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },
}
