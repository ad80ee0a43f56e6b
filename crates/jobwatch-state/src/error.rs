//! Error types for the result recorder.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for recorder operations.
pub type RecordResult<T> = Result<T, RecordError>;

/// Errors that can occur while appending to the result log.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to open result log {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write result log {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialize(#[from] csv::Error),
}
