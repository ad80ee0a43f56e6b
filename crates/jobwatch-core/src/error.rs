//! Error types for configuration resolution.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while resolving the monitor configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid timeout {0:?}: expected a positive number of seconds or a value like \"500ms\"")]
    InvalidTimeout(String),

    #[error("target URL must not be empty")]
    EmptyTargetUrl,

    #[error("jobs field name must not be empty")]
    EmptyJobsField,
}
