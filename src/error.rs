//! Unified error types for the build engine server and tooling.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the build engine.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Invalid configuration values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Data file loading error.
    #[error("data error: {0}")]
    Data(#[from] DataError),

    /// Display client error.
    #[error("client error: {0}")]
    Client(#[from] ClientError),
}

/// Errors raised while reading files from the repository root.
#[derive(Error, Debug)]
pub enum DataError {
    /// The file does not exist.
    #[error("file not found: {}", path.display())]
    NotFound {
        /// Path that was requested.
        path: PathBuf,
    },

    /// Reading the file failed for a reason other than absence.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON (or not the expected shape).
    #[error("invalid JSON in {}: {source}", path.display())]
    Parse {
        /// Path that was parsed.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A wrapper file is missing its top-level array.
    #[error("{} has no top-level '{key}' array", path.display())]
    Shape {
        /// Path that was parsed.
        path: PathBuf,
        /// Expected wrapper key.
        key: &'static str,
    },
}

impl DataError {
    /// Classify an IO error for `path`.
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            DataError::NotFound { path }
        } else {
            DataError::Io { path, source }
        }
    }

    /// Whether the file was simply absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DataError::NotFound { .. })
    }
}

/// Display client errors.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The base URL could not be parsed or joined.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// Transport or decode failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
