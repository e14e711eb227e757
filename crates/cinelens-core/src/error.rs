//! Error types for Cinelens.
//!
//! Every fallible operation in the library returns [`CinelensError`]. The
//! service layer converts these into tagged outcomes so callers never see a
//! raw error, but the variants stay distinct so each failure branch can be
//! tested on its own.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the Cinelens library.
#[derive(Debug, Error)]
pub enum CinelensError {
    // Dataset errors
    #[error("Dataset file not found: {0}")]
    MissingDataFile(PathBuf),

    #[error("Malformed row in {path:?} at line {line}: {message}")]
    MalformedRow {
        path: PathBuf,
        line: usize,
        message: String,
    },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Network errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        /// Optional cause description
        cause: Option<String>,
    },

    #[error("Request timed out: {message}")]
    Timeout { message: String },

    #[error("Rate limited by {service} (429), retry after {retry_after_secs:?} seconds")]
    RateLimited {
        service: String,
        retry_after_secs: Option<u64>,
    },

    #[error("Generation failed: {message}")]
    Generation {
        message: String,
        status_code: Option<u16>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },
}

/// Result type alias for Cinelens operations.
pub type Result<T> = std::result::Result<T, CinelensError>;

impl From<std::io::Error> for CinelensError {
    fn from(err: std::io::Error) -> Self {
        CinelensError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for CinelensError {
    fn from(err: serde_json::Error) -> Self {
        CinelensError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for CinelensError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CinelensError::Timeout {
                message: err.to_string(),
            }
        } else {
            CinelensError::Network {
                message: err.to_string(),
                cause: std::error::Error::source(&err).map(|s| s.to_string()),
            }
        }
    }
}

impl CinelensError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        CinelensError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Check whether this error means the generation quota was exhausted.
    ///
    /// Structured 429 responses map to [`CinelensError::RateLimited`]. A
    /// generation error with any other status code is not a quota error, even
    /// if its body mentions `429`. Errors that only carry text (custom
    /// generators, proxies that rewrap the status) are matched on a `429` in
    /// their message.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            CinelensError::RateLimited { .. } => true,
            CinelensError::Generation {
                status_code: Some(429),
                ..
            } => true,
            CinelensError::Generation {
                status_code: Some(_),
                ..
            } => false,
            other => other.to_string().contains("429"),
        }
    }

    /// Check if this error comes from an absent dataset file.
    pub fn is_missing_data(&self) -> bool {
        matches!(self, CinelensError::MissingDataFile(_))
    }
}
