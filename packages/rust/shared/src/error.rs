//! Error types for Prospector.
//!
//! Library crates use [`ProspectorError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Prospector operations.
///
/// Only [`ProspectorError::Config`] aborts a search. Source,
/// normalization and network failures are caught by the pipeline, logged,
/// and degrade to fewer results.
#[derive(Debug, thiserror::Error)]
pub enum ProspectorError {
    /// ICP or application configuration is missing or malformed.
    #[error("config error: {message}")]
    Config { message: String },

    /// A data source collaborator failed.
    #[error("source '{source_name}' failed: {message}")]
    Source {
        source_name: String,
        message: String,
    },

    /// A raw record could not be mapped into the unified schema.
    #[error("normalization error: {0}")]
    Normalization(String),

    /// Network/HTTP error talking to an external API.
    #[error("network error: {0}")]
    Network(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// JSON/CSV/YAML/TOML encoding error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ProspectorError>;

impl ProspectorError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a source failure tagged with the source's name.
    pub fn source(source_name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Source {
            source_name: source_name.into(),
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = ProspectorError::config("missing icp section");
        assert_eq!(err.to_string(), "config error: missing icp section");

        let err = ProspectorError::source("Crunchbase", "HTTP 500");
        assert_eq!(err.to_string(), "source 'Crunchbase' failed: HTTP 500");

        let err = ProspectorError::validation("min confidence must be within [0, 1]");
        assert_eq!(
            err.to_string(),
            "validation error: min confidence must be within [0, 1]"
        );
    }
}
