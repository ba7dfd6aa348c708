//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A config file was not valid TOML, or did not match the expected shape.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path that failed to parse.
        path: String,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A field failed post-merge validation.
    #[error("invalid config field {field}: {message}")]
    ValidationError {
        /// Dotted field path, e.g. `"llm.temperature"`.
        field: String,
        /// Human-readable explanation.
        message: String,
    },

    /// No home directory could be resolved for user-level config discovery.
    #[error("could not determine the current user's home directory")]
    NoHomeDir,
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
