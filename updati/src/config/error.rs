//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while loading or validating settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Settings file not found.
    #[error("Settings file not found: {path}")]
    MissingFile { path: String },

    /// I/O error reading the settings file.
    #[error("Failed to read '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("Failed to parse TOML in '{path}': {source}")]
    TomlError {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// A repository pattern is not a valid regular expression.
    #[error("Invalid repository pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A setting holds a value outside its accepted range.
    #[error("Invalid value for '{field}': {message}")]
    ValidationError { field: &'static str, message: String },
}
