//! Error types for configuration parsing and validation.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::ParseVersionError;

/// Error type for configuration operations.
///
/// Covers errors from parsing, validation, and file operations, for both
/// the settings file and the desired-model file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("Failed to read config file '{}': {source}", path.display())]
    FileRead {
        /// Path to the file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to write configuration file (for init command).
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Missing required field that must be provided by CLI or config file.
    #[error("Missing required field: {field}. {hint}")]
    MissingRequired {
        /// Name of the missing field
        field: &'static str,
        /// Hint for how to provide the value
        hint: &'static str,
    },

    /// Invalid URL provided.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The invalid URL string
        url: String,
        /// Reason for invalidity
        reason: String,
    },

    /// The server version does not parse.
    #[error(transparent)]
    InvalidVersion(#[from] ParseVersionError),

    /// The server version parses but is not one this tool knows.
    #[error("Unsupported server version '{version}': expected one of {supported}")]
    UnsupportedVersion {
        /// The configured version
        version: String,
        /// Supported versions, comma separated
        supported: String,
    },

    /// Invalid duration value (zero).
    #[error("Invalid duration for {field}: {reason}")]
    InvalidDuration {
        /// Name of the field
        field: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Invalid header format.
    #[error("Invalid header format '{value}': expected 'Key=Value' or 'Key: Value'")]
    InvalidHeader {
        /// The invalid header string
        value: String,
    },

    /// Invalid header name.
    #[error("Invalid header name '{name}': {reason}")]
    InvalidHeaderName {
        /// The invalid header name
        name: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Invalid header value.
    #[error("Invalid header value for '{name}': {reason}")]
    InvalidHeaderValue {
        /// The header name
        name: String,
        /// Reason for invalidity
        reason: String,
    },

    /// A desired-model attribute has a TOML type with no attribute kind.
    #[error("Object '{id}': attribute '{attribute}' {reason}")]
    InvalidAttribute {
        /// Object id
        id: String,
        /// Attribute name as written
        attribute: String,
        /// What is wrong with it
        reason: &'static str,
    },

    /// The same object appears twice in a desired model.
    #[error("Object '{id}' of {family} is declared more than once")]
    DuplicateObject {
        /// Family name
        family: String,
        /// Object id
        id: String,
    },
}

/// Well-known field names for `MissingRequired` errors.
///
/// Use these constants for compile-time safety when matching field names.
pub mod field {
    /// The server URL field.
    pub const URL: &str = "url";
    /// The server version field.
    pub const VERSION: &str = "version";
}

impl ConfigError {
    /// Creates a `MissingRequired` error for a required field.
    #[must_use]
    pub const fn missing(field: &'static str, hint: &'static str) -> Self {
        Self::MissingRequired { field, hint }
    }
}
