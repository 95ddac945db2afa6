//! Error types for registry lookups and response decoding.

use thiserror::Error;

use crate::model::ValueKind;

/// Error type for registry operations.
///
/// Raised while resolving a plan or decoding a store response; both are
/// configuration problems rather than transient failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No family with this name is registered.
    #[error("Unknown configuration family '{name}' (known: {known})")]
    UnknownFamily {
        /// The requested family
        name: String,
        /// Comma-separated registered families
        known: String,
    },

    /// The family has no variant with this tag.
    #[error("Unknown {family} variant '{tag}' (known: {known})")]
    UnknownVariant {
        /// Family name
        family: &'static str,
        /// The requested tag
        tag: String,
        /// Comma-separated valid tags
        known: String,
    },

    /// A response carried no recognizable `schemas` entry.
    #[error("Response for {family} has no schema for this family")]
    MissingSchema {
        /// Family name
        family: &'static str,
    },

    /// A response named a schema for a different variant than expected.
    #[error("Response schema '{schema}' does not match {family} variant '{expected}'")]
    SchemaMismatch {
        /// Family name
        family: &'static str,
        /// Variant the decoder was asked for
        expected: &'static str,
        /// Schema found in the response
        schema: String,
    },

    /// A response was not the expected JSON shape.
    #[error("Malformed {family} response: {reason}")]
    MalformedResponse {
        /// Family name
        family: &'static str,
        /// What was wrong
        reason: String,
    },

    /// A response attribute had the wrong JSON type.
    #[error("Response attribute '{attribute}' is not a {expected}")]
    WrongKind {
        /// Internal attribute name
        attribute: &'static str,
        /// Kind the registry declares
        expected: ValueKind,
    },
}
