//! Error types for reconciliation passes.

use std::fmt;

use thiserror::Error;

use crate::model::{ServerVersion, ValueKind};
use crate::registry::RegistryError;
use crate::store::{HttpError, StoreError};

/// A single plan-time violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required attribute has no value.
    #[error("'{attribute}' is required for variant '{variant}'")]
    Missing {
        /// Attribute name
        attribute: String,
        /// Selected variant
        variant: &'static str,
    },

    /// An attribute was set that the selected variant does not own.
    #[error("'{attribute}' is not applicable to variant '{variant}'")]
    NotApplicable {
        /// Attribute name
        attribute: String,
        /// Selected variant
        variant: &'static str,
    },

    /// The family declares no such attribute.
    #[error("Unknown attribute '{attribute}' for {family}")]
    UnknownAttribute {
        /// Attribute name
        attribute: String,
        /// Family name
        family: &'static str,
    },

    /// The value has the wrong kind.
    #[error("'{attribute}' must be a {expected}, got a {found}")]
    WrongKind {
        /// Attribute name
        attribute: String,
        /// Declared kind
        expected: ValueKind,
        /// Supplied kind
        found: ValueKind,
    },

    /// An attribute is missing because another one is set.
    #[error("'{attribute}' must be set when '{because}' is set")]
    Requires {
        /// The missing attribute
        attribute: String,
        /// The attribute that demands it
        because: String,
    },

    /// More than one of a mutually exclusive group is set.
    #[error("Only one of {} may be set", quoted(.attributes))]
    Exclusive {
        /// The conflicting attributes that are set
        attributes: Vec<String>,
    },

    /// A server-intrinsic variant was requested in create mode.
    #[error("Variant '{variant}' exists on every server and can only be adopted")]
    AdoptOnly {
        /// Selected variant
        variant: &'static str,
    },
}

impl ValidationError {
    /// Attributes the violation refers to.
    #[must_use]
    pub fn attributes(&self) -> Vec<&str> {
        match self {
            Self::Missing { attribute, .. }
            | Self::NotApplicable { attribute, .. }
            | Self::UnknownAttribute { attribute, .. }
            | Self::WrongKind { attribute, .. }
            | Self::Requires { attribute, .. } => vec![attribute.as_str()],
            Self::Exclusive { attributes } => attributes.iter().map(String::as_str).collect(),
            Self::AdoptOnly { .. } => Vec::new(),
        }
    }
}

/// Every violation found in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Records a violation.
    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// Number of violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates violations in discovery order.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// `Ok(())` if empty, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one violation was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.0.len())?;
        for error in &self.0 {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An attribute that needs a newer server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRequirement {
    /// Attribute name
    pub attribute: &'static str,
    /// Oldest version that accepts it
    pub minimum: ServerVersion,
}

impl fmt::Display for VersionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' (requires {})", self.attribute, self.minimum)
    }
}

/// Error type for a reconciliation pass.
///
/// Validation and version errors are raised before any remote call. The
/// remaining variants halt the pass in the phase where they occur.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Unknown family or variant, or an undecodable response.
    #[error("Configuration error: {0}")]
    Configuration(#[from] RegistryError),

    /// Plan-time rule violations.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Attributes the configured server version does not support.
    #[error(
        "Not supported on server version {configured}: {}",
        join(.attributes)
    )]
    UnsupportedOnVersion {
        /// Configured server version
        configured: ServerVersion,
        /// Offending attributes
        attributes: Vec<VersionRequirement>,
    },

    /// The remote object is of another variant than the desired one.
    #[error("'{id}' is a '{remote}' on the server but '{desired}' was requested")]
    VariantMismatch {
        /// Object id
        id: String,
        /// Desired variant
        desired: String,
        /// Variant on the server
        remote: String,
    },

    /// Adopt mode found nothing to adopt.
    #[error("{family} '{id}' does not exist and adopt mode never creates")]
    NotFound {
        /// Family name
        family: &'static str,
        /// Object id
        id: String,
    },

    /// The store answered with a non-success status.
    #[error("Remote store returned {status}: {body}")]
    Remote {
        /// HTTP status
        status: http::StatusCode,
        /// Response body as returned
        body: String,
    },

    /// The store could not be reached.
    #[error("Transport error: {0}")]
    Transport(#[source] HttpError),
}

impl From<StoreError> for ReconcileError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Status { status, body } => Self::Remote { status, body },
            StoreError::Transport(e) => Self::Transport(e),
            StoreError::InvalidBody(e) => Self::Configuration(RegistryError::MalformedResponse {
                family: "store",
                reason: e.to_string(),
            }),
        }
    }
}

fn quoted(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("'{item}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn join(items: &[VersionRequirement]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
