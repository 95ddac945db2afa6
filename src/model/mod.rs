//! Caller-facing data model.
//!
//! This module provides:
//! - Typed attribute values ([`Value`], [`ValueKind`], [`StringSet`])
//! - The generic configuration record ([`ConfigObject`])
//! - Change directives ([`Operation`], [`UpdateRequest`])
//! - Desired-state requests ([`DesiredObject`], [`Mode`])
//! - Server versions ([`ServerVersion`])

mod desired;
mod object;
mod operation;
mod value;
mod version;

#[cfg(test)]
mod version_tests;

pub use desired::{DesiredObject, Mode};
pub use object::ConfigObject;
pub use operation::{Operation, OperationKind, UpdateRequest};
pub use value::{StringSet, Value, ValueKind};
pub use version::{ParseVersionError, ServerVersion};

/// Converts an internal attribute name to its kebab-case wire name.
///
/// `aws_access_key_id` becomes `aws-access-key-id`.
#[must_use]
pub fn wire_name(name: &str) -> String {
    name.replace('_', "-")
}

/// Converts a kebab-case wire name back to the internal attribute name.
#[must_use]
pub fn attribute_name(wire: &str) -> String {
    wire.replace('-', "_")
}
