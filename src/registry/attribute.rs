//! Typed attribute identifiers.

use crate::model::{ServerVersion, ValueKind, wire_name};

/// Static description of one attribute of a configuration family.
///
/// Each family declares its attributes once, in canonical order. That order
/// is the order operations are emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeDef {
    /// Internal snake_case name.
    pub name: &'static str,
    /// Value kind.
    pub kind: ValueKind,
    /// Write-only attribute the server never echoes back.
    pub sensitive: bool,
    /// Oldest server version that accepts the attribute.
    pub since: Option<ServerVersion>,
}

impl AttributeDef {
    const fn new(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            kind,
            sensitive: false,
            since: None,
        }
    }

    /// A string attribute.
    #[must_use]
    pub const fn string(name: &'static str) -> Self {
        Self::new(name, ValueKind::String)
    }

    /// A boolean attribute.
    #[must_use]
    pub const fn bool(name: &'static str) -> Self {
        Self::new(name, ValueKind::Bool)
    }

    /// An integer attribute.
    #[must_use]
    pub const fn int(name: &'static str) -> Self {
        Self::new(name, ValueKind::Int)
    }

    /// A string-set attribute.
    #[must_use]
    pub const fn set(name: &'static str) -> Self {
        Self::new(name, ValueKind::Set)
    }

    /// Marks the attribute as obscured.
    #[must_use]
    pub const fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Requires at least `version` on the server.
    #[must_use]
    pub const fn since(mut self, version: ServerVersion) -> Self {
        self.since = Some(version);
        self
    }

    /// Kebab-case wire name.
    #[must_use]
    pub fn wire_name(&self) -> String {
        wire_name(self.name)
    }

    /// Returns true if `version` is new enough for this attribute.
    #[must_use]
    pub fn supported_on(&self, version: ServerVersion) -> bool {
        self.since.is_none_or(|minimum| version.at_least(minimum))
    }
}
