//! Attribute-level change directives sent to the remote store.

use std::fmt;

use serde::Serialize;

use super::Value;

/// What an [`Operation`] does to its attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Replace the attribute value.
    Set,
    /// Add values to a multi-valued attribute.
    Add,
    /// Remove values from a multi-valued attribute.
    Remove,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Set => "set",
            Self::Add => "add",
            Self::Remove => "remove",
        };
        f.write_str(name)
    }
}

/// A single change directive: `{op, path, value}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    /// Operation kind.
    pub op: OperationKind,
    /// Kebab-case wire name of the attribute.
    pub path: String,
    /// New value (`Set`) or the values to add or remove.
    pub value: Value,
    /// Whether the value must be masked in logs and output.
    #[serde(skip)]
    pub sensitive: bool,
}

impl Operation {
    /// Creates a `set` operation.
    #[must_use]
    pub fn set(path: impl Into<String>, value: Value) -> Self {
        Self::new(OperationKind::Set, path, value)
    }

    /// Creates an `add` operation.
    #[must_use]
    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self::new(OperationKind::Add, path, value)
    }

    /// Creates a `remove` operation.
    #[must_use]
    pub fn remove(path: impl Into<String>, value: Value) -> Self {
        Self::new(OperationKind::Remove, path, value)
    }

    fn new(op: OperationKind, path: impl Into<String>, value: Value) -> Self {
        Self {
            op,
            path: path.into(),
            value,
            sensitive: false,
        }
    }

    /// Marks the operation value as sensitive.
    #[must_use]
    pub const fn sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = sensitive;
        self
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sensitive {
            write!(f, "{} {} = ***", self.op, self.path)
        } else {
            write!(f, "{} {} = {}", self.op, self.path, self.value)
        }
    }
}

/// The body of one atomic update call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateRequest {
    /// Operations in canonical attribute order.
    pub operations: Vec<Operation>,
}

impl UpdateRequest {
    /// Wraps an operation list.
    #[must_use]
    pub const fn new(operations: Vec<Operation>) -> Self {
        Self { operations }
    }

    /// Returns true if there is nothing to apply.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
