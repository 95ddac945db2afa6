//! The generic configuration object record.

use std::collections::BTreeMap;

use serde::Serialize;

use super::Value;

static NULL: Value = Value::Null;

/// One manageable configuration entity, for example a single cipher stream
/// provider.
///
/// Attributes are keyed by their internal (snake_case) name. Which names
/// are meaningful is decided by the object's `variant`; see
/// [`crate::registry::Variant`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigObject {
    /// Unique key, immutable after creation.
    pub id: String,
    /// Variant tag within the object's family.
    pub variant: String,
    /// Attribute name to value.
    pub attributes: BTreeMap<String, Value>,
}

impl ConfigObject {
    /// Creates an object with no attributes.
    #[must_use]
    pub fn new(id: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            variant: variant.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Sets an attribute, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets an attribute.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Returns the attribute value, or `Null` if absent.
    #[must_use]
    pub fn get(&self, name: &str) -> &Value {
        self.attributes.get(name).unwrap_or(&NULL)
    }

    /// Returns true if the attribute holds a defined value.
    #[must_use]
    pub fn is_defined(&self, name: &str) -> bool {
        self.get(name).is_defined()
    }

    /// Iterates attributes holding defined values.
    pub fn defined(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes
            .iter()
            .filter(|(_, value)| value.is_defined())
            .map(|(name, value)| (name.as_str(), value))
    }
}
