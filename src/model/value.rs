//! Typed attribute values.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Serialize, Serializer};

/// The closed set of attribute kinds a configuration object can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// A single string.
    String,
    /// A boolean flag.
    Bool,
    /// A signed 64-bit integer.
    Int,
    /// An unordered, duplicate-free set of strings.
    Set,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Set => "set",
        };
        f.write_str(name)
    }
}

/// A set of strings that keeps insertion order but compares as a set.
///
/// Duplicates are dropped on insertion. Two sets are equal when they hold
/// the same members, regardless of order.
#[derive(Debug, Clone, Default, Eq)]
pub struct StringSet {
    items: Vec<String>,
}

impl StringSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Inserts a value, returning `false` if it was already present.
    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if self.contains(&value) {
            return false;
        }
        self.items.push(value);
        true
    }

    /// Returns true if the set contains `value`.
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.items.iter().any(|item| item == value)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    /// Members of `self` that are not in `other`, in `self`'s order.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        self.iter().filter(|item| !other.contains(item)).collect()
    }

    fn sorted(&self) -> BTreeSet<&str> {
        self.iter().collect()
    }
}

impl PartialEq for StringSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.sorted() == other.sorted()
    }
}

impl<S: Into<String>> FromIterator<S> for StringSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

impl Serialize for StringSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// The value of one attribute on a configuration object.
///
/// `Null` means "not set". `Unknown` is a planning-time placeholder for a
/// value the caller has not determined yet; it never reaches the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Value {
    /// No value.
    #[default]
    Null,
    /// Not yet known to the caller.
    Unknown,
    /// A string value.
    String(String),
    /// A boolean value.
    Bool(bool),
    /// An integer value.
    Int(i64),
    /// A set of strings.
    Set(StringSet),
}

impl Value {
    /// Convenience constructor for string values.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Convenience constructor for set values.
    #[must_use]
    pub fn set<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Set(values.into_iter().collect())
    }

    /// Returns true if this value carries actual data.
    ///
    /// Empty strings count as unset.
    #[must_use]
    pub fn is_defined(&self) -> bool {
        match self {
            Self::Null | Self::Unknown => false,
            Self::String(s) => !s.is_empty(),
            Self::Bool(_) | Self::Int(_) | Self::Set(_) => true,
        }
    }

    /// Returns true if this value is defined or still unknown.
    #[must_use]
    pub fn is_specified(&self) -> bool {
        matches!(self, Self::Unknown) || self.is_defined()
    }

    /// Returns true for the `Unknown` placeholder.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// The kind of a concrete value, `None` for `Null` and `Unknown`.
    #[must_use]
    pub const fn kind(&self) -> Option<ValueKind> {
        match self {
            Self::Null | Self::Unknown => None,
            Self::String(_) => Some(ValueKind::String),
            Self::Bool(_) => Some(ValueKind::Bool),
            Self::Int(_) => Some(ValueKind::Int),
            Self::Set(_) => Some(ValueKind::Set),
        }
    }

    /// Collapses the empty string into `Null`.
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            Self::String(s) if s.is_empty() => Self::Null,
            other => other,
        }
    }

    /// Converts a JSON value of the expected kind.
    ///
    /// JSON `null` and the empty string both decode to `Null`. Returns `None`
    /// when the JSON shape does not match `kind`.
    #[must_use]
    pub fn from_json(kind: ValueKind, json: &serde_json::Value) -> Option<Self> {
        use serde_json::Value as Json;

        match (kind, json) {
            (_, Json::Null) => Some(Self::Null),
            (ValueKind::String, Json::String(s)) => Some(Self::string(s.as_str()).normalized()),
            (ValueKind::Bool, Json::Bool(b)) => Some(Self::Bool(*b)),
            (ValueKind::Int, Json::Number(n)) => n.as_i64().map(Self::Int),
            (ValueKind::Set, Json::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<StringSet>>()
                .map(Self::Set),
            _ => None,
        }
    }

    /// Converts to the JSON wire form. `Unknown` maps to `null`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Self::Null | Self::Unknown => Json::Null,
            Self::String(s) => Json::String(s.clone()),
            Self::Bool(b) => Json::Bool(*b),
            Self::Int(i) => Json::from(*i),
            Self::Set(set) => Json::Array(set.iter().map(Json::from).collect()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null | Self::Unknown => serializer.serialize_none(),
            Self::String(s) => serializer.serialize_str(s),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Set(set) => set.serialize(serializer),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Unknown => f.write_str("(unknown)"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Set(set) => {
                f.write_str("[")?;
                for (i, item) in set.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item:?}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::string(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<StringSet> for Value {
    fn from(value: StringSet) -> Self {
        Self::Set(value)
    }
}
