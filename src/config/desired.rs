//! Desired-model file parsing.
//!
//! A desired model is a TOML file of `[[object]]` entries:
//!
//! ```toml
//! [[object]]
//! family = "cipher-stream-provider"
//! id = "Passphrase File"
//! variant = "file-based"
//!
//! [object.attributes]
//! enabled = true
//! password-file = "config/passphrase"
//! ```
//!
//! Attribute names may be written in wire (kebab-case) or internal
//! (snake_case) form.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::model::{ConfigObject, DesiredObject, Mode, Value, attribute_name};

use super::ConfigError;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFile {
    #[serde(default, rename = "object")]
    objects: Vec<RawObject>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawObject {
    family: String,
    id: String,
    variant: String,
    #[serde(default)]
    mode: Mode,
    #[serde(default)]
    attributes: toml::Table,
}

/// The parsed contents of a desired-model file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredFile {
    /// Objects in declaration order.
    pub objects: Vec<DesiredObject>,
}

impl DesiredFile {
    /// Loads a desired model from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses a desired model from a TOML string.
    ///
    /// Registry checks (known family, variant, attributes) are left to the
    /// reconciler; this only checks shape.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid, an attribute has a type
    /// with no attribute kind, or an object is declared twice.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let raw: RawFile = toml::from_str(content)?;

        let mut seen = HashSet::new();
        let mut objects = Vec::with_capacity(raw.objects.len());

        for entry in raw.objects {
            if !seen.insert((entry.family.clone(), entry.id.clone())) {
                return Err(ConfigError::DuplicateObject {
                    family: entry.family,
                    id: entry.id,
                });
            }

            let mut object = ConfigObject::new(entry.id, entry.variant);
            for (name, raw_value) in &entry.attributes {
                let value = convert(raw_value).map_err(|reason| ConfigError::InvalidAttribute {
                    id: object.id.clone(),
                    attribute: name.clone(),
                    reason,
                })?;
                object.set(attribute_name(name), value);
            }

            objects.push(DesiredObject {
                family: entry.family,
                mode: entry.mode,
                object,
                previous: None,
            });
        }

        Ok(Self { objects })
    }

    /// Number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if the file declares no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

fn convert(raw: &toml::Value) -> Result<Value, &'static str> {
    match raw {
        toml::Value::String(s) => Ok(Value::string(s.as_str())),
        toml::Value::Boolean(b) => Ok(Value::Bool(*b)),
        toml::Value::Integer(i) => Ok(Value::Int(*i)),
        toml::Value::Array(items) => items
            .iter()
            .map(toml::Value::as_str)
            .collect::<Option<Vec<_>>>()
            .map(Value::set)
            .ok_or("must be an array of strings"),
        toml::Value::Float(_) => Err("must not be a float"),
        toml::Value::Datetime(_) => Err("must not be a date"),
        toml::Value::Table(_) => Err("must not be a table"),
    }
}
