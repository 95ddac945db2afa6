//! Variant registry for configuration object families.
//!
//! This module provides:
//! - Typed attribute identifiers ([`AttributeDef`])
//! - Per-variant metadata ([`VariantDescriptor`], [`DefaultValue`], [`Rule`])
//! - Resolved variant handles with constructor and decoder ([`Variant`])
//! - Family tables ([`Family`]) and the lookup entry point ([`Registry`])
//!
//! Families are closed: the only way to add a variant is to add a
//! descriptor to the family's table.

mod attribute;
pub mod cipher_stream_provider;
mod error;
pub mod uncached_attribute_criteria;
mod variant;

#[cfg(test)]
mod registry_tests;

pub use attribute::AttributeDef;
pub use error::RegistryError;
pub use variant::{DefaultValue, Literal, Rule, Variant, VariantDescriptor};

use serde_json::Value as Json;

use crate::model::ConfigObject;

/// URN prefix shared by every configuration schema.
pub const SCHEMA_PREFIX: &str = "urn:pingidentity:schemas:configuration:2.0";

/// A polymorphic family of configuration objects.
#[derive(Debug)]
pub struct Family {
    /// Family name, e.g. `cipher-stream-provider`.
    pub name: &'static str,
    /// Config API collection path segment.
    pub endpoint: &'static str,
    /// Every attribute of the family, in canonical order.
    pub attributes: &'static [AttributeDef],
    /// Attributes every variant requires.
    pub common_required: &'static [&'static str],
    /// Attributes every variant may set.
    pub common_optional: &'static [&'static str],
    /// The closed set of variants.
    pub variants: &'static [VariantDescriptor],
}

impl Family {
    /// Resolves a variant by tag.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownVariant`] for tags outside the family.
    pub fn variant(&self, tag: &str) -> Result<Variant<'_>, RegistryError> {
        self.variants
            .iter()
            .find(|v| v.tag == tag)
            .map(|descriptor| Variant::new(self, descriptor))
            .ok_or_else(|| RegistryError::UnknownVariant {
                family: self.name,
                tag: tag.to_string(),
                known: self.tags().collect::<Vec<_>>().join(", "),
            })
    }

    /// Variant tags in declaration order.
    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.variants.iter().map(|v| v.tag)
    }

    /// Looks up an attribute by internal name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Schema prefix for this family's variants.
    #[must_use]
    pub fn schema_prefix(&self) -> String {
        format!("{SCHEMA_PREFIX}:{}", self.name)
    }

    /// Decodes a response into whichever variant its schema names.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the schema is missing or unknown, or the
    /// body does not decode.
    pub fn decode(&self, response: &Json) -> Result<ConfigObject, RegistryError> {
        let schema = self.schema_of(response)?;
        let prefix = self.schema_prefix();
        let tag = schema
            .strip_prefix(prefix.as_str())
            .and_then(|rest| rest.strip_prefix(':'))
            .ok_or(RegistryError::MissingSchema { family: self.name })?;

        self.variant(tag)?.decode(response)
    }

    /// Finds the first `schemas` entry belonging to this family.
    pub(crate) fn schema_of(&self, response: &Json) -> Result<String, RegistryError> {
        let prefix = format!("{}:", self.schema_prefix());
        response
            .get("schemas")
            .and_then(Json::as_array)
            .into_iter()
            .flatten()
            .filter_map(Json::as_str)
            .find(|schema| schema.starts_with(&prefix))
            .map(str::to_string)
            .ok_or(RegistryError::MissingSchema { family: self.name })
    }
}

static BUILTIN: [&Family; 2] = [
    &cipher_stream_provider::FAMILY,
    &uncached_attribute_criteria::FAMILY,
];

/// The set of families the engine can reconcile.
#[derive(Debug, Clone, Copy)]
pub struct Registry {
    families: &'static [&'static Family],
}

impl Registry {
    /// Creates a registry over the given families.
    #[must_use]
    pub const fn new(families: &'static [&'static Family]) -> Self {
        Self { families }
    }

    /// The families shipped with this crate.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(&BUILTIN)
    }

    /// Looks up a family by name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownFamily`] for unregistered names.
    pub fn family(&self, name: &str) -> Result<&'static Family, RegistryError> {
        self.families
            .iter()
            .copied()
            .find(|f| f.name == name)
            .ok_or_else(|| RegistryError::UnknownFamily {
                name: name.to_string(),
                known: self.names().collect::<Vec<_>>().join(", "),
            })
    }

    /// Resolves a variant of a family.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the family or tag is unknown.
    pub fn resolve(&self, family: &str, tag: &str) -> Result<Variant<'static>, RegistryError> {
        self.family(family)?.variant(tag)
    }

    /// Registered families.
    pub fn families(&self) -> impl Iterator<Item = &'static Family> + '_ {
        self.families.iter().copied()
    }

    /// Registered family names.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.families.iter().map(|f| f.name)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}
