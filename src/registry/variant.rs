//! Variant descriptors and the resolved [`Variant`] handle.

use serde_json::{Map, Value as Json};

use crate::model::{ConfigObject, ServerVersion, Value};

use super::{AttributeDef, Family, RegistryError};

/// Literal default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    /// String default.
    String(&'static str),
    /// Boolean default.
    Bool(bool),
    /// Integer default.
    Int(i64),
}

impl Literal {
    /// Converts to an attribute value.
    #[must_use]
    pub fn to_value(self) -> Value {
        match self {
            Self::String(s) => Value::string(s),
            Self::Bool(b) => Value::Bool(b),
            Self::Int(i) => Value::Int(i),
        }
    }
}

/// A default injected when the caller leaves an attribute unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultValue {
    /// Attribute name.
    pub attribute: &'static str,
    /// Value to inject.
    pub value: Literal,
    /// Oldest server version this default applies to.
    ///
    /// When several entries exist for one attribute, the newest one the
    /// server satisfies wins; when none qualifies nothing is injected.
    pub since: Option<ServerVersion>,
}

impl DefaultValue {
    /// A default that applies on every supported version.
    #[must_use]
    pub const fn always(attribute: &'static str, value: Literal) -> Self {
        Self {
            attribute,
            value,
            since: None,
        }
    }

    /// A default that applies from `version` onwards.
    #[must_use]
    pub const fn since(attribute: &'static str, value: Literal, version: ServerVersion) -> Self {
        Self {
            attribute,
            value,
            since: Some(version),
        }
    }
}

/// Cross-attribute constraint checked before any remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// If any of these is set, all of them must be.
    Together(&'static [&'static str]),
    /// At most one of these may be set.
    Exclusive(&'static [&'static str]),
    /// If the first is set, the second must be.
    Implies(&'static str, &'static str),
}

/// Static metadata for one variant of a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantDescriptor {
    /// Variant tag, e.g. `file-based`.
    pub tag: &'static str,
    /// Attributes required on creation, on top of the family's common ones.
    pub required: &'static [&'static str],
    /// Attributes only this variant may set.
    pub optional: &'static [&'static str],
    /// Defaults for optional attributes.
    pub defaults: &'static [DefaultValue],
    /// Cross-attribute rules.
    pub rules: &'static [Rule],
    /// Server-intrinsic singleton: can only be adopted.
    pub adopt_only: bool,
}

impl VariantDescriptor {
    /// A variant with no extra attributes.
    #[must_use]
    pub const fn new(tag: &'static str) -> Self {
        Self {
            tag,
            required: &[],
            optional: &[],
            defaults: &[],
            rules: &[],
            adopt_only: false,
        }
    }
}

/// A variant resolved within its family.
///
/// This is the handle the resolver, the codec and the driver work with.
#[derive(Debug, Clone, Copy)]
pub struct Variant<'a> {
    family: &'a Family,
    descriptor: &'a VariantDescriptor,
}

impl<'a> Variant<'a> {
    pub(super) const fn new(family: &'a Family, descriptor: &'a VariantDescriptor) -> Self {
        Self { family, descriptor }
    }

    /// The variant tag.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        self.descriptor.tag
    }

    /// The owning family.
    #[must_use]
    pub const fn family(&self) -> &'a Family {
        self.family
    }

    /// The static descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &'a VariantDescriptor {
        self.descriptor
    }

    /// Whether this variant can only be adopted.
    #[must_use]
    pub const fn is_adopt_only(&self) -> bool {
        self.descriptor.adopt_only
    }

    /// Schema URN identifying this variant on the wire.
    #[must_use]
    pub fn schema(&self) -> String {
        format!("{}:{}", self.family.schema_prefix(), self.tag())
    }

    /// Returns true if `name` is meaningful for this variant.
    #[must_use]
    pub fn is_legal(&self, name: &str) -> bool {
        [
            self.family.common_required,
            self.family.common_optional,
            self.descriptor.required,
            self.descriptor.optional,
        ]
        .iter()
        .any(|names| names.contains(&name))
    }

    /// Returns true if `name` must be set on creation.
    #[must_use]
    pub fn is_required(&self, name: &str) -> bool {
        self.family.common_required.contains(&name) || self.descriptor.required.contains(&name)
    }

    /// Legal attributes in the family's canonical order.
    pub fn legal_attributes(self) -> impl Iterator<Item = &'a AttributeDef> + 'a {
        self.family
            .attributes
            .iter()
            .filter(move |attr| self.is_legal(attr.name))
    }

    /// Required attribute names.
    pub fn required_attributes(self) -> impl Iterator<Item = &'static str> + 'a {
        self.family
            .common_required
            .iter()
            .chain(self.descriptor.required)
            .copied()
    }

    /// The default for `name` on `version`, if any.
    #[must_use]
    pub fn default_for(&self, name: &str, version: ServerVersion) -> Option<Value> {
        self.descriptor
            .defaults
            .iter()
            .filter(|d| d.attribute == name)
            .filter(|d| d.since.is_none_or(|minimum| version.at_least(minimum)))
            .max_by_key(|d| d.since)
            .map(|d| d.value.to_value())
    }

    /// Cross-attribute rules.
    #[must_use]
    pub const fn rules(&self) -> &'static [Rule] {
        self.descriptor.rules
    }

    /// Builds the minimal remote "add" payload.
    ///
    /// Contains the schema, the id and every legal attribute with a defined
    /// value. Required attributes are expected to be present already.
    #[must_use]
    pub fn build_create_request(&self, object: &ConfigObject) -> Json {
        let mut body = Map::new();
        body.insert("schemas".to_string(), Json::from(vec![self.schema()]));
        body.insert("id".to_string(), Json::from(object.id.as_str()));

        for attr in self.legal_attributes() {
            let value = object.get(attr.name);
            if value.is_defined() {
                body.insert(attr.wire_name(), value.to_json());
            }
        }

        Json::Object(body)
    }

    /// Decodes a store response into a [`ConfigObject`] tagged with this
    /// variant.
    ///
    /// Only legal attributes are read; absent and null fields become
    /// [`Value::Null`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the response names another variant, lacks
    /// an id, or carries an attribute of the wrong JSON type.
    pub fn decode(&self, response: &Json) -> Result<ConfigObject, RegistryError> {
        let fields = response
            .as_object()
            .ok_or_else(|| self.malformed("expected a JSON object"))?;

        let schema = self.family.schema_of(response)?;
        if schema != self.schema() {
            return Err(RegistryError::SchemaMismatch {
                family: self.family.name,
                expected: self.tag(),
                schema,
            });
        }

        let id = fields
            .get("id")
            .and_then(Json::as_str)
            .ok_or_else(|| self.malformed("missing 'id'"))?;

        let mut object = ConfigObject::new(id, self.tag());
        for attr in self.legal_attributes() {
            let raw = fields.get(&attr.wire_name()).unwrap_or(&Json::Null);
            let value = Value::from_json(attr.kind, raw).ok_or(RegistryError::WrongKind {
                attribute: attr.name,
                expected: attr.kind,
            })?;
            object.set(attr.name, value);
        }

        Ok(object)
    }

    /// Copy of `object` with obscured values replaced by `***`.
    #[must_use]
    pub fn redact(&self, object: &ConfigObject) -> ConfigObject {
        let mut redacted = object.clone();
        for attr in self.family.attributes.iter().filter(|a| a.sensitive) {
            if redacted.is_defined(attr.name) {
                redacted.set(attr.name, "***");
            }
        }
        redacted
    }

    fn malformed(&self, reason: &str) -> RegistryError {
        RegistryError::MalformedResponse {
            family: self.family.name,
            reason: reason.to_string(),
        }
    }
}
