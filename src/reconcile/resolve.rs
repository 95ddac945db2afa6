//! Default injection and applicability nulling.

use crate::model::{ConfigObject, ServerVersion, Value};
use crate::registry::Variant;

/// Fills unset attributes that have a default for `version`.
///
/// Unset means `Null` or an empty string. `Unknown` is left alone: the
/// caller will supply a value later. Idempotent.
#[must_use]
pub fn apply_defaults(variant: Variant<'_>, object: &ConfigObject, version: ServerVersion) -> ConfigObject {
    let mut result = object.clone();

    for default in variant.descriptor().defaults {
        let current = result.get(default.attribute);
        if current.is_defined() || current.is_unknown() {
            continue;
        }
        if let Some(value) = variant.default_for(default.attribute, version) {
            result.set(default.attribute, value);
        }
    }

    result
}

/// Keeps stored values for defaulted attributes the caller left unset.
///
/// `plan` is the normalized desired object, `desired` the caller's form
/// and `state` the fetched remote object. A default only stands in for a
/// value that is unset on both sides; a value already on the server wins.
#[must_use]
pub fn keep_stored(
    variant: Variant<'_>,
    plan: &ConfigObject,
    desired: &ConfigObject,
    state: &ConfigObject,
) -> ConfigObject {
    let mut result = plan.clone();

    for default in variant.descriptor().defaults {
        let requested = desired.get(default.attribute).clone().normalized();
        if requested.is_defined() || requested.is_unknown() {
            continue;
        }
        let stored = state.get(default.attribute);
        if stored.is_defined() {
            result.set(default.attribute, stored.clone());
        }
    }

    result
}

/// Forces every attribute the variant does not own to `Null`.
///
/// Covers both attributes present on `object` and every other attribute
/// of the family, so the result always carries an explicit `Null` for
/// them. Idempotent.
#[must_use]
pub fn null_not_applicable(variant: Variant<'_>, object: &ConfigObject) -> ConfigObject {
    let mut result = object.clone();

    for value in result
        .attributes
        .iter_mut()
        .filter(|(name, _)| !variant.is_legal(name))
        .map(|(_, value)| value)
    {
        *value = Value::Null;
    }

    for attr in variant.family().attributes {
        if !variant.is_legal(attr.name) {
            result.set(attr.name, Value::Null);
        }
    }

    result
}

/// Empty strings become `Null`; everything else is unchanged.
#[must_use]
pub fn normalize_empty(object: &ConfigObject) -> ConfigObject {
    let mut result = object.clone();
    for value in result.attributes.values_mut() {
        *value = std::mem::take(value).normalized();
    }
    result
}

/// The full per-pass normalization: empty strings, defaults, applicability.
#[must_use]
pub fn normalize(variant: Variant<'_>, object: &ConfigObject, version: ServerVersion) -> ConfigObject {
    let cleaned = normalize_empty(object);
    let defaulted = apply_defaults(variant, &cleaned, version);
    null_not_applicable(variant, &defaulted)
}

/// Copies obscured attribute values from `source` onto `target`.
///
/// Only values that are defined on `source` are copied.
pub fn overlay_obscured(variant: Variant<'_>, target: &mut ConfigObject, source: &ConfigObject) {
    for attr in variant.legal_attributes().filter(|attr| attr.sensitive) {
        let value = source.get(attr.name);
        if value.is_defined() {
            target.set(attr.name, value.clone());
        }
    }
}
