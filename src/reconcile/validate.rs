//! Plan-time validation and version gating.
//!
//! Everything here runs before the store is contacted, so a caller mistake
//! never results in a partial remote mutation.

use crate::model::{ConfigObject, Mode, ServerVersion};
use crate::registry::{Rule, Variant};

use super::error::{ReconcileError, ValidationError, ValidationErrors, VersionRequirement};

/// Checks a desired object against its variant.
///
/// All violations are collected; nothing fails fast. Required attributes
/// are only enforced in [`Mode::Create`], since adopted objects already
/// exist. A required attribute with a default for `version` counts as set.
///
/// # Errors
///
/// Returns every violation found.
pub fn validate(
    variant: Variant<'_>,
    object: &ConfigObject,
    mode: Mode,
    version: ServerVersion,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if object.id.trim().is_empty() {
        errors.push(ValidationError::Missing {
            attribute: "id".to_string(),
            variant: variant.tag(),
        });
    }

    if mode == Mode::Create && variant.is_adopt_only() {
        errors.push(ValidationError::AdoptOnly {
            variant: variant.tag(),
        });
    }

    check_attributes(variant, object, &mut errors);

    if mode == Mode::Create {
        for name in variant.required_attributes() {
            let present =
                object.get(name).is_specified() || variant.default_for(name, version).is_some();
            if !present {
                errors.push(ValidationError::Missing {
                    attribute: name.to_string(),
                    variant: variant.tag(),
                });
            }
        }
    }

    for rule in variant.rules() {
        check_rule(*rule, object, &mut errors);
    }

    errors.into_result()
}

fn check_attributes(variant: Variant<'_>, object: &ConfigObject, errors: &mut ValidationErrors) {
    let family = variant.family();

    for (name, value) in &object.attributes {
        if !value.is_specified() {
            continue;
        }

        let Some(attr) = family.attribute(name) else {
            errors.push(ValidationError::UnknownAttribute {
                attribute: name.clone(),
                family: family.name,
            });
            continue;
        };

        if !variant.is_legal(name) {
            errors.push(ValidationError::NotApplicable {
                attribute: name.clone(),
                variant: variant.tag(),
            });
            continue;
        }

        if let Some(found) = value.kind().filter(|kind| *kind != attr.kind) {
            errors.push(ValidationError::WrongKind {
                attribute: name.clone(),
                expected: attr.kind,
                found,
            });
        }
    }
}

fn check_rule(rule: Rule, object: &ConfigObject, errors: &mut ValidationErrors) {
    match rule {
        Rule::Together(group) => {
            let Some(trigger) = group.iter().find(|name| object.is_defined(name)) else {
                return;
            };
            for name in group.iter().filter(|name| !object.get(name).is_specified()) {
                errors.push(ValidationError::Requires {
                    attribute: (*name).to_string(),
                    because: (*trigger).to_string(),
                });
            }
        }
        Rule::Exclusive(group) => {
            let set: Vec<String> = group
                .iter()
                .filter(|name| object.is_defined(name))
                .map(|name| (*name).to_string())
                .collect();
            if set.len() > 1 {
                errors.push(ValidationError::Exclusive { attributes: set });
            }
        }
        Rule::Implies(trigger, needed) => {
            if object.is_defined(trigger) && !object.get(needed).is_specified() {
                errors.push(ValidationError::Requires {
                    attribute: needed.to_string(),
                    because: trigger.to_string(),
                });
            }
        }
    }
}

/// Rejects attributes the configured server version does not know.
///
/// Only attributes the caller actually defined are checked. Defaults are
/// version-gated separately and never trip this check.
///
/// # Errors
///
/// Returns [`ReconcileError::UnsupportedOnVersion`] listing every offending
/// attribute.
pub fn check_version(
    variant: Variant<'_>,
    object: &ConfigObject,
    version: ServerVersion,
) -> Result<(), ReconcileError> {
    let attributes: Vec<VersionRequirement> = variant
        .legal_attributes()
        .filter(|attr| object.is_defined(attr.name))
        .filter_map(|attr| {
            attr.since
                .filter(|minimum| !version.at_least(*minimum))
                .map(|minimum| VersionRequirement {
                    attribute: attr.name,
                    minimum,
                })
        })
        .collect();

    if attributes.is_empty() {
        Ok(())
    } else {
        Err(ReconcileError::UnsupportedOnVersion {
            configured: version,
            attributes,
        })
    }
}
