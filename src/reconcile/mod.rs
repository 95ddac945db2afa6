//! Reconciliation engine.
//!
//! This module provides:
//! - The attribute operation codec ([`diff_attribute`], [`diff_objects`])
//! - Default injection and applicability nulling ([`apply_defaults`],
//!   [`keep_stored`], [`null_not_applicable`], [`normalize`])
//! - Plan-time validation ([`validate`], [`check_version`])
//! - The lifecycle driver ([`Reconciler`])
//! - Error types ([`ReconcileError`], [`ValidationError`])

mod diff;
mod driver;
mod error;
mod resolve;
mod validate;

#[cfg(test)]
mod validate_tests;

pub use diff::{diff_attribute, diff_attribute_into, diff_objects};
pub use driver::{Deletion, Phase, Plan, PlannedAction, Prepared, Reconciled, Reconciler};
pub use error::{ReconcileError, ValidationError, ValidationErrors, VersionRequirement};
pub use resolve::{
    apply_defaults, keep_stored, normalize, normalize_empty, null_not_applicable, overlay_obscured,
};
pub use validate::{check_version, validate};
