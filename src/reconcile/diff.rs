//! Attribute operation codec.
//!
//! Pure functions that turn a (plan, state) pair into the minimal set of
//! change directives.

use crate::model::{ConfigObject, Operation, Value};
use crate::registry::Variant;

/// Computes the operation for one attribute, if any.
///
/// - Scalars: `set` when the plan is defined and differs from the state.
///   An empty plan string counts as unset.
/// - Sets: `add` for members only in the plan, otherwise `remove` for
///   members only in the state. When both directions differ this returns
///   the `add`; use [`diff_attribute_into`] to collect both.
/// - `Unknown` or unset plan values never produce an operation.
#[must_use]
pub fn diff_attribute(plan: &Value, state: &Value, wire_name: &str) -> Option<Operation> {
    let mut ops = Vec::with_capacity(2);
    diff_attribute_into(&mut ops, plan, state, wire_name);
    ops.into_iter().next()
}

/// Appends every operation needed for one attribute to `ops`.
///
/// For sets whose members differ in both directions, pushes `add` then
/// `remove`.
pub fn diff_attribute_into(ops: &mut Vec<Operation>, plan: &Value, state: &Value, wire_name: &str) {
    if !plan.is_defined() {
        return;
    }

    match (plan, state) {
        (Value::Set(planned), Value::Set(current)) => {
            let added = planned.difference(current);
            let removed = current.difference(planned);
            if !added.is_empty() {
                ops.push(Operation::add(wire_name, Value::Set(added)));
            }
            if !removed.is_empty() {
                ops.push(Operation::remove(wire_name, Value::Set(removed)));
            }
        }
        (Value::Set(planned), _) => {
            if !planned.is_empty() {
                ops.push(Operation::add(wire_name, plan.clone()));
            }
        }
        _ if plan != state => ops.push(Operation::set(wire_name, plan.clone())),
        _ => {}
    }
}

/// Diffs every legal attribute of `variant`, in canonical order.
///
/// The id is never diffed. Operations on obscured attributes are flagged
/// so they are masked when displayed.
#[must_use]
pub fn diff_objects(variant: Variant<'_>, plan: &ConfigObject, state: &ConfigObject) -> Vec<Operation> {
    let mut ops = Vec::new();

    for attr in variant.legal_attributes() {
        let start = ops.len();
        diff_attribute_into(
            &mut ops,
            plan.get(attr.name),
            state.get(attr.name),
            &attr.wire_name(),
        );
        if attr.sensitive {
            for op in &mut ops[start..] {
                op.sensitive = true;
            }
        }
    }

    ops
}
