//! Saved obscured values, keyed by family and id.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::model::{ConfigObject, Value};
use crate::registry::Family;

/// The obscured values last submitted for one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Family name.
    pub family: String,
    /// Object id.
    pub id: String,
    /// Variant tag the values were submitted under.
    pub variant: String,
    /// Internal attribute name to wire value.
    pub obscured: BTreeMap<String, Json>,
}

/// Every saved snapshot, in family then id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshots {
    entries: BTreeMap<(String, String), Snapshot>,
}

impl Snapshots {
    /// Builds the set from saved entries; later duplicates win.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = Snapshot>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|s| ((s.family.clone(), s.id.clone()), s))
                .collect(),
        }
    }

    /// Iterates the snapshots in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.entries.values()
    }

    /// Returns the snapshot for one object.
    #[must_use]
    pub fn get(&self, family: &str, id: &str) -> Option<&Snapshot> {
        self.entries.get(&(family.to_string(), id.to_string()))
    }

    /// Number of objects with saved values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rebuilds the previous-pass object for `id` from its saved values.
    ///
    /// Values whose attribute is unknown to `family`, or whose JSON no
    /// longer matches the attribute kind, are dropped.
    #[must_use]
    pub fn previous(&self, family: &Family, id: &str) -> Option<ConfigObject> {
        let snapshot = self.get(family.name, id)?;
        let mut object = ConfigObject::new(id, snapshot.variant.as_str());

        for (name, json) in &snapshot.obscured {
            let Some(attr) = family.attribute(name) else {
                tracing::debug!(family = family.name, id, "Dropping saved value for unknown attribute {name}");
                continue;
            };
            match Value::from_json(attr.kind, json) {
                Some(value) => object.set(name.as_str(), value),
                None => tracing::debug!(family = family.name, id, "Dropping saved value for {name}"),
            }
        }

        Some(object)
    }

    /// Records the obscured values of a confirmed object.
    ///
    /// An object with no defined obscured value leaves no entry behind.
    pub fn record(&mut self, family: &Family, object: &ConfigObject) {
        let obscured: BTreeMap<String, Json> = family
            .attributes
            .iter()
            .filter(|attr| attr.sensitive && object.is_defined(attr.name))
            .map(|attr| (attr.name.to_string(), object.get(attr.name).to_json()))
            .collect();

        let key = (family.name.to_string(), object.id.clone());
        if obscured.is_empty() {
            self.entries.remove(&key);
            return;
        }

        self.entries.insert(
            key,
            Snapshot {
                family: family.name.to_string(),
                id: object.id.clone(),
                variant: object.variant.clone(),
                obscured,
            },
        );
    }

    /// Drops the entry for one object. Returns true if one existed.
    pub fn forget(&mut self, family: &str, id: &str) -> bool {
        self.entries
            .remove(&(family.to_string(), id.to_string()))
            .is_some()
    }
}
