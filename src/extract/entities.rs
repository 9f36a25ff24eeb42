//! Bucketing of analyzed entities by type label.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Entity labels reported by the interpret endpoint.
pub const WANTED_ENTITY_TYPES: [&str; 3] = ["ORGANIZATION", "PERSON", "ADDRESS"];

/// A named entity tagged with its type label (e.g. `PERSON`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_type: String,
    pub name: String,
}

impl Entity {
    pub fn new(entity_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            name: name.into(),
        }
    }
}

/// Entity names grouped by label. Serializes as a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EntityBucket(BTreeMap<String, Vec<String>>);

impl EntityBucket {
    /// Names collected for `label`, if the label was requested.
    pub fn get(&self, label: &str) -> Option<&[String]> {
        self.0.get(label).map(Vec::as_slice)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Total number of names across all labels.
    pub fn total(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

/// Group entity names under the wanted labels.
///
/// Every wanted label is present in the result, possibly empty. Names keep
/// their input order and duplicates are preserved. Entities with any other
/// label are ignored.
pub fn classify(entities: &[Entity], wanted: &[&str]) -> EntityBucket {
    let mut buckets: BTreeMap<String, Vec<String>> = wanted
        .iter()
        .map(|label| (label.to_string(), Vec::new()))
        .collect();

    for entity in entities {
        if let Some(names) = buckets.get_mut(&entity.entity_type) {
            names.push(entity.name.clone());
        }
    }

    EntityBucket(buckets)
}
