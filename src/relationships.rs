// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Relationship resolution
//!
//! Merges the relationships embedded in entities with the manually curated
//! ones into a single set keyed by `source|target|type`. Embedded edges are
//! inserted first and manual edges second, so a manual edge replaces an
//! embedded one with the same key. Keys are compared exactly, without case
//! or whitespace normalisation.

use crate::types::{Entity, ManualRelationship, ManualRelationshipsConfig, Relationship, RelationshipKey};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Insertion-ordered relationship set with last-write-wins per key
#[derive(Debug, Clone, Default)]
pub struct RelationshipSet {
    entries: Vec<Relationship>,
    index: HashMap<RelationshipKey, usize>,
}

impl RelationshipSet {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a relationship, returning the entry it replaced
    ///
    /// A replaced entry keeps its position in the set.
    pub fn insert(&mut self, relationship: Relationship) -> Option<Relationship> {
        let key = relationship.key();
        if let Some(&pos) = self.index.get(&key) {
            Some(std::mem::replace(&mut self.entries[pos], relationship))
        } else {
            self.index.insert(key, self.entries.len());
            self.entries.push(relationship);
            None
        }
    }

    /// Look up a relationship by key
    #[must_use]
    pub fn get(&self, key: &RelationshipKey) -> Option<&Relationship> {
        self.index.get(key).map(|&pos| &self.entries[pos])
    }

    /// Number of distinct keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Relationships in insertion order
    #[must_use]
    pub fn into_vec(self) -> Vec<Relationship> {
        self.entries
    }
}

/// Outcome of a resolution pass
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Deduplicated relationships in insertion order
    pub relationships: Vec<Relationship>,
    /// Number of inserts that replaced an existing key
    pub overwritten: usize,
    /// Manual entries rejected for missing identity fields
    pub skipped: usize,
}

/// Edges declared inside entity records
pub fn embedded_edges(entities: &[Entity]) -> impl Iterator<Item = Relationship> + '_ {
    entities.iter().flat_map(|entity| {
        entity
            .relationships
            .iter()
            .map(move |rel| Relationship::from_embedded(&entity.slug, rel))
    })
}

fn manual_edge(entry: &ManualRelationship, config: &ManualRelationshipsConfig) -> Relationship {
    let weight = entry
        .weight
        .or_else(|| config.types.get(&entry.rel_type).and_then(|t| t.default_weight))
        .unwrap_or(1.0);

    Relationship {
        source: entry.source.clone(),
        target: entry.target.clone(),
        rel_type: entry.rel_type.clone(),
        weight,
        description: entry.description.clone(),
        category: entry.category.clone(),
        is_manual: true,
        bidirectional: entry.bidirectional,
        metadata: entry.metadata.clone(),
    }
}

/// Edges declared in the manual document, with bidirectional entries mirrored
///
/// Returns the edges and the number of entries rejected, either for missing
/// source, target or type or because they could not be read at all.
#[must_use]
pub fn manual_edges(config: &ManualRelationshipsConfig) -> (Vec<Relationship>, usize) {
    let mut edges = Vec::with_capacity(config.relationships.len());
    let mut skipped = config.rejected;

    for (index, entry) in config.relationships.iter().enumerate() {
        let missing = entry.missing_fields();
        if !missing.is_empty() {
            warn!(
                "Skipping manual relationship {}: missing {}",
                index + 1,
                missing.join(", ")
            );
            skipped += 1;
            continue;
        }

        edges.push(manual_edge(entry, config));
        if entry.bidirectional {
            edges.push(manual_edge(&entry.reversed(), config));
        }
    }

    (edges, skipped)
}

/// Resolve the unified relationship set
#[must_use]
pub fn resolve(entities: &[Entity], manual: Option<&ManualRelationshipsConfig>) -> Resolution {
    let mut set = RelationshipSet::new();
    let mut overwritten = 0;

    let (manual, skipped) = manual.map(manual_edges).unwrap_or_default();

    for relationship in embedded_edges(entities).chain(manual) {
        let incoming_manual = relationship.is_manual;
        if let Some(previous) = set.insert(relationship) {
            overwritten += 1;
            debug!(
                key = %previous.key(),
                previous_manual = previous.is_manual,
                incoming_manual,
                "Relationship overwritten"
            );
        }
    }

    Resolution {
        relationships: set.into_vec(),
        overwritten,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EmbeddedRelationship, RelationshipType};

    fn entity_with(slug: &str, rels: &[(&str, &str, Option<f64>)]) -> Entity {
        let mut entity = Entity::new(slug, &slug.to_uppercase(), "parachain");
        entity.relationships = rels
            .iter()
            .map(|(target, rel_type, weight)| EmbeddedRelationship {
                target: (*target).into(),
                rel_type: (*rel_type).into(),
                weight: *weight,
            })
            .collect();
        entity
    }

    fn manual(source: &str, target: &str, rel_type: &str, weight: Option<f64>, bidirectional: bool) -> ManualRelationship {
        ManualRelationship {
            source: source.into(),
            target: target.into(),
            rel_type: rel_type.into(),
            weight,
            bidirectional,
            ..Default::default()
        }
    }

    #[test]
    fn test_embedded_weight_defaults_to_one() {
        let entities = vec![entity_with("a", &[("b", "uses", None)])];
        let resolution = resolve(&entities, None);
        assert_eq!(resolution.relationships.len(), 1);
        assert_eq!(resolution.relationships[0].weight, 1.0);
        assert!(!resolution.relationships[0].is_manual);
    }

    #[test]
    fn test_manual_overrides_embedded() {
        let entities = vec![
            entity_with("A", &[("B", "partners", Some(3.0))]),
            entity_with("B", &[]),
        ];
        let config = ManualRelationshipsConfig {
            relationships: vec![manual("A", "B", "partners", Some(5.0), false)],
            ..Default::default()
        };

        let resolution = resolve(&entities, Some(&config));
        assert_eq!(resolution.relationships.len(), 1);
        let edge = &resolution.relationships[0];
        assert_eq!((edge.source.as_str(), edge.target.as_str()), ("A", "B"));
        assert_eq!(edge.weight, 5.0);
        assert!(edge.is_manual);
        assert_eq!(resolution.overwritten, 1);
    }

    #[test]
    fn test_bidirectional_emits_mirror() {
        let config = ManualRelationshipsConfig {
            relationships: vec![manual("X", "Y", "integrates", Some(2.0), true)],
            ..Default::default()
        };

        let resolution = resolve(&[], Some(&config));
        assert_eq!(resolution.relationships.len(), 2);

        let forward = &resolution.relationships[0];
        let reverse = &resolution.relationships[1];
        assert_eq!((forward.source.as_str(), forward.target.as_str()), ("X", "Y"));
        assert!(forward.bidirectional);
        assert_eq!((reverse.source.as_str(), reverse.target.as_str()), ("Y", "X"));
        assert!(!reverse.bidirectional);
        assert!(reverse.is_manual);
        assert_eq!(reverse.weight, 2.0);
    }

    #[test]
    fn test_overwrite_keeps_first_position() {
        let entities = vec![entity_with("a", &[("b", "uses", None), ("c", "uses", None)])];
        let config = ManualRelationshipsConfig {
            relationships: vec![manual("a", "b", "uses", Some(9.0), false)],
            ..Default::default()
        };

        let resolution = resolve(&entities, Some(&config));
        assert_eq!(resolution.relationships[0].target, "b");
        assert_eq!(resolution.relationships[0].weight, 9.0);
        assert_eq!(resolution.relationships[1].target, "c");
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let entities = vec![
            entity_with("a", &[("b", "uses", None)]),
            entity_with("A", &[("b", "uses", None)]),
        ];
        assert_eq!(resolve(&entities, None).relationships.len(), 2);
    }

    #[test]
    fn test_malformed_manual_entries_are_skipped() {
        let config = ManualRelationshipsConfig {
            relationships: vec![
                manual("a", "", "uses", None, false),
                manual("a", "b", " ", None, true),
                manual("a", "b", "uses", None, false),
            ],
            ..Default::default()
        };

        let resolution = resolve(&[], Some(&config));
        assert_eq!(resolution.skipped, 2);
        assert_eq!(resolution.relationships.len(), 1);
    }

    #[test]
    fn test_manual_weight_falls_back_to_type_default() {
        let mut config = ManualRelationshipsConfig {
            relationships: vec![manual("a", "b", "funds", None, false)],
            ..Default::default()
        };
        config.types.insert(
            "funds".into(),
            RelationshipType {
                name: "Funds".into(),
                default_weight: Some(7.0),
                ..Default::default()
            },
        );

        let resolution = resolve(&[], Some(&config));
        assert_eq!(resolution.relationships[0].weight, 7.0);
    }

    #[test]
    fn test_set_lookup_by_key() {
        let mut set = RelationshipSet::new();
        let edge = Relationship::from_embedded(
            "a",
            &EmbeddedRelationship { target: "b".into(), rel_type: "uses".into(), weight: None },
        );
        let key = edge.key();
        assert!(set.insert(edge).is_none());
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(&key).map(|r| r.target.as_str()), Some("b"));
    }
}
