// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Invariant tests for relationship resolution and configuration merging
//!
//! These tests verify critical invariants:
//! 1. Resolution determinism - one relationship per key, stable order
//! 2. Manual precedence - curated edges win over embedded ones
//! 3. Configuration merging - partial documents keep the defaults

use ecoview::graph::RelationshipGraph;
use ecoview::loader;
use ecoview::relationships::resolve;
use ecoview::render::{self, RenderConfig, ViewType};
use ecoview::source::MemorySource;
use ecoview::types::{EmbeddedRelationship, Entity, ManualRelationship, ManualRelationshipsConfig};
use proptest::prelude::*;
use std::collections::HashSet;

// =============================================================================
// Test Helpers
// =============================================================================

const SLUGS: [&str; 4] = ["a", "b", "c", "d"];
const TYPES: [&str; 3] = ["uses", "partners", "integrates"];

fn make_entity(slug: &str, rels: &[(usize, usize, Option<u8>)]) -> Entity {
    let mut entity = Entity::new(slug, &slug.to_uppercase(), "parachain");
    entity.relationships = rels
        .iter()
        .map(|&(target, rel_type, weight)| EmbeddedRelationship {
            target: SLUGS[target].into(),
            rel_type: TYPES[rel_type].into(),
            weight: weight.map(f64::from),
        })
        .collect();
    entity
}

fn make_manual(source: usize, target: usize, rel_type: usize, weight: u8, bidirectional: bool) -> ManualRelationship {
    ManualRelationship {
        source: SLUGS[source].into(),
        target: SLUGS[target].into(),
        rel_type: TYPES[rel_type].into(),
        weight: Some(f64::from(weight)),
        bidirectional,
        ..Default::default()
    }
}

fn embedded_strategy() -> impl Strategy<Value = Vec<(usize, usize, Option<u8>)>> {
    prop::collection::vec((0..SLUGS.len(), 0..TYPES.len(), prop::option::of(1u8..10)), 0..6)
}

fn manual_strategy() -> impl Strategy<Value = Vec<(usize, usize, usize, u8, bool)>> {
    prop::collection::vec(
        (0..SLUGS.len(), 0..SLUGS.len(), 0..TYPES.len(), 1u8..10, any::<bool>()),
        0..8,
    )
}

fn build_inputs(
    embedded: &[Vec<(usize, usize, Option<u8>)>],
    manual: &[(usize, usize, usize, u8, bool)],
) -> (Vec<Entity>, ManualRelationshipsConfig) {
    let entities = SLUGS
        .iter()
        .zip(embedded)
        .map(|(slug, rels)| make_entity(slug, rels))
        .collect();
    let config = ManualRelationshipsConfig {
        relationships: manual
            .iter()
            .map(|&(s, t, r, w, b)| make_manual(s, t, r, w, b))
            .collect(),
        ..Default::default()
    };
    (entities, config)
}

// =============================================================================
// Resolution Invariants
// =============================================================================

proptest! {
    #[test]
    fn prop_keys_are_unique(
        embedded in prop::collection::vec(embedded_strategy(), SLUGS.len()),
        manual in manual_strategy(),
    ) {
        let (entities, config) = build_inputs(&embedded, &manual);
        let resolution = resolve(&entities, Some(&config));

        let keys: HashSet<_> = resolution.relationships.iter().map(|r| r.key()).collect();
        prop_assert_eq!(keys.len(), resolution.relationships.len());
    }

    #[test]
    fn prop_resolution_is_deterministic(
        embedded in prop::collection::vec(embedded_strategy(), SLUGS.len()),
        manual in manual_strategy(),
    ) {
        let (entities, config) = build_inputs(&embedded, &manual);
        let first = resolve(&entities, Some(&config));
        let second = resolve(&entities, Some(&config));
        prop_assert_eq!(first.relationships, second.relationships);
        prop_assert_eq!(first.overwritten, second.overwritten);
    }

    #[test]
    fn prop_manual_keys_are_manual(
        embedded in prop::collection::vec(embedded_strategy(), SLUGS.len()),
        manual in manual_strategy(),
    ) {
        let (entities, config) = build_inputs(&embedded, &manual);
        let resolution = resolve(&entities, Some(&config));

        for rel in &config.relationships {
            let mut expected = vec![(rel.source.clone(), rel.target.clone())];
            if rel.bidirectional {
                expected.push((rel.target.clone(), rel.source.clone()));
            }
            for (source, target) in expected {
                let found = resolution
                    .relationships
                    .iter()
                    .find(|r| r.source == source && r.target == target && r.rel_type == rel.rel_type);
                prop_assert!(found.is_some());
                prop_assert!(found.is_some_and(|r| r.is_manual));
            }
        }
    }

    #[test]
    fn prop_counts_balance(
        embedded in prop::collection::vec(embedded_strategy(), SLUGS.len()),
        manual in manual_strategy(),
    ) {
        let (entities, config) = build_inputs(&embedded, &manual);
        let resolution = resolve(&entities, Some(&config));

        let embedded_total: usize = entities.iter().map(|e| e.relationships.len()).sum();
        let manual_total: usize = config
            .relationships
            .iter()
            .map(|r| if r.bidirectional { 2 } else { 1 })
            .sum();
        prop_assert_eq!(
            resolution.relationships.len() + resolution.overwritten,
            embedded_total + manual_total
        );
    }

    #[test]
    fn prop_physics_overlay_touches_one_key(value in -10.0f64..10.0) {
        let text = format!("graph:\n  physics:\n    gravity: {value}\n");
        let config = render::resolve_document(&text).unwrap();
        let defaults = RenderConfig::default();
        let graph = config.graph.as_ref().unwrap();
        let default_graph = defaults.graph.as_ref().unwrap();

        prop_assert_eq!(graph.physics.gravity, Some(value));
        prop_assert_eq!(graph.physics.link_distance, default_graph.physics.link_distance);
        prop_assert_eq!(graph.physics.charge_strength, default_graph.physics.charge_strength);
        prop_assert_eq!(&graph.nodes, &default_graph.nodes);
        prop_assert_eq!(&config.table, &defaults.table);
    }
}

// =============================================================================
// End-to-End Scenarios
// =============================================================================

#[test]
fn test_manual_overwrites_embedded() {
    let mut a = Entity::new("A", "Alpha", "parachain");
    a.relationships.push(EmbeddedRelationship {
        target: "B".into(),
        rel_type: "partners".into(),
        weight: Some(3.0),
    });
    let b = Entity::new("B", "Beta", "parachain");
    let config = ManualRelationshipsConfig {
        relationships: vec![ManualRelationship {
            source: "A".into(),
            target: "B".into(),
            rel_type: "partners".into(),
            weight: Some(5.0),
            ..Default::default()
        }],
        ..Default::default()
    };

    let resolution = resolve(&[a, b], Some(&config));
    assert_eq!(resolution.relationships.len(), 1);
    let rel = &resolution.relationships[0];
    assert_eq!((rel.source.as_str(), rel.target.as_str()), ("A", "B"));
    assert_eq!(rel.rel_type, "partners");
    assert_eq!(rel.weight, 5.0);
    assert!(rel.is_manual);
    assert_eq!(resolution.overwritten, 1);
}

#[test]
fn test_bidirectional_manual_relationship() {
    let config = ManualRelationshipsConfig {
        relationships: vec![ManualRelationship {
            source: "X".into(),
            target: "Y".into(),
            rel_type: "integrates".into(),
            weight: Some(2.0),
            bidirectional: true,
            ..Default::default()
        }],
        ..Default::default()
    };

    let resolution = resolve(&[], Some(&config));
    assert_eq!(resolution.relationships.len(), 2);

    let forward = &resolution.relationships[0];
    assert_eq!((forward.source.as_str(), forward.target.as_str()), ("X", "Y"));
    assert!(forward.is_manual && forward.bidirectional);

    let mirror = &resolution.relationships[1];
    assert_eq!((mirror.source.as_str(), mirror.target.as_str()), ("Y", "X"));
    assert!(mirror.is_manual && !mirror.bidirectional);
    assert_eq!(mirror.weight, 2.0);
}

#[tokio::test]
async fn test_pipeline_from_documents_to_graph() {
    let source = MemorySource::new()
        .with(
            "data/parachains.yml",
            r"
- slug: moonbeam
  name: Moonbeam
  type: parachain
  metrics: {stars: 900}
  relationships:
    - {target: acala, type: partners, weight: 3}
- slug: acala
  name: Acala
  type: parachain
- name: Missing slug
  type: parachain
",
        )
        .with(
            "data/dapps.yml",
            "dapps:\n  - {slug: stellaswap, name: StellaSwap, type: dapp}\n",
        )
        .with(
            "relationships.yml",
            r"
relationships:
  - {source: stellaswap, target: moonbeam, type: deployed_on, category: technical}
categories:
  technical: {name: Technical, color: '#123456', style: dashed}
",
        )
        .with("render.yaml", "viewType: graph\nentityTypes: [parachain, dapp]\n");

    let layout = loader::ResourceLayout::default();
    let dataset = loader::load_dataset(&source, &layout).await.unwrap();
    assert_eq!(dataset.metadata.total_entities, 3);
    assert_eq!(dataset.entity_types, vec!["parachain", "dapp"]);
    assert_eq!(dataset.relationships.len(), 2);
    assert_eq!(dataset.metadata.manual_relationships, 1);

    let config = render::load_render_config(&source, &layout.render_config).await;
    assert_eq!(config.view_type, ViewType::Graph);

    let graph = RelationshipGraph::build(&dataset, &config.entity_types, &config.graph_or_default(), None);
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(graph.edges_to("moonbeam").len(), 1);
    assert!(graph.edges_to("moonbeam")[0].is_manual);
}

#[tokio::test]
async fn test_invalid_render_document_keeps_defaults() {
    let source = MemorySource::new().with(
        "render.yaml",
        "table:\n  columns:\n    - {key: metrics.tvl, label: TVL, type: currency}\n",
    );
    assert!(render::try_load_render_config(&source, "render.yaml").await.is_err());
    assert_eq!(
        render::load_render_config(&source, "render.yaml").await,
        RenderConfig::default()
    );
}
