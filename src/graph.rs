// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Graph view model - styled nodes and links ready for rendering

use crate::filter::EntityFilter;
use crate::render::{EdgeStyling, GraphConfig, NodeStyling};
use crate::types::{Dataset, Entity, FieldValue, Relationship};
use anyhow::{Context, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write as _;

/// Colour used when no rule applies, and for embedded links
pub const DEFAULT_COLOR: &str = "#69b7d4";
/// Colour of manual links
pub const MANUAL_COLOR: &str = "#FF6B6B";
/// Node radius when no size rule applies
pub const DEFAULT_NODE_SIZE: f64 = 5.0;
/// Link width when no width rule applies
pub const DEFAULT_LINK_WIDTH: f64 = 1.0;

const NODE_SIZE_DOMAIN: [f64; 2] = [0.0, 100.0];
const NODE_SIZE_RANGE: [f64; 2] = [5.0, 20.0];
const NODE_COLOR_DOMAIN: [f64; 2] = [0.0, 100.0];
const LINK_WIDTH_DOMAIN: [f64; 2] = [1.0, 10.0];
const LINK_WIDTH_RANGE: [f64; 2] = [1.0, 5.0];

/// A styled entity node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Entity slug
    pub id: String,
    /// Display name
    pub name: String,
    /// Entity type
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Radius
    pub size: f64,
    /// Fill colour
    pub color: String,
    /// Label, when labels are shown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A styled relationship link
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLink {
    /// Relationship id
    pub id: String,
    /// Source slug
    pub source: String,
    /// Target slug
    pub target: String,
    /// Relationship type
    #[serde(rename = "type")]
    pub rel_type: String,
    /// Weight
    pub weight: f64,
    /// Category key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Whether the link was curated by hand
    pub is_manual: bool,
    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Stroke width
    pub width: f64,
    /// Stroke colour
    pub color: String,
    /// Dash pattern, `None` for solid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<[u32; 2]>,
}

#[derive(Serialize)]
struct GraphExport<'a> {
    nodes: Vec<&'a GraphNode>,
    links: Vec<&'a GraphLink>,
}

/// Relationship graph with petgraph backing
#[derive(Debug, Default)]
pub struct RelationshipGraph {
    graph: DiGraph<GraphNode, GraphLink>,
    node_indices: HashMap<String, NodeIndex>,
}

fn field_text(value: FieldValue<'_>) -> String {
    match value {
        FieldValue::Number(n) => n.to_string(),
        FieldValue::Text(s) => s.to_string(),
        FieldValue::List(items) => items.join(", "),
    }
}

struct NodeStyler<'a> {
    styling: &'a NodeStyling,
    type_order: Vec<&'a str>,
}

impl<'a> NodeStyler<'a> {
    fn new(styling: &'a NodeStyling, entities: &[&'a Entity]) -> Self {
        let mut type_order: Vec<&str> = Vec::new();
        for &entity in entities {
            if !type_order.contains(&entity.entity_type.as_str()) {
                type_order.push(&entity.entity_type);
            }
        }
        Self { styling, type_order }
    }

    fn size(&self, entity: &Entity) -> f64 {
        let Some(rule) = &self.styling.size_by else {
            return DEFAULT_NODE_SIZE;
        };
        match entity.field(&rule.field).and_then(|v| v.as_number()) {
            Some(value) => rule.scale_number(value, NODE_SIZE_DOMAIN, NODE_SIZE_RANGE),
            None => DEFAULT_NODE_SIZE,
        }
    }

    fn color(&self, entity: &Entity) -> String {
        let Some(rule) = &self.styling.color_by else {
            return DEFAULT_COLOR.to_string();
        };

        if rule.field == "type" {
            let palette = rule.palette().unwrap_or(&[]);
            let index = self
                .type_order
                .iter()
                .position(|t| *t == entity.entity_type)
                .unwrap_or(0);
            return palette
                .get(index % palette.len().max(1))
                .map_or_else(|| DEFAULT_COLOR.to_string(), Clone::clone);
        }

        entity
            .field(&rule.field)
            .and_then(|v| v.as_number())
            .and_then(|value| rule.color_for(value, NODE_COLOR_DOMAIN))
            .unwrap_or(DEFAULT_COLOR)
            .to_string()
    }

    fn label(&self, entity: &Entity) -> Option<String> {
        if self.styling.show_labels != Some(true) {
            return None;
        }
        let label = self
            .styling
            .label_field
            .as_deref()
            .and_then(|field| entity.field(field))
            .map(field_text)
            .filter(|s| !s.is_empty());
        Some(label.unwrap_or_else(|| entity.name.clone()))
    }
}

fn edge_visible(rel: &Relationship, edges: &EdgeStyling) -> bool {
    if edges.show_manual_relationships == Some(false) && rel.is_manual {
        return false;
    }
    if edges.show_entity_relationships == Some(false) && !rel.is_manual {
        return false;
    }
    if let Some(types) = edges.relationship_types.as_ref().filter(|t| !t.is_empty()) {
        if !types.contains(&rel.rel_type) {
            return false;
        }
    }
    if let (Some(categories), Some(category)) = (
        edges.relationship_categories.as_ref().filter(|c| !c.is_empty()),
        &rel.category,
    ) {
        if !categories.contains(category) {
            return false;
        }
    }
    true
}

fn link_width(rel: &Relationship, edges: &EdgeStyling) -> f64 {
    let Some(rule) = &edges.width_by else {
        return DEFAULT_LINK_WIDTH;
    };
    let weight = if rel.weight == 0.0 { 1.0 } else { rel.weight };
    rule.scale_number(weight, LINK_WIDTH_DOMAIN, LINK_WIDTH_RANGE)
}

fn link_color(rel: &Relationship, edges: &EdgeStyling, dataset: &Dataset) -> String {
    if edges.style_by_category == Some(true) {
        let color = rel
            .category
            .as_ref()
            .and_then(|c| dataset.categories.get(c))
            .map(|c| c.color.as_str())
            .filter(|c| !c.is_empty());
        if let Some(color) = color {
            return color.to_string();
        }
    }
    if edges.style_by_type == Some(true) {
        if let Some(color) = dataset
            .relationship_types
            .get(&rel.rel_type)
            .and_then(|t| t.color.as_deref())
        {
            return color.to_string();
        }
    }
    if rel.is_manual {
        MANUAL_COLOR.to_string()
    } else {
        DEFAULT_COLOR.to_string()
    }
}

fn link_dash(rel: &Relationship, edges: &EdgeStyling, dataset: &Dataset) -> Option<[u32; 2]> {
    if edges.style_by_category != Some(true) {
        return None;
    }
    rel.category
        .as_ref()
        .and_then(|c| dataset.categories.get(c))
        .and_then(|c| c.line_style())
        .and_then(|style| style.dash_pattern())
}

impl RelationshipGraph {
    /// Create an empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the view model for a dataset
    ///
    /// Nodes are the entities whose type is in `entity_types` and which pass
    /// `filter`. Links are the relationships between two such nodes that the
    /// edge settings keep visible.
    #[must_use]
    pub fn build(
        dataset: &Dataset,
        entity_types: &[String],
        config: &GraphConfig,
        filter: Option<&EntityFilter>,
    ) -> Self {
        let entities: Vec<&Entity> = dataset
            .entities
            .iter()
            .filter(|e| entity_types.contains(&e.entity_type))
            .filter(|e| filter.map_or(true, |f| f.matches(e)))
            .collect();

        let styler = NodeStyler::new(&config.nodes, &entities);
        let mut graph = Self::new();

        for entity in &entities {
            graph.add_node(GraphNode {
                id: entity.slug.clone(),
                name: entity.name.clone(),
                entity_type: entity.entity_type.clone(),
                size: styler.size(entity),
                color: styler.color(entity),
                label: styler.label(entity),
            });
        }

        let edges = &config.edges;
        for rel in &dataset.relationships {
            if !edge_visible(rel, edges) {
                continue;
            }
            graph.add_link(GraphLink {
                id: rel.id(),
                source: rel.source.clone(),
                target: rel.target.clone(),
                rel_type: rel.rel_type.clone(),
                weight: rel.weight,
                category: rel.category.clone(),
                is_manual: rel.is_manual,
                description: rel.description.clone(),
                width: link_width(rel, edges),
                color: link_color(rel, edges, dataset),
                dash: link_dash(rel, edges, dataset),
            });
        }

        graph
    }

    /// Add a node; a node with the same id is replaced
    pub fn add_node(&mut self, node: GraphNode) {
        if let Some(&idx) = self.node_indices.get(&node.id) {
            self.graph[idx] = node;
        } else {
            let id = node.id.clone();
            let idx = self.graph.add_node(node);
            self.node_indices.insert(id, idx);
        }
    }

    /// Add a link; returns false when an endpoint is not a node
    pub fn add_link(&mut self, link: GraphLink) -> bool {
        match (
            self.node_indices.get(&link.source),
            self.node_indices.get(&link.target),
        ) {
            (Some(&from), Some(&to)) => {
                self.graph.add_edge(from, to, link);
                true
            }
            _ => false,
        }
    }

    /// Get a node by id
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.node_indices.get(id).map(|&idx| &self.graph[idx])
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_weights()
    }

    /// All links in insertion order
    pub fn links(&self) -> impl Iterator<Item = &GraphLink> {
        self.graph.edge_weights()
    }

    fn links_at(&self, id: &str, direction: Direction) -> Vec<&GraphLink> {
        let Some(&idx) = self.node_indices.get(id) else {
            return Vec::new();
        };
        let mut links: Vec<_> = self
            .graph
            .edges_directed(idx, direction)
            .map(|e| (e.id(), e.weight()))
            .collect();
        links.sort_by_key(|(edge_id, _)| *edge_id);
        links.into_iter().map(|(_, link)| link).collect()
    }

    /// Links leaving a node
    #[must_use]
    pub fn edges_from(&self, id: &str) -> Vec<&GraphLink> {
        self.links_at(id, Direction::Outgoing)
    }

    /// Links entering a node
    #[must_use]
    pub fn edges_to(&self, id: &str) -> Vec<&GraphLink> {
        self.links_at(id, Direction::Incoming)
    }

    /// Get node count
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get edge count
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Check if the graph is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Export to DOT format for Graphviz
    #[must_use]
    pub fn to_dot(&self) -> String {
        let escape = |s: &str| s.replace('\\', "\\\\").replace('"', "\\\"");

        let mut dot = String::from("digraph ecosystem {\n");
        dot.push_str("  rankdir=LR;\n");
        dot.push_str("  node [shape=circle, style=filled];\n\n");

        for node in self.nodes() {
            let label = node.label.as_deref().unwrap_or(&node.name);
            let _ = writeln!(
                dot,
                "  \"{}\" [label=\"{}\", fillcolor=\"{}\", width={:.2}];",
                escape(&node.id),
                escape(label),
                node.color,
                node.size / 10.0
            );
        }

        dot.push('\n');

        for link in self.links() {
            let style = match link.dash {
                Some([5, 5]) => ", style=dashed",
                Some(_) => ", style=dotted",
                None => "",
            };
            let _ = writeln!(
                dot,
                "  \"{}\" -> \"{}\" [label=\"{}\", color=\"{}\", penwidth={:.2}{}];",
                escape(&link.source),
                escape(&link.target),
                escape(&link.rel_type),
                link.color,
                link.width,
                style
            );
        }

        dot.push_str("}\n");
        dot
    }

    /// Export to JSON
    pub fn to_json(&self) -> Result<String> {
        let export = GraphExport {
            nodes: self.nodes().collect(),
            links: self.links().collect(),
        };
        serde_json::to_string_pretty(&export).context("Failed to serialize graph to JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::assemble_dataset;
    use crate::render::{Scale, StyleRange, StylingRule};
    use crate::types::{
        EmbeddedRelationship, ManualRelationship, ManualRelationshipsConfig, RelationshipCategory,
    };

    fn make_entity(slug: &str, entity_type: &str, stars: Option<f64>) -> Entity {
        let mut entity = Entity::new(slug, &slug.to_uppercase(), entity_type);
        if let Some(stars) = stars {
            entity.metrics.insert("stars".into(), stars);
        }
        entity
    }

    fn make_dataset() -> Dataset {
        let mut a = make_entity("a", "parachain", Some(100.0));
        a.relationships.push(EmbeddedRelationship {
            target: "b".into(),
            rel_type: "uses".into(),
            weight: Some(10.0),
        });
        a.relationships.push(EmbeddedRelationship {
            target: "ghost".into(),
            rel_type: "uses".into(),
            weight: None,
        });
        let b = make_entity("b", "dapp", None);
        let w = make_entity("w", "wallet", Some(5.0));

        let mut manual = ManualRelationshipsConfig {
            relationships: vec![ManualRelationship {
                source: "b".into(),
                target: "a".into(),
                rel_type: "funds".into(),
                weight: Some(1.0),
                category: Some("eco".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        manual.categories.insert(
            "eco".into(),
            RelationshipCategory {
                name: "Ecosystem".into(),
                color: "#00ff00".into(),
                style: Some("dotted".into()),
                description: None,
            },
        );
        assemble_dataset(vec![a, b, w], Some(manual))
    }

    fn types(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_nodes_follow_type_allow_list() {
        let dataset = make_dataset();
        let graph = RelationshipGraph::build(&dataset, &types(&["parachain", "dapp"]), &GraphConfig::default(), None);

        assert_eq!(graph.node_count(), 2);
        assert!(graph.node("w").is_none());
        // a->ghost has no target node
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edges_from("a").len(), 1);
        assert_eq!(graph.edges_to("a").len(), 1);
    }

    #[test]
    fn test_default_styling() {
        let dataset = make_dataset();
        let graph = RelationshipGraph::build(&dataset, &types(&["parachain", "dapp"]), &GraphConfig::default(), None);

        // sqrt scale over [0, 1000] onto [5, 20]
        let a = graph.node("a").unwrap();
        let expected = 5.0 + 15.0 * (0.1_f64).sqrt();
        assert!((a.size - expected).abs() < 1e-9);
        assert_eq!(graph.node("b").unwrap().size, DEFAULT_NODE_SIZE);

        // palette follows first-seen type order
        assert_eq!(a.color, "#ff6b6b");
        assert_eq!(graph.node("b").unwrap().color, "#4ecdc4");
        assert_eq!(a.label.as_deref(), Some("A"));

        let embedded = graph.edges_from("a")[0];
        assert_eq!(embedded.color, DEFAULT_COLOR);
        assert!((embedded.width - 5.0).abs() < 1e-9);

        let manual = graph.edges_from("b")[0];
        assert_eq!(manual.color, MANUAL_COLOR);
        assert_eq!(manual.dash, None);
    }

    #[test]
    fn test_category_styling() {
        let dataset = make_dataset();
        let mut config = GraphConfig::default();
        config.edges.style_by_category = Some(true);

        let graph = RelationshipGraph::build(&dataset, &types(&["parachain", "dapp"]), &config, None);
        let manual = graph.edges_from("b")[0];
        assert_eq!(manual.color, "#00ff00");
        assert_eq!(manual.dash, Some([2, 3]));
    }

    #[test]
    fn test_edge_filters() {
        let dataset = make_dataset();
        let allowed = types(&["parachain", "dapp"]);

        let mut config = GraphConfig::default();
        config.edges.show_manual_relationships = Some(false);
        let graph = RelationshipGraph::build(&dataset, &allowed, &config, None);
        assert_eq!(graph.edge_count(), 1);
        assert!(!graph.links().any(|l| l.is_manual));

        let mut config = GraphConfig::default();
        config.edges.relationship_types = Some(vec!["funds".into()]);
        let graph = RelationshipGraph::build(&dataset, &allowed, &config, None);
        assert_eq!(graph.links().map(|l| l.rel_type.as_str()).collect::<Vec<_>>(), vec!["funds"]);

        // uncategorised links pass a category allow-list
        let mut config = GraphConfig::default();
        config.edges.relationship_categories = Some(vec!["other".into()]);
        let graph = RelationshipGraph::build(&dataset, &allowed, &config, None);
        assert_eq!(graph.links().map(|l| l.rel_type.as_str()).collect::<Vec<_>>(), vec!["uses"]);
    }

    #[test]
    fn test_entity_filter_narrows_nodes() {
        let dataset = make_dataset();
        let filter = EntityFilter::new().with_search("a");
        let graph = RelationshipGraph::build(
            &dataset,
            &types(&["parachain", "dapp", "wallet"]),
            &GraphConfig::default(),
            Some(&filter),
        );
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_numeric_colour_rule() {
        let dataset = make_dataset();
        let mut config = GraphConfig::default();
        config.nodes.color_by = Some(StylingRule {
            property: "color".into(),
            field: "metrics.stars".into(),
            scale: Scale::Linear,
            domain: Some([0.0, 100.0]),
            range: Some(StyleRange::Colors(vec!["#000000".into(), "#ffffff".into()])),
        });

        let graph = RelationshipGraph::build(&dataset, &types(&["parachain", "dapp", "wallet"]), &config, None);
        assert_eq!(graph.node("a").unwrap().color, "#ffffff");
        assert_eq!(graph.node("w").unwrap().color, "#000000");
        assert_eq!(graph.node("b").unwrap().color, DEFAULT_COLOR);
    }

    #[test]
    fn test_to_dot() {
        let dataset = make_dataset();
        let graph = RelationshipGraph::build(&dataset, &types(&["parachain", "dapp"]), &GraphConfig::default(), None);
        let dot = graph.to_dot();

        assert!(dot.contains("digraph ecosystem"));
        assert!(dot.contains("\"a\" -> \"b\""));
        assert!(dot.contains("label=\"funds\""));
    }

    #[test]
    fn test_to_json() {
        let dataset = make_dataset();
        let graph = RelationshipGraph::build(&dataset, &types(&["parachain"]), &GraphConfig::default(), None);
        let json: serde_json::Value = serde_json::from_str(&graph.to_json().unwrap()).unwrap();
        assert_eq!(json["nodes"][0]["id"], "a");
        assert_eq!(json["links"].as_array().map(Vec::len), Some(0));
    }
}
