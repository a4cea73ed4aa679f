// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Unvalidated configuration documents and the overlay rules between them

use super::{
    EdgeStyling, GraphConfig, NodeStyling, RenderConfig, StyleRange, StylingRule, TableColumn,
    TableConfig,
};
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;

/// A render configuration document as written by the user
///
/// Every field is optional; enumerations and numeric shapes are kept raw so
/// that validation can report exactly which rule a document breaks.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    /// View selector
    pub view_type: Option<String>,
    /// Entity type allow-list
    pub entity_types: Option<Vec<String>>,
    /// Table section
    pub table: Option<TableDraft>,
    /// Graph section
    pub graph: Option<GraphDraft>,
}

/// Table section of a document
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDraft {
    /// Columns
    pub columns: Option<Vec<ColumnDraft>>,
    /// Initial sort
    pub default_sort: Option<SortDraft>,
    /// Rows per page
    pub page_size: Option<u32>,
}

/// Column of a document
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ColumnDraft {
    /// Field path
    pub key: Option<String>,
    /// Header label
    pub label: Option<String>,
    /// Column type name
    #[serde(rename = "type")]
    pub column_type: Option<String>,
    /// Sortable flag
    pub sortable: Option<bool>,
    /// Filterable flag
    pub filterable: Option<bool>,
    /// Width
    pub width: Option<f64>,
}

/// Default sort of a document
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SortDraft {
    /// Column key
    pub column: Option<String>,
    /// Direction name
    pub direction: Option<String>,
}

/// Graph section of a document
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GraphDraft {
    /// Physics parameters, values unchecked
    pub physics: Option<BTreeMap<String, Value>>,
    /// Node styling
    pub nodes: Option<NodeStylingDraft>,
    /// Edge styling
    pub edges: Option<EdgeStylingDraft>,
    /// Canvas width
    pub width: Option<u32>,
    /// Canvas height
    pub height: Option<u32>,
}

/// Styling rule of a document
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StylingRuleDraft {
    /// Visual property
    pub property: Option<String>,
    /// Data field
    pub field: Option<String>,
    /// Scale name
    pub scale: Option<String>,
    /// Domain, shape unchecked
    pub domain: Option<Value>,
    /// Range, shape unchecked
    pub range: Option<Value>,
}

/// Node styling of a document
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStylingDraft {
    /// Size rule
    pub size_by: Option<StylingRuleDraft>,
    /// Colour rule
    pub color_by: Option<StylingRuleDraft>,
    /// Label field
    pub label_field: Option<String>,
    /// Label visibility
    pub show_labels: Option<bool>,
}

/// Edge styling of a document
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStylingDraft {
    /// Width rule
    pub width_by: Option<StylingRuleDraft>,
    /// Colour rule
    pub color_by: Option<StylingRuleDraft>,
    /// Label visibility
    pub show_labels: Option<bool>,
    /// Manual relationship visibility
    pub show_manual_relationships: Option<bool>,
    /// Embedded relationship visibility
    pub show_entity_relationships: Option<bool>,
    /// Type allow-list
    pub relationship_types: Option<Vec<String>>,
    /// Category allow-list
    pub relationship_categories: Option<Vec<String>>,
    /// Category styling switch
    pub style_by_category: Option<bool>,
    /// Type styling switch
    pub style_by_type: Option<bool>,
}

// =============================================================================
// Overlay
// =============================================================================

impl ConfigDocument {
    /// Overlay `user` on top of `self`
    ///
    /// `viewType` and `entityTypes` are replaced wholesale. The table section
    /// is merged key by key, with `columns` replaced rather than combined.
    /// Within the graph section, `physics`, `nodes` and `edges` are each
    /// merged key by key.
    #[must_use]
    pub fn overlay(self, user: ConfigDocument) -> ConfigDocument {
        ConfigDocument {
            view_type: user.view_type.or(self.view_type),
            entity_types: user.entity_types.or(self.entity_types),
            table: match user.table {
                Some(table) => Some(self.table.unwrap_or_default().overlay(table)),
                None => self.table,
            },
            graph: match user.graph {
                Some(graph) => Some(self.graph.unwrap_or_default().overlay(graph)),
                None => self.graph,
            },
        }
    }
}

impl TableDraft {
    fn overlay(self, user: TableDraft) -> TableDraft {
        TableDraft {
            columns: user.columns.or(self.columns),
            default_sort: user.default_sort.or(self.default_sort),
            page_size: user.page_size.or(self.page_size),
        }
    }
}

impl GraphDraft {
    fn overlay(self, user: GraphDraft) -> GraphDraft {
        let mut physics = self.physics.unwrap_or_default();
        physics.extend(user.physics.unwrap_or_default());

        GraphDraft {
            physics: Some(physics),
            nodes: Some(
                self.nodes
                    .unwrap_or_default()
                    .overlay(user.nodes.unwrap_or_default()),
            ),
            edges: Some(
                self.edges
                    .unwrap_or_default()
                    .overlay(user.edges.unwrap_or_default()),
            ),
            width: user.width.or(self.width),
            height: user.height.or(self.height),
        }
    }
}

impl NodeStylingDraft {
    fn overlay(self, user: NodeStylingDraft) -> NodeStylingDraft {
        NodeStylingDraft {
            size_by: user.size_by.or(self.size_by),
            color_by: user.color_by.or(self.color_by),
            label_field: user.label_field.or(self.label_field),
            show_labels: user.show_labels.or(self.show_labels),
        }
    }
}

impl EdgeStylingDraft {
    fn overlay(self, user: EdgeStylingDraft) -> EdgeStylingDraft {
        EdgeStylingDraft {
            width_by: user.width_by.or(self.width_by),
            color_by: user.color_by.or(self.color_by),
            show_labels: user.show_labels.or(self.show_labels),
            show_manual_relationships: user
                .show_manual_relationships
                .or(self.show_manual_relationships),
            show_entity_relationships: user
                .show_entity_relationships
                .or(self.show_entity_relationships),
            relationship_types: user.relationship_types.or(self.relationship_types),
            relationship_categories: user.relationship_categories.or(self.relationship_categories),
            style_by_category: user.style_by_category.or(self.style_by_category),
            style_by_type: user.style_by_type.or(self.style_by_type),
        }
    }
}

// =============================================================================
// Validated configuration back to document form
// =============================================================================

fn numbers(values: &[f64]) -> Value {
    Value::Sequence(values.iter().map(|n| Value::from(*n)).collect())
}

impl From<&StylingRule> for StylingRuleDraft {
    fn from(rule: &StylingRule) -> Self {
        Self {
            property: Some(rule.property.clone()),
            field: Some(rule.field.clone()),
            scale: Some(rule.scale.as_str().to_string()),
            domain: rule.domain.map(|d| numbers(&d)),
            range: rule.range.as_ref().map(|range| match range {
                StyleRange::Numeric(values) => numbers(values),
                StyleRange::Colors(colors) => {
                    Value::Sequence(colors.iter().map(|c| Value::String(c.clone())).collect())
                }
                StyleRange::Mixed(items) => Value::Sequence(items.clone()),
            }),
        }
    }
}

impl From<&TableColumn> for ColumnDraft {
    fn from(column: &TableColumn) -> Self {
        Self {
            key: Some(column.key.clone()),
            label: Some(column.label.clone()),
            column_type: Some(column.column_type.as_str().to_string()),
            sortable: column.sortable,
            filterable: column.filterable,
            width: column.width,
        }
    }
}

impl From<&TableConfig> for TableDraft {
    fn from(table: &TableConfig) -> Self {
        Self {
            columns: Some(table.columns.iter().map(ColumnDraft::from).collect()),
            default_sort: table.default_sort.as_ref().map(|sort| SortDraft {
                column: Some(sort.column.clone()),
                direction: Some(sort.direction.as_str().to_string()),
            }),
            page_size: table.page_size,
        }
    }
}

impl From<&NodeStyling> for NodeStylingDraft {
    fn from(nodes: &NodeStyling) -> Self {
        Self {
            size_by: nodes.size_by.as_ref().map(StylingRuleDraft::from),
            color_by: nodes.color_by.as_ref().map(StylingRuleDraft::from),
            label_field: nodes.label_field.clone(),
            show_labels: nodes.show_labels,
        }
    }
}

impl From<&EdgeStyling> for EdgeStylingDraft {
    fn from(edges: &EdgeStyling) -> Self {
        Self {
            width_by: edges.width_by.as_ref().map(StylingRuleDraft::from),
            color_by: edges.color_by.as_ref().map(StylingRuleDraft::from),
            show_labels: edges.show_labels,
            show_manual_relationships: edges.show_manual_relationships,
            show_entity_relationships: edges.show_entity_relationships,
            relationship_types: edges.relationship_types.clone(),
            relationship_categories: edges.relationship_categories.clone(),
            style_by_category: edges.style_by_category,
            style_by_type: edges.style_by_type,
        }
    }
}

impl From<&GraphConfig> for GraphDraft {
    fn from(graph: &GraphConfig) -> Self {
        Self {
            physics: Some(
                graph
                    .physics
                    .entries()
                    .into_iter()
                    .map(|(name, value)| (name, Value::from(value)))
                    .collect(),
            ),
            nodes: Some(NodeStylingDraft::from(&graph.nodes)),
            edges: Some(EdgeStylingDraft::from(&graph.edges)),
            width: graph.width,
            height: graph.height,
        }
    }
}

impl From<&RenderConfig> for ConfigDocument {
    fn from(config: &RenderConfig) -> Self {
        Self {
            view_type: Some(config.view_type.as_str().to_string()),
            entity_types: Some(config.entity_types.clone()),
            table: config.table.as_ref().map(TableDraft::from),
            graph: config.graph.as_ref().map(GraphDraft::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> ConfigDocument {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_physics_merges_key_by_key() {
        let base = doc("graph:\n  physics: {alphaDecay: 0.1, linkDistance: 30}\n");
        let merged = base.overlay(doc("graph:\n  physics: {linkDistance: 80}\n"));
        let physics = merged.graph.unwrap().physics.unwrap();
        assert_eq!(physics["alphaDecay"].as_f64(), Some(0.1));
        assert_eq!(physics["linkDistance"].as_f64(), Some(80.0));
    }

    #[test]
    fn test_styling_rule_is_replaced_whole() {
        let base = doc("graph:\n  nodes:\n    sizeBy: {property: size, field: metrics.stars, scale: sqrt}\n    showLabels: true\n");
        let merged = base.overlay(doc("graph:\n  nodes:\n    sizeBy: {field: metrics.tvl}\n"));
        let nodes = merged.graph.unwrap().nodes.unwrap();
        let size_by = nodes.size_by.unwrap();
        assert_eq!(size_by.field.as_deref(), Some("metrics.tvl"));
        assert_eq!(size_by.property, None);
        assert_eq!(nodes.show_labels, Some(true));
    }

    #[test]
    fn test_absent_sections_are_kept() {
        let base = doc("viewType: table\ntable:\n  pageSize: 5\n");
        let merged = base.clone().overlay(ConfigDocument::default());
        assert_eq!(merged, base);
    }
}
