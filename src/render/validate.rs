// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Structural validation of merged configuration documents

use super::document::{
    ColumnDraft, ConfigDocument, EdgeStylingDraft, GraphDraft, NodeStylingDraft, SortDraft,
    StylingRuleDraft, TableDraft,
};
use super::{
    ColumnType, DefaultSort, EdgeStyling, GraphConfig, GraphPhysics, NodeStyling, RenderConfig,
    Scale, SortDirection, StyleRange, StylingRule, TableColumn, TableConfig, ViewType,
};
use crate::error::ConfigError;
use serde_yaml::Value;
use std::collections::BTreeMap;

impl ConfigDocument {
    /// Check the document against the structural rules and build the typed configuration
    pub fn validate(self) -> Result<RenderConfig, ConfigError> {
        let view_type = self
            .view_type
            .as_deref()
            .and_then(ViewType::parse)
            .ok_or_else(|| ConfigError::InvalidViewType {
                found: self.view_type.clone(),
            })?;

        let entity_types = match self.entity_types {
            Some(types) if !types.is_empty() => types,
            _ => return Err(ConfigError::EmptyEntityTypes),
        };

        let present = match view_type {
            ViewType::Table => self.table.is_some(),
            ViewType::Graph => self.graph.is_some(),
        };
        if !present {
            return Err(ConfigError::MissingSection { view: view_type });
        }

        let table = self.table.map(validate_table).transpose()?;
        let graph = self.graph.map(validate_graph).transpose()?;

        Ok(RenderConfig {
            view_type,
            entity_types,
            table,
            graph,
        })
    }
}

fn validate_table(table: TableDraft) -> Result<TableConfig, ConfigError> {
    let columns = table.columns.unwrap_or_default();
    if columns.is_empty() {
        return Err(ConfigError::NoColumns);
    }

    let columns = columns
        .into_iter()
        .enumerate()
        .map(|(index, column)| validate_column(index, column))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TableConfig {
        columns,
        default_sort: table.default_sort.map(validate_sort).transpose()?,
        page_size: table.page_size,
    })
}

fn validate_column(index: usize, column: ColumnDraft) -> Result<TableColumn, ConfigError> {
    let non_empty = |value: Option<String>| value.filter(|s| !s.is_empty());
    let (Some(key), Some(label)) = (non_empty(column.key), non_empty(column.label)) else {
        return Err(ConfigError::ColumnIdentity { index });
    };

    let column_type = column
        .column_type
        .as_deref()
        .and_then(ColumnType::parse)
        .ok_or(ConfigError::InvalidColumnType {
            index,
            found: column.column_type.clone(),
        })?;

    Ok(TableColumn {
        key,
        label,
        column_type,
        sortable: column.sortable,
        filterable: column.filterable,
        width: column.width,
    })
}

fn validate_sort(sort: SortDraft) -> Result<DefaultSort, ConfigError> {
    match (sort.column, sort.direction.as_deref().and_then(SortDirection::parse)) {
        (Some(column), Some(direction)) if !column.is_empty() => Ok(DefaultSort { column, direction }),
        _ => Err(ConfigError::InvalidDefaultSort),
    }
}

fn validate_physics(physics: BTreeMap<String, Value>) -> Result<GraphPhysics, ConfigError> {
    let mut validated = GraphPhysics::default();
    for (key, value) in physics {
        let number = match value {
            Value::Number(n) => n.as_f64(),
            _ => None,
        };
        match number {
            Some(n) => validated.set(&key, n),
            None => return Err(ConfigError::PhysicsNotNumeric { key }),
        }
    }
    Ok(validated)
}

fn validate_rule(rule: StylingRuleDraft, context: &'static str) -> Result<StylingRule, ConfigError> {
    let non_empty = |value: Option<String>| value.filter(|s| !s.is_empty());
    let (Some(property), Some(field)) = (non_empty(rule.property), non_empty(rule.field)) else {
        return Err(ConfigError::RuleIdentity { context });
    };

    let scale = rule
        .scale
        .as_deref()
        .and_then(Scale::parse)
        .ok_or(ConfigError::InvalidScale {
            context,
            found: rule.scale.clone(),
        })?;

    let domain = match rule.domain {
        None => None,
        Some(Value::Sequence(items)) => match items.as_slice() {
            [lo, hi] => match (lo.as_f64(), hi.as_f64()) {
                (Some(lo), Some(hi)) => Some([lo, hi]),
                _ => return Err(ConfigError::InvalidDomain { context }),
            },
            _ => return Err(ConfigError::InvalidDomain { context }),
        },
        Some(_) => return Err(ConfigError::InvalidDomain { context }),
    };

    let range = match rule.range {
        None => None,
        Some(Value::Sequence(items)) => Some(style_range(items)),
        Some(_) => return Err(ConfigError::InvalidRange { context }),
    };

    Ok(StylingRule {
        property,
        field,
        scale,
        domain,
        range,
    })
}

fn style_range(items: Vec<Value>) -> StyleRange {
    if let Some(numbers) = items.iter().map(Value::as_f64).collect::<Option<Vec<_>>>() {
        return StyleRange::Numeric(numbers);
    }
    if let Some(colors) = items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
    {
        return StyleRange::Colors(colors);
    }
    StyleRange::Mixed(items)
}

fn validate_nodes(nodes: NodeStylingDraft) -> Result<NodeStyling, ConfigError> {
    Ok(NodeStyling {
        size_by: nodes.size_by.map(|r| validate_rule(r, "node sizeBy")).transpose()?,
        color_by: nodes.color_by.map(|r| validate_rule(r, "node colorBy")).transpose()?,
        label_field: nodes.label_field,
        show_labels: nodes.show_labels,
    })
}

fn validate_edges(edges: EdgeStylingDraft) -> Result<EdgeStyling, ConfigError> {
    Ok(EdgeStyling {
        width_by: edges.width_by.map(|r| validate_rule(r, "edge widthBy")).transpose()?,
        color_by: edges.color_by.map(|r| validate_rule(r, "edge colorBy")).transpose()?,
        show_labels: edges.show_labels,
        show_manual_relationships: edges.show_manual_relationships,
        show_entity_relationships: edges.show_entity_relationships,
        relationship_types: edges.relationship_types,
        relationship_categories: edges.relationship_categories,
        style_by_category: edges.style_by_category,
        style_by_type: edges.style_by_type,
    })
}

fn validate_graph(graph: GraphDraft) -> Result<GraphConfig, ConfigError> {
    Ok(GraphConfig {
        physics: validate_physics(graph.physics.unwrap_or_default())?,
        nodes: validate_nodes(graph.nodes.unwrap_or_default())?,
        edges: validate_edges(graph.edges.unwrap_or_default())?,
        width: graph.width,
        height: graph.height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::resolve_document;

    fn err(text: &str) -> ConfigError {
        resolve_document(text).unwrap_err()
    }

    #[test]
    fn test_rejects_unknown_view() {
        assert!(matches!(
            err("viewType: chart\n"),
            ConfigError::InvalidViewType { found: Some(v) } if v == "chart"
        ));
    }

    #[test]
    fn test_rejects_empty_entity_types() {
        assert!(matches!(err("entityTypes: []\n"), ConfigError::EmptyEntityTypes));
    }

    #[test]
    fn test_rejects_column_without_label() {
        assert!(matches!(
            err("table:\n  columns:\n    - {key: name, type: string}\n"),
            ConfigError::ColumnIdentity { index: 0 }
        ));
    }

    #[test]
    fn test_rejects_empty_columns() {
        assert!(matches!(err("table:\n  columns: []\n"), ConfigError::NoColumns));
    }

    #[test]
    fn test_rejects_non_numeric_physics() {
        assert!(matches!(
            err("graph:\n  physics:\n    gravity: strong\n"),
            ConfigError::PhysicsNotNumeric { key } if key == "gravity"
        ));
    }

    #[test]
    fn test_rejects_bad_scale() {
        assert!(matches!(
            err("graph:\n  edges:\n    widthBy: {property: width, field: weight, scale: cubic}\n"),
            ConfigError::InvalidScale { context: "edge widthBy", .. }
        ));
    }

    #[test]
    fn test_rejects_rule_without_field() {
        assert!(matches!(
            err("graph:\n  nodes:\n    colorBy: {property: color, scale: linear}\n"),
            ConfigError::RuleIdentity { context: "node colorBy" }
        ));
    }

    #[test]
    fn test_rejects_bad_domain() {
        assert!(matches!(
            err("graph:\n  nodes:\n    sizeBy: {property: size, field: x, scale: log, domain: [1, 2, 3]}\n"),
            ConfigError::InvalidDomain { .. }
        ));
        assert!(matches!(
            err("graph:\n  nodes:\n    sizeBy: {property: size, field: x, scale: log, domain: [low, high]}\n"),
            ConfigError::InvalidDomain { .. }
        ));
    }

    #[test]
    fn test_rejects_non_list_range() {
        assert!(matches!(
            err("graph:\n  nodes:\n    sizeBy: {property: size, field: x, scale: log, range: 5}\n"),
            ConfigError::InvalidRange { .. }
        ));
    }

    #[test]
    fn test_rejects_bad_sort_direction() {
        assert!(matches!(
            err("table:\n  defaultSort: {column: name, direction: sideways}\n"),
            ConfigError::InvalidDefaultSort
        ));
    }

    #[test]
    fn test_accepts_colour_range() {
        let config = resolve_document(
            "graph:\n  edges:\n    colorBy: {property: color, field: type, scale: linear, range: ['#000000', '#ffffff']}\n",
        )
        .unwrap();
        let rule = config.graph.unwrap().edges.color_by.unwrap();
        assert_eq!(rule.range, Some(StyleRange::Colors(vec!["#000000".into(), "#ffffff".into()])));
    }

    #[test]
    fn test_accepts_mixed_range() {
        let config = resolve_document(
            "graph:\n  nodes:\n    sizeBy: {property: size, field: metrics.stars, scale: sqrt, range: [5, '#fff']}\n",
        )
        .unwrap();
        let rule = config.graph.unwrap().nodes.size_by.unwrap();
        assert!(matches!(&rule.range, Some(StyleRange::Mixed(items)) if items.len() == 2));
        assert_eq!(rule.numeric_range(), None);
        assert_eq!(rule.palette(), None);
    }
}
