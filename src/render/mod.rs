// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Render configuration for the table and graph views
//!
//! The user document is parsed into a [`ConfigDocument`], overlaid on the
//! built-in defaults and then validated into a [`RenderConfig`]. An invalid
//! document never blocks rendering: [`load_render_config`] logs the cause
//! and returns the defaults.

mod document;
mod scale;
mod validate;

pub use document::{
    ColumnDraft, ConfigDocument, EdgeStylingDraft, GraphDraft, NodeStylingDraft, SortDraft,
    StylingRuleDraft, TableDraft,
};

use crate::error::ConfigError;
use crate::source::ResourceSource;
use serde::Serialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{error, info, warn};

// =============================================================================
// Enumerations
// =============================================================================

/// Which view renders the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewType {
    /// Sortable, filterable table
    Table,
    /// Force-directed relationship graph
    Graph,
}

impl ViewType {
    /// Parse a view name
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "table" => Some(Self::Table),
            "graph" => Some(Self::Graph),
            _ => None,
        }
    }

    /// Canonical name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Graph => "graph",
        }
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a table column renders its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Plain text
    String,
    /// Formatted number
    Number,
    /// Date
    Date,
    /// Hyperlink
    Link,
    /// Tag list
    Tags,
}

impl ColumnType {
    /// Parse a column type name
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "date" => Some(Self::Date),
            "link" => Some(Self::Link),
            "tags" => Some(Self::Tags),
            _ => None,
        }
    }

    /// Canonical name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Date => "date",
            Self::Link => "link",
            Self::Tags => "tags",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending
    Asc,
    /// Descending
    Desc,
}

impl SortDirection {
    /// Parse a direction name
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    /// Canonical name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Scale function of a styling rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    /// Identity
    Linear,
    /// Logarithmic
    Log,
    /// Square root
    Sqrt,
}

impl Scale {
    /// Parse a scale name
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "linear" => Some(Self::Linear),
            "log" => Some(Self::Log),
            "sqrt" => Some(Self::Sqrt),
            _ => None,
        }
    }

    /// Canonical name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Log => "log",
            Self::Sqrt => "sqrt",
        }
    }
}

// =============================================================================
// Table
// =============================================================================

/// A table column
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColumn {
    /// Entity field path, e.g. `metrics.stars`
    pub key: String,
    /// Header label
    pub label: String,
    /// Value rendering
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Whether the column can be sorted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sortable: Option<bool>,
    /// Whether the column can be filtered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filterable: Option<bool>,
    /// Preferred width in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

impl TableColumn {
    fn new(key: &str, label: &str, column_type: ColumnType) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            column_type,
            sortable: None,
            filterable: None,
            width: None,
        }
    }

    fn sortable(mut self) -> Self {
        self.sortable = Some(true);
        self
    }

    fn filterable(mut self) -> Self {
        self.filterable = Some(true);
        self
    }
}

/// Initial sort of the table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefaultSort {
    /// Column key
    pub column: String,
    /// Direction
    pub direction: SortDirection,
}

/// Table view settings
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    /// Columns in display order
    pub columns: Vec<TableColumn>,
    /// Initial sort
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_sort: Option<DefaultSort>,
    /// Rows per page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

// =============================================================================
// Graph
// =============================================================================

/// Force simulation parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPhysics {
    /// Simulation cooling rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha_decay: Option<f64>,
    /// Node repulsion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge_strength: Option<f64>,
    /// Target link length
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_distance: Option<f64>,
    /// Link stiffness
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_strength: Option<f64>,
    /// Velocity damping
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity_decay: Option<f64>,
    /// Pull toward the centre
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gravity: Option<f64>,
    /// Parameters without a dedicated field
    #[serde(flatten)]
    pub other: BTreeMap<String, f64>,
}

impl GraphPhysics {
    /// Set a parameter by its document name
    pub fn set(&mut self, name: &str, value: f64) {
        match name {
            "alphaDecay" => self.alpha_decay = Some(value),
            "chargeStrength" => self.charge_strength = Some(value),
            "linkDistance" => self.link_distance = Some(value),
            "linkStrength" => self.link_strength = Some(value),
            "velocityDecay" => self.velocity_decay = Some(value),
            "gravity" => self.gravity = Some(value),
            other => {
                self.other.insert(other.to_string(), value);
            }
        }
    }

    /// All parameters that are set, by document name
    #[must_use]
    pub fn entries(&self) -> Vec<(String, f64)> {
        let known = [
            ("alphaDecay", self.alpha_decay),
            ("chargeStrength", self.charge_strength),
            ("linkDistance", self.link_distance),
            ("linkStrength", self.link_strength),
            ("velocityDecay", self.velocity_decay),
            ("gravity", self.gravity),
        ];
        known
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
            .chain(self.other.iter().map(|(k, v)| (k.clone(), *v)))
            .collect()
    }
}

/// Output range of a styling rule
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StyleRange {
    /// Numeric bounds for sizes and widths
    Numeric(Vec<f64>),
    /// Colour palette
    Colors(Vec<String>),
    /// Any other list; neither a numeric range nor a palette
    Mixed(Vec<Value>),
}

/// Maps a data field onto a visual property
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StylingRule {
    /// Visual property (size, color, width)
    pub property: String,
    /// Data field path
    pub field: String,
    /// Scale function
    pub scale: Scale,
    /// Input domain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<[f64; 2]>,
    /// Output range
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<StyleRange>,
}

/// Node styling
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyling {
    /// Node size rule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_by: Option<StylingRule>,
    /// Node colour rule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_by: Option<StylingRule>,
    /// Field used for labels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_field: Option<String>,
    /// Whether labels are drawn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_labels: Option<bool>,
}

/// Edge styling and visibility
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyling {
    /// Edge width rule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width_by: Option<StylingRule>,
    /// Edge colour rule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_by: Option<StylingRule>,
    /// Whether labels are drawn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_labels: Option<bool>,
    /// Hide manual relationships when false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_manual_relationships: Option<bool>,
    /// Hide embedded relationships when false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_entity_relationships: Option<bool>,
    /// Relationship types to keep (all when empty)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship_types: Option<Vec<String>>,
    /// Relationship categories to keep (all when empty)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship_categories: Option<Vec<String>>,
    /// Colour and dash edges by category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_by_category: Option<bool>,
    /// Colour edges by type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_by_type: Option<bool>,
}

/// Graph view settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphConfig {
    /// Force simulation parameters
    pub physics: GraphPhysics,
    /// Node styling
    pub nodes: NodeStyling,
    /// Edge styling
    pub edges: EdgeStyling,
    /// Canvas width
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Canvas height
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            physics: GraphPhysics {
                alpha_decay: Some(0.0228),
                charge_strength: Some(-30.0),
                link_distance: Some(30.0),
                link_strength: Some(1.0),
                velocity_decay: Some(0.4),
                ..GraphPhysics::default()
            },
            nodes: NodeStyling {
                size_by: Some(StylingRule {
                    property: "size".into(),
                    field: "metrics.stars".into(),
                    scale: Scale::Sqrt,
                    domain: Some([0.0, 1000.0]),
                    range: Some(StyleRange::Numeric(vec![5.0, 20.0])),
                }),
                color_by: Some(StylingRule {
                    property: "color".into(),
                    field: "type".into(),
                    scale: Scale::Linear,
                    domain: None,
                    range: Some(palette(&[
                        "#ff6b6b", "#4ecdc4", "#45b7d1", "#96ceb4", "#fecca7", "#ff9999",
                    ])),
                }),
                label_field: Some("name".into()),
                show_labels: Some(true),
            },
            edges: EdgeStyling {
                width_by: Some(StylingRule {
                    property: "width".into(),
                    field: "weight".into(),
                    scale: Scale::Linear,
                    domain: Some([1.0, 10.0]),
                    range: Some(StyleRange::Numeric(vec![1.0, 5.0])),
                }),
                show_labels: Some(false),
                ..EdgeStyling::default()
            },
            width: Some(800),
            height: Some(600),
        }
    }
}

fn palette(colors: &[&str]) -> StyleRange {
    StyleRange::Colors(colors.iter().map(|c| (*c).to_string()).collect())
}

// =============================================================================
// Render configuration
// =============================================================================

/// Validated render configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    /// Selected view
    pub view_type: ViewType,
    /// Entity types shown
    pub entity_types: Vec<String>,
    /// Table settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<TableConfig>,
    /// Graph settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphConfig>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            view_type: ViewType::Table,
            entity_types: vec!["parachain".into(), "dapp".into(), "infrastructure".into()],
            table: Some(TableConfig {
                columns: vec![
                    TableColumn::new("name", "Name", ColumnType::String).sortable().filterable(),
                    TableColumn::new("type", "Type", ColumnType::String).sortable().filterable(),
                    TableColumn::new("description", "Description", ColumnType::String).filterable(),
                    TableColumn::new("metrics.stars", "Stars", ColumnType::Number).sortable(),
                    TableColumn::new("website", "Website", ColumnType::Link),
                ],
                default_sort: Some(DefaultSort {
                    column: "metrics.stars".into(),
                    direction: SortDirection::Desc,
                }),
                page_size: Some(25),
            }),
            graph: Some(GraphConfig::default()),
        }
    }
}

impl RenderConfig {
    /// Built-in defaults with the given view selected
    #[must_use]
    pub fn default_for_view(view_type: ViewType) -> Self {
        Self {
            view_type,
            ..Self::default()
        }
    }

    /// Table of parachains sorted by TVL
    #[must_use]
    pub fn parachain_table() -> Self {
        Self {
            view_type: ViewType::Table,
            entity_types: vec!["parachain".into()],
            table: Some(TableConfig {
                columns: vec![
                    TableColumn::new("name", "Parachain Name", ColumnType::String).sortable().filterable(),
                    TableColumn::new("description", "Description", ColumnType::String).filterable(),
                    TableColumn::new("metrics.tx_count", "Transactions", ColumnType::Number).sortable(),
                    TableColumn::new("metrics.tvl", "TVL", ColumnType::Number).sortable(),
                    TableColumn::new("website", "Website", ColumnType::Link),
                    TableColumn::new("github", "GitHub", ColumnType::Link),
                ],
                default_sort: Some(DefaultSort {
                    column: "metrics.tvl".into(),
                    direction: SortDirection::Desc,
                }),
                page_size: Some(50),
            }),
            graph: None,
        }
    }

    /// Graph of every major entity type with looser physics
    #[must_use]
    pub fn full_graph() -> Self {
        let graph = GraphConfig {
            physics: GraphPhysics {
                alpha_decay: Some(0.02),
                charge_strength: Some(-100.0),
                link_distance: Some(50.0),
                link_strength: Some(0.5),
                velocity_decay: Some(0.3),
                gravity: Some(0.1),
                other: BTreeMap::new(),
            },
            nodes: NodeStyling {
                size_by: Some(StylingRule {
                    property: "size".into(),
                    field: "metrics.stars".into(),
                    scale: Scale::Log,
                    domain: Some([1.0, 10000.0]),
                    range: Some(StyleRange::Numeric(vec![8.0, 30.0])),
                }),
                color_by: Some(StylingRule {
                    property: "color".into(),
                    field: "type".into(),
                    scale: Scale::Linear,
                    domain: None,
                    range: Some(palette(&[
                        "#e74c3c", "#3498db", "#2ecc71", "#f39c12", "#9b59b6", "#1abc9c",
                    ])),
                }),
                label_field: Some("name".into()),
                show_labels: Some(true),
            },
            edges: EdgeStyling {
                width_by: Some(StylingRule {
                    property: "width".into(),
                    field: "weight".into(),
                    scale: Scale::Sqrt,
                    domain: Some([1.0, 20.0]),
                    range: Some(StyleRange::Numeric(vec![1.0, 8.0])),
                }),
                color_by: Some(StylingRule {
                    property: "color".into(),
                    field: "type".into(),
                    scale: Scale::Linear,
                    domain: None,
                    range: Some(palette(&["#95a5a6", "#34495e", "#7f8c8d"])),
                }),
                show_labels: Some(false),
                ..EdgeStyling::default()
            },
            width: Some(1200),
            height: Some(800),
        };

        Self {
            view_type: ViewType::Graph,
            entity_types: ["parachain", "dapp", "infrastructure", "defi", "wallet", "bridge"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            table: None,
            graph: Some(graph),
        }
    }

    /// Apply a partial document on top of this configuration and re-validate
    pub fn updated(&self, overlay: ConfigDocument) -> Result<Self, ConfigError> {
        ConfigDocument::from(self).overlay(overlay).validate()
    }

    /// Graph settings, or the built-in graph defaults when absent
    #[must_use]
    pub fn graph_or_default(&self) -> GraphConfig {
        self.graph.clone().unwrap_or_default()
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Parse a user document; an empty document is an empty overlay
pub fn parse_document(text: &str) -> Result<ConfigDocument, ConfigError> {
    if text.trim().is_empty() {
        return Ok(ConfigDocument::default());
    }
    match serde_yaml::from_str::<Value>(text)? {
        Value::Null => Ok(ConfigDocument::default()),
        value => Ok(serde_yaml::from_value(value)?),
    }
}

/// Merge a user document over the built-in defaults and validate the result
pub fn resolve_document(text: &str) -> Result<RenderConfig, ConfigError> {
    RenderConfig::default().updated(parse_document(text)?)
}

/// Load the render configuration, reporting why a present document is unusable
///
/// A missing or unreachable document yields the built-in defaults.
pub async fn try_load_render_config(
    source: &dyn ResourceSource,
    path: &str,
) -> Result<RenderConfig, ConfigError> {
    match source.fetch(path).await {
        Ok(text) => {
            let config = resolve_document(&text)?;
            info!("Render configuration loaded successfully");
            Ok(config)
        }
        Err(e) if e.is_not_found() => {
            warn!("{} not found, using default configuration", path);
            Ok(RenderConfig::default())
        }
        Err(e) => {
            warn!("Could not fetch {}: {}; using default configuration", path, e);
            Ok(RenderConfig::default())
        }
    }
}

/// Load the render configuration, falling back to the defaults on any problem
pub async fn load_render_config(source: &dyn ResourceSource, path: &str) -> RenderConfig {
    match try_load_render_config(source, path).await {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load render configuration: {}", e);
            warn!("Falling back to default configuration");
            RenderConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    #[test]
    fn test_defaults_validate() {
        let config = resolve_document("").unwrap();
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn test_presets_validate() {
        for preset in [
            RenderConfig::parachain_table(),
            RenderConfig::full_graph(),
            RenderConfig::default_for_view(ViewType::Graph),
        ] {
            let round_trip = preset.updated(ConfigDocument::default()).unwrap();
            assert_eq!(round_trip, preset);
        }
    }

    #[test]
    fn test_gravity_only_overlay_keeps_defaults() {
        let config = resolve_document("graph:\n  physics:\n    gravity: 0.2\n").unwrap();
        let defaults = RenderConfig::default();
        let graph = config.graph.as_ref().unwrap();
        let default_graph = defaults.graph.as_ref().unwrap();

        assert_eq!(graph.physics.gravity, Some(0.2));
        assert_eq!(graph.physics.alpha_decay, default_graph.physics.alpha_decay);
        assert_eq!(graph.physics.charge_strength, default_graph.physics.charge_strength);
        assert_eq!(graph.physics.link_distance, default_graph.physics.link_distance);
        assert_eq!(graph.physics.link_strength, default_graph.physics.link_strength);
        assert_eq!(graph.physics.velocity_decay, default_graph.physics.velocity_decay);
        assert_eq!(graph.nodes, default_graph.nodes);
        assert_eq!(graph.edges, default_graph.edges);
        assert_eq!(config.table, defaults.table);
        assert_eq!(config.view_type, defaults.view_type);
        assert_eq!(config.entity_types, defaults.entity_types);
    }

    #[test]
    fn test_user_columns_replace_defaults() {
        let config = resolve_document(
            "table:\n  columns:\n    - {key: slug, label: Slug, type: string}\n  pageSize: 10\n",
        )
        .unwrap();
        let table = config.table.unwrap();
        assert_eq!(table.columns.len(), 1);
        assert_eq!(table.columns[0].key, "slug");
        assert_eq!(table.page_size, Some(10));
        assert_eq!(table.default_sort, RenderConfig::default().table.unwrap().default_sort);
    }

    #[test]
    fn test_view_and_types_replace_wholesale() {
        let config = resolve_document("viewType: graph\nentityTypes: [wallet]\n").unwrap();
        assert_eq!(config.view_type, ViewType::Graph);
        assert_eq!(config.entity_types, vec!["wallet"]);
    }

    #[test]
    fn test_update_without_required_section_fails() {
        let err = RenderConfig::parachain_table()
            .updated(parse_document("viewType: graph\n").unwrap())
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection { view: ViewType::Graph }));
    }

    #[tokio::test]
    async fn test_missing_document_uses_defaults() {
        let source = MemorySource::new();
        let config = try_load_render_config(&source, "render.yaml").await.unwrap();
        assert_eq!(config, RenderConfig::default());
    }

    #[tokio::test]
    async fn test_invalid_column_type_falls_back() {
        let source = MemorySource::new().with(
            "render.yaml",
            "viewType: table\ntable:\n  columns:\n    - {key: tvl, label: TVL, type: currency}\n",
        );

        let err = try_load_render_config(&source, "render.yaml").await.unwrap_err();
        assert!(matches!(err, ConfigError::InvalidColumnType { index: 0, .. }));

        let config = load_render_config(&source, "render.yaml").await;
        assert_eq!(config, RenderConfig::default());
    }

    #[tokio::test]
    async fn test_unparseable_document_falls_back() {
        let source = MemorySource::new().with("render.yaml", "viewType: [graph\n");
        assert_eq!(load_render_config(&source, "render.yaml").await, RenderConfig::default());
    }
}
