// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Ecoview library - data pipeline for ecosystem dashboards
//!
//! This crate loads ecosystem entities from YAML resources, resolves the
//! relationships between them, and prepares the render configuration that
//! table and graph views consume.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod commands;
pub mod compat;
pub mod config;
pub mod error;
pub mod filter;
pub mod graph;
pub mod import;
pub mod lint;
pub mod loader;
pub mod relationships;
pub mod render;
pub mod schema;
pub mod session;
pub mod source;

/// Core data types shared across the pipeline
pub mod types {
    use chrono::{DateTime, Utc};
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Serialize};
    use sha2::{Digest, Sha256};
    use std::collections::BTreeMap;
    use std::fmt;
    use tracing::warn;

    // =========================================================================
    // Entities
    // =========================================================================

    /// Value stored under an entity key the loader has no dedicated field for
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum AuxValue {
        /// Numeric value
        Number(f64),
        /// Free text
        Text(String),
        /// List of strings
        List(Vec<String>),
    }

    impl AuxValue {
        /// Convert a parsed YAML value, if it has one of the supported shapes
        #[must_use]
        pub fn from_yaml(value: &serde_yaml::Value) -> Option<Self> {
            use serde_yaml::Value;
            match value {
                Value::Number(n) => n.as_f64().map(Self::Number),
                Value::String(s) => Some(Self::Text(s.clone())),
                Value::Sequence(items) => items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .map(Self::List),
                _ => None,
            }
        }
    }

    /// Relationship declared inside an entity record
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct EmbeddedRelationship {
        /// Target entity slug
        pub target: String,
        /// Relationship type
        #[serde(rename = "type")]
        pub rel_type: String,
        /// Optional weight (defaults to 1 when resolved)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub weight: Option<f64>,
    }

    /// Cataloged ecosystem project
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Entity {
        /// Unique identifier, used as the graph node key
        pub slug: String,
        /// Display name
        pub name: String,
        /// Entity type (parachain, dapp, infrastructure, ...)
        #[serde(rename = "type")]
        pub entity_type: String,
        /// Description
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
        /// Website URL
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub website: Option<String>,
        /// GitHub URL
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub github: Option<String>,
        /// Twitter URL
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub twitter: Option<String>,
        /// Numeric metrics (stars, tvl, ...)
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        pub metrics: BTreeMap<String, f64>,
        /// Classification tags
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub tags: Vec<String>,
        /// Outbound relationships
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub relationships: Vec<EmbeddedRelationship>,
        /// Keys without a dedicated field
        #[serde(flatten)]
        pub extra: BTreeMap<String, AuxValue>,
    }

    /// Borrowed view of an entity field resolved by path
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum FieldValue<'a> {
        /// Numeric value
        Number(f64),
        /// Text value
        Text(&'a str),
        /// List of strings
        List(&'a [String]),
    }

    impl FieldValue<'_> {
        /// Numeric value, if this field is a number
        #[must_use]
        pub fn as_number(&self) -> Option<f64> {
            match self {
                Self::Number(n) => Some(*n),
                _ => None,
            }
        }
    }

    impl Entity {
        /// Create a minimal entity
        #[must_use]
        pub fn new(slug: &str, name: &str, entity_type: &str) -> Self {
            Self {
                slug: slug.into(),
                name: name.into(),
                entity_type: entity_type.into(),
                description: None,
                website: None,
                github: None,
                twitter: None,
                metrics: BTreeMap::new(),
                tags: Vec::new(),
                relationships: Vec::new(),
                extra: BTreeMap::new(),
            }
        }

        /// Resolve a dotted field path such as `name` or `metrics.stars`
        #[must_use]
        pub fn field(&self, path: &str) -> Option<FieldValue<'_>> {
            fn text(value: &Option<String>) -> Option<FieldValue<'_>> {
                value.as_deref().map(FieldValue::Text)
            }
            match path.split_once('.') {
                Some(("metrics", key)) => self.metrics.get(key).copied().map(FieldValue::Number),
                Some(_) => None,
                None => match path {
                    "slug" => Some(FieldValue::Text(&self.slug)),
                    "name" => Some(FieldValue::Text(&self.name)),
                    "type" => Some(FieldValue::Text(&self.entity_type)),
                    "description" => text(&self.description),
                    "website" => text(&self.website),
                    "github" => text(&self.github),
                    "twitter" => text(&self.twitter),
                    "tags" => Some(FieldValue::List(&self.tags)),
                    other => self.extra.get(other).map(|value| match value {
                        AuxValue::Number(n) => FieldValue::Number(*n),
                        AuxValue::Text(s) => FieldValue::Text(s),
                        AuxValue::List(items) => FieldValue::List(items),
                    }),
                },
            }
        }
    }

    // =========================================================================
    // Relationships
    // =========================================================================

    /// Deduplication key of a relationship: the ordered (source, target, type) triple
    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct RelationshipKey {
        /// Source slug
        pub source: String,
        /// Target slug
        pub target: String,
        /// Relationship type
        pub rel_type: String,
    }

    impl fmt::Display for RelationshipKey {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}|{}|{}", self.source, self.target, self.rel_type)
        }
    }

    /// Provenance details attached to a curated relationship
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct RelationshipMeta {
        /// Where the relationship was sourced from
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub source: Option<String>,
        /// Free-form provenance notes
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub notes: Option<String>,
        /// Confidence score (0.0 to 1.0)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub confidence: Option<f64>,
        /// When the relationship was established, as written
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub established: Option<String>,
    }

    /// Resolved, directed relationship between two entities
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Relationship {
        /// Source slug
        pub source: String,
        /// Target slug
        pub target: String,
        /// Relationship type
        #[serde(rename = "type")]
        pub rel_type: String,
        /// Weight (default 1)
        pub weight: f64,
        /// Description
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
        /// Category key
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub category: Option<String>,
        /// Whether this edge was curated by hand
        pub is_manual: bool,
        /// Whether this edge was declared bidirectional
        #[serde(default)]
        pub bidirectional: bool,
        /// Provenance metadata
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub metadata: Option<RelationshipMeta>,
    }

    impl Relationship {
        /// Build an edge from an embedded entity relationship
        #[must_use]
        pub fn from_embedded(source: &str, embedded: &EmbeddedRelationship) -> Self {
            Self {
                source: source.to_string(),
                target: embedded.target.clone(),
                rel_type: embedded.rel_type.clone(),
                weight: embedded.weight.unwrap_or(1.0),
                description: None,
                category: None,
                is_manual: false,
                bidirectional: false,
                metadata: None,
            }
        }

        /// Deduplication key
        #[must_use]
        pub fn key(&self) -> RelationshipKey {
            RelationshipKey {
                source: self.source.clone(),
                target: self.target.clone(),
                rel_type: self.rel_type.clone(),
            }
        }

        /// Deterministic ID derived from the deduplication key
        #[must_use]
        pub fn id(&self) -> String {
            let mut hasher = Sha256::new();
            hasher.update(self.key().to_string().as_bytes());
            let hash = hex::encode(hasher.finalize());
            format!("rel:{}", &hash[..8])
        }
    }

    /// Relationship authored in the manual relationships document
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct ManualRelationship {
        /// Source slug
        #[serde(default)]
        pub source: String,
        /// Target slug
        #[serde(default)]
        pub target: String,
        /// Relationship type
        #[serde(rename = "type", default)]
        pub rel_type: String,
        /// Weight
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub weight: Option<f64>,
        /// Description
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
        /// Category key
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub category: Option<String>,
        /// Also emit the mirrored edge
        #[serde(default)]
        pub bidirectional: bool,
        /// Provenance metadata
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub metadata: Option<RelationshipMeta>,
    }

    impl ManualRelationship {
        /// Names of identity fields that are missing or empty
        #[must_use]
        pub fn missing_fields(&self) -> Vec<&'static str> {
            [
                ("source", &self.source),
                ("target", &self.target),
                ("type", &self.rel_type),
            ]
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
        }

        /// The mirrored relationship, with `bidirectional` cleared
        #[must_use]
        pub fn reversed(&self) -> Self {
            Self {
                source: self.target.clone(),
                target: self.source.clone(),
                bidirectional: false,
                ..self.clone()
            }
        }
    }

    /// Line style of a relationship category
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum LineStyle {
        /// Solid line
        Solid,
        /// Dashed line
        Dashed,
        /// Dotted line
        Dotted,
    }

    impl LineStyle {
        /// Parse a style name
        #[must_use]
        pub fn parse(name: &str) -> Option<Self> {
            match name {
                "solid" => Some(Self::Solid),
                "dashed" => Some(Self::Dashed),
                "dotted" => Some(Self::Dotted),
                _ => None,
            }
        }

        /// Canvas dash pattern, `None` for solid lines
        #[must_use]
        pub fn dash_pattern(self) -> Option<[u32; 2]> {
            match self {
                Self::Solid => None,
                Self::Dashed => Some([5, 5]),
                Self::Dotted => Some([2, 3]),
            }
        }
    }

    /// Named styling record for relationship categories
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct RelationshipCategory {
        /// Display name
        #[serde(default)]
        pub name: String,
        /// Colour (#RRGGBB)
        #[serde(default)]
        pub color: String,
        /// Line style name (solid, dashed, dotted)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub style: Option<String>,
        /// Description
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
    }

    impl RelationshipCategory {
        /// Parsed line style, if declared and recognised
        #[must_use]
        pub fn line_style(&self) -> Option<LineStyle> {
            self.style.as_deref().and_then(LineStyle::parse)
        }
    }

    /// Named styling record for relationship types
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct RelationshipType {
        /// Display name
        #[serde(default)]
        pub name: String,
        /// Description
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
        /// Weight used when a relationship of this type declares none
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub default_weight: Option<f64>,
        /// Colour (#RRGGBB)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub color: Option<String>,
    }

    /// The manual relationships document
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct ManualRelationshipsConfig {
        /// Curated relationships
        #[serde(default)]
        pub relationships: Vec<ManualRelationship>,
        /// Category styling records
        #[serde(default)]
        pub categories: BTreeMap<String, RelationshipCategory>,
        /// Type styling records
        #[serde(default)]
        pub types: BTreeMap<String, RelationshipType>,
        /// Relationship entries that could not be read
        #[serde(skip)]
        pub rejected: usize,
    }

    fn key_name(key: &serde_yaml::Value) -> Option<String> {
        match key {
            serde_yaml::Value::String(s) => Some(s.clone()),
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn read_records<T: DeserializeOwned>(document: &serde_yaml::Value, section: &str) -> BTreeMap<String, T> {
        let Some(map) = document.get(section).and_then(serde_yaml::Value::as_mapping) else {
            return BTreeMap::new();
        };
        map.iter()
            .filter_map(|(key, value)| {
                let name = key_name(key)?;
                match serde_yaml::from_value(value.clone()) {
                    Ok(record) => Some((name, record)),
                    Err(e) => {
                        warn!("Ignoring {} entry '{}': {}", section, name, e);
                        None
                    }
                }
            })
            .collect()
    }

    impl ManualRelationshipsConfig {
        /// Read a parsed document entry by entry
        ///
        /// Entries that do not fit the expected shape are dropped on their
        /// own; unreadable relationships are counted in `rejected`.
        #[must_use]
        pub fn from_yaml(document: &serde_yaml::Value) -> Self {
            let mut config = Self {
                categories: read_records(document, "categories"),
                types: read_records(document, "types"),
                ..Self::default()
            };

            match document.get("relationships") {
                None | Some(serde_yaml::Value::Null) => {}
                Some(serde_yaml::Value::Sequence(entries)) => {
                    for (index, entry) in entries.iter().enumerate() {
                        match serde_yaml::from_value::<ManualRelationship>(entry.clone()) {
                            Ok(rel) => config.relationships.push(rel),
                            Err(e) => {
                                warn!("Skipping manual relationship {}: {}", index + 1, e);
                                config.rejected += 1;
                            }
                        }
                    }
                }
                Some(_) => warn!("Ignoring manual relationships: 'relationships' is not a list"),
            }

            config
        }
    }

    // =========================================================================
    // Dataset
    // =========================================================================

    /// Summary of a loaded dataset
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DatasetMetadata {
        /// When the dataset was assembled
        pub last_updated: DateTime<Utc>,
        /// Number of entities
        pub total_entities: usize,
        /// Entities per type
        pub entity_type_counts: BTreeMap<String, usize>,
        /// Resolved relationships curated by hand
        pub manual_relationships: usize,
        /// Resolved relationships embedded in entities
        pub entity_relationships: usize,
        /// Keys whose entry was replaced during the merge
        pub overwritten_relationships: usize,
    }

    /// Resolved, immutable dataset consumed by the views
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Dataset {
        /// All entities that passed identity filtering
        pub entities: Vec<Entity>,
        /// Entity types in first-seen order
        pub entity_types: Vec<String>,
        /// Deduplicated relationships
        pub relationships: Vec<Relationship>,
        /// Relationship category styling
        pub categories: BTreeMap<String, RelationshipCategory>,
        /// Relationship type styling
        pub relationship_types: BTreeMap<String, RelationshipType>,
        /// Summary
        pub metadata: DatasetMetadata,
    }

    impl Dataset {
        /// Look up an entity by slug
        #[must_use]
        pub fn entity(&self, slug: &str) -> Option<&Entity> {
            self.entities.iter().find(|e| e.slug == slug)
        }
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::error::{ConfigError, LoadError, SchemaError, SourceError};
    pub use crate::render::RenderConfig;
    pub use crate::types::*;
    pub use anyhow::{Context, Result};
}
