// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Entity loading - fetches the data manifest and assembles the dataset
//!
//! Every resource in the manifest is fetched concurrently. A resource that
//! cannot be fetched or parsed is logged and skipped; loading only fails
//! when no entity survives identity filtering.

use crate::error::LoadError;
use crate::relationships;
use crate::source::ResourceSource;
use crate::types::{
    AuxValue, Dataset, DatasetMetadata, EmbeddedRelationship, Entity, ManualRelationshipsConfig,
};
use chrono::Utc;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Data resources looked up by default, under `data/<name>.yml`
pub const DEFAULT_RESOURCES: [&str; 9] = [
    "parachains",
    "dapps",
    "infrastructure",
    "tools",
    "wallets",
    "bridges",
    "defi",
    "nft",
    "gaming",
];

/// Entity keys with dedicated fields
const KNOWN_KEYS: [&str; 10] = [
    "slug",
    "name",
    "type",
    "description",
    "website",
    "github",
    "twitter",
    "metrics",
    "tags",
    "relationships",
];

// =============================================================================
// Manifest
// =============================================================================

/// Declared list of data resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Named data resources, fetched as `data/<name>.yml`
    pub resources: Vec<String>,
    /// Catch-all resource, fetched as `<name>.yml`
    pub catch_all: Option<String>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            resources: DEFAULT_RESOURCES.iter().map(|s| (*s).to_string()).collect(),
            catch_all: Some("data".into()),
        }
    }
}

impl Manifest {
    /// Resource paths in fetch order
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.resources
            .iter()
            .map(|name| format!("data/{name}.yml"))
            .chain(self.catch_all.iter().map(|name| format!("{name}.yml")))
            .collect()
    }
}

/// Locations of every document the pipeline reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLayout {
    /// Data resources
    pub manifest: Manifest,
    /// Manual relationships document
    pub relationships: String,
    /// Render configuration document
    pub render_config: String,
    /// Entity schema document
    pub schema: String,
}

impl Default for ResourceLayout {
    fn default() -> Self {
        Self {
            manifest: Manifest::default(),
            relationships: "relationships.yml".into(),
            render_config: "render.yaml".into(),
            schema: "data.schema.yml".into(),
        }
    }
}

// =============================================================================
// Fetching and flattening
// =============================================================================

/// Result of fetching and parsing one resource
#[derive(Debug)]
pub struct ResourceOutcome {
    /// Resource path
    pub resource: String,
    /// Records found, or why none could be read
    pub result: Result<Vec<Value>, LoadError>,
}

/// Collect the records of a parsed document
///
/// A sequence contributes every item; a mapping contributes the items of
/// each value that is itself a sequence.
#[must_use]
pub fn flatten_document(document: Value) -> Vec<Value> {
    match document {
        Value::Sequence(items) => items,
        Value::Mapping(groups) => groups
            .into_iter()
            .filter_map(|(_, value)| match value {
                Value::Sequence(items) => Some(items),
                _ => None,
            })
            .flatten()
            .collect(),
        _ => Vec::new(),
    }
}

/// Parse a resource body into its records
pub fn parse_resource(resource: &str, text: &str) -> Result<Vec<Value>, LoadError> {
    let document: Value = serde_yaml::from_str(text).map_err(|source| LoadError::Parse {
        resource: resource.to_string(),
        source,
    })?;
    Ok(flatten_document(document))
}

/// Fetch every manifest entry concurrently
pub async fn fetch_resources(
    source: &dyn ResourceSource,
    manifest: &Manifest,
) -> Vec<ResourceOutcome> {
    let fetches = manifest.paths().into_iter().map(|resource| async move {
        let result = match source.fetch(&resource).await {
            Ok(text) => parse_resource(&resource, &text),
            Err(e) => Err(e.into()),
        };
        ResourceOutcome { resource, result }
    });
    join_all(fetches).await
}

/// Fetch the manifest and concatenate every record found, skipping failures
pub async fn load_records(source: &dyn ResourceSource, manifest: &Manifest) -> Vec<Value> {
    let mut records = Vec::new();
    for outcome in fetch_resources(source, manifest).await {
        match outcome.result {
            Ok(items) => {
                debug!(resource = %outcome.resource, count = items.len(), "Loaded resource");
                records.extend(items);
            }
            Err(LoadError::Source(e)) if e.is_not_found() => {
                debug!(resource = %outcome.resource, "Resource not present");
            }
            Err(e) => warn!("Could not load {}: {}", outcome.resource, e),
        }
    }
    records
}

// =============================================================================
// Entity conversion
// =============================================================================

fn non_empty_text(map: &serde_yaml::Mapping, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Text of an identity field; numbers are accepted and rendered as text
fn identity_text(map: &serde_yaml::Mapping, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn embedded_relationship(slug: &str, value: &Value) -> Option<EmbeddedRelationship> {
    let map = value.as_mapping()?;
    match (non_empty_text(map, "target"), non_empty_text(map, "type")) {
        (Some(target), Some(rel_type)) => Some(EmbeddedRelationship {
            target,
            rel_type,
            weight: map.get("weight").and_then(Value::as_f64),
        }),
        _ => {
            warn!(entity = %slug, "Dropping embedded relationship without target or type");
            None
        }
    }
}

/// Convert a raw record into an entity
///
/// Returns `None` when the record lacks a slug, name or type.
#[must_use]
pub fn entity_from_record(record: &Value) -> Option<Entity> {
    let map = record.as_mapping()?;
    let mut entity = Entity::new(
        &identity_text(map, "slug")?,
        &identity_text(map, "name")?,
        &identity_text(map, "type")?,
    );

    entity.description = non_empty_text(map, "description");
    entity.website = non_empty_text(map, "website");
    entity.github = non_empty_text(map, "github");
    entity.twitter = non_empty_text(map, "twitter");

    if let Some(metrics) = map.get("metrics").and_then(Value::as_mapping) {
        for (key, value) in metrics {
            match (key.as_str(), value.as_f64()) {
                (Some(key), Some(n)) => {
                    entity.metrics.insert(key.to_string(), n);
                }
                _ => debug!(entity = %entity.slug, "Ignoring non-numeric metric {:?}", key),
            }
        }
    }

    if let Some(tags) = map.get("tags").and_then(Value::as_sequence) {
        entity.tags = tags.iter().filter_map(Value::as_str).map(str::to_string).collect();
    }

    if let Some(rels) = map.get("relationships").and_then(Value::as_sequence) {
        entity.relationships = rels
            .iter()
            .filter_map(|value| embedded_relationship(&entity.slug, value))
            .collect();
    }

    for (key, value) in map {
        let Some(key) = key.as_str() else { continue };
        if KNOWN_KEYS.contains(&key) {
            continue;
        }
        match AuxValue::from_yaml(value) {
            Some(aux) => {
                entity.extra.insert(key.to_string(), aux);
            }
            None => debug!(entity = %entity.slug, "Ignoring field {} with unsupported shape", key),
        }
    }

    Some(entity)
}

/// Keep the records that identify an entity; returns the entities and the drop count
#[must_use]
pub fn sanitize(records: &[Value]) -> (Vec<Entity>, usize) {
    let entities: Vec<Entity> = records.iter().filter_map(entity_from_record).collect();
    let dropped = records.len() - entities.len();
    (entities, dropped)
}

/// Load and filter all entities named by the manifest
pub async fn load_entities(
    source: &dyn ResourceSource,
    manifest: &Manifest,
) -> Result<Vec<Entity>, LoadError> {
    let records = load_records(source, manifest).await;
    info!("Loaded {} records from {}", records.len(), source.describe());

    let (entities, dropped) = sanitize(&records);
    if dropped > 0 {
        warn!("Filtered out {} invalid entities", dropped);
    }

    if entities.is_empty() {
        return Err(LoadError::NoEntities {
            attempted: manifest.paths().len(),
        });
    }

    Ok(entities)
}

/// Load the manual relationships document; absence is not an error
pub async fn load_manual_relationships(
    source: &dyn ResourceSource,
    path: &str,
) -> Option<ManualRelationshipsConfig> {
    let text = match source.fetch(path).await {
        Ok(text) => text,
        Err(e) if e.is_not_found() => {
            info!("No manual relationships at {}", path);
            return None;
        }
        Err(e) => {
            warn!("Could not load manual relationships: {}", e);
            return None;
        }
    };

    match serde_yaml::from_str::<Value>(&text) {
        Ok(Value::Null) => None,
        Ok(value @ Value::Mapping(_)) => Some(ManualRelationshipsConfig::from_yaml(&value)),
        Ok(_) => {
            warn!("Ignoring manual relationships in {}: expected a mapping", path);
            None
        }
        Err(e) => {
            warn!("Ignoring unparseable manual relationships in {}: {}", path, e);
            None
        }
    }
}

// =============================================================================
// Dataset assembly
// =============================================================================

/// Combine filtered entities and manual relationships into a dataset
#[must_use]
pub fn assemble_dataset(entities: Vec<Entity>, manual: Option<ManualRelationshipsConfig>) -> Dataset {
    let resolution = relationships::resolve(&entities, manual.as_ref());

    let mut entity_types: Vec<String> = Vec::new();
    let mut entity_type_counts: BTreeMap<String, usize> = BTreeMap::new();
    for entity in &entities {
        if !entity_types.contains(&entity.entity_type) {
            entity_types.push(entity.entity_type.clone());
        }
        *entity_type_counts.entry(entity.entity_type.clone()).or_default() += 1;
    }

    let manual_count = resolution.relationships.iter().filter(|r| r.is_manual).count();
    let metadata = DatasetMetadata {
        last_updated: Utc::now(),
        total_entities: entities.len(),
        entity_type_counts,
        manual_relationships: manual_count,
        entity_relationships: resolution.relationships.len() - manual_count,
        overwritten_relationships: resolution.overwritten,
    };

    let manual = manual.unwrap_or_default();
    Dataset {
        entities,
        entity_types,
        relationships: resolution.relationships,
        categories: manual.categories,
        relationship_types: manual.types,
        metadata,
    }
}

/// Load entities and manual relationships concurrently and resolve them
pub async fn load_dataset(
    source: &dyn ResourceSource,
    layout: &ResourceLayout,
) -> Result<Dataset, LoadError> {
    let (entities, manual) = futures::join!(
        load_entities(source, &layout.manifest),
        load_manual_relationships(source, &layout.relationships),
    );
    let dataset = assemble_dataset(entities?, manual);

    info!("Successfully loaded {} valid entities", dataset.metadata.total_entities);
    info!("Entity types: {:?}", dataset.entity_types);
    Ok(dataset)
}
