// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Import of upstream ecosystem records
//!
//! The upstream catalogue keeps one YAML file per project with a category
//! list, readiness levels, web links and metric time series. Each record is
//! converted into an [`Entity`] and the results are bucketed into the
//! `parachains`, `dapps` and `infrastructure` data resources.

use crate::types::Entity;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// One point of an upstream metric series
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MetricPoint {
    /// Sample date
    #[serde(default)]
    pub date: Option<String>,
    /// Sample value
    pub value: f64,
}

/// Readiness levels of an upstream project
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Readiness {
    /// Business readiness
    pub business: Option<String>,
    /// Technology readiness
    pub technology: Option<String>,
}

/// Web presence of an upstream project
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WebLinks {
    /// Project site
    pub site: Option<String>,
    /// Twitter handle or URL
    pub twitter: Option<String>,
    /// GitHub URL
    pub github: Option<String>,
}

/// Upstream metric series
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpstreamMetrics {
    /// Twitter follower series
    #[serde(default)]
    pub twitter: Vec<MetricPoint>,
    /// GitHub star series
    #[serde(default)]
    pub github: Vec<MetricPoint>,
}

/// A project record in the upstream format
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpstreamRecord {
    /// Project name
    pub name: String,
    /// Categories
    #[serde(default)]
    pub category: Vec<String>,
    /// Description
    pub description: Option<String>,
    /// Readiness levels
    pub readiness: Option<Readiness>,
    /// Ecosystems the project belongs to
    #[serde(default)]
    pub ecosystem: Vec<String>,
    /// Layers (e.g. `Layer-1`)
    #[serde(default)]
    pub layer: Vec<String>,
    /// Web links
    pub web: Option<WebLinks>,
    /// Metric series
    pub metrics: Option<UpstreamMetrics>,
}

/// Derive a slug from a project name
#[must_use]
pub fn generate_slug(name: &str) -> String {
    let cleaned: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect();

    let mut slug = String::with_capacity(cleaned.len());
    for c in cleaned.chars() {
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }
    slug
}

/// Entity type for an upstream record
#[must_use]
pub fn categorize(record: &UpstreamRecord) -> &'static str {
    if record.category.is_empty() {
        return "infrastructure";
    }

    let categories: Vec<String> = record.category.iter().map(|c| c.to_lowercase()).collect();
    let has = |name: &str| categories.iter().any(|c| c == name);

    if has("wallet") {
        "wallet"
    } else if has("defi") || has("exchange") {
        "defi"
    } else if has("dapp") || has("game") {
        "dapp"
    } else if has("bridge") {
        "bridge"
    } else if has("nft") {
        "nft"
    } else if has("oracle") || has("api") || has("infra") {
        "infrastructure"
    } else if record.layer.iter().any(|l| l == "Layer-1") {
        "parachain"
    } else {
        let technology = record.readiness.as_ref().and_then(|r| r.technology.as_deref());
        match technology {
            Some("Connected to Parachain" | "Connected to Relay chain") => "parachain",
            _ => "infrastructure",
        }
    }
}

fn tag(value: &str) -> String {
    value
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Convert an upstream record into an entity
#[must_use]
pub fn transform(record: &UpstreamRecord) -> Entity {
    let mut entity = Entity::new(&generate_slug(&record.name), &record.name, categorize(record));
    entity.description.clone_from(&record.description);

    if let Some(web) = &record.web {
        entity.website = web.site.as_ref().map(|site| {
            if site.starts_with("http://") || site.starts_with("https://") {
                site.clone()
            } else {
                format!("https://{site}")
            }
        });
        entity.github.clone_from(&web.github);
        entity.twitter = web.twitter.as_ref().map(|handle| {
            if handle.starts_with("http") {
                handle.clone()
            } else {
                format!("https://twitter.com/{handle}")
            }
        });
    }

    if let Some(metrics) = &record.metrics {
        if let Some(latest) = metrics.github.last() {
            entity.metrics.insert("stars".into(), latest.value);
        }
        if let Some(latest) = metrics.twitter.last() {
            entity.metrics.insert("twitter_followers".into(), latest.value);
        }
    }

    for value in record.category.iter().chain(&record.ecosystem) {
        let tag = tag(value);
        if !entity.tags.contains(&tag) {
            entity.tags.push(tag);
        }
    }

    entity
}

/// Output data resource for an imported entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Bucket {
    /// `parachains.yml`
    Parachains,
    /// `dapps.yml`
    Dapps,
    /// `infrastructure.yml`
    Infrastructure,
}

impl Bucket {
    /// Bucket for an entity type
    #[must_use]
    pub fn for_type(entity_type: &str) -> Self {
        match entity_type {
            "parachain" => Self::Parachains,
            "dapp" | "defi" | "nft" | "gaming" => Self::Dapps,
            _ => Self::Infrastructure,
        }
    }

    /// Resource name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Parachains => "parachains",
            Self::Dapps => "dapps",
            Self::Infrastructure => "infrastructure",
        }
    }
}

/// Imported entities grouped by output resource
#[derive(Debug, Clone, Default)]
pub struct ImportBatch {
    /// Entities per bucket, in input order
    pub buckets: BTreeMap<Bucket, Vec<Entity>>,
    /// Files that could not be read or parsed
    pub failed: Vec<PathBuf>,
}

impl ImportBatch {
    /// Add an entity to its bucket
    pub fn push(&mut self, entity: Entity) {
        self.buckets
            .entry(Bucket::for_type(&entity.entity_type))
            .or_default()
            .push(entity);
    }

    /// Number of entities in a bucket
    #[must_use]
    pub fn count(&self, bucket: Bucket) -> usize {
        self.buckets.get(&bucket).map_or(0, Vec::len)
    }

    /// Total number of imported entities
    #[must_use]
    pub fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("yaml" | "yml"))
}

/// Read every upstream record under `dir`, skipping files that do not parse
pub fn read_upstream_dir(dir: &Path) -> Result<ImportBatch> {
    if !dir.is_dir() {
        anyhow::bail!("{} is not a directory", dir.display());
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file() && is_yaml(e.path()))
        .map(walkdir::DirEntry::into_path)
        .collect();
    paths.sort();

    let mut batch = ImportBatch::default();
    for path in paths {
        let parsed = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))
            .and_then(|text| {
                serde_yaml::from_str::<UpstreamRecord>(&text)
                    .with_context(|| format!("Failed to parse {}", path.display()))
            });

        match parsed {
            Ok(record) => {
                debug!("Imported {}", record.name);
                batch.push(transform(&record));
            }
            Err(e) => {
                warn!("{:#}", e);
                batch.failed.push(path);
            }
        }
    }

    info!("Imported {} records ({} failed)", batch.total(), batch.failed.len());
    Ok(batch)
}

/// Write every bucket as `<name>.yml` under `out`
///
/// All three resources are written, empty ones included.
pub fn write_batch(batch: &ImportBatch, out: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out).with_context(|| format!("Failed to create {}", out.display()))?;

    let empty = Vec::new();
    let mut written = Vec::new();
    for bucket in [Bucket::Parachains, Bucket::Dapps, Bucket::Infrastructure] {
        let entities = batch.buckets.get(&bucket).unwrap_or(&empty);
        let path = out.join(format!("{}.yml", bucket.name()));
        let yaml = serde_yaml::to_string(entities)
            .with_context(|| format!("Failed to serialize {}", bucket.name()))?;
        fs::write(&path, yaml).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote {} items to {}", entities.len(), path.display());
        written.push(path);
    }
    Ok(written)
}
