// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Inspect command - loads the dataset and render configuration and summarises them

use super::Output;
use crate::config::Config;
use crate::render::RenderConfig;
use crate::types::DatasetMetadata;
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectReport<'a> {
    source: String,
    entity_types: &'a [String],
    metadata: &'a DatasetMetadata,
    render_config: &'a RenderConfig,
}

/// Run the inspect command
pub async fn run(settings: &Config, out: Output) -> Result<()> {
    let mut session = super::session(settings);
    info!("Inspecting {}", session.source().describe());

    let dataset = session.dataset().await.context("Failed to load data")?;
    let config = session.render_config().await;

    if out.json {
        return out.print_json(&InspectReport {
            source: session.source().describe(),
            entity_types: &dataset.entity_types,
            metadata: &dataset.metadata,
            render_config: &config,
        });
    }

    let meta = &dataset.metadata;
    println!("{}", out.heading(&format!("Dataset ({})", session.source().describe())));
    println!("  entities: {}", meta.total_entities);
    for entity_type in &dataset.entity_types {
        let count = meta.entity_type_counts.get(entity_type).copied().unwrap_or(0);
        println!("    {entity_type}: {count}");
    }
    println!(
        "  relationships: {} ({} embedded, {} manual, {} overwritten)",
        dataset.relationships.len(),
        meta.entity_relationships,
        meta.manual_relationships,
        meta.overwritten_relationships
    );
    if !dataset.categories.is_empty() {
        let keys: Vec<_> = dataset.categories.keys().map(String::as_str).collect();
        println!("  categories: {}", keys.join(", "));
    }
    if !dataset.relationship_types.is_empty() {
        let keys: Vec<_> = dataset.relationship_types.keys().map(String::as_str).collect();
        println!("  relationship types: {}", keys.join(", "));
    }

    println!();
    println!("{}", out.heading("Render configuration"));
    println!("  view: {}", config.view_type);
    println!("  entity types: {}", config.entity_types.join(", "));
    if let Some(table) = &config.table {
        println!("  table: {} columns", table.columns.len());
    }
    if let Some(graph) = &config.graph {
        let physics: Vec<String> = graph
            .physics
            .entries()
            .into_iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        println!("  graph physics: {}", physics.join(", "));
    }

    Ok(())
}
