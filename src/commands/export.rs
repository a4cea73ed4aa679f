// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Export command - exports the relationship graph to various formats

use crate::config::Config;
use crate::filter::EntityFilter;
use crate::graph::RelationshipGraph;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Graphviz DOT format
    Dot,
    /// JSON view model
    Json,
}

impl ExportFormat {
    /// Parse format from string
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "dot" | "graphviz" => Some(Self::Dot),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// File extension for the format
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Dot => "dot",
            Self::Json => "json",
        }
    }
}

/// Arguments for the export command
#[derive(Debug, Default)]
pub struct ExportArgs {
    /// Output format name
    pub format: String,
    /// Write here instead of stdout
    pub output: Option<PathBuf>,
    /// Restrict to these entity types instead of the configured ones
    pub types: Vec<String>,
    /// Free-text search over name, description and tags
    pub search: Option<String>,
}

/// Run the export command
pub async fn run(settings: &Config, args: ExportArgs) -> Result<()> {
    let format = ExportFormat::parse(&args.format).ok_or_else(|| {
        anyhow::anyhow!("Unknown export format: {}. Supported: dot, json", args.format)
    })?;
    info!("Exporting to {}", format.extension());

    let mut session = super::session(settings);
    let dataset = session.dataset().await.context("Failed to load data")?;
    let config = session.render_config().await;

    let entity_types = if args.types.is_empty() {
        config.entity_types.clone()
    } else {
        args.types.clone()
    };
    let mut filter = EntityFilter::new();
    if let Some(term) = &args.search {
        filter = filter.with_search(term);
    }

    let graph = RelationshipGraph::build(&dataset, &entity_types, &config.graph_or_default(), Some(&filter));
    if graph.is_empty() {
        eprintln!("Warning: no entities match the selected types");
    }

    let content = match format {
        ExportFormat::Dot => graph.to_dot(),
        ExportFormat::Json => graph.to_json()?,
    };

    match args.output {
        Some(path) => {
            fs::write(&path, &content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
            println!(
                "Exported {} nodes and {} links to {}",
                graph.node_count(),
                graph.edge_count(),
                path.display()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}
