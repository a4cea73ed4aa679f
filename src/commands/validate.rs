// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Validate command - checks every data record against the entity schema

use super::Output;
use crate::config::Config;
use crate::loader::{self, flatten_document};
use crate::schema::{SchemaValidator, ValidationReport};
use anyhow::{Context, Result};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Arguments for the validate command
#[derive(Debug, Default)]
pub struct ValidateArgs {
    /// Validate every YAML file in this directory instead of the manifest
    pub dir: Option<PathBuf>,
    /// Schema file overriding the configured schema resource
    pub schema: Option<PathBuf>,
    /// Show diagnostics for at most this many invalid records
    pub limit: Option<usize>,
}

fn read_dir_records(dir: &Path) -> Result<Vec<Value>> {
    if !dir.is_dir() {
        anyhow::bail!("Could not access data directory: {}", dir.display());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .map(walkdir::DirEntry::into_path)
        .filter(|p| {
            p.is_file() && matches!(p.extension().and_then(|e| e.to_str()), Some("yml" | "yaml"))
        })
        .collect();
    files.sort();

    let mut records = Vec::new();
    for file in files {
        let parsed = fs::read_to_string(&file)
            .map_err(anyhow::Error::from)
            .and_then(|text| serde_yaml::from_str::<Value>(&text).map_err(anyhow::Error::from));
        match parsed {
            Ok(document) => records.extend(flatten_document(document)),
            Err(e) => warn!("Could not load {}: {}", file.display(), e),
        }
    }
    Ok(records)
}

fn print_report(report: &ValidationReport, limit: Option<usize>, out: Output) {
    println!("{}", out.heading("Validation Results:"));
    println!("  {} {}", out.ok("valid entities:"), report.valid);
    println!("  {} {}", out.error("invalid entities:"), report.invalid.len());

    if report.invalid.is_empty() {
        return;
    }

    println!();
    println!("{}", out.error("Validation Errors:"));
    let shown = limit.unwrap_or(report.invalid.len());
    for entity in report.invalid.iter().take(shown) {
        println!("\n  Entity: {}", entity.slug);
        for diagnostic in &entity.diagnostics {
            println!("    - {}: {}", diagnostic.field, diagnostic.message);
        }
    }
    if report.invalid.len() > shown {
        println!("\n  ... and {} more errors", report.invalid.len() - shown);
    }
}

/// Run the validate command
pub async fn run(settings: &Config, args: ValidateArgs, out: Output) -> Result<()> {
    let source = super::resource_source(settings);
    let layout = settings.layout();

    let schema_text = match &args.schema {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema {}", path.display()))?,
        None => source
            .fetch(&layout.schema)
            .await
            .with_context(|| format!("Failed to load schema {}", layout.schema))?,
    };
    let validator = SchemaValidator::from_yaml_str(&schema_text).context("Failed to compile schema")?;
    info!("Schema loaded successfully");

    let records = match &args.dir {
        Some(dir) => read_dir_records(dir)?,
        None => loader::load_records(source.as_ref(), &layout.manifest).await,
    };
    info!("Loaded {} entities", records.len());

    if records.is_empty() {
        anyhow::bail!("No entities found in data files");
    }

    let report = validator.validate_all(&records);
    if out.json {
        out.print_json(&report)?;
    } else {
        print_report(&report, args.limit, out);
    }

    if report.exceeds_threshold() {
        anyhow::bail!(
            "Too many validation errors ({} of {}) - check schema compatibility",
            report.invalid.len(),
            report.total
        );
    }
    if !report.invalid.is_empty() && !out.json {
        println!("\n{}", out.warn("Some entities have validation errors but majority are valid"));
    }
    if !out.json {
        println!("\n{}", out.ok("Data validation completed!"));
    }
    Ok(())
}
