// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Lint-relationships command - checks the manual relationships document

use super::Output;
use crate::config::Config;
use crate::lint::{self, LintReport};
use crate::loader;
use anyhow::{Context, Result};
use serde_yaml::Value;
use std::collections::HashSet;
use tracing::info;

fn print_report(report: &LintReport, out: Output) {
    println!("{}", out.heading("Relationship Lint"));
    println!(
        "  checked {} relationships, {} categories, {} types",
        report.relationships, report.categories, report.types
    );

    let errors: Vec<_> = report.errors().collect();
    if !errors.is_empty() {
        println!("\n{}", out.error("Errors:"));
        for finding in errors {
            println!("  - {finding}");
        }
    }
    let warnings: Vec<_> = report.warnings().collect();
    if !warnings.is_empty() {
        println!("\n{}", out.warn("Warnings:"));
        for finding in warnings {
            println!("  - {finding}");
        }
    }
    if report.findings.is_empty() {
        println!("\n{}", out.ok("No problems found"));
    }
}

/// Run the lint-relationships command
///
/// With `check_entities`, every endpoint must name a loaded entity.
pub async fn run(settings: &Config, check_entities: bool, out: Output) -> Result<()> {
    let source = super::resource_source(settings);
    let layout = settings.layout();

    let text = source
        .fetch(&layout.relationships)
        .await
        .with_context(|| format!("Failed to load {}", layout.relationships))?;
    let document: Value = serde_yaml::from_str(&text)
        .with_context(|| format!("Failed to parse {}", layout.relationships))?;
    if document.is_null() {
        anyhow::bail!("{} is empty", layout.relationships);
    }

    let known = if check_entities {
        let records = loader::load_records(source.as_ref(), &layout.manifest).await;
        let (entities, _) = loader::sanitize(&records);
        info!("Checking endpoints against {} entities", entities.len());
        Some(entities.into_iter().map(|e| e.slug).collect::<HashSet<_>>())
    } else {
        None
    };

    let report = lint::lint(&document, known.as_ref());
    if out.json {
        out.print_json(&report)?;
    } else {
        print_report(&report, out);
    }

    if report.has_errors() {
        anyhow::bail!("{} relationship error(s) found", report.errors().count());
    }
    Ok(())
}
