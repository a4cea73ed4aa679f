// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Check-schema command - compares two schema revisions for compatibility

use super::Output;
use crate::compat::{self, CompatibilityReport};
use anyhow::{Context, Result};
use serde_yaml::Value;
use std::fs;
use std::path::Path;
use tracing::info;

fn read_schema(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("Failed to parse schema {}", path.display()))
}

fn print_section(title: &str, items: &[String], marker: &str) {
    if items.is_empty() {
        return;
    }
    println!("\n{title}");
    for item in items {
        println!("  {marker} {item}");
    }
}

fn print_report(report: &CompatibilityReport, out: Output) {
    println!("{}", out.heading("Schema Compatibility Report"));
    print_section(&out.error("Breaking Changes:"), &report.breaking_changes, "-");
    print_section(&out.warn("Warnings:"), &report.warnings, "-");
    print_section("New Properties (+):", &report.new_properties, "+");
    print_section("Removed Properties (-):", &report.removed_properties, "-");
    println!();
    if report.is_compatible() {
        println!("{}", out.ok("Schema is backward compatible"));
    } else {
        println!("{}", out.error("Schema has breaking changes"));
    }
}

/// Run the check-schema command
pub fn run(old: &Path, new: &Path, out: Output) -> Result<()> {
    info!("Comparing {} with {}", old.display(), new.display());
    let report = compat::compare(&read_schema(old)?, &read_schema(new)?);

    if out.json {
        out.print_json(&report)?;
    } else {
        print_report(&report, out);
    }

    if !report.is_compatible() {
        anyhow::bail!(
            "{} breaking change(s) between {} and {}",
            report.breaking_changes.len(),
            old.display(),
            new.display()
        );
    }
    Ok(())
}
