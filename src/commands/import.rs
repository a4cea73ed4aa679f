// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Import command - converts upstream catalogue records into data resources

use super::Output;
use crate::import::{self, Bucket};
use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct ImportSummary {
    parachains: usize,
    dapps: usize,
    infrastructure: usize,
    failed: Vec<PathBuf>,
    written: Vec<PathBuf>,
}

/// Run the import command
pub fn run(src: &Path, out_dir: &Path, out: Output) -> Result<()> {
    let batch = import::read_upstream_dir(src)?;
    let written = import::write_batch(&batch, out_dir)?;

    let summary = ImportSummary {
        parachains: batch.count(Bucket::Parachains),
        dapps: batch.count(Bucket::Dapps),
        infrastructure: batch.count(Bucket::Infrastructure),
        failed: batch.failed.clone(),
        written,
    };

    if out.json {
        return out.print_json(&summary);
    }

    println!("{}", out.heading("Import Summary:"));
    println!("  Parachains: {}", summary.parachains);
    println!("  DApps: {}", summary.dapps);
    println!("  Infrastructure: {}", summary.infrastructure);
    println!("  Total: {}", batch.total());
    if !summary.failed.is_empty() {
        println!("\n{}", out.warn("Skipped files:"));
        for path in &summary.failed {
            println!("  - {}", path.display());
        }
    }
    println!("\n{} {}", out.ok("Wrote resources to"), out_dir.display());
    Ok(())
}
