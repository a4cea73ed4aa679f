// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Check-config command - validates the render configuration document

use super::Output;
use crate::config::Config;
use crate::render;
use anyhow::{Context, Result};

/// Run the check-config command
///
/// With `show`, the effective configuration is printed after the check.
pub async fn run(settings: &Config, show: bool, out: Output) -> Result<()> {
    let source = super::resource_source(settings);
    let path = settings.layout().render_config;

    let config = match render::try_load_render_config(source.as_ref(), &path).await {
        Ok(config) => config,
        Err(e) => {
            if !out.json {
                println!("{} {}", out.error("Invalid render configuration:"), e);
                println!("  the viewer falls back to the default configuration");
            }
            anyhow::bail!("Render configuration {} is invalid: {}", path, e);
        }
    };

    if out.json {
        return out.print_json(&config);
    }

    println!("{} {}", out.ok("Render configuration OK:"), path);
    if show {
        let yaml = serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
        println!();
        print!("{yaml}");
    }
    Ok(())
}
