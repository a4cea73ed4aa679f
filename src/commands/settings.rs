// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Settings command - prints the effective settings

use super::Output;
use crate::config::{self, Config};
use anyhow::Result;

/// Run the settings command
pub fn run(settings: &Config, out: Output) -> Result<()> {
    if out.json {
        return out.print_json(settings);
    }

    if let Some(path) = config::default_config_path() {
        println!("# settings file: {}", path.display());
    }
    print!("{}", settings.to_toml()?);
    Ok(())
}
