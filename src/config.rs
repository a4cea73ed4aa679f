// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then `ECOVIEW_*` environment variables. Command-line overrides are
//! applied by the caller afterwards.

use crate::loader::{Manifest, ResourceLayout, DEFAULT_RESOURCES};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "ECOVIEW";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the data, relationships, render and schema documents
    pub data_dir: PathBuf,
    /// Base URL to fetch documents from instead of `data_dir`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Data resources, fetched as `data/<name>.yml`
    pub resources: Vec<String>,
    /// Catch-all resource, fetched as `<name>.yml`; empty disables it
    pub catch_all: String,
    /// Manual relationships document
    pub relationships_file: String,
    /// Render configuration document
    pub render_config_file: String,
    /// Entity schema document
    pub schema_file: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        let layout = ResourceLayout::default();
        Self {
            data_dir: PathBuf::from("public"),
            base_url: None,
            resources: DEFAULT_RESOURCES.iter().map(|s| (*s).to_string()).collect(),
            catch_all: "data".to_string(),
            relationships_file: layout.relationships,
            render_config_file: layout.render_config,
            schema_file: layout.schema,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Resource locations described by these settings
    #[must_use]
    pub fn layout(&self) -> ResourceLayout {
        ResourceLayout {
            manifest: Manifest {
                resources: self.resources.clone(),
                catch_all: Some(self.catch_all.clone()).filter(|s| !s.is_empty()),
            },
            relationships: self.relationships_file.clone(),
            render_config: self.render_config_file.clone(),
            schema: self.schema_file.clone(),
        }
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize settings")
    }
}

/// Platform location of the settings file
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("org", "hyperpolymath", "ecoview")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load configuration from an explicit file, the platform file, and the environment
///
/// An explicit `path` must exist; the platform file is optional.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let file = match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Settings file not found: {}", path.display());
            }
            Some(path.to_path_buf())
        }
        None => default_config_path(),
    };

    let mut builder = config::Config::builder();
    if let Some(file) = &file {
        builder = builder.add_source(
            config::File::from(file.as_path())
                .format(config::FileFormat::Toml)
                .required(false),
        );
    }
    builder = builder.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("resources"),
    );

    let settings = builder.build().context("Failed to read settings")?;
    settings
        .try_deserialize::<Config>()
        .context("Invalid settings")
}
