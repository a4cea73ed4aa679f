// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Command implementations

pub mod check_config;
pub mod check_schema;
pub mod completions;
pub mod export;
pub mod import;
pub mod inspect;
pub mod lint;
pub mod settings;
pub mod validate;

use crate::config::Config;
use crate::session::DataSession;
use crate::source::{DirSource, HttpSource, ResourceSource};
use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Output options shared by every command
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    /// Emit machine-readable JSON instead of text
    pub json: bool,
    /// Use ANSI colours in text output
    pub color: bool,
}

impl Output {
    /// Green text
    #[must_use]
    pub fn ok(&self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    /// Yellow text
    #[must_use]
    pub fn warn(&self, text: &str) -> String {
        if self.color {
            text.yellow().to_string()
        } else {
            text.to_string()
        }
    }

    /// Red text
    #[must_use]
    pub fn error(&self, text: &str) -> String {
        if self.color {
            text.red().to_string()
        } else {
            text.to_string()
        }
    }

    /// Bold text
    #[must_use]
    pub fn heading(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// Print a value as pretty JSON on stdout
    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// The source the settings point at: the base URL if set, else the data directory
#[must_use]
pub fn resource_source(settings: &Config) -> Box<dyn ResourceSource> {
    match &settings.base_url {
        Some(url) => Box::new(HttpSource::new(url)),
        None => Box::new(DirSource::new(&settings.data_dir)),
    }
}

/// A fresh session over the configured source
#[must_use]
pub fn session(settings: &Config) -> DataSession {
    DataSession::new(resource_source(settings), settings.layout())
}
