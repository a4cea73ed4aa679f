// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Session context owning the loaded dataset and render configuration
//!
//! Both snapshots are loaded on first use and shared as `Arc`s. They are
//! never mutated; a reload replaces the snapshot as a whole.

use crate::error::LoadError;
use crate::loader::{self, ResourceLayout};
use crate::render::{self, RenderConfig};
use crate::source::ResourceSource;
use crate::types::Dataset;
use std::sync::Arc;
use tracing::info;

/// Explicit owner of the resolved dataset and configuration
pub struct DataSession {
    source: Box<dyn ResourceSource>,
    layout: ResourceLayout,
    dataset: Option<Arc<Dataset>>,
    render_config: Option<Arc<RenderConfig>>,
}

impl std::fmt::Debug for DataSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSession")
            .field("source", &self.source.describe())
            .field("layout", &self.layout)
            .field("dataset_loaded", &self.dataset.is_some())
            .field("config_loaded", &self.render_config.is_some())
            .finish()
    }
}

impl DataSession {
    /// Create a session over a source; nothing is fetched yet
    #[must_use]
    pub fn new(source: Box<dyn ResourceSource>, layout: ResourceLayout) -> Self {
        Self {
            source,
            layout,
            dataset: None,
            render_config: None,
        }
    }

    /// Source the session reads from
    #[must_use]
    pub fn source(&self) -> &dyn ResourceSource {
        self.source.as_ref()
    }

    /// Resource locations
    #[must_use]
    pub fn layout(&self) -> &ResourceLayout {
        &self.layout
    }

    /// The dataset, loading it on first use
    pub async fn dataset(&mut self) -> Result<Arc<Dataset>, LoadError> {
        if let Some(dataset) = &self.dataset {
            return Ok(Arc::clone(dataset));
        }
        let dataset = Arc::new(loader::load_dataset(self.source.as_ref(), &self.layout).await?);
        self.dataset = Some(Arc::clone(&dataset));
        Ok(dataset)
    }

    /// The render configuration, loading it on first use
    ///
    /// Never fails: an unusable document yields the built-in defaults.
    pub async fn render_config(&mut self) -> Arc<RenderConfig> {
        if let Some(config) = &self.render_config {
            return Arc::clone(config);
        }
        let config = Arc::new(
            render::load_render_config(self.source.as_ref(), &self.layout.render_config).await,
        );
        self.render_config = Some(Arc::clone(&config));
        config
    }

    /// Drop both snapshots; the next access reloads them
    pub fn invalidate(&mut self) {
        self.dataset = None;
        self.render_config = None;
    }

    /// Load fresh snapshots and swap them in
    ///
    /// On failure the previous snapshots stay in place.
    pub async fn reload(&mut self) -> Result<Arc<Dataset>, LoadError> {
        let (dataset, config) = futures::join!(
            loader::load_dataset(self.source.as_ref(), &self.layout),
            render::load_render_config(self.source.as_ref(), &self.layout.render_config),
        );
        let dataset = Arc::new(dataset?);
        self.dataset = Some(Arc::clone(&dataset));
        self.render_config = Some(Arc::new(config));
        info!("Session reloaded from {}", self.source.describe());
        Ok(dataset)
    }
}
