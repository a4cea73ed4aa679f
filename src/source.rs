// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Resource sources - where data, relationship, config and schema documents come from

use crate::error::SourceError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Something that can hand out named text resources
#[async_trait]
pub trait ResourceSource: Send + Sync {
    /// Fetch the resource at `path` (relative, `/`-separated)
    async fn fetch(&self, path: &str) -> Result<String, SourceError>;

    /// Human-readable description for log lines
    fn describe(&self) -> String;
}

/// Resources stored under a local directory
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// Serve resources relative to `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ResourceSource for DirSource {
    async fn fetch(&self, path: &str) -> Result<String, SourceError> {
        let full = self.root.join(path.trim_start_matches('/'));
        match tokio::fs::read_to_string(&full).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SourceError::NotFound(path.to_string()))
            }
            Err(source) => Err(SourceError::Io {
                path: path.to_string(),
                source,
            }),
        }
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Resources served over HTTP below a base URL
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSource {
    /// Serve resources relative to `base_url`
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl ResourceSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<String, SourceError> {
        let response = self
            .client
            .get(self.url_for(path))
            .send()
            .await
            .map_err(|source| SourceError::Http {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| SourceError::Http {
            path: path.to_string(),
            source,
        })
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// Resources held in memory, keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    resources: BTreeMap<String, String>,
}

impl MemorySource {
    /// Empty source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource
    #[must_use]
    pub fn with(mut self, path: &str, content: &str) -> Self {
        self.insert(path, content);
        self
    }

    /// Add or replace a resource
    pub fn insert(&mut self, path: &str, content: &str) {
        self.resources.insert(path.to_string(), content.to_string());
    }

    /// Remove a resource
    pub fn remove(&mut self, path: &str) {
        self.resources.remove(path);
    }
}

#[async_trait]
impl ResourceSource for MemorySource {
    async fn fetch(&self, path: &str) -> Result<String, SourceError> {
        self.resources
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(path.to_string()))
    }

    fn describe(&self) -> String {
        format!("memory ({} resources)", self.resources.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_dir_source_reads_relative_paths() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        std::fs::write(dir.path().join("data/dapps.yml"), "- slug: a\n").unwrap();

        let source = DirSource::new(dir.path());
        let text = source.fetch("data/dapps.yml").await.unwrap();
        assert!(text.contains("slug: a"));
    }

    #[tokio::test]
    async fn test_dir_source_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let source = DirSource::new(dir.path());

        let err = source.fetch("render.yaml").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_http_source_joins_urls() {
        let source = HttpSource::new("https://example.org/app/");
        assert_eq!(source.url_for("/data/nft.yml"), "https://example.org/app/data/nft.yml");
    }
}
