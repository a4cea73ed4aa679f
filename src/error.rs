// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Error types shared by the loader, resolvers and validators

use crate::render::ViewType;
use thiserror::Error;

/// Failure to fetch a single named resource
#[derive(Debug, Error)]
pub enum SourceError {
    /// The resource does not exist at the source
    #[error("resource not found: {0}")]
    NotFound(String),
    /// Local I/O failure
    #[error("failed to read {path}: {source}")]
    Io {
        /// Resource path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// Transport failure talking to a remote source
    #[error("request for {path} failed: {source}")]
    Http {
        /// Resource path
        path: String,
        /// Underlying error
        #[source]
        source: reqwest::Error,
    },
    /// The remote source answered with a non-success status
    #[error("request for {path} returned status {status}")]
    Status {
        /// Resource path
        path: String,
        /// HTTP status code
        status: u16,
    },
}

impl SourceError {
    /// Whether this error only means "the resource is absent"
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Failure while loading data resources
#[derive(Debug, Error)]
pub enum LoadError {
    /// A single resource could not be fetched
    #[error(transparent)]
    Source(#[from] SourceError),
    /// A single resource could not be parsed
    #[error("failed to parse {resource}: {source}")]
    Parse {
        /// Resource path
        resource: String,
        /// Underlying error
        #[source]
        source: serde_yaml::Error,
    },
    /// Nothing usable survived loading and filtering
    #[error("no entities loaded from {attempted} resource(s); check that the data files are available")]
    NoEntities {
        /// Number of resources that were attempted
        attempted: usize,
    },
}

/// Structural problem with a merged render configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid YAML or has the wrong shape
    #[error("failed to parse render configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// `viewType` is missing or not one of the supported views
    #[error("invalid viewType {found:?}: must be 'table' or 'graph'")]
    InvalidViewType {
        /// Value found in the document
        found: Option<String>,
    },
    /// `entityTypes` is missing or empty
    #[error("entityTypes must be a non-empty list")]
    EmptyEntityTypes,
    /// The section for the selected view is absent
    #[error("{view} configuration is required when viewType is \"{view}\"")]
    MissingSection {
        /// Selected view
        view: ViewType,
    },
    /// The table declares no columns
    #[error("table must have at least one column defined")]
    NoColumns,
    /// A column lacks its key or label
    #[error("column {index} must have both 'key' and 'label' properties")]
    ColumnIdentity {
        /// Column position
        index: usize,
    },
    /// A column type is missing or unsupported
    #[error("invalid column type {found:?} for column {index}: must be one of string, number, date, link, tags")]
    InvalidColumnType {
        /// Column position
        index: usize,
        /// Value found in the document
        found: Option<String>,
    },
    /// The default sort is incomplete or has an unknown direction
    #[error("defaultSort must name a column and a direction of 'asc' or 'desc'")]
    InvalidDefaultSort,
    /// A physics parameter is not a number
    #[error("physics parameter {key} must be a number")]
    PhysicsNotNumeric {
        /// Parameter name
        key: String,
    },
    /// A styling rule lacks its property or field
    #[error("{context} must have 'property' and 'field' defined")]
    RuleIdentity {
        /// Which rule
        context: &'static str,
    },
    /// A styling rule has an unsupported scale
    #[error("{context} scale must be 'linear', 'log', or 'sqrt' (found {found:?})")]
    InvalidScale {
        /// Which rule
        context: &'static str,
        /// Value found in the document
        found: Option<String>,
    },
    /// A styling rule domain is not a numeric pair
    #[error("{context} domain must be an array of two numbers")]
    InvalidDomain {
        /// Which rule
        context: &'static str,
    },
    /// A styling rule range is not a list
    #[error("{context} range must be an array of numbers or colour strings")]
    InvalidRange {
        /// Which rule
        context: &'static str,
    },
}

/// Failure to prepare a schema validator
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema document could not be parsed
    #[error("failed to parse schema: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// The schema document could not be converted to JSON
    #[error("schema is not representable as JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The schema is not a valid JSON Schema
    #[error("invalid schema: {0}")]
    Compile(String),
}
