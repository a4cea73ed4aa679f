// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Entity schema validation
//!
//! A thin layer over `jsonschema`: the schema is compiled once and every
//! record is checked against the same validator. Records arrive as YAML and
//! are converted to JSON before validation.

use crate::error::SchemaError;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Share of invalid records above which a validation run fails
pub const INVALID_THRESHOLD: f64 = 0.5;

/// One violated schema constraint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Instance path, or the schema path when the instance path is empty
    pub field: String,
    /// Human-readable message
    pub message: String,
    /// The offending value
    pub value: JsonValue,
}

/// Diagnostics for one record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityDiagnostics {
    /// Record slug, or `unknown`
    pub slug: String,
    /// Violated constraints
    pub diagnostics: Vec<Diagnostic>,
}

/// Outcome of validating a batch of records
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Records checked
    pub total: usize,
    /// Records that passed
    pub valid: usize,
    /// Records that failed, in input order
    pub invalid: Vec<EntityDiagnostics>,
}

impl ValidationReport {
    /// Whether more than half of the records are invalid
    #[must_use]
    pub fn exceeds_threshold(&self) -> bool {
        #[allow(clippy::cast_precision_loss)]
        let limit = self.total as f64 * INVALID_THRESHOLD;
        #[allow(clippy::cast_precision_loss)]
        let invalid = self.invalid.len() as f64;
        invalid > limit
    }
}

/// Compiled entity schema
pub struct SchemaValidator {
    validator: jsonschema::Validator,
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator").finish_non_exhaustive()
    }
}

impl SchemaValidator {
    /// Compile a JSON Schema document
    pub fn compile(schema: &JsonValue) -> Result<Self, SchemaError> {
        let validator =
            jsonschema::validator_for(schema).map_err(|e| SchemaError::Compile(e.to_string()))?;
        Ok(Self { validator })
    }

    /// Parse a YAML (or JSON) schema document and compile it
    pub fn from_yaml_str(text: &str) -> Result<Self, SchemaError> {
        let document: serde_yaml::Value = serde_yaml::from_str(text)?;
        Self::compile(&to_json(&document)?)
    }

    /// Check one record, returning every violated constraint
    #[must_use]
    pub fn validate(&self, record: &JsonValue) -> Vec<Diagnostic> {
        self.validator
            .iter_errors(record)
            .map(|error| {
                let instance_path = error.instance_path.to_string();
                let field = if instance_path.is_empty() {
                    error.schema_path.to_string()
                } else {
                    instance_path
                };
                Diagnostic {
                    field,
                    message: error.to_string(),
                    value: error.instance.clone().into_owned(),
                }
            })
            .collect()
    }

    /// Check a batch of YAML records
    #[must_use]
    pub fn validate_all(&self, records: &[serde_yaml::Value]) -> ValidationReport {
        let mut report = ValidationReport {
            total: records.len(),
            ..ValidationReport::default()
        };

        for record in records {
            let diagnostics = match to_json(record) {
                Ok(json) => self.validate(&json),
                Err(e) => vec![Diagnostic {
                    field: String::new(),
                    message: e.to_string(),
                    value: JsonValue::Null,
                }],
            };

            if diagnostics.is_empty() {
                report.valid += 1;
            } else {
                let slug = record
                    .get("slug")
                    .and_then(serde_yaml::Value::as_str)
                    .unwrap_or("unknown")
                    .to_string();
                report.invalid.push(EntityDiagnostics { slug, diagnostics });
            }
        }

        report
    }
}

/// Convert a YAML value to JSON
pub fn to_json(value: &serde_yaml::Value) -> Result<JsonValue, SchemaError> {
    Ok(serde_json::to_value(value)?)
}
