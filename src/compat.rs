// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Schema compatibility checks between two schema revisions

use serde::Serialize;
use serde_yaml::Value;
use std::collections::BTreeSet;

/// Required fields the pipeline cannot do without
pub const CRITICAL_FIELDS: [&str; 3] = ["slug", "name", "type"];

/// Differences between an old and a new schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompatibilityReport {
    /// Changes that break existing data or consumers
    pub breaking_changes: Vec<String>,
    /// Changes that may degrade display
    pub warnings: Vec<String>,
    /// Properties only in the new schema
    pub new_properties: Vec<String>,
    /// Properties only in the old schema
    pub removed_properties: Vec<String>,
}

impl CompatibilityReport {
    /// Whether the new schema can replace the old one
    #[must_use]
    pub fn is_compatible(&self) -> bool {
        self.breaking_changes.is_empty()
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn properties(schema: &Value) -> impl Iterator<Item = (&str, &Value)> {
    schema
        .get("properties")
        .and_then(Value::as_mapping)
        .into_iter()
        .flatten()
        .filter_map(|(key, value)| key.as_str().map(|k| (k, value)))
}

/// Dotted paths of every declared property, nested objects included
#[must_use]
pub fn property_paths(schema: &Value) -> BTreeSet<String> {
    fn walk(schema: &Value, prefix: &str, out: &mut BTreeSet<String>) {
        for (key, value) in properties(schema) {
            let path = join(prefix, key);
            if value.is_mapping() {
                walk(value, &path, out);
            }
            out.insert(path);
        }
    }

    let mut out = BTreeSet::new();
    walk(schema, "", &mut out);
    out
}

/// Dotted paths of every required field, nested objects included
#[must_use]
pub fn required_paths(schema: &Value) -> BTreeSet<String> {
    fn walk(schema: &Value, prefix: &str, out: &mut BTreeSet<String>) {
        if let Some(required) = schema.get("required").and_then(Value::as_sequence) {
            out.extend(required.iter().filter_map(Value::as_str).map(|f| join(prefix, f)));
        }
        for (key, value) in properties(schema) {
            if value.is_mapping() {
                walk(value, &join(prefix, key), out);
            }
        }
    }

    let mut out = BTreeSet::new();
    walk(schema, "", &mut out);
    out
}

/// Compare two schema documents
#[must_use]
pub fn compare(old: &Value, new: &Value) -> CompatibilityReport {
    let old_properties = property_paths(old);
    let new_properties = property_paths(new);
    let old_required = required_paths(old);
    let new_required = required_paths(new);

    let mut report = CompatibilityReport {
        new_properties: new_properties.difference(&old_properties).cloned().collect(),
        removed_properties: old_properties.difference(&new_properties).cloned().collect(),
        ..CompatibilityReport::default()
    };

    for field in new_required.difference(&old_required) {
        report.breaking_changes.push(format!("New required field: {field}"));
    }

    for field in CRITICAL_FIELDS {
        if old_required.contains(field) && !new_required.contains(field) {
            report
                .breaking_changes
                .push(format!("Critical required field removed: {field}"));
        }
    }

    for path in &report.removed_properties {
        let root = path.split('.').next().unwrap_or(path);
        if !CRITICAL_FIELDS.contains(&root) {
            report
                .warnings
                .push(format!("Property removed: {path} (may cause display issues)"));
        }
    }

    report
}
