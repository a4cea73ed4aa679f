// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Non-blocking checks of the manual relationships document

use crate::types::LineStyle;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::collections::HashSet;
use std::fmt;

/// Recommended weight bounds
const WEIGHT_RANGE: std::ops::RangeInclusive<f64> = 1.0..=10.0;

/// Severity of a lint finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Must be fixed
    Error,
    /// Worth a look
    Warning,
}

/// A single lint finding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    /// Severity
    pub severity: Severity,
    /// What the finding is about, e.g. `relationship 3` or `category 'tech'`
    pub subject: String,
    /// Description of the problem
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Lint results
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LintReport {
    /// Relationships checked
    pub relationships: usize,
    /// Categories checked
    pub categories: usize,
    /// Types checked
    pub types: usize,
    /// Findings in document order
    pub findings: Vec<Finding>,
}

impl LintReport {
    fn push(&mut self, severity: Severity, subject: impl Into<String>, message: impl Into<String>) {
        self.findings.push(Finding {
            severity,
            subject: subject.into(),
            message: message.into(),
        });
    }

    /// Findings of error severity
    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Error)
    }

    /// Findings of warning severity
    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Warning)
    }

    /// Whether any error was found
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

/// `#RRGGBB`
#[must_use]
pub fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

fn key_name(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => format!("{other:?}"),
    }
}

/// Text of a field, if it is a non-empty string or a number
fn text_field<'a>(record: &'a Mapping, key: &str) -> Option<std::borrow::Cow<'a, str>> {
    match record.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.as_str().into()),
        Value::Number(n) => Some(n.to_string().into()),
        _ => None,
    }
}

fn section<'a>(document: &'a Value, name: &str) -> Option<&'a Mapping> {
    document.get(name).and_then(Value::as_mapping)
}

fn lint_relationship(
    report: &mut LintReport,
    subject: &str,
    rel: &Mapping,
    categories: Option<&Mapping>,
    types: Option<&Mapping>,
    known_slugs: Option<&HashSet<String>>,
) {
    let source = text_field(rel, "source");
    let target = text_field(rel, "target");
    let rel_type = text_field(rel, "type");

    for (field, value) in [("source", &source), ("target", &target), ("type", &rel_type)] {
        if value.is_none() {
            report.push(Severity::Error, subject, format!("missing '{field}' field"));
        }
    }

    match rel.get("weight").and_then(Value::as_f64) {
        None => report.push(Severity::Error, subject, "'weight' must be a number"),
        Some(w) if !WEIGHT_RANGE.contains(&w) => report.push(
            Severity::Warning,
            subject,
            format!("weight {w} outside recommended range 1-10"),
        ),
        Some(_) => {}
    }

    if let (Some(source), Some(target)) = (&source, &target) {
        if source == target {
            report.push(
                Severity::Warning,
                subject,
                format!("self-referential relationship ({source} -> {target})"),
            );
        }
    }

    if let (Some(category), Some(categories)) = (text_field(rel, "category"), categories) {
        if !categories.contains_key(category.as_ref()) {
            report.push(
                Severity::Warning,
                subject,
                format!("category '{category}' not defined in categories section"),
            );
        }
    }

    if let (Some(rel_type), Some(types)) = (&rel_type, types) {
        if !types.contains_key(rel_type.as_ref()) {
            report.push(
                Severity::Warning,
                subject,
                format!("type '{rel_type}' not defined in types section"),
            );
        }
    }

    if let Some(known) = known_slugs {
        for (end, slug) in [("source", &source), ("target", &target)] {
            if let Some(slug) = slug {
                if !known.contains(slug.as_ref()) {
                    report.push(Severity::Warning, subject, format!("{end} '{slug}' is not a known entity"));
                }
            }
        }
    }
}

fn lint_category(report: &mut LintReport, subject: &str, category: &Mapping) {
    if text_field(category, "name").is_none() {
        report.push(Severity::Error, subject, "missing 'name' field");
    }
    match category.get("color") {
        None | Some(Value::Null) => report.push(Severity::Error, subject, "missing 'color' field"),
        Some(Value::String(color)) if is_hex_color(color) => {}
        Some(other) => report.push(
            Severity::Error,
            subject,
            format!("invalid color format '{}' (should be #RRGGBB)", scalar(other)),
        ),
    }
    if let Some(style) = category.get("style").filter(|v| !v.is_null()) {
        if style.as_str().and_then(LineStyle::parse).is_none() {
            report.push(
                Severity::Error,
                subject,
                format!("invalid style '{}' (should be solid, dashed, or dotted)", scalar(style)),
            );
        }
    }
}

fn lint_type(report: &mut LintReport, subject: &str, rel_type: &Mapping) {
    if text_field(rel_type, "name").is_none() {
        report.push(Severity::Error, subject, "missing 'name' field");
    }
    match rel_type.get("default_weight") {
        None | Some(Value::Null) => {}
        Some(value) => match value.as_f64() {
            Some(w) if !WEIGHT_RANGE.contains(&w) => report.push(
                Severity::Warning,
                subject,
                format!("default_weight {w} outside recommended range 1-10"),
            ),
            Some(_) => {}
            None => report.push(Severity::Error, subject, "'default_weight' must be a number"),
        },
    }
    match rel_type.get("color") {
        None | Some(Value::Null) => {}
        Some(Value::String(color)) if is_hex_color(color) => {}
        Some(other) => report.push(
            Severity::Error,
            subject,
            format!("invalid color format '{}' (should be #RRGGBB)", scalar(other)),
        ),
    }
}

/// Check every record of a styling section; returns how many there are
fn lint_records(
    report: &mut LintReport,
    document: &Value,
    name: &str,
    label: &str,
    check: fn(&mut LintReport, &str, &Mapping),
) -> usize {
    let Some(value) = document.get(name).filter(|v| !v.is_null()) else {
        return 0;
    };
    let Some(records) = value.as_mapping() else {
        report.push(Severity::Error, name, "should be a mapping");
        return 0;
    };
    for (key, record) in records {
        let subject = format!("{label} '{}'", key_name(key));
        match record.as_mapping() {
            Some(record) => check(report, &subject, record),
            None => report.push(Severity::Error, &subject, "should be a mapping"),
        }
    }
    records.len()
}

/// Scalar rendering for messages
fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Check a parsed manual relationships document
///
/// Every problem becomes a finding, including values of the wrong type.
/// When `known_slugs` is given, relationship endpoints are also checked
/// against it.
#[must_use]
pub fn lint(document: &Value, known_slugs: Option<&HashSet<String>>) -> LintReport {
    let mut report = LintReport::default();
    let categories = section(document, "categories");
    let types = section(document, "types");

    match document.get("relationships").and_then(Value::as_sequence) {
        None => report.push(Severity::Error, "relationships", "should be a list"),
        Some(entries) => {
            report.relationships = entries.len();
            for (index, entry) in entries.iter().enumerate() {
                let subject = format!("relationship {}", index + 1);
                match entry.as_mapping() {
                    Some(rel) => lint_relationship(&mut report, &subject, rel, categories, types, known_slugs),
                    None => report.push(Severity::Error, &subject, "should be a mapping"),
                }
            }
        }
    }

    let categories = lint_records(&mut report, document, "categories", "category", lint_category);
    let types = lint_records(&mut report, document, "types", "type", lint_type);
    report.categories = categories;
    report.types = types;

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_hex_color() {
        assert!(is_hex_color("#FF6B6B"));
        assert!(is_hex_color("#69b7d4"));
        assert!(!is_hex_color("FF6B6B"));
        assert!(!is_hex_color("#FFF"));
        assert!(!is_hex_color("#GGGGGG"));
    }

    #[test]
    fn test_clean_document() {
        let report = lint(
            &doc(
                r"
relationships:
  - {source: acala, target: moonbeam, type: bridge, weight: 4, category: tech}
categories:
  tech: {name: Technical, color: '#45b7d1', style: dashed}
types:
  bridge: {name: Bridge, default_weight: 3}
",
            ),
            None,
        );
        assert!(report.findings.is_empty(), "{:?}", report.findings);
        assert_eq!((report.relationships, report.categories, report.types), (1, 1, 1));
    }

    #[test]
    fn test_relationship_findings() {
        let report = lint(
            &doc(
                r"
relationships:
  - {source: a, type: uses}
  - {source: b, target: b, type: uses, weight: 12, category: nope}
categories:
  tech: {name: Technical, color: '#45b7d1'}
",
            ),
            None,
        );
        let errors: Vec<_> = report.errors().map(ToString::to_string).collect();
        assert_eq!(
            errors,
            vec!["relationship 1: missing 'target' field", "relationship 1: 'weight' must be a number"]
        );
        assert_eq!(report.warnings().count(), 3);
        assert!(report.has_errors());
    }

    #[test]
    fn test_style_record_findings() {
        let report = lint(
            &doc(
                r"
relationships: []
categories:
  a: {color: 'red', style: wavy}
types:
  t: {name: T, default_weight: 0.5, color: '#12345'}
",
            ),
            None,
        );
        assert_eq!(report.errors().count(), 4);
        assert_eq!(report.warnings().count(), 1);
    }

    #[test]
    fn test_unknown_slugs_warn() {
        let known: HashSet<String> = ["a".to_string()].into_iter().collect();
        let report = lint(&doc("relationships:\n  - {source: a, target: z, type: uses, weight: 1}\n"), Some(&known));
        let warnings: Vec<_> = report.warnings().map(ToString::to_string).collect();
        assert_eq!(warnings, vec!["relationship 1: target 'z' is not a known entity"]);
        assert!(!report.has_errors());
    }

    #[test]
    fn test_wrongly_typed_values_become_findings() {
        let report = lint(
            &doc(
                r"
relationships:
  - {source: a, target: b, type: uses, weight: heavy}
  - {source: 42, target: b, type: uses, weight: 2}
  - just text
categories:
  tech: {name: Tech, color: 123456}
types: [uses]
",
            ),
            None,
        );
        let errors: Vec<_> = report.errors().map(ToString::to_string).collect();
        assert_eq!(
            errors,
            vec![
                "relationship 1: 'weight' must be a number",
                "relationship 3: should be a mapping",
                "category 'tech': invalid color format '123456' (should be #RRGGBB)",
                "types: should be a mapping",
            ]
        );
        assert_eq!(report.relationships, 3);
        assert_eq!(report.types, 0);
    }

    #[test]
    fn test_missing_relationship_list() {
        let report = lint(&doc("categories: {}\n"), None);
        let errors: Vec<_> = report.errors().map(ToString::to_string).collect();
        assert_eq!(errors, vec!["relationships: should be a list"]);
    }
}
