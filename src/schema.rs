//! Payload shape detection
//!
//! Scan reports arrive in several structurally different, undocumented
//! shapes depending on which tool-chain generation produced them. This
//! module classifies a raw substructure from structural fingerprints alone;
//! the normalizers dispatch on the resulting tags. Rules are evaluated in
//! order and the first match wins. Unrecognized payloads are a valid
//! outcome, never an error: they normalize to empty output downstream.

use crate::models::ScanReport;
use serde_json::Value as JsonValue;

/// Shape of a raw complexity substructure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplexityShape {
    /// Legacy wrapper: the real per-file map lives under a `raw_data` key,
    /// each file holding a plain array of radon-style items.
    LegacyWrapped,
    /// Current format: per-file objects carrying a `functions` array.
    Current,
    /// Legacy inline format: per-file values are themselves arrays of
    /// radon-style items; only function/method/class entries qualify.
    PythonInline,
    Unrecognized,
}

impl ComplexityShape {
    pub fn detect(raw: &JsonValue) -> Self {
        let Some(map) = raw.as_object() else {
            return ComplexityShape::Unrecognized;
        };
        if map.contains_key("raw_data") {
            return ComplexityShape::LegacyWrapped;
        }
        for value in map.values() {
            if value.get("functions").map(JsonValue::is_array) == Some(true) {
                return ComplexityShape::Current;
            }
            if value.is_array() {
                return ComplexityShape::PythonInline;
            }
        }
        ComplexityShape::Unrecognized
    }
}

/// Shape of a raw diagnostics substructure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticShape {
    /// Flat pylint-style array: each item carries a `path` field.
    Pylint,
    /// ESLint-style array of per-file grouping objects: each item carries a
    /// `filePath` field plus pre-computed `errorCount`/`warningCount`.
    PreGrouped,
    Unrecognized,
}

impl DiagnosticShape {
    pub fn detect(raw: &JsonValue) -> Self {
        let Some(items) = raw.as_array() else {
            return DiagnosticShape::Unrecognized;
        };
        for item in items {
            if item.get("path").is_some() {
                return DiagnosticShape::Pylint;
            }
            if item.get("filePath").is_some() {
                return DiagnosticShape::PreGrouped;
            }
        }
        DiagnosticShape::Unrecognized
    }
}

/// Source ecosystem of a whole report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportEcosystem {
    Python,
    JavaScript,
}

impl ReportEcosystem {
    /// Classify a report from its explicit `language` tag when present,
    /// falling back to the diagnostics fingerprint for older rows.
    pub fn detect(report: &ScanReport) -> Option<Self> {
        match report.language.as_deref() {
            Some("python") => return Some(ReportEcosystem::Python),
            Some("javascript") => return Some(ReportEcosystem::JavaScript),
            _ => {}
        }
        match DiagnosticShape::detect(&report.details.diagnostics) {
            DiagnosticShape::Pylint => Some(ReportEcosystem::Python),
            DiagnosticShape::PreGrouped => Some(ReportEcosystem::JavaScript),
            DiagnosticShape::Unrecognized => None,
        }
    }
}
