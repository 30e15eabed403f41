//! Complexity normalizer
//!
//! Converts any supported complexity-report shape into the canonical
//! per-file map. All shapes funnel through one uniform item mapping, so
//! the same logical data normalizes identically regardless of which
//! tool-chain generation produced it. Files contributing zero qualifying
//! items are omitted from the map entirely.

use crate::models::{
    stable_entry_id, FunctionKind, FunctionMetric, NormalizedFileReport, Rank,
};
use crate::normalize::defaults;
use crate::schema::ComplexityShape;
use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, trace};

/// Normalize a raw complexity substructure into per-file reports, keyed by
/// display file name.
pub fn normalize_complexity(raw: &JsonValue) -> IndexMap<String, NormalizedFileReport> {
    let mut normalized = IndexMap::new();

    let Some(per_file) = per_file_map(raw) else {
        trace!("complexity payload unrecognized, normalizing to empty");
        return normalized;
    };

    for (file_path, entry) in per_file {
        let functions = file_metrics(file_path, entry);
        let Some(report) = NormalizedFileReport::from_functions(file_path.clone(), functions)
        else {
            // Absence is the clean-file signal; an empty entry would also
            // make the average undefined.
            debug!(file = %file_path, "no qualifying complexity items, omitting file");
            continue;
        };
        normalized.insert(report.file_name.clone(), report);
    }

    normalized
}

/// Locate the per-file map for the detected shape, unwrapping the legacy
/// `raw_data` envelope.
fn per_file_map(raw: &JsonValue) -> Option<&Map<String, JsonValue>> {
    match ComplexityShape::detect(raw) {
        ComplexityShape::LegacyWrapped => raw.get("raw_data").and_then(JsonValue::as_object),
        ComplexityShape::Current | ComplexityShape::PythonInline => raw.as_object(),
        ComplexityShape::Unrecognized => None,
    }
}

/// Extract qualifying metrics from one file entry, whichever shape it has.
fn file_metrics(file_path: &str, entry: &JsonValue) -> Vec<FunctionMetric> {
    if let Some(functions) = entry.get("functions").and_then(JsonValue::as_array) {
        // Current format: every listed function qualifies.
        functions
            .iter()
            .enumerate()
            .map(|(index, item)| metric_from_item(file_path, index, item, FunctionKind::Function))
            .collect()
    } else if let Some(items) = entry.as_array() {
        // Inline radon items: only function/method/class entries qualify.
        items
            .iter()
            .filter_map(|item| {
                item.get("type")
                    .and_then(JsonValue::as_str)
                    .and_then(FunctionKind::parse)
                    .map(|kind| (kind, item))
            })
            .enumerate()
            .map(|(index, (kind, item))| metric_from_item(file_path, index, item, kind))
            .collect()
    } else {
        Vec::new()
    }
}

/// Uniform raw-item mapping shared by every shape; see
/// [`crate::normalize::defaults`] for the fallback table.
fn metric_from_item(
    file_path: &str,
    index: usize,
    item: &JsonValue,
    fallback_kind: FunctionKind,
) -> FunctionMetric {
    let line = item
        .get("lineno")
        .or_else(|| item.get("line"))
        .and_then(JsonValue::as_u64)
        .unwrap_or(u64::from(defaults::DEFAULT_METRIC_LINE)) as u32;

    let complexity = match item.get("complexity").and_then(JsonValue::as_u64) {
        Some(c) if c >= 1 => c as u32,
        _ => defaults::DEFAULT_COMPLEXITY,
    };

    let name = item
        .get("name")
        .and_then(JsonValue::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| defaults::placeholder_name(line));

    let rank = item
        .get("rank")
        .and_then(JsonValue::as_str)
        .and_then(Rank::parse)
        .unwrap_or(defaults::DEFAULT_RANK);

    let kind = item
        .get("type")
        .and_then(JsonValue::as_str)
        .and_then(FunctionKind::parse)
        .unwrap_or(fallback_kind);

    FunctionMetric {
        id: stable_entry_id("complexity", file_path, index, &name),
        is_high_complexity: complexity > defaults::HIGH_COMPLEXITY_THRESHOLD,
        name,
        kind,
        complexity,
        rank,
        line,
        file_path: file_path.to_string(),
    }
}
