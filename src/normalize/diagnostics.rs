//! Diagnostic normalizer
//!
//! Groups raw lint output by file into canonical diagnostic groups. Two
//! conventions are supported: flat pylint-style arrays keyed by a `path`
//! field, and eslint-style per-file grouping objects keyed by `filePath`.
//! Grouping preserves insertion order of first encounter, output is sorted
//! by file name, and files with zero diagnostics are absent rather than
//! empty - consumers read absence as the clean-file success state.

use crate::models::{
    stable_entry_id, DiagnosticMessage, DiagnosticSeverity, FileDiagnosticGroup,
};
use crate::normalize::defaults;
use crate::schema::DiagnosticShape;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use tracing::trace;

/// Normalize a raw diagnostics substructure into sorted per-file groups.
pub fn normalize_diagnostics(raw: &JsonValue) -> Vec<FileDiagnosticGroup> {
    let mut groups = match DiagnosticShape::detect(raw) {
        DiagnosticShape::Pylint => group_flat_items(raw.as_array().map_or(&[], Vec::as_slice)),
        DiagnosticShape::PreGrouped => {
            regroup_pregrouped(raw.as_array().map_or(&[], Vec::as_slice))
        }
        DiagnosticShape::Unrecognized => {
            trace!("diagnostics payload unrecognized, normalizing to empty");
            Vec::new()
        }
    };
    groups.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    groups
}

/// Group flat pylint-style items by their raw `path` field. Items without
/// a path cannot be attributed to a file and are skipped.
fn group_flat_items(items: &[JsonValue]) -> Vec<FileDiagnosticGroup> {
    let mut by_file: IndexMap<String, Vec<DiagnosticMessage>> = IndexMap::new();

    for (index, item) in items.iter().enumerate() {
        let Some(path) = item.get("path").and_then(JsonValue::as_str) else {
            continue;
        };
        let message = message_from_flat_item(path, index, item);
        by_file.entry(path.to_string()).or_default().push(message);
    }

    by_file
        .into_iter()
        .filter_map(|(path, messages)| FileDiagnosticGroup::from_messages(path, messages))
        .collect()
}

/// Re-derive canonical groups from eslint-style pre-grouped file entries.
/// Counts are recomputed from the messages themselves so the
/// error+warning==total invariant holds even when the payload's own
/// counters disagree; files left with no messages are dropped.
fn regroup_pregrouped(entries: &[JsonValue]) -> Vec<FileDiagnosticGroup> {
    entries
        .iter()
        .filter_map(|entry| {
            let path = entry.get("filePath").and_then(JsonValue::as_str)?;
            let messages: Vec<DiagnosticMessage> = entry
                .get("messages")
                .and_then(JsonValue::as_array)
                .map_or(&[] as &[JsonValue], Vec::as_slice)
                .iter()
                .enumerate()
                .map(|(index, item)| message_from_grouped_item(path, index, item))
                .collect();
            FileDiagnosticGroup::from_messages(path, messages)
        })
        .collect()
}

/// Map one flat pylint item. Severity: `type == "error"` is an error,
/// everything else a warning.
fn message_from_flat_item(path: &str, index: usize, item: &JsonValue) -> DiagnosticMessage {
    let severity = match item.get("type").and_then(JsonValue::as_str) {
        Some("error") => DiagnosticSeverity::Error,
        _ => DiagnosticSeverity::Warning,
    };
    let kind = item
        .get("type")
        .and_then(JsonValue::as_str)
        .unwrap_or(if severity.is_error() { "error" } else { "warning" })
        .to_string();

    let rule_id = item
        .get("symbol")
        .or_else(|| item.get("message-id"))
        .and_then(JsonValue::as_str)
        .unwrap_or(defaults::UNKNOWN_LABEL)
        .to_string();

    let line = u32_field(item, "line", defaults::DEFAULT_DIAGNOSTIC_LINE);
    let column = u32_field(item, "column", defaults::DEFAULT_COLUMN);

    DiagnosticMessage {
        id: stable_entry_id("diagnostic", path, index, &rule_id),
        severity,
        message: str_field(item, "message", defaults::DEFAULT_MESSAGE),
        end_line: u32_field(item, "endLine", line),
        end_column: u32_field(item, "endColumn", column),
        line,
        column,
        kind,
        module: str_field(item, "module", defaults::UNKNOWN_LABEL),
        symbol: str_field(item, "symbol", defaults::UNKNOWN_LABEL),
        rule_id,
    }
}

/// Map one eslint-style message. Severity arrives pre-encoded as 1|2.
fn message_from_grouped_item(path: &str, index: usize, item: &JsonValue) -> DiagnosticMessage {
    let severity = item
        .get("severity")
        .and_then(JsonValue::as_u64)
        .map(DiagnosticSeverity::from_code)
        .unwrap_or_default();

    let rule_id = item
        .get("ruleId")
        .and_then(JsonValue::as_str)
        .unwrap_or(defaults::UNKNOWN_LABEL)
        .to_string();

    let line = u32_field(item, "line", defaults::DEFAULT_DIAGNOSTIC_LINE);
    let column = u32_field(item, "column", defaults::DEFAULT_COLUMN);

    DiagnosticMessage {
        id: stable_entry_id("diagnostic", path, index, &rule_id),
        severity,
        message: str_field(item, "message", defaults::DEFAULT_MESSAGE),
        end_line: u32_field(item, "endLine", line),
        end_column: u32_field(item, "endColumn", column),
        line,
        column,
        kind: if severity.is_error() { "error" } else { "warning" }.to_string(),
        module: defaults::UNKNOWN_LABEL.to_string(),
        symbol: rule_id.clone(),
        rule_id,
    }
}

fn u32_field(item: &JsonValue, key: &str, default: u32) -> u32 {
    item.get(key)
        .and_then(JsonValue::as_u64)
        .map_or(default, |v| v as u32)
}

fn str_field(item: &JsonValue, key: &str, default: &str) -> String {
    item.get(key)
        .and_then(JsonValue::as_str)
        .unwrap_or(default)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pylint_grouping() {
        let raw = json!([
            { "path": "a.py", "type": "error", "message": "undefined-variable", "line": 4, "symbol": "E1101" },
            { "path": "a.py", "type": "warning", "message": "unused import", "line": 9 }
        ]);
        let groups = normalize_diagnostics(&raw);
        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.file_name, "a.py");
        assert_eq!(group.error_count, 1);
        assert_eq!(group.warning_count, 1);
        assert_eq!(group.total_issues, 2);
        assert_eq!(group.messages[0].severity, DiagnosticSeverity::Error);
        assert_eq!(group.messages[0].symbol, "E1101");
        assert_eq!(group.messages[1].rule_id, "unknown");
    }

    #[test]
    fn test_groups_sorted_by_file_name() {
        let raw = json!([
            { "path": "zeta.py", "type": "warning", "message": "w" },
            { "path": "alpha.py", "type": "error", "message": "e" },
            { "path": "zeta.py", "type": "error", "message": "e2" }
        ]);
        let groups = normalize_diagnostics(&raw);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].file_name, "alpha.py");
        assert_eq!(groups[1].file_name, "zeta.py");
        assert_eq!(groups[1].total_issues, 2);
    }

    #[test]
    fn test_items_without_path_are_skipped() {
        let raw = json!([
            { "path": "a.py", "type": "warning", "message": "kept" },
            { "type": "error", "message": "no path, dropped" }
        ]);
        let groups = normalize_diagnostics(&raw);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].total_issues, 1);
    }

    #[test]
    fn test_flat_item_defaults() {
        let raw = json!([ { "path": "a.py" } ]);
        let groups = normalize_diagnostics(&raw);
        let msg = &groups[0].messages[0];
        assert_eq!(msg.severity, DiagnosticSeverity::Warning);
        assert_eq!(msg.message, "Unknown error");
        assert_eq!(msg.line, 1);
        assert_eq!(msg.end_line, 1);
        assert_eq!(msg.column, 0);
        assert_eq!(msg.module, "unknown");
        assert_eq!(msg.kind, "warning");
    }

    #[test]
    fn test_message_id_fallback_for_rule() {
        let raw = json!([ { "path": "a.py", "message-id": "C0114", "type": "convention" } ]);
        let groups = normalize_diagnostics(&raw);
        assert_eq!(groups[0].messages[0].rule_id, "C0114");
    }

    #[test]
    fn test_pregrouped_passthrough() {
        let raw = json!([
            {
                "filePath": "src/App.jsx",
                "errorCount": 1,
                "warningCount": 1,
                "messages": [
                    { "ruleId": "no-unused-vars", "severity": 1, "message": "x is unused", "line": 3, "column": 7 },
                    { "ruleId": "no-undef", "severity": 2, "message": "y is not defined", "line": 8, "column": 2 }
                ]
            }
        ]);
        let groups = normalize_diagnostics(&raw);
        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.file_path, "src/App.jsx");
        assert_eq!(group.file_name, "App.jsx");
        assert_eq!(group.error_count, 1);
        assert_eq!(group.warning_count, 1);
        assert_eq!(group.messages[1].kind, "error");
        assert_eq!(group.messages[1].symbol, "no-undef");
    }

    #[test]
    fn test_pregrouped_counts_recomputed_from_messages() {
        // Payload counters disagree with the message list; the invariant
        // wins.
        let raw = json!([
            {
                "filePath": "a.js",
                "errorCount": 5,
                "warningCount": 5,
                "messages": [ { "ruleId": "semi", "severity": 2, "message": "m", "line": 1 } ]
            }
        ]);
        let groups = normalize_diagnostics(&raw);
        assert_eq!(groups[0].error_count, 1);
        assert_eq!(groups[0].warning_count, 0);
        assert_eq!(groups[0].total_issues, 1);
    }

    #[test]
    fn test_pregrouped_clean_files_are_absent() {
        let raw = json!([
            { "filePath": "clean.js", "errorCount": 0, "warningCount": 0, "messages": [] },
            { "filePath": "dirty.js", "errorCount": 1, "warningCount": 0,
              "messages": [ { "ruleId": "no-undef", "severity": 2, "message": "m", "line": 1 } ] }
        ]);
        let groups = normalize_diagnostics(&raw);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].file_name, "dirty.js");
    }

    #[test]
    fn test_malformed_payloads_normalize_to_empty() {
        assert!(normalize_diagnostics(&json!(null)).is_empty());
        assert!(normalize_diagnostics(&json!({})).is_empty());
        assert!(normalize_diagnostics(&json!([])).is_empty());
        assert!(normalize_diagnostics(&json!("garbage")).is_empty());
        assert!(normalize_diagnostics(&json!([{ "no": "fingerprint" }])).is_empty());
    }

    #[test]
    fn test_count_invariant_holds_for_mixed_input() {
        let raw = json!([
            { "path": "m.py", "type": "error", "message": "a" },
            { "path": "m.py", "type": "refactor", "message": "b" },
            { "path": "m.py", "type": "convention", "message": "c" },
            { "path": "m.py", "type": "error", "message": "d" }
        ]);
        let groups = normalize_diagnostics(&raw);
        let group = &groups[0];
        assert_eq!(group.error_count, 2);
        assert_eq!(group.warning_count, 2);
        assert_eq!(group.error_count + group.warning_count, group.total_issues);
        assert_eq!(group.total_issues, group.messages.len());
    }
}
