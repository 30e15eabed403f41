//! End-to-end normalization tests
//!
//! Drive whole raw report records - the shapes the store actually returns
//! for both ecosystems - through shape detection, both normalizers, the
//! per-report view, and the window roll-up.

use scanhealth::aggregate::{
    complexity_overview, filter_reports, page_bounds, summarize_window, total_pages, ReportView,
    PAGE_SIZE,
};
use scanhealth::enrich::{complexity_context, diagnostic_context};
use scanhealth::models::{DiagnosticSeverity, ScanReport};
use scanhealth::schema::ReportEcosystem;
use serde_json::json;

fn python_report() -> ScanReport {
    serde_json::from_value(json!({
        "id": "rep-py-1",
        "project_id": "proj-1",
        "created_at": "2024-03-02T08:30:00Z",
        "health_score": 64,
        "details_json": {
            "lint": [
                { "path": "app/views.py", "type": "error", "message": "Undefined variable 'qs'",
                  "line": 41, "column": 8, "symbol": "undefined-variable", "module": "app.views" },
                { "path": "app/views.py", "type": "warning", "message": "Unused import 'os'",
                  "line": 2, "symbol": "unused-import", "module": "app.views" },
                { "path": "app/models.py", "type": "convention", "message": "Missing module docstring",
                  "line": 1, "symbol": "missing-module-docstring", "module": "app.models" }
            ],
            "complexity": {
                "raw_data": {
                    "app/views.py": [
                        { "type": "function", "name": "dashboard", "complexity": 9, "rank": "C", "lineno": 30 },
                        { "type": "function", "name": "healthz", "complexity": 1, "rank": "A", "lineno": 12 },
                        { "type": "class", "name": "ReportView", "complexity": 4, "rank": "A", "lineno": 55 }
                    ],
                    "app/__init__.py": [
                        { "type": "module", "name": "app", "complexity": 3 }
                    ]
                }
            }
        }
    }))
    .unwrap()
}

fn javascript_report() -> ScanReport {
    serde_json::from_value(json!({
        "id": "rep-js-1",
        "project_id": "proj-1",
        "created_at": "2024-03-03T09:00:00Z",
        "health_score": 82,
        "language": "javascript",
        "details": {
            "diagnostics": [
                {
                    "filePath": "src/components/App.jsx",
                    "errorCount": 1,
                    "warningCount": 1,
                    "messages": [
                        { "ruleId": "no-undef", "severity": 2, "message": "'io' is not defined", "line": 14, "column": 3 },
                        { "ruleId": "no-unused-vars", "severity": 1, "message": "'theme' is assigned a value but never used", "line": 6, "column": 9 }
                    ]
                },
                { "filePath": "src/main.jsx", "errorCount": 0, "warningCount": 0, "messages": [] }
            ],
            "complexity": {
                "src/components/App.jsx": {
                    "functions": [
                        { "name": "App", "complexity": 6, "rank": "B", "lineno": 5 },
                        { "complexity": 2, "lineno": 40 }
                    ]
                }
            }
        }
    }))
    .unwrap()
}

#[test]
fn python_report_normalizes_both_sides() {
    let report = python_report();
    assert_eq!(ReportEcosystem::detect(&report), Some(ReportEcosystem::Python));

    let view = ReportView::from_report(&report);

    // Diagnostics: two files, sorted by name, module-only file absent.
    assert_eq!(view.diagnostics.len(), 2);
    assert_eq!(view.diagnostics[0].file_name, "models.py");
    assert_eq!(view.diagnostics[1].file_name, "views.py");

    let views = &view.diagnostics[1];
    assert_eq!(views.error_count, 1);
    assert_eq!(views.warning_count, 1);
    assert_eq!(views.total_issues, 2);
    assert_eq!(views.messages[0].severity, DiagnosticSeverity::Error);
    assert_eq!(views.messages[0].rule_id, "undefined-variable");
    assert_eq!(views.messages[0].module, "app.views");

    // Convention messages classify as warnings.
    assert_eq!(view.diagnostics[0].warning_count, 1);

    // Complexity: module-level entry filtered, so __init__.py is absent.
    assert_eq!(view.complexity.len(), 1);
    let views_cc = &view.complexity["views.py"];
    assert_eq!(views_cc.total_functions, 3);
    assert_eq!(views_cc.max_complexity, 9);
    assert_eq!(views_cc.high_complexity_functions, 1);
    assert!((views_cc.average_complexity - 14.0 / 3.0).abs() < 1e-9);
}

#[test]
fn javascript_report_normalizes_both_sides() {
    let report = javascript_report();
    assert_eq!(
        ReportEcosystem::detect(&report),
        Some(ReportEcosystem::JavaScript)
    );

    let view = ReportView::from_report(&report);

    // The clean file is absent from the grouped output.
    assert_eq!(view.diagnostics.len(), 1);
    let app = &view.diagnostics[0];
    assert_eq!(app.file_name, "App.jsx");
    assert_eq!(app.file_path, "src/components/App.jsx");
    assert_eq!(app.error_count + app.warning_count, app.total_issues);

    let app_cc = &view.complexity["App.jsx"];
    assert_eq!(app_cc.total_functions, 2);
    // Anonymous function fell back to its line-derived placeholder.
    assert_eq!(app_cc.functions[1].name, "Function at line 40");
    assert!((app_cc.average_complexity - 4.0).abs() < 1e-9);
}

#[test]
fn window_roll_up_over_mixed_reports() {
    let unscored: ScanReport = serde_json::from_value(json!({
        "id": "rep-unscored",
        "project_id": "proj-1",
        "created_at": "2024-03-04T09:00:00Z",
        "health_score": null,
        "details": { "diagnostics": [], "complexity": {} }
    }))
    .unwrap();

    let window = vec![python_report(), javascript_report(), unscored];
    let summary = summarize_window(&window);

    assert_eq!(summary.report_count, 3);
    // Raw pre-grouping counts: 3 pylint items + 2 eslint file entries.
    assert_eq!(summary.total_issue_count, 5);
    // (64 + 82) / 2; the unscored report is excluded, not a zero.
    assert!((summary.health_score_average - 73.0).abs() < 1e-9);
}

#[test]
fn empty_window_is_defined_zero() {
    let summary = summarize_window(&[]);
    assert_eq!(summary.health_score_average, 0.0);
    assert_eq!(summary.total_issue_count, 0);
    assert_eq!(summary.report_count, 0);
}

#[test]
fn window_filter_matches_details_and_score() {
    let window = vec![python_report(), javascript_report()];

    let by_rule = filter_reports(&window, "no-undef");
    assert_eq!(by_rule.len(), 1);
    assert_eq!(by_rule[0].id, "rep-js-1");

    let by_score = filter_reports(&window, "64");
    assert_eq!(by_score.len(), 1);
    assert_eq!(by_score[0].id, "rep-py-1");

    assert_eq!(filter_reports(&window, "").len(), 2);
}

#[test]
fn pagination_constants() {
    assert_eq!(PAGE_SIZE, 6);
    assert_eq!(total_pages(0), 0);
    assert_eq!(total_pages(14), 3);
    assert_eq!(page_bounds(1), (6, 11));
}

#[test]
fn context_builders_feed_from_normalized_view() {
    let view = ReportView::from_report(&python_report());

    let lint_ctx = diagnostic_context(&view.diagnostics[1]);
    assert!(lint_ctx.contains("- Line 41: [ERROR] Undefined variable 'qs' (undefined-variable)"));

    let cc_ctx = complexity_context(&view.complexity["views.py"]);
    assert!(cc_ctx.contains("File: views.py"));
    assert!(cc_ctx.contains("- Function \"dashboard\" (Line 30): Complexity 9, Rank C"));
    assert!(cc_ctx.contains("- Class \"ReportView\" (Line 55): Complexity 4, Rank A"));
}

#[test]
fn overview_spans_all_files_of_a_report() {
    let view = ReportView::from_report(&python_report());
    let overview = complexity_overview(&view.complexity);
    assert_eq!(overview.total_functions, 3);
    assert_eq!(overview.high_complexity_functions, 1);
    assert_eq!(overview.max_complexity, 9);
}

#[test]
fn same_logical_payload_is_shape_invariant() {
    let functions = json!([
        { "type": "function", "name": "sync", "complexity": 11, "rank": "D", "lineno": 77 }
    ]);
    let inline = json!({ "worker.py": functions.clone() });
    let wrapped = json!({ "raw_data": { "worker.py": functions.clone() } });
    let current = json!({ "worker.py": { "functions": functions } });

    let a = scanhealth::normalize_complexity(&inline);
    let b = scanhealth::normalize_complexity(&wrapped);
    let c = scanhealth::normalize_complexity(&current);
    assert_eq!(a, b);
    assert_eq!(b, c);
    assert_eq!(a["worker.py"].max_complexity, 11);
}
