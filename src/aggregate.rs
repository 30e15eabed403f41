//! Report aggregation
//!
//! Combines the two normalizers into a per-report view and rolls up
//! window-level statistics for the dashboard: health-score average, total
//! raw issue count, pagination over a descending-by-creation-time
//! ordering, and the client-side window filter. Everything here is a pure
//! function of the loaded window and is recomputed per view.

use crate::models::{AggregateSummary, FileDiagnosticGroup, NormalizedFileReport, ScanReport};
use crate::normalize::{normalize_complexity, normalize_diagnostics};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::debug;

/// Fixed number of reports per page.
pub const PAGE_SIZE: usize = 6;

/// Total page count for a report set of the given size.
pub fn total_pages(total_count: usize) -> usize {
    total_count.div_ceil(PAGE_SIZE)
}

/// Inclusive row range `(from, to)` for a zero-based page, matching the
/// store's range query convention.
pub fn page_bounds(page: usize) -> (usize, usize) {
    let from = page * PAGE_SIZE;
    (from, from + PAGE_SIZE - 1)
}

/// Both normalized sides of one report, the per-report render input
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub complexity: IndexMap<String, NormalizedFileReport>,
    pub diagnostics: Vec<FileDiagnosticGroup>,
}

impl ReportView {
    /// Normalize a report's complexity and diagnostic substructures. The
    /// two sides are independent; a malformed side degrades to empty
    /// without affecting the other.
    pub fn from_report(report: &ScanReport) -> Self {
        let view = Self {
            complexity: normalize_complexity(&report.details.complexity),
            diagnostics: normalize_diagnostics(&report.details.diagnostics),
        };
        debug!(
            report = %report.id,
            complexity_files = view.complexity.len(),
            diagnostic_files = view.diagnostics.len(),
            "normalized report"
        );
        view
    }
}

/// Roll up the currently displayed window of reports.
///
/// The health average excludes unscored reports from both numerator and
/// denominator; a window with no scored reports yields a defined 0.0 so
/// numeric formatting downstream stays stable. The issue count is the raw
/// pre-grouping diagnostic-array length, summed across the window.
pub fn summarize_window(reports: &[ScanReport]) -> AggregateSummary {
    let mut scored = 0usize;
    let mut score_sum = 0i64;
    let mut issues = 0usize;

    for report in reports {
        if let Some(score) = report.health_score {
            scored += 1;
            score_sum += score;
        }
        issues += raw_issue_count(&report.details.diagnostics);
    }

    AggregateSummary {
        health_score_average: if scored == 0 {
            0.0
        } else {
            score_sum as f64 / scored as f64
        },
        total_issue_count: issues,
        report_count: reports.len(),
    }
}

fn raw_issue_count(diagnostics: &JsonValue) -> usize {
    diagnostics.as_array().map_or(0, Vec::len)
}

/// Case-insensitive window filter over a report's formatted creation time,
/// health-score digits, and raw details JSON. An empty term keeps the
/// window unchanged.
pub fn filter_reports<'a>(reports: &'a [ScanReport], term: &str) -> Vec<&'a ScanReport> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return reports.iter().collect();
    }

    reports
        .iter()
        .filter(|report| {
            if report
                .created_at
                .to_rfc3339()
                .to_lowercase()
                .contains(&needle)
            {
                return true;
            }
            if let Some(score) = report.health_score {
                if score.to_string().contains(&needle) {
                    return true;
                }
            }
            serde_json::to_string(&report.details)
                .map(|details| details.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
        .collect()
}

/// Display band for a health score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthBand {
    Good,
    Fair,
    Poor,
}

impl HealthBand {
    pub fn of(score: i64) -> Self {
        if score > 70 {
            HealthBand::Good
        } else if score > 40 {
            HealthBand::Fair
        } else {
            HealthBand::Poor
        }
    }
}

/// Roll-up across one report's normalized complexity map
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityOverview {
    pub total_functions: usize,
    pub high_complexity_functions: usize,
    pub average_complexity: f64,
    pub max_complexity: u32,
}

/// Summarize all functions across a report's files. An empty map yields
/// the zero overview rather than an undefined average.
pub fn complexity_overview(
    files: &IndexMap<String, NormalizedFileReport>,
) -> ComplexityOverview {
    let mut overview = ComplexityOverview::default();
    let mut sum = 0u64;

    for file in files.values() {
        for func in &file.functions {
            overview.total_functions += 1;
            sum += u64::from(func.complexity);
            if func.is_high_complexity {
                overview.high_complexity_functions += 1;
            }
            overview.max_complexity = overview.max_complexity.max(func.complexity);
        }
    }

    if overview.total_functions > 0 {
        overview.average_complexity = sum as f64 / overview.total_functions as f64;
    }
    overview
}
