//! Context-blob synthesis for enrichment requests
//!
//! The explanation service receives a plain-text summary of what is wrong
//! with a file. Both builders cap the number of leading items they include
//! to bound the request payload.

use crate::models::{FileDiagnosticGroup, FunctionKind, NormalizedFileReport};
use std::fmt::Write;

/// Diagnostics included in a lint context blob.
pub const MAX_DIAGNOSTIC_CONTEXT_LINES: usize = 20;

/// Functions included in a complexity context blob.
pub const MAX_COMPLEXITY_CONTEXT_FUNCTIONS: usize = 15;

/// One line per diagnostic, first twenty only.
pub fn diagnostic_context(group: &FileDiagnosticGroup) -> String {
    if group.messages.is_empty() {
        return "No lint issues found.".to_string();
    }

    group
        .messages
        .iter()
        .take(MAX_DIAGNOSTIC_CONTEXT_LINES)
        .map(|msg| {
            format!(
                "- Line {}: [{}] {} ({})",
                msg.line,
                msg.kind.to_uppercase(),
                msg.message,
                msg.symbol
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// File-level summary header plus one line per function, first fifteen
/// only.
pub fn complexity_context(report: &NormalizedFileReport) -> String {
    let mut context = format!(
        "File: {}\nTotal Functions: {}\nAverage Complexity: {:.2}\nHigh Complexity Functions (>5): {}\n\n",
        report.file_name,
        report.total_functions,
        report.average_complexity,
        report.high_complexity_functions
    );

    for func in report
        .functions
        .iter()
        .take(MAX_COMPLEXITY_CONTEXT_FUNCTIONS)
    {
        let label = match func.kind {
            FunctionKind::Class => "Class",
            _ => "Function",
        };
        let _ = writeln!(
            context,
            "- {} \"{}\" (Line {}): Complexity {}, Rank {}",
            label, func.name, func.line, func.complexity, func.rank
        );
    }

    context.trim_end().to_string()
}
