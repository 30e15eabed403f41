//! Core data models for scanhealth
//!
//! Canonical per-file entities produced by the normalizers, the raw report
//! record as stored, and the aggregate summary consumed by the UI. All
//! normalized types serialize with the camelCase field names downstream
//! consumers expect.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Generate a deterministic entity ID based on content hash.
///
/// Normalized entities are recomputed on every view, so IDs must be stable
/// across recomputations of the same payload. The ID is a 16-character hex
/// string derived from hashing the entity's source kind, file path, position
/// within the raw payload, and display label.
pub fn stable_entry_id(source: &str, file: &str, index: usize, label: &str) -> String {
    // MD5 keeps ids stable across compiler versions, unlike DefaultHasher.
    let input = format!("{source}\n{file}\n{index}\n{label}");
    let digest = md5::compute(input.as_bytes());
    format!("{:x}", digest)[..16].to_string()
}

/// Extract the trailing path segment for display, splitting on either
/// separator. The raw path is otherwise preserved as the grouping key.
pub fn trailing_segment(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Kind of code entity a complexity metric describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    #[default]
    Function,
    Method,
    Class,
}

impl FunctionKind {
    /// Parse a raw `type` field; only these three kinds qualify as
    /// complexity-bearing entities.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "function" => Some(FunctionKind::Function),
            "method" => Some(FunctionKind::Method),
            "class" => Some(FunctionKind::Class),
            _ => None,
        }
    }
}

impl std::fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FunctionKind::Function => write!(f, "function"),
            FunctionKind::Method => write!(f, "method"),
            FunctionKind::Class => write!(f, "class"),
        }
    }
}

/// Complexity letter grade, A (best) through F (worst)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Rank {
    #[default]
    A,
    B,
    C,
    D,
    F,
}

impl Rank {
    /// Parse a raw rank string, case-insensitive. Radon additionally emits
    /// "E", which the canonical scale folds into F.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_uppercase().as_str() {
            "A" => Some(Rank::A),
            "B" => Some(Rank::B),
            "C" => Some(Rank::C),
            "D" => Some(Rank::D),
            "E" | "F" => Some(Rank::F),
            _ => None,
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rank::A => write!(f, "A"),
            Rank::B => write!(f, "B"),
            Rank::C => write!(f, "C"),
            Rank::D => write!(f, "D"),
            Rank::F => write!(f, "F"),
        }
    }
}

/// Diagnostic severity, encoded on the wire as 1 (warning) or 2 (error)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DiagnosticSeverity {
    #[default]
    Warning,
    Error,
}

impl DiagnosticSeverity {
    pub fn code(&self) -> u8 {
        match self {
            DiagnosticSeverity::Warning => 1,
            DiagnosticSeverity::Error => 2,
        }
    }

    pub fn from_code(code: u64) -> Self {
        if code == 2 {
            DiagnosticSeverity::Error
        } else {
            DiagnosticSeverity::Warning
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, DiagnosticSeverity::Error)
    }
}

impl std::fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticSeverity::Warning => write!(f, "warning"),
            DiagnosticSeverity::Error => write!(f, "error"),
        }
    }
}

impl Serialize for DiagnosticSeverity {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for DiagnosticSeverity {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u64::deserialize(deserializer)?;
        Ok(DiagnosticSeverity::from_code(code))
    }
}

/// One function/method/class complexity metric, owned by its file report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionMetric {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FunctionKind,
    pub complexity: u32,
    pub rank: Rank,
    pub line: u32,
    pub file_path: String,
    pub is_high_complexity: bool,
}

/// Canonical per-file complexity report
///
/// Files with zero qualifying functions never appear in the normalized map,
/// so `functions` is non-empty and the derived aggregates are always finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedFileReport {
    pub file_name: String,
    pub full_path: String,
    pub functions: Vec<FunctionMetric>,
    pub total_functions: usize,
    pub average_complexity: f64,
    pub max_complexity: u32,
    pub high_complexity_functions: usize,
}

impl NormalizedFileReport {
    /// Build a file report from its qualifying metrics. Returns `None` for
    /// an empty metric list: absence is the "clean file" signal, and it
    /// keeps the average well-defined.
    pub fn from_functions(full_path: impl Into<String>, functions: Vec<FunctionMetric>) -> Option<Self> {
        if functions.is_empty() {
            return None;
        }
        let full_path = full_path.into();
        let total = functions.len();
        let sum: u64 = functions.iter().map(|f| u64::from(f.complexity)).sum();
        let max = functions.iter().map(|f| f.complexity).max().unwrap_or(0);
        let high = functions.iter().filter(|f| f.is_high_complexity).count();

        Some(Self {
            file_name: trailing_segment(&full_path).to_string(),
            functions,
            total_functions: total,
            average_complexity: sum as f64 / total as f64,
            max_complexity: max,
            high_complexity_functions: high,
            full_path,
        })
    }
}

/// One lint/style/error finding tied to a file and line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticMessage {
    pub id: String,
    pub rule_id: String,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub module: String,
    pub symbol: String,
}

/// Canonical per-file diagnostic group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDiagnosticGroup {
    pub file_path: String,
    pub file_name: String,
    pub messages: Vec<DiagnosticMessage>,
    pub error_count: usize,
    pub warning_count: usize,
    pub total_issues: usize,
}

impl FileDiagnosticGroup {
    /// Build a group from its messages, deriving the counts so that
    /// `error_count + warning_count == total_issues == messages.len()`
    /// holds for every input. Returns `None` for an empty message list:
    /// clean files are absent, not empty.
    pub fn from_messages(file_path: impl Into<String>, messages: Vec<DiagnosticMessage>) -> Option<Self> {
        if messages.is_empty() {
            return None;
        }
        let file_path = file_path.into();
        let errors = messages.iter().filter(|m| m.severity.is_error()).count();
        let total = messages.len();

        Some(Self {
            file_name: trailing_segment(&file_path).to_string(),
            file_path,
            error_count: errors,
            warning_count: total - errors,
            total_issues: total,
            messages,
        })
    }
}

/// Roll-up over the currently displayed window of reports, recomputed from
/// the loaded window and never persisted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSummary {
    pub health_score_average: f64,
    pub total_issue_count: usize,
    pub report_count: usize,
}

/// Raw report payload substructures, exactly as returned by the store
///
/// Either side may be absent, empty, or malformed; the normalizers degrade
/// to empty output rather than erroring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportDetails {
    #[serde(default)]
    pub complexity: JsonValue,
    /// Older store rows used a `lint` column name for the diagnostics side.
    #[serde(default, alias = "lint")]
    pub diagnostics: JsonValue,
}

/// One scan report record as stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub id: String,
    pub project_id: String,
    pub created_at: DateTime<Utc>,
    /// 0-100, computed upstream; null when the scan produced no score.
    #[serde(default)]
    pub health_score: Option<i64>,
    /// Explicit ecosystem tag; older rows lack it and are fingerprinted
    /// from the diagnostics payload instead.
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, alias = "details_json")]
    pub details: ReportDetails,
}

/// User profile fields consumed by the quota gate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub is_pro: bool,
    #[serde(default)]
    pub ai_usage_count: u32,
    #[serde(default)]
    pub last_ai_use: Option<NaiveDate>,
}
