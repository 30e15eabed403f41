//! AI enrichment of normalized findings
//!
//! On-demand natural-language explanations for a file's diagnostics or
//! complexity profile, obtained from an external explanation service. The
//! service sits behind the [`ExplainBackend`] trait with one HTTP
//! implementation; the [`EnrichmentDispatcher`] owns the single visible
//! request slot, preemption, the request timeout, and the quota commit
//! that follows a successful call.

mod client;
mod context;
mod dispatcher;

pub use client::HttpExplainClient;
pub use context::{
    complexity_context, diagnostic_context, MAX_COMPLEXITY_CONTEXT_FUNCTIONS,
    MAX_DIAGNOSTIC_CONTEXT_LINES,
};
pub use dispatcher::{
    EnrichmentDispatcher, EnrichmentSlot, SlotState, ANALYSIS_FAILED_MESSAGE,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur in the enrichment module
#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("enrichment endpoint not configured; set SCANHEALTH_ENRICH_URL or the config file")]
    MissingEndpoint,

    #[error("daily AI analysis limit reached ({limit} requests)")]
    QuotaExceeded { limit: u32 },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("failed to parse service response: {0}")]
    ParseError(String),

    #[error("explanation service reported an error: {0}")]
    ServiceError(String),

    #[error("enrichment request timed out after {0}s")]
    Timeout(u64),

    #[error("quota lookup failed: {0}")]
    StoreError(String),

    #[error("enrichment worker failed: {0}")]
    Internal(String),
}

pub type EnrichResult<T> = Result<T, EnrichError>;

/// Symbolic issue category sent to the explanation service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueCategory {
    LintIssues,
    ComplexityIssue,
    CodeError,
}

impl IssueCategory {
    pub fn as_symbol(&self) -> &'static str {
        match self {
            IssueCategory::LintIssues => "LINT_ISSUES",
            IssueCategory::ComplexityIssue => "COMPLEXITY_ISSUE",
            IssueCategory::CodeError => "CODE_ERROR",
        }
    }
}

/// Wire request to the explanation service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainRequest {
    pub symbol: String,
    pub message: String,
    pub context: String,
}

/// Wire response from the explanation service
///
/// A well-formed response carries exactly one of the two fields; a
/// response carrying `error` is treated the same as a transport failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExplainResponse {
    #[serde(default)]
    pub suggestion: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// The explanation service, abstracted for testing and alternative
/// transports. Implementations are synchronous; the dispatcher moves them
/// off the async loop.
pub trait ExplainBackend: Send + Sync {
    fn explain(&self, request: &ExplainRequest) -> EnrichResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_category_symbols() {
        assert_eq!(IssueCategory::LintIssues.as_symbol(), "LINT_ISSUES");
        assert_eq!(IssueCategory::ComplexityIssue.as_symbol(), "COMPLEXITY_ISSUE");
        assert_eq!(IssueCategory::CodeError.as_symbol(), "CODE_ERROR");
    }

    #[test]
    fn test_response_parses_success_shape() {
        let resp: ExplainResponse =
            serde_json::from_str(r#"{ "suggestion": "Split the function." }"#).unwrap();
        assert_eq!(resp.suggestion.as_deref(), Some("Split the function."));
        assert!(resp.error.is_none());
    }

    #[test]
    fn test_response_parses_error_shape() {
        let resp: ExplainResponse =
            serde_json::from_str(r#"{ "error": "model unavailable" }"#).unwrap();
        assert_eq!(resp.error.as_deref(), Some("model unavailable"));
        assert!(resp.suggestion.is_none());
    }
}
