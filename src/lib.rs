//! Scanhealth - report-normalization core for static-analysis scan reports
//!
//! A persistent store accumulates scan reports produced by heterogeneous
//! lint and cyclomatic-complexity tool-chains for two source ecosystems,
//! each of which has evolved through incompatible payload shapes. This
//! crate ingests one arbitrary payload, detects its shape, converts it into
//! one canonical per-file model, computes derived aggregates, and gates and
//! dispatches AI-enrichment requests under a per-user daily quota.
//!
//! The crate is a library invoked by a surrounding application; it has no
//! CLI surface. Normalization is pure and recomputed per view. Only the
//! quota commit and the enrichment call itself are effectful, and both go
//! through traits (`store::ProfileStore`, `enrich::ExplainBackend`) so the
//! hosting application owns the actual transport.

pub mod aggregate;
pub mod config;
pub mod enrich;
pub mod models;
pub mod normalize;
pub mod quota;
pub mod schema;
pub mod store;

pub use aggregate::{summarize_window, ReportView, PAGE_SIZE};
pub use enrich::{EnrichError, EnrichmentDispatcher, ExplainBackend, IssueCategory};
pub use models::{
    AggregateSummary, DiagnosticMessage, FileDiagnosticGroup, FunctionMetric,
    NormalizedFileReport, Profile, ScanReport,
};
pub use normalize::{normalize_complexity, normalize_diagnostics};
pub use quota::{authorize, QuotaDecision, QuotaState, Tier};
pub use store::ProfileStore;
