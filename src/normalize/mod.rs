//! Payload normalization
//!
//! Converts any supported raw complexity or diagnostics substructure into
//! the canonical per-file model. Normalization is synchronous, pure, and
//! total: malformed or unrecognized input degrades to empty output, never
//! to an error. Missing fields take the defaults documented in
//! [`defaults`].

pub mod complexity;
pub mod defaults;
pub mod diagnostics;

pub use complexity::normalize_complexity;
pub use diagnostics::normalize_diagnostics;
