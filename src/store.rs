//! External store interface
//!
//! The persistent store (profiles, reports) lives outside this crate; only
//! the quota fields are read and written here, through a trait the hosting
//! application implements over its actual transport. Implementations are
//! expected to provide atomic update semantics for the quota write - the
//! dispatcher re-reads the authoritative count immediately before each
//! commit, but relies on the store for last-writer consistency.

use crate::quota::{QuotaState, QuotaUpdate};
use anyhow::Result;

/// Access to the per-user quota fields of the profile record
pub trait ProfileStore: Send + Sync {
    /// Fetch the authoritative quota state for a user.
    fn fetch_quota(&self, user_id: &str) -> Result<QuotaState>;

    /// Persist the post-success quota update for a user.
    fn commit_quota(&self, user_id: &str, update: &QuotaUpdate) -> Result<()>;
}
