//! Daily enrichment quota gate
//!
//! Each user gets a tier-dependent number of AI analysis requests per
//! calendar day. The stored usage count only counts if it was written
//! today; any older date means the budget has reset. `authorize` is a pure
//! decision with no I/O - the caller commits the post-success update
//! against the store only after the enrichment call itself succeeds, so a
//! denied or failed request never consumes quota.

use crate::models::Profile;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily request budget for free accounts.
pub const FREE_DAILY_LIMIT: u32 = 10;

/// Daily request budget for pro accounts.
pub const PRO_DAILY_LIMIT: u32 = 50;

/// Subscription tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Pro,
}

impl Tier {
    pub fn from_is_pro(is_pro: bool) -> Self {
        if is_pro {
            Tier::Pro
        } else {
            Tier::Free
        }
    }

    pub fn daily_limit(&self) -> u32 {
        match self {
            Tier::Free => FREE_DAILY_LIMIT,
            Tier::Pro => PRO_DAILY_LIMIT,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Free => write!(f, "free"),
            Tier::Pro => write!(f, "pro"),
        }
    }
}

/// Quota fields of one user, as last persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct QuotaState {
    pub usage_count: u32,
    /// Day the count was last written; `None` for a user who has never
    /// made an enrichment request.
    pub last_use_date: Option<NaiveDate>,
    pub tier: Tier,
}

impl From<&Profile> for QuotaState {
    fn from(profile: &Profile) -> Self {
        Self {
            usage_count: profile.ai_usage_count,
            last_use_date: profile.last_ai_use,
            tier: Tier::from_is_pro(profile.is_pro),
        }
    }
}

/// Outcome of the pure authorization decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaDecision {
    pub allowed: bool,
    /// Count that actually applies today: the stored count if it was
    /// written today, otherwise 0.
    pub effective_count: u32,
}

/// Decide whether one more enrichment request fits today's budget.
pub fn authorize(state: &QuotaState, today: NaiveDate) -> QuotaDecision {
    let effective_count = if state.last_use_date == Some(today) {
        state.usage_count
    } else {
        0
    };
    QuotaDecision {
        allowed: effective_count < state.tier.daily_limit(),
        effective_count,
    }
}

/// State to persist after a successful enrichment dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaUpdate {
    pub usage_count: u32,
    pub last_use_date: NaiveDate,
}

/// Compute the post-success write from an authorization decision.
pub fn post_success_update(decision: &QuotaDecision, today: NaiveDate) -> QuotaUpdate {
    QuotaUpdate {
        usage_count: decision.effective_count + 1,
        last_use_date: today,
    }
}

/// User-visible denial text carrying the tier's limit.
pub fn denial_message(tier: Tier) -> String {
    format!(
        "Daily AI analysis limit reached ({} requests). Try again tomorrow.",
        tier.daily_limit()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_day_rollover_resets_count() {
        let state = QuotaState {
            usage_count: 10,
            last_use_date: Some(date("2024-01-01")),
            tier: Tier::Free,
        };
        let decision = authorize(&state, date("2024-01-02"));
        assert!(decision.allowed);
        assert_eq!(decision.effective_count, 0);
    }

    #[test]
    fn test_free_limit_reached_today() {
        let today = date("2024-01-02");
        let state = QuotaState {
            usage_count: 10,
            last_use_date: Some(today),
            tier: Tier::Free,
        };
        let decision = authorize(&state, today);
        assert!(!decision.allowed);
        assert_eq!(decision.effective_count, 10);
    }

    #[test]
    fn test_pro_limit_is_higher() {
        let today = date("2024-01-02");
        let state = QuotaState {
            usage_count: 10,
            last_use_date: Some(today),
            tier: Tier::Pro,
        };
        assert!(authorize(&state, today).allowed);

        let maxed = QuotaState {
            usage_count: 50,
            ..state
        };
        assert!(!authorize(&maxed, today).allowed);
    }

    #[test]
    fn test_never_used_is_allowed() {
        let state = QuotaState::default();
        let decision = authorize(&state, date("2024-06-15"));
        assert!(decision.allowed);
        assert_eq!(decision.effective_count, 0);
    }

    #[test]
    fn test_post_success_update_increments_effective() {
        let today = date("2024-01-02");
        // Stale count from yesterday: the update restarts at 1, not 11.
        let state = QuotaState {
            usage_count: 10,
            last_use_date: Some(date("2024-01-01")),
            tier: Tier::Free,
        };
        let update = post_success_update(&authorize(&state, today), today);
        assert_eq!(update.usage_count, 1);
        assert_eq!(update.last_use_date, today);
    }

    #[test]
    fn test_quota_state_from_profile() {
        let profile = Profile {
            is_pro: true,
            ai_usage_count: 7,
            last_ai_use: Some(date("2024-05-05")),
        };
        let state = QuotaState::from(&profile);
        assert_eq!(state.tier, Tier::Pro);
        assert_eq!(state.usage_count, 7);
    }

    #[test]
    fn test_denial_message_names_limit() {
        assert!(denial_message(Tier::Free).contains("10"));
        assert!(denial_message(Tier::Pro).contains("50"));
    }
}
