//! Single-slot enrichment dispatcher
//!
//! One logical request slot per consumer view: `Idle -> Loading ->
//! {Resolved, Failed}`, with any state returning to `Loading` when a new
//! request is submitted. Each submission takes a fresh sequence token and a
//! worker may only write the slot while its token is still the latest, so
//! a late-arriving stale response can never overwrite a newer request's
//! result - preemption without relying on actual network cancellation.
//!
//! Quota is checked before anything is sent (a denial leaves both the slot
//! and the stored count untouched) and committed only after a successful
//! call, re-reading the authoritative count immediately before the write.

use crate::config::DEFAULT_ENRICH_TIMEOUT_SECS;
use crate::enrich::{EnrichError, EnrichResult, ExplainBackend, ExplainRequest, IssueCategory};
use crate::quota::{authorize, post_success_update};
use crate::store::ProfileStore;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Generic failure text shown in the slot; the underlying error goes to
/// the log, not the user.
pub const ANALYSIS_FAILED_MESSAGE: &str = "AI analysis failed. Please try again.";

/// The dispatcher's visible request slot
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentSlot {
    pub target_file_name: String,
    pub loading: bool,
    pub result: Option<String>,
    pub error: Option<String>,
}

impl EnrichmentSlot {
    fn idle() -> Self {
        Self::default()
    }

    fn loading(file_name: &str) -> Self {
        Self {
            target_file_name: file_name.to_string(),
            loading: true,
            result: None,
            error: None,
        }
    }

    fn resolved(file_name: &str, text: String) -> Self {
        Self {
            target_file_name: file_name.to_string(),
            loading: false,
            result: Some(text),
            error: None,
        }
    }

    fn failed(file_name: &str, message: &str) -> Self {
        Self {
            target_file_name: file_name.to_string(),
            loading: false,
            result: None,
            error: Some(message.to_string()),
        }
    }

    pub fn state(&self) -> SlotState {
        if self.loading {
            SlotState::Loading
        } else if self.result.is_some() {
            SlotState::Resolved
        } else if self.error.is_some() {
            SlotState::Failed
        } else {
            SlotState::Idle
        }
    }
}

/// Lifecycle state derived from the slot fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Idle,
    Loading,
    Resolved,
    Failed,
}

struct Inner {
    backend: Arc<dyn ExplainBackend>,
    store: Arc<dyn ProfileStore>,
    /// Latest issued request token; a worker only writes the slot while
    /// its own token still equals this value.
    seq: AtomicU64,
    /// Serializes token bumps with slot writes so the stale check and the
    /// write happen as one step.
    gate: Mutex<()>,
    slot: watch::Sender<EnrichmentSlot>,
    timeout: Duration,
}

/// Manages the single outstanding enrichment request for one consumer view
#[derive(Clone)]
pub struct EnrichmentDispatcher {
    inner: Arc<Inner>,
}

impl EnrichmentDispatcher {
    pub fn new(backend: Arc<dyn ExplainBackend>, store: Arc<dyn ProfileStore>) -> Self {
        Self::with_timeout(
            backend,
            store,
            Duration::from_secs(DEFAULT_ENRICH_TIMEOUT_SECS),
        )
    }

    pub fn with_timeout(
        backend: Arc<dyn ExplainBackend>,
        store: Arc<dyn ProfileStore>,
        timeout: Duration,
    ) -> Self {
        let (slot, _) = watch::channel(EnrichmentSlot::idle());
        Self {
            inner: Arc::new(Inner {
                backend,
                store,
                seq: AtomicU64::new(0),
                gate: Mutex::new(()),
                slot,
                timeout,
            }),
        }
    }

    /// Watch the slot for changes; useful for consumers that re-render on
    /// every transition.
    pub fn subscribe(&self) -> watch::Receiver<EnrichmentSlot> {
        self.inner.slot.subscribe()
    }

    /// Snapshot of the current slot.
    pub fn slot(&self) -> EnrichmentSlot {
        self.inner.slot.borrow().clone()
    }

    /// Submit a new enrichment request, preempting whatever the slot holds.
    ///
    /// Returns the request token on dispatch. Fails fast - before any
    /// service call and without touching the slot - when today's quota is
    /// exhausted or the quota lookup itself fails.
    pub async fn submit(
        &self,
        user_id: &str,
        file_name: &str,
        category: IssueCategory,
        summary: impl Into<String>,
        context: impl Into<String>,
    ) -> EnrichResult<u64> {
        let inner = &self.inner;

        let store = Arc::clone(&inner.store);
        let user = user_id.to_string();
        let state = task::spawn_blocking(move || store.fetch_quota(&user))
            .await
            .map_err(|e| EnrichError::Internal(e.to_string()))?
            .map_err(|e| EnrichError::StoreError(e.to_string()))?;

        let today = Utc::now().date_naive();
        let decision = authorize(&state, today);
        if !decision.allowed {
            let limit = state.tier.daily_limit();
            info!(user = user_id, limit, "enrichment request denied by quota");
            return Err(EnrichError::QuotaExceeded { limit });
        }

        let token = {
            let _gate = lock(&inner.gate);
            let token = inner.seq.fetch_add(1, Ordering::SeqCst) + 1;
            inner.slot.send_replace(EnrichmentSlot::loading(file_name));
            token
        };
        info!(
            user = user_id,
            file = file_name,
            token,
            symbol = category.as_symbol(),
            "dispatching enrichment request"
        );

        let request = ExplainRequest {
            symbol: category.as_symbol().to_string(),
            message: summary.into(),
            context: context.into(),
        };
        tokio::spawn(run_request(
            Arc::clone(inner),
            token,
            user_id.to_string(),
            file_name.to_string(),
            request,
            today,
        ));

        Ok(token)
    }

    /// Drop whatever is in flight and return the slot to idle, e.g. when
    /// the consumer navigates away from the file being analyzed.
    pub fn cancel(&self) {
        let _gate = lock(&self.inner.gate);
        self.inner.seq.fetch_add(1, Ordering::SeqCst);
        self.inner.slot.send_replace(EnrichmentSlot::idle());
        debug!("enrichment slot cancelled");
    }
}

fn lock(gate: &Mutex<()>) -> MutexGuard<'_, ()> {
    gate.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn run_request(
    inner: Arc<Inner>,
    token: u64,
    user_id: String,
    file_name: String,
    request: ExplainRequest,
    today: NaiveDate,
) {
    let backend = Arc::clone(&inner.backend);
    let call = task::spawn_blocking(move || backend.explain(&request));

    let outcome = match timeout(inner.timeout, call).await {
        Err(_) => Err(EnrichError::Timeout(inner.timeout.as_secs())),
        Ok(Err(join_err)) => Err(EnrichError::Internal(join_err.to_string())),
        Ok(Ok(result)) => result,
    };

    match outcome {
        Ok(text) => {
            let won = {
                let _gate = lock(&inner.gate);
                if token == inner.seq.load(Ordering::SeqCst) {
                    inner
                        .slot
                        .send_replace(EnrichmentSlot::resolved(&file_name, text));
                    true
                } else {
                    false
                }
            };
            if won {
                commit_usage(&inner, &user_id, today).await;
            } else {
                debug!(token, file = %file_name, "stale enrichment result discarded");
            }
        }
        Err(err) => {
            warn!(error = %err, file = %file_name, "enrichment request failed");
            let _gate = lock(&inner.gate);
            if token == inner.seq.load(Ordering::SeqCst) {
                inner
                    .slot
                    .send_replace(EnrichmentSlot::failed(&file_name, ANALYSIS_FAILED_MESSAGE));
            }
        }
    }
}

/// Persist the post-success usage count. The explanation stays visible
/// even when this write fails; the discrepancy is logged instead.
async fn commit_usage(inner: &Arc<Inner>, user_id: &str, today: NaiveDate) {
    let store = Arc::clone(&inner.store);
    let user = user_id.to_string();
    let committed = task::spawn_blocking(move || {
        // Re-read the authoritative count so two near-simultaneous
        // successes cannot double-spend from a stale copy.
        let state = store.fetch_quota(&user)?;
        let update = post_success_update(&authorize(&state, today), today);
        store.commit_quota(&user, &update)
    })
    .await;

    match committed {
        Ok(Ok(())) => debug!(user = user_id, "quota usage committed"),
        Ok(Err(err)) => warn!(
            user = user_id,
            error = %err,
            "quota commit failed; explanation shown without a usage update"
        ),
        Err(err) => warn!(user = user_id, error = %err, "quota commit worker failed"),
    }
}
