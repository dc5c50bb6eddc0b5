//! Test doubles for the sync layer.

use crate::error::{SyncError, SyncResult};
use crate::index::{AssetIndex, AssetTransfer};
use crate::observer::SyncObserver;
use crate::plan::SyncPlan;
use crate::report::{SyncRange, SyncReport, TokenFailure};
use async_trait::async_trait;
use kudos_chain::mock::tx_hash;
use kudos_store::ApplyOutcome;
use kudos_types::{TokenId, TransferEvent};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct IndexState {
    /// Remaining injected HTTP failures per token id, with the status code.
    failures: HashMap<TokenId, (usize, u16)>,
    reported_ids: HashMap<TokenId, TokenId>,
    calls: Vec<TokenId>,
}

/// An [`AssetIndex`] that reports `tx_hash(id)` for every token unless told
/// otherwise.
#[derive(Default)]
pub struct MockAssetIndex {
    state: Mutex<IndexState>,
}

impl MockAssetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, IndexState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Makes the next `times` lookups of `id` fail with HTTP `status`.
    pub fn fail_with_status(&self, id: u64, status: u16, times: usize) {
        self.lock().failures.insert(TokenId::new(id), (times, status));
    }

    /// Makes lookups of `id` report a different token id.
    pub fn report_token_id(&self, id: u64, reported: u64) {
        self.lock()
            .reported_ids
            .insert(TokenId::new(id), TokenId::new(reported));
    }

    /// Token ids looked up so far, in call order.
    pub fn calls(&self) -> Vec<TokenId> {
        self.lock().calls.clone()
    }
}

#[async_trait]
impl AssetIndex for MockAssetIndex {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn first_transfer(&self, token_id: TokenId) -> SyncResult<AssetTransfer> {
        let mut state = self.lock();
        state.calls.push(token_id);
        if let Some((remaining, status)) = state.failures.get_mut(&token_id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(SyncError::Http {
                    status: *status,
                    body: "scripted failure".into(),
                });
            }
        }
        let reported = state.reported_ids.get(&token_id).copied().unwrap_or(token_id);
        Ok(AssetTransfer {
            token_id: reported,
            tx_hash: tx_hash(token_id.get()),
        })
    }
}

/// A notification captured by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    RunStarted(SyncPlan),
    RangeResolved(SyncRange),
    TransferSeen(TokenId),
    TokenApplied(TokenId, ApplyOutcome),
    TokenFailed(TokenFailure),
    RunFinished(SyncReport),
}

/// Observer that keeps every notification.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Observed>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: Observed) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }

    pub fn events(&self) -> Vec<Observed> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Ids passed to `token_applied`, in order.
    pub fn applied_ids(&self) -> Vec<TokenId> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Observed::TokenApplied(id, _) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Ids passed to `token_failed`, in order.
    pub fn failed_ids(&self) -> Vec<TokenId> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Observed::TokenFailed(f) => Some(f.token_id),
                _ => None,
            })
            .collect()
    }
}

impl SyncObserver for RecordingObserver {
    fn run_started(&self, plan: &SyncPlan) {
        self.push(Observed::RunStarted(plan.clone()));
    }

    fn range_resolved(&self, range: &SyncRange) {
        self.push(Observed::RangeResolved(*range));
    }

    fn transfer_seen(&self, event: &TransferEvent) {
        self.push(Observed::TransferSeen(event.token_id));
    }

    fn token_applied(&self, token_id: TokenId, outcome: ApplyOutcome) {
        self.push(Observed::TokenApplied(token_id, outcome));
    }

    fn token_failed(&self, failure: &TokenFailure) {
        self.push(Observed::TokenFailed(failure.clone()));
    }

    fn run_finished(&self, report: &SyncReport) {
        self.push(Observed::RunFinished(report.clone()));
    }
}
