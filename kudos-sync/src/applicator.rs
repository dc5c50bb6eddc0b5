//! Token applicator: reads a token from the ledger and commits it to the store.

use crate::config::SyncOptions;
use crate::error::{SyncError, SyncResult};
use crate::retry::retry;
use kudos_chain::KudosLedger;
use kudos_store::{ApplyOutcome, TokenStore};
use kudos_types::{TokenId, TokenState, TransferRef};
use std::sync::Arc;
use tracing::debug;

/// Applies ledger state for single tokens to the store.
///
/// Reads are retried and bounded by the configured deadline; writes go
/// straight to the store and are idempotent.
pub struct TokenApplicator {
    ledger: Arc<dyn KudosLedger>,
    store: Arc<dyn TokenStore>,
    options: SyncOptions,
}

impl TokenApplicator {
    pub fn new(ledger: Arc<dyn KudosLedger>, store: Arc<dyn TokenStore>, options: SyncOptions) -> Self {
        Self {
            ledger,
            store,
            options,
        }
    }

    /// Reads the current state of a token.
    pub async fn fetch(&self, token_id: TokenId) -> SyncResult<TokenState> {
        let ledger = &self.ledger;
        let label = format!("ledger read of token {token_id}");
        let state = retry(&self.options.retry, self.options.request_timeout, &label, || async move {
            ledger
                .token(token_id)
                .await
                .map_err(|e| SyncError::from_ledger(token_id, e))
        })
        .await?;

        if state.id != token_id {
            return Err(SyncError::data(
                token_id,
                format!("ledger returned state for token {}", state.id),
            ));
        }
        Ok(state)
    }

    /// Writes already-fetched state.
    pub fn commit(&self, state: &TokenState, transfer: Option<&TransferRef>) -> SyncResult<ApplyOutcome> {
        let outcome = self.store.upsert(state, transfer)?;
        debug!("Committed token {} ({:?})", state.id, outcome);
        Ok(outcome)
    }

    /// Reads a token and commits it with an optional transfer reference.
    pub async fn apply(&self, token_id: TokenId, transfer: Option<&TransferRef>) -> SyncResult<ApplyOutcome> {
        let state = self.fetch(token_id).await?;
        self.commit(&state, transfer)
    }
}
