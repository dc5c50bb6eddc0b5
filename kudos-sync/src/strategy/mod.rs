//! Sync strategies and the commit pipeline they share.
//!
//! Every strategy reduces to a list of tokens to read. Reads fan out up to
//! `concurrency` at a time; results come back in input order and are
//! committed one by one, so the store sees the same sequence of upserts
//! whatever the concurrency.

pub(crate) mod enumeration;
pub(crate) mod event_log;
pub(crate) mod external_index;

use crate::applicator::TokenApplicator;
use crate::config::{FailurePolicy, SyncOptions};
use crate::error::{SyncError, SyncResult};
use crate::observer::SyncObserver;
use crate::report::{SyncReport, TokenFailure};
use crate::retry::retry;
use futures::stream::{self, StreamExt};
use kudos_chain::KudosLedger;
use kudos_store::TokenStore;
use kudos_types::{BlockNumber, TokenId, TokenState, TransferEvent, TransferRef};
use std::future::Future;
use tracing::debug;

/// A token read, ready to commit.
pub(crate) struct Fetched {
    pub state: TokenState,
    pub transfer: Option<TransferRef>,
}

/// Collaborators borrowed for the length of one run.
pub(crate) struct RunContext<'a> {
    pub ledger: &'a dyn KudosLedger,
    pub store: &'a dyn TokenStore,
    pub applicator: &'a TokenApplicator,
    pub observer: &'a dyn SyncObserver,
    pub options: SyncOptions,
}

impl RunContext<'_> {
    pub async fn head_block(&self) -> SyncResult<BlockNumber> {
        let ledger = self.ledger;
        retry(&self.options.retry, self.options.request_timeout, "head block read", || async move {
            Ok(ledger.head_block().await?)
        })
        .await
    }

    pub async fn total_supply(&self) -> SyncResult<u64> {
        let ledger = self.ledger;
        retry(&self.options.retry, self.options.request_timeout, "total supply read", || async move {
            Ok(ledger.total_supply().await?)
        })
        .await
    }

    /// Collects transfer events in `[from, to]`, one ledger window at a time.
    ///
    /// Each window gets its own deadline and retries.
    pub async fn transfer_events(&self, from: BlockNumber, to: BlockNumber) -> SyncResult<Vec<TransferEvent>> {
        let ledger = self.ledger;
        let window = ledger.log_window().max(1);
        let mut events = Vec::new();
        let mut start = from;

        while start <= to {
            let end = start.saturating_add(window - 1).min(to);
            let label = format!("transfer events {start}..={end}");
            let batch = retry(&self.options.retry, self.options.request_timeout, &label, || async move {
                Ok(ledger.transfer_events(start, end).await?)
            })
            .await?;
            debug!("Read {} transfer events in blocks {start}..={end}", batch.len());
            events.extend(batch);

            if end == BlockNumber::MAX {
                break;
            }
            start = end + 1;
        }

        events.sort_by_key(TransferEvent::ledger_position);
        Ok(events)
    }

    /// Reads every item with `fetch` and commits the results in input order.
    ///
    /// With a `checkpoint_scope`, the checkpoint follows each commit until the
    /// first failed token; later successes are committed but do not move it.
    /// Store errors end the run under either failure policy.
    pub async fn apply_in_order<I, T, K, F, Fut>(
        &self,
        items: I,
        token_of: K,
        fetch: F,
        checkpoint_scope: Option<&str>,
        report: &mut SyncReport,
    ) -> SyncResult<()>
    where
        I: IntoIterator<Item = T>,
        K: Fn(&T) -> TokenId,
        F: Fn(T) -> Fut,
        Fut: Future<Output = SyncResult<Fetched>>,
    {
        let mut fetches = stream::iter(items)
            .map(|item| {
                let token_id = token_of(&item);
                let fut = fetch(item);
                async move { (token_id, fut.await) }
            })
            .buffered(self.options.concurrency.max(1));

        let mut contiguous = true;
        while let Some((token_id, result)) = fetches.next().await {
            let error = match result {
                Ok(fetched) => {
                    let outcome = self
                        .applicator
                        .commit(&fetched.state, fetched.transfer.as_ref())?;
                    report.record(outcome);
                    self.observer.token_applied(token_id, outcome);

                    if let (true, Some(scope)) = (contiguous, checkpoint_scope) {
                        self.store.save_checkpoint(scope, token_id)?;
                        report.checkpoint = Some(token_id);
                    }
                    continue;
                }
                Err(e) if !e.is_per_token() => return Err(e),
                Err(e) => e,
            };

            let failure = TokenFailure::new(token_id, &error);
            self.observer.token_failed(&failure);
            match self.options.failure_policy {
                FailurePolicy::Abort => {
                    return Err(SyncError::Aborted {
                        token_id,
                        source: Box::new(error),
                    });
                }
                FailurePolicy::SkipAndReport => {
                    debug!("Skipping token {token_id}; checkpoint frozen");
                    contiguous = false;
                    report.failures.push(failure);
                }
            }
        }
        Ok(())
    }
}
