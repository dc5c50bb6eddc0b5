//! External-index strategy: attributes each id's transfer from an asset index.

use super::{Fetched, RunContext};
use crate::cursor::IdCursor;
use crate::error::{SyncError, SyncResult};
use crate::index::AssetIndex;
use crate::plan::{checkpoint_scope, SyncMethod};
use crate::report::{SyncRange, SyncReport};
use crate::retry::retry;
use kudos_types::{Network, TokenId, TransferRef};

pub(crate) async fn run(
    ctx: &RunContext<'_>,
    index: &dyn AssetIndex,
    network: Network,
    from: &IdCursor,
) -> SyncResult<SyncReport> {
    let supply = ctx.total_supply().await?;
    let scope = checkpoint_scope(network, SyncMethod::OpenSea);
    let start = from.resolve(supply, ctx.store, &scope)?;

    let range = SyncRange::Ids {
        from: start.get(),
        to: supply,
    };
    ctx.observer.range_resolved(&range);
    let mut report = SyncReport::new(network, SyncMethod::OpenSea, range);

    let options = ctx.options;
    ctx.apply_in_order(
        (start.get()..=supply).map(TokenId::new),
        |id: &TokenId| *id,
        |id: TokenId| async move {
            let label = format!("{} lookup of token {id}", index.provider_name());
            let transfer = retry(&options.retry, options.request_timeout, &label, || {
                index.first_transfer(id)
            })
            .await?;

            // Commits must stay keyed by the id being walked.
            if transfer.token_id != id {
                return Err(SyncError::data(
                    id,
                    format!("{} reported token {}", index.provider_name(), transfer.token_id),
                ));
            }

            let state = ctx.applicator.fetch(id).await?;
            Ok(Fetched {
                state,
                transfer: Some(TransferRef::from_hash(transfer.tx_hash)),
            })
        },
        Some(&scope),
        &mut report,
    )
    .await?;

    Ok(report)
}
