//! Enumeration strategy: reads every id from the start to the total supply.

use super::{Fetched, RunContext};
use crate::cursor::IdCursor;
use crate::error::SyncResult;
use crate::plan::{checkpoint_scope, SyncMethod};
use crate::report::{SyncRange, SyncReport};
use kudos_types::{Network, TokenId};

pub(crate) async fn run(ctx: &RunContext<'_>, network: Network, from: &IdCursor) -> SyncResult<SyncReport> {
    // Read once; tokens minted during the run are left for the next one.
    let supply = ctx.total_supply().await?;
    let scope = checkpoint_scope(network, SyncMethod::Id);
    let start = from.resolve(supply, ctx.store, &scope)?;

    let range = SyncRange::Ids {
        from: start.get(),
        to: supply,
    };
    ctx.observer.range_resolved(&range);
    let mut report = SyncReport::new(network, SyncMethod::Id, range);

    ctx.apply_in_order(
        (start.get()..=supply).map(TokenId::new),
        |id: &TokenId| *id,
        |id: TokenId| async move {
            let state = ctx.applicator.fetch(id).await?;
            Ok(Fetched { state, transfer: None })
        },
        Some(&scope),
        &mut report,
    )
    .await?;

    Ok(report)
}
