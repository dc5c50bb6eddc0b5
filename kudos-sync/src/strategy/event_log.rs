//! Event-log strategy: applies every `Transfer` event from a block to head.

use super::{Fetched, RunContext};
use crate::cursor::BlockCursor;
use crate::error::SyncResult;
use crate::plan::SyncMethod;
use crate::report::{SyncRange, SyncReport};
use kudos_types::{Network, TransferEvent};

pub(crate) async fn run(ctx: &RunContext<'_>, network: Network, from: &BlockCursor) -> SyncResult<SyncReport> {
    let head = ctx.head_block().await?;
    let start = from.resolve(head)?;

    let range = SyncRange::Blocks { from: start, to: head };
    ctx.observer.range_resolved(&range);
    let mut report = SyncReport::new(network, SyncMethod::Filter, range);
    report.head_block = Some(head);
    if range.is_empty() {
        return Ok(report);
    }

    let events = ctx.transfer_events(start, head).await?;
    for event in &events {
        ctx.observer.transfer_seen(event);
    }

    ctx.apply_in_order(
        events,
        |event: &TransferEvent| event.token_id,
        |event: TransferEvent| async move {
            let state = ctx.applicator.fetch(event.token_id).await?;
            Ok(Fetched {
                state,
                transfer: Some(event.to_transfer_ref()),
            })
        },
        None,
        &mut report,
    )
    .await?;

    Ok(report)
}
