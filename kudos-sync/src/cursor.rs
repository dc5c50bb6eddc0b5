//! Cursor resolution.
//!
//! Block cursors and id cursors are separate types so a rewind count is
//! never applied in the wrong unit.

use crate::error::{SyncError, SyncResult};
use kudos_chain::BlockTag;
use kudos_store::TokenStore;
use kudos_types::{BlockNumber, TokenId};

/// Start of an event-log run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockCursor {
    At(BlockTag),
    /// Number of blocks back from the head.
    Rewind(u64),
}

impl BlockCursor {
    /// Resolves to a concrete block given the current head.
    pub fn resolve(&self, head: BlockNumber) -> SyncResult<BlockNumber> {
        match self {
            BlockCursor::At(tag) => Ok(tag.resolve(head)),
            BlockCursor::Rewind(blocks) => rewind(head, *blocks, "blocks", "head block"),
        }
    }
}

/// Start of an id-enumerating run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdCursor {
    At(TokenId),
    /// Number of ids back from the total supply.
    Rewind(u64),
    CatchUp,
    Resume,
}

impl IdCursor {
    /// Resolves to the first id to sync.
    ///
    /// `scope` names the checkpoint consulted by [`IdCursor::Resume`].
    pub fn resolve(&self, supply: u64, store: &dyn TokenStore, scope: &str) -> SyncResult<TokenId> {
        match self {
            IdCursor::At(id) => Ok(*id),
            IdCursor::Rewind(ids) => {
                let start = rewind(supply, *ids, "ids", "total supply")?;
                if start == 0 {
                    return Err(SyncError::Config(format!(
                        "rewinding {ids} ids from a total supply of {supply} lands before the lowest kudos id"
                    )));
                }
                Ok(TokenId::new(start))
            }
            IdCursor::CatchUp => catch_up(store),
            IdCursor::Resume => match store.checkpoint(scope)? {
                Some(last) => last.next().ok_or_else(|| {
                    SyncError::Config(format!("checkpoint {last} for {scope} cannot be advanced"))
                }),
                None => catch_up(store),
            },
        }
    }
}

fn catch_up(store: &dyn TokenStore) -> SyncResult<TokenId> {
    Ok(store.max_known_id()?.unwrap_or(TokenId::FIRST))
}

/// `bound - by`, rejecting a rewind past zero.
pub fn rewind(bound: u64, by: u64, unit: &str, what: &str) -> SyncResult<u64> {
    bound.checked_sub(by).ok_or_else(|| {
        SyncError::Config(format!("cannot rewind {by} {unit}: {what} is only {bound}"))
    })
}
