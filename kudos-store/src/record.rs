//! Stored token rows and the merge rule applied on upsert.

use kudos_types::{BlockNumber, TokenId, TokenState, TransferRef, TxHash};
use serde::{Deserialize, Serialize};

/// What an upsert did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyOutcome {
    /// The token had no row; one was inserted.
    Created,
    /// The row existed and at least one column changed.
    Updated,
    /// The merged row equals the stored row; nothing was written.
    Unchanged,
}

impl ApplyOutcome {
    /// Returns true if the store was modified.
    pub fn is_applied(&self) -> bool {
        !matches!(self, ApplyOutcome::Unchanged)
    }
}

/// A token row as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub state: TokenState,
    /// Block of the minting transfer, once seen.
    pub mint_block: Option<BlockNumber>,
    pub last_tx_hash: Option<TxHash>,
    pub last_block: Option<BlockNumber>,
}

impl TokenRecord {
    /// Returns the token id.
    pub fn id(&self) -> TokenId {
        self.state.id
    }

    /// Computes the row that results from applying `state` and `transfer` on
    /// top of `existing`.
    ///
    /// Ledger fields always take the new values. `mint_block` is set once.
    /// The transfer cursor never moves to a lower block; a reference without
    /// a block replaces the hash and keeps the block only when the hash is
    /// the one already stored.
    pub fn merge(
        existing: Option<&TokenRecord>,
        state: &TokenState,
        transfer: Option<&TransferRef>,
    ) -> TokenRecord {
        let mut merged = TokenRecord {
            state: state.clone(),
            mint_block: existing.and_then(|r| r.mint_block),
            last_tx_hash: existing.and_then(|r| r.last_tx_hash),
            last_block: existing.and_then(|r| r.last_block),
        };

        let Some(transfer) = transfer else {
            return merged;
        };

        if transfer.minted && merged.mint_block.is_none() {
            merged.mint_block = transfer.block_number;
        }

        match (transfer.block_number, merged.last_block) {
            (Some(block), Some(current)) if block < current => {}
            (Some(block), _) => {
                merged.last_tx_hash = Some(transfer.tx_hash);
                merged.last_block = Some(block);
            }
            (None, _) => {
                if merged.last_tx_hash != Some(transfer.tx_hash) {
                    merged.last_tx_hash = Some(transfer.tx_hash);
                    merged.last_block = None;
                }
            }
        }

        merged
    }
}
