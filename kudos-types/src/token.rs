//! Ledger-derived token state and transfer records.

use crate::{TokenId, TxHash};
use serde::{Deserialize, Serialize};

/// A block height on the ledger.
pub type BlockNumber = u64;

/// The current state of a token as read from the Kudos contract.
///
/// This is the part of a stored row that the ledger is authoritative for;
/// sync cursor fields live alongside it in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenState {
    pub id: TokenId,
    /// Checksummed owner address.
    pub owner: String,
    /// Metadata URI returned by `tokenURI`.
    pub token_uri: String,
    pub price_finney: u64,
    pub num_clones_allowed: u64,
    pub num_clones_in_wild: u64,
    /// Id of the kudos this one was cloned from; equal to `id` for originals.
    pub cloned_from_id: u64,
}

/// An ownership change emitted by the contract's `Transfer` event.
///
/// Events order by `(block_number, log_index)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEvent {
    pub token_id: TokenId,
    pub block_number: BlockNumber,
    pub log_index: u64,
    pub tx_hash: TxHash,
    pub from: String,
    pub to: String,
}

impl TransferEvent {
    /// The zero address, used as `from` when a token is minted.
    pub const ZERO_ADDRESS: &'static str = "0x0000000000000000000000000000000000000000";

    /// Returns true if this transfer minted the token.
    pub fn is_mint(&self) -> bool {
        self.from.eq_ignore_ascii_case(Self::ZERO_ADDRESS)
    }

    /// Sort key giving ledger order.
    pub fn ledger_position(&self) -> (BlockNumber, u64) {
        (self.block_number, self.log_index)
    }

    /// Reduces the event to the reference stored as a token's sync cursor.
    pub fn to_transfer_ref(&self) -> TransferRef {
        TransferRef {
            tx_hash: self.tx_hash,
            block_number: Some(self.block_number),
            minted: self.is_mint(),
        }
    }
}

/// The transaction a sync pass attributes to a token.
///
/// Event-log sync knows the block; the marketplace only reports the hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRef {
    pub tx_hash: TxHash,
    pub block_number: Option<BlockNumber>,
    /// True when the transaction minted the token.
    pub minted: bool,
}

impl TransferRef {
    /// A reference carrying only a transaction hash.
    pub fn from_hash(tx_hash: TxHash) -> Self {
        Self {
            tx_hash,
            block_number: None,
            minted: false,
        }
    }
}
