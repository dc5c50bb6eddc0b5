//! Core type definitions for Kudos ledger sync.
//!
//! This crate defines the plain data types shared by the store, the chain
//! client and the sync strategies:
//! - Token and transaction identifiers
//! - Supported networks
//! - Ledger-derived token state and transfer events
//!
//! Nothing here performs I/O.

mod ids;
mod network;
mod token;

pub use ids::{TokenId, TxHash};
pub use network::Network;
pub use token::{BlockNumber, TokenState, TransferEvent, TransferRef};

/// Errors that can occur while parsing core types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid token id: {0}")]
    InvalidTokenId(String),

    #[error("invalid transaction hash: {0}")]
    InvalidTxHash(String),

    #[error("unknown network: {0}")]
    UnknownNetwork(String),
}
