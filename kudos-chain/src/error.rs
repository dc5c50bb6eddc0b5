//! Error types for the chain client.

use thiserror::Error;

/// Result type for ledger reads.
pub type ChainResult<T> = Result<T, ChainError>;

/// Errors that can occur while reading the ledger.
#[derive(Debug, Clone, Error)]
pub enum ChainError {
    /// The client could not be built from its configuration.
    #[error("invalid ledger configuration: {0}")]
    Config(String),

    /// The RPC endpoint failed or returned an error response.
    #[error("rpc error: {message}")]
    Rpc { message: String, transient: bool },

    /// A contract call reverted, e.g. `ownerOf` for an id that was never minted.
    #[error("contract call reverted: {0}")]
    Reverted(String),

    /// The node returned data that does not match the contract ABI.
    #[error("failed to decode ledger data: {0}")]
    Decode(String),
}

impl ChainError {
    /// Creates a transient RPC error.
    pub fn transient(message: impl Into<String>) -> Self {
        ChainError::Rpc {
            message: message.into(),
            transient: true,
        }
    }

    /// Returns true if retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ChainError::Rpc { transient: true, .. })
    }
}
