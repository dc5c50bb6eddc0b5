//! Error types for the sync layer.

use kudos_chain::ChainError;
use kudos_store::StoreError;
use kudos_types::TokenId;
use std::time::Duration;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Invalid flag combination, unsupported network/method pairing or
    /// missing settings. Always raised before any I/O.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP transport failure (connect, reset, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// Non-success HTTP status from the marketplace.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// A network call exceeded its deadline.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Malformed or missing fields for a single token.
    #[error("invalid data for token {token_id}: {reason}")]
    Data { token_id: TokenId, reason: String },

    /// A token failed under the abort policy; no later token was committed.
    #[error("sync aborted at token {token_id}: {source}")]
    Aborted {
        token_id: TokenId,
        #[source]
        source: Box<SyncError>,
    },

    /// Ledger read failure.
    #[error("ledger error: {0}")]
    Chain(#[from] ChainError),

    /// Store failure.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error (config file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Maps a ledger error for a single token. Reverts and undecodable
    /// responses are data problems with that token.
    pub fn from_ledger(token_id: TokenId, error: ChainError) -> Self {
        match error {
            ChainError::Reverted(reason) | ChainError::Decode(reason) => {
                SyncError::Data { token_id, reason }
            }
            other => SyncError::Chain(other),
        }
    }

    /// Creates a data error for a token.
    pub fn data(token_id: TokenId, reason: impl Into<String>) -> Self {
        SyncError::Data {
            token_id,
            reason: reason.into(),
        }
    }

    /// Returns true if the same call may succeed when retried.
    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::Network(_) | SyncError::Timeout(_) => true,
            SyncError::Http { status, .. } => *status == 429 || *status >= 500,
            SyncError::Chain(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Returns true if the error concerns one token only, so a skip-and-report
    /// run may continue past it.
    pub fn is_per_token(&self) -> bool {
        !matches!(
            self,
            SyncError::Config(_)
                | SyncError::Store(_)
                | SyncError::Io(_)
                | SyncError::Aborted { .. }
        )
    }
}
