//! Third-party asset indexes.

mod opensea;

pub use opensea::OpenSeaClient;

use crate::error::SyncResult;
use async_trait::async_trait;
use kudos_types::{TokenId, TxHash};
use serde::{Deserialize, Serialize};

/// The transfer an index reports for a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTransfer {
    /// Token id as reported by the index.
    pub token_id: TokenId,
    pub tx_hash: TxHash,
}

/// An external service that indexes token transfers.
#[async_trait]
pub trait AssetIndex: Send + Sync {
    /// Short name used in logs.
    fn provider_name(&self) -> &str;

    /// Returns the first transfer the index reports for a token.
    ///
    /// The returned `token_id` must equal the requested one. The sync
    /// rejects a mismatch as a data error for that token instead of writing
    /// under either id.
    async fn first_transfer(&self, token_id: TokenId) -> SyncResult<AssetTransfer>;
}
