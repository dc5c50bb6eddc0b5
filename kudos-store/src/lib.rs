//! Token store for Kudos ledger sync.
//!
//! The store holds one row per token: the state last read from the ledger
//! plus a transfer cursor (last applied transaction hash and block). Rows are
//! created on first successful fetch, updated on later syncs and never
//! deleted.
//!
//! Writes go through [`TokenStore::upsert`], which is idempotent: applying the
//! same `(state, transfer)` pair twice leaves the row exactly as the first
//! application did and reports [`ApplyOutcome::Unchanged`].
//!
//! The store also keeps per-scope checkpoints so an interrupted ID sync can
//! resume after the last committed token.

mod error;
mod record;
mod sqlite;

pub use error::{StoreError, StoreResult};
pub use record::{ApplyOutcome, TokenRecord};
pub use sqlite::SqliteTokenStore;

use kudos_types::{TokenId, TokenState, TransferRef};

/// Persistence contract used by the sync strategies.
pub trait TokenStore: Send + Sync {
    /// Merges ledger state and an optional transfer reference into the row
    /// for `state.id`, creating it if needed.
    fn upsert(&self, state: &TokenState, transfer: Option<&TransferRef>) -> StoreResult<ApplyOutcome>;

    /// Loads the stored row for a token.
    fn get(&self, id: TokenId) -> StoreResult<Option<TokenRecord>>;

    /// Returns the highest token id present, or `None` for an empty store.
    fn max_known_id(&self) -> StoreResult<Option<TokenId>>;

    /// Returns the number of stored tokens.
    fn count(&self) -> StoreResult<usize>;

    /// Returns the last committed token id for a sync scope.
    fn checkpoint(&self, scope: &str) -> StoreResult<Option<TokenId>>;

    /// Records the last committed token id for a sync scope.
    fn save_checkpoint(&self, scope: &str, id: TokenId) -> StoreResult<()>;
}
