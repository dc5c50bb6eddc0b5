//! Read-only client for the Kudos contract.
//!
//! The sync strategies only see the [`KudosLedger`] trait. [`EvmLedger`] is
//! the alloy-backed implementation; anything specific to the RPC library
//! (error shapes, log decoding, block range limits) stays inside this crate.
//!
//! # Example
//!
//! ```no_run
//! use kudos_chain::{EvmLedger, KudosLedger, LedgerConfig};
//!
//! # async fn run() -> kudos_chain::ChainResult<()> {
//! let ledger = EvmLedger::connect(&LedgerConfig {
//!     rpc_url: "http://localhost:8545".to_string(),
//!     contract_address: "0x2aea4add166ebf38b63d09a75de1a7b94aa24163".to_string(),
//!     ..Default::default()
//! })?;
//! let supply = ledger.total_supply().await?;
//! # let _ = supply;
//! # Ok(())
//! # }
//! ```

mod block;
mod classify;
mod contract;
mod error;
mod evm;
pub mod mock;

pub use block::BlockTag;
pub use error::{ChainError, ChainResult};
pub use evm::{EvmLedger, LedgerConfig, DEFAULT_LOG_CHUNK_SIZE};

use async_trait::async_trait;
use kudos_types::{BlockNumber, TokenId, TokenState, TransferEvent};

/// Read-only view of the Kudos contract on one network.
#[async_trait]
pub trait KudosLedger: Send + Sync {
    /// Returns the current head block number.
    async fn head_block(&self) -> ChainResult<BlockNumber>;

    /// Returns the number of tokens minted so far.
    async fn total_supply(&self) -> ChainResult<u64>;

    /// Largest block span worth asking for in one [`transfer_events`] call.
    /// Callers that bound each call with a deadline should walk long ranges
    /// in windows of this size.
    ///
    /// [`transfer_events`]: KudosLedger::transfer_events
    fn log_window(&self) -> u64 {
        BlockNumber::MAX
    }

    /// Returns every `Transfer` event in `[from, to]`, sorted by block then
    /// log index.
    async fn transfer_events(
        &self,
        from: BlockNumber,
        to: BlockNumber,
    ) -> ChainResult<Vec<TransferEvent>>;

    /// Reads the current state of a single token.
    async fn token(&self, id: TokenId) -> ChainResult<TokenState>;
}
