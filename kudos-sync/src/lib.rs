//! Sync strategies for the Kudos token ledger.
//!
//! Reconciles a local [`TokenStore`](kudos_store::TokenStore) with the Kudos
//! contract using one of three strategies:
//!
//! - **Event log** (`filter`): applies every `Transfer` event from a start
//!   block to head.
//! - **Enumeration** (`id`): reads every token id from a start id to the
//!   total supply.
//! - **External index** (`opensea`): asks OpenSea for each id's transfer
//!   transaction and applies it with the ledger state.
//!
//! # Components
//!
//! - **Plan**: validates a [`SyncRequest`] into a [`SyncPlan`] without I/O
//! - **Cursor**: resolves explicit, rewind, catch-up and resume starts
//! - **Applicator**: reads one token and commits it idempotently
//! - **Coordinator**: dispatches a plan to its strategy and returns a
//!   [`SyncReport`]
//!
//! Reads are retried with backoff and bounded by a deadline; ids fan out up
//! to a configured concurrency while commits stay in id order. ID runs
//! checkpoint after each committed token so `--resume` can pick up after an
//! interruption.
//!
//! # Example
//!
//! ```
//! use kudos_sync::{CursorSpec, SyncMethod, SyncPlan, SyncRequest};
//! use kudos_types::Network;
//!
//! let request = SyncRequest::new(Network::Rinkeby, SyncMethod::Filter, CursorSpec::CatchUp);
//! assert!(SyncPlan::new(&request).is_err());
//! ```

pub mod applicator;
pub mod config;
mod coordinator;
pub mod cursor;
mod error;
pub mod index;
pub mod mock;
pub mod observer;
pub mod plan;
pub mod report;
pub mod retry;
mod strategy;

pub use applicator::TokenApplicator;
pub use config::{FailurePolicy, NetworkConfig, OpenSeaConfig, RetryPolicy, SyncConfig, SyncOptions};
pub use coordinator::SyncCoordinator;
pub use cursor::{BlockCursor, IdCursor};
pub use error::{SyncError, SyncResult};
pub use index::{AssetIndex, AssetTransfer, OpenSeaClient};
pub use observer::{SyncObserver, TracingObserver};
pub use plan::{CursorSpec, SyncMethod, SyncPlan, SyncRequest};
pub use report::{SyncRange, SyncReport, TokenFailure};
