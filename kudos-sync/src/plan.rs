//! Validated sync plans.
//!
//! A [`SyncRequest`] is what the user asked for; [`SyncPlan::new`] checks it
//! without touching the network or the store and yields one closed variant
//! per strategy.

use crate::cursor::{BlockCursor, IdCursor};
use crate::error::{SyncError, SyncResult};
use kudos_chain::BlockTag;
use kudos_types::{Network, TokenId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The sync method named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMethod {
    /// Tail `Transfer` events from a block.
    Filter,
    /// Enumerate token ids up to the total supply.
    Id,
    /// Query OpenSea per token id.
    OpenSea,
}

impl SyncMethod {
    pub const ALL: [SyncMethod; 3] = [SyncMethod::Filter, SyncMethod::Id, SyncMethod::OpenSea];

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncMethod::Filter => "filter",
            SyncMethod::Id => "id",
            SyncMethod::OpenSea => "opensea",
        }
    }
}

impl fmt::Display for SyncMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncMethod {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "filter" => Ok(SyncMethod::Filter),
            "id" => Ok(SyncMethod::Id),
            "opensea" => Ok(SyncMethod::OpenSea),
            _ => Err(SyncError::Config(format!(
                "unknown sync method {s:?}; expected filter, id or opensea"
            ))),
        }
    }
}

/// Where a run should start, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorSpec {
    /// `--start`: a block tag for `filter`, a token id otherwise.
    Start(String),
    /// `--rewind`: blocks back from head for `filter`, ids back from the
    /// total supply otherwise.
    Rewind(u64),
    /// `--catchup`: from the highest id already stored.
    CatchUp,
    /// `--resume`: from the checkpoint left by the previous run.
    Resume,
}

/// An unvalidated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    pub network: Network,
    pub method: SyncMethod,
    pub cursor: CursorSpec,
}

impl SyncRequest {
    pub fn new(network: Network, method: SyncMethod, cursor: CursorSpec) -> Self {
        Self {
            network,
            method,
            cursor,
        }
    }
}

/// A validated request. Exactly one strategy per variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPlan {
    EventLog { network: Network, from: BlockCursor },
    Enumeration { network: Network, from: IdCursor },
    ExternalIndex { network: Network, from: IdCursor },
}

impl SyncPlan {
    /// Validates a request. Performs no I/O.
    pub fn new(request: &SyncRequest) -> SyncResult<Self> {
        let network = request.network;
        match request.method {
            SyncMethod::Filter => Ok(SyncPlan::EventLog {
                network,
                from: block_cursor(&request.cursor)?,
            }),
            SyncMethod::Id => Ok(SyncPlan::Enumeration {
                network,
                from: id_cursor(&request.cursor)?,
            }),
            SyncMethod::OpenSea => {
                if network == Network::Localhost {
                    return Err(SyncError::Config(
                        "the OpenSea API only indexes rinkeby and mainnet".into(),
                    ));
                }
                Ok(SyncPlan::ExternalIndex {
                    network,
                    from: id_cursor(&request.cursor)?,
                })
            }
        }
    }

    pub fn network(&self) -> Network {
        match self {
            SyncPlan::EventLog { network, .. }
            | SyncPlan::Enumeration { network, .. }
            | SyncPlan::ExternalIndex { network, .. } => *network,
        }
    }

    pub fn method(&self) -> SyncMethod {
        match self {
            SyncPlan::EventLog { .. } => SyncMethod::Filter,
            SyncPlan::Enumeration { .. } => SyncMethod::Id,
            SyncPlan::ExternalIndex { .. } => SyncMethod::OpenSea,
        }
    }

    /// Key under which ID strategies store their checkpoint.
    pub fn checkpoint_scope(&self) -> String {
        checkpoint_scope(self.network(), self.method())
    }
}

/// Key under which a network/method pair stores its checkpoint.
pub fn checkpoint_scope(network: Network, method: SyncMethod) -> String {
    format!("{network}:{method}")
}

fn block_cursor(spec: &CursorSpec) -> SyncResult<BlockCursor> {
    match spec {
        CursorSpec::Start(raw) => raw
            .parse::<BlockTag>()
            .map(BlockCursor::At)
            .map_err(|e| SyncError::Config(e.to_string())),
        CursorSpec::Rewind(blocks) => Ok(BlockCursor::Rewind(*blocks)),
        CursorSpec::CatchUp => Err(SyncError::Config(
            "--catchup is not valid for filter syncing".into(),
        )),
        CursorSpec::Resume => Err(SyncError::Config(
            "--resume is not valid for filter syncing; rerun with --start <block>".into(),
        )),
    }
}

fn id_cursor(spec: &CursorSpec) -> SyncResult<IdCursor> {
    match spec {
        CursorSpec::Start(raw) => {
            let id = raw
                .parse::<TokenId>()
                .map_err(|_| SyncError::Config(format!("--start must be a token id, got {raw:?}")))?;
            if id < TokenId::FIRST {
                return Err(SyncError::Config("the lowest kudos id is 1".into()));
            }
            Ok(IdCursor::At(id))
        }
        CursorSpec::Rewind(ids) => Ok(IdCursor::Rewind(*ids)),
        CursorSpec::CatchUp => Ok(IdCursor::CatchUp),
        CursorSpec::Resume => Ok(IdCursor::Resume),
    }
}
