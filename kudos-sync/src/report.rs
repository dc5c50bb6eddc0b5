//! Run summaries.

use crate::error::SyncError;
use crate::plan::SyncMethod;
use kudos_store::ApplyOutcome;
use kudos_types::{BlockNumber, Network, TokenId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The span a run covered. Both ends are inclusive; `from > to` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncRange {
    Blocks { from: BlockNumber, to: BlockNumber },
    Ids { from: u64, to: u64 },
}

impl SyncRange {
    pub fn is_empty(&self) -> bool {
        match self {
            SyncRange::Blocks { from, to } | SyncRange::Ids { from, to } => from > to,
        }
    }
}

impl fmt::Display for SyncRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncRange::Blocks { from, to } => write!(f, "blocks {from}..={to}"),
            SyncRange::Ids { from, to } => write!(f, "ids {from}..={to}"),
        }
    }
}

/// A token that could not be synced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenFailure {
    pub token_id: TokenId,
    pub reason: String,
    /// True if the last error was transient, i.e. a later run may succeed.
    pub transient: bool,
}

impl TokenFailure {
    pub fn new(token_id: TokenId, error: &SyncError) -> Self {
        Self {
            token_id,
            reason: error.to_string(),
            transient: error.is_transient(),
        }
    }
}

/// Summary returned by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub network: Network,
    pub method: SyncMethod,
    pub range: SyncRange,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failures: Vec<TokenFailure>,
    /// Last id covered by the contiguous successful prefix of an id run.
    pub checkpoint: Option<TokenId>,
    /// Head block observed by an event-log run; the next run can start after it.
    pub head_block: Option<BlockNumber>,
}

impl SyncReport {
    pub fn new(network: Network, method: SyncMethod, range: SyncRange) -> Self {
        Self {
            network,
            method,
            range,
            created: 0,
            updated: 0,
            unchanged: 0,
            failures: Vec::new(),
            checkpoint: None,
            head_block: None,
        }
    }

    pub fn record(&mut self, outcome: ApplyOutcome) {
        match outcome {
            ApplyOutcome::Created => self.created += 1,
            ApplyOutcome::Updated => self.updated += 1,
            ApplyOutcome::Unchanged => self.unchanged += 1,
        }
    }

    /// Number of upserts that changed the store.
    pub fn applied(&self) -> usize {
        self.created + self.updated
    }

    /// Number of tokens committed, changed or not.
    pub fn processed(&self) -> usize {
        self.applied() + self.unchanged
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_ids(&self) -> Vec<TokenId> {
        self.failures.iter().map(|f| f.token_id).collect()
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} sync over {}: {} created, {} updated, {} unchanged, {} failed",
            self.network,
            self.method,
            self.range,
            self.created,
            self.updated,
            self.unchanged,
            self.failures.len()
        )?;
        if let Some(checkpoint) = self.checkpoint {
            write!(f, ", checkpoint {checkpoint}")?;
        }
        if let Some(head) = self.head_block {
            write!(f, ", head block {head}")?;
        }
        Ok(())
    }
}
