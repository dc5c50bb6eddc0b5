//! Telemetry sink for sync runs.
//!
//! Strategies report progress to a [`SyncObserver`] passed in by the caller
//! instead of writing to a global logger. Every method has an empty default,
//! so an observer only implements what it cares about.

use crate::plan::SyncPlan;
use crate::report::{SyncRange, SyncReport, TokenFailure};
use kudos_store::ApplyOutcome;
use kudos_types::{TokenId, TransferEvent};
use tracing::{debug, info, warn};

/// Receives progress notifications from a sync run.
pub trait SyncObserver: Send + Sync {
    fn run_started(&self, _plan: &SyncPlan) {}

    fn range_resolved(&self, _range: &SyncRange) {}

    fn transfer_seen(&self, _event: &TransferEvent) {}

    fn token_applied(&self, _token_id: TokenId, _outcome: ApplyOutcome) {}

    fn token_failed(&self, _failure: &TokenFailure) {}

    fn run_finished(&self, _report: &SyncReport) {}
}

/// Observer that forwards to `tracing`.
pub struct TracingObserver;

impl SyncObserver for TracingObserver {
    fn run_started(&self, plan: &SyncPlan) {
        info!("Starting {} sync on {}", plan.method(), plan.network());
    }

    fn range_resolved(&self, range: &SyncRange) {
        if range.is_empty() {
            info!("Nothing to sync ({range})");
        } else {
            info!("Syncing {range}");
        }
    }

    fn transfer_seen(&self, event: &TransferEvent) {
        info!(
            "Transfer event: block {} token {} tx {}",
            event.block_number, event.token_id, event.tx_hash
        );
    }

    fn token_applied(&self, token_id: TokenId, outcome: ApplyOutcome) {
        debug!("Token {token_id}: {outcome:?}");
    }

    fn token_failed(&self, failure: &TokenFailure) {
        warn!("Token {} failed: {}", failure.token_id, failure.reason);
    }

    fn run_finished(&self, report: &SyncReport) {
        info!("{report}");
    }
}
