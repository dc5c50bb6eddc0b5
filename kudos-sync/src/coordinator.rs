//! Sync coordinator: validates a request, resolves its cursor and runs the
//! matching strategy.

use crate::applicator::TokenApplicator;
use crate::config::SyncOptions;
use crate::error::{SyncError, SyncResult};
use crate::index::AssetIndex;
use crate::observer::{SyncObserver, TracingObserver};
use crate::plan::{SyncPlan, SyncRequest};
use crate::report::SyncReport;
use crate::strategy::{enumeration, event_log, external_index, RunContext};
use kudos_chain::KudosLedger;
use kudos_store::TokenStore;
use kudos_types::Network;
use std::sync::Arc;

/// Drives sync runs for one network.
pub struct SyncCoordinator {
    network: Network,
    ledger: Arc<dyn KudosLedger>,
    store: Arc<dyn TokenStore>,
    index: Option<Arc<dyn AssetIndex>>,
    observer: Arc<dyn SyncObserver>,
    applicator: TokenApplicator,
    options: SyncOptions,
}

impl SyncCoordinator {
    /// Creates a coordinator with a [`TracingObserver`] and no asset index.
    pub fn new(
        network: Network,
        ledger: Arc<dyn KudosLedger>,
        store: Arc<dyn TokenStore>,
        options: SyncOptions,
    ) -> Self {
        let applicator = TokenApplicator::new(ledger.clone(), store.clone(), options);
        Self {
            network,
            ledger,
            store,
            index: None,
            observer: Arc::new(TracingObserver),
            applicator,
            options,
        }
    }

    /// Sets the asset index used by OpenSea runs.
    pub fn with_index(mut self, index: Arc<dyn AssetIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Replaces the telemetry sink.
    pub fn with_observer(mut self, observer: Arc<dyn SyncObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// The applicator runs commit through.
    pub fn applicator(&self) -> &TokenApplicator {
        &self.applicator
    }

    /// Validates and runs a request.
    pub async fn sync(&self, request: &SyncRequest) -> SyncResult<SyncReport> {
        let plan = SyncPlan::new(request)?;
        self.run(&plan).await
    }

    /// Runs a validated plan.
    pub async fn run(&self, plan: &SyncPlan) -> SyncResult<SyncReport> {
        if plan.network() != self.network {
            return Err(SyncError::Config(format!(
                "plan targets {} but the coordinator is connected to {}",
                plan.network(),
                self.network
            )));
        }
        if matches!(plan, SyncPlan::ExternalIndex { .. }) && self.index.is_none() {
            return Err(SyncError::Config(
                "OpenSea sync requires an asset index client".into(),
            ));
        }

        self.observer.run_started(plan);
        let ctx = RunContext {
            ledger: self.ledger.as_ref(),
            store: self.store.as_ref(),
            applicator: &self.applicator,
            observer: self.observer.as_ref(),
            options: self.options,
        };

        let report = match plan {
            SyncPlan::EventLog { network, from } => event_log::run(&ctx, *network, from).await?,
            SyncPlan::Enumeration { network, from } => {
                enumeration::run(&ctx, *network, from).await?
            }
            SyncPlan::ExternalIndex { network, from } => {
                let index = self.index.as_deref().ok_or_else(|| {
                    SyncError::Config("OpenSea sync requires an asset index client".into())
                })?;
                external_index::run(&ctx, index, *network, from).await?
            }
        };

        self.observer.run_finished(&report);
        Ok(report)
    }
}
