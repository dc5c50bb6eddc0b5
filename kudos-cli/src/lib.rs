//! Argument parsing and wiring for the `kudos-sync` binary.

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use kudos_chain::EvmLedger;
use kudos_store::SqliteTokenStore;
use kudos_sync::{
    AssetIndex, CursorSpec, FailurePolicy, OpenSeaClient, SyncConfig, SyncCoordinator, SyncMethod,
    SyncPlan, SyncReport, SyncRequest,
};
use kudos_types::Network;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Log filter applied unless `RUST_LOG` says otherwise. HTTP and RPC client
/// internals stay at warn.
const DEFAULT_FILTER: &str = "info,hyper=warn,hyper_util=warn,reqwest=warn,alloy=warn";
const VERBOSE_FILTER: &str = "debug,hyper=warn,hyper_util=warn,reqwest=warn";

#[derive(Parser, Debug, Clone)]
#[command(name = "kudos-sync")]
#[command(about = "Syncs the Kudos database with the blockchain")]
#[command(group(
    ArgGroup::new("cursor")
        .required(true)
        .args(["start", "rewind", "catchup", "resume"])
))]
pub struct Args {
    /// Ethereum network to use (localhost, rinkeby, mainnet)
    pub network: Network,

    /// Sync method to use (filter, id, opensea)
    pub method: SyncMethod,

    /// Kudos id or block to start syncing at. Lowest kudos id is 1; blocks
    /// accept a number, "earliest" or "latest"
    #[arg(short, long)]
    pub start: Option<String>,

    /// Sync the latest <REWIND> kudos ids or blocks
    #[arg(short, long)]
    pub rewind: Option<u64>,

    /// Sync from the newest kudos already in the database
    #[arg(long)]
    pub catchup: bool,

    /// Continue after the last token committed by a previous id or opensea run
    #[arg(long)]
    pub resume: bool,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// SQLite database path
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// OpenSea API key (also read from OPENSEA_API_KEY)
    #[arg(long)]
    pub opensea_api_key: Option<String>,

    /// Maximum ledger or OpenSea reads in flight
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Stop at the first token that fails instead of skipping it
    #[arg(long)]
    pub fail_fast: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// The cursor flag that was given. clap guarantees exactly one.
    pub fn cursor(&self) -> CursorSpec {
        if let Some(start) = &self.start {
            CursorSpec::Start(start.clone())
        } else if let Some(rewind) = self.rewind {
            CursorSpec::Rewind(rewind)
        } else if self.resume {
            CursorSpec::Resume
        } else {
            CursorSpec::CatchUp
        }
    }

    pub fn to_request(&self) -> SyncRequest {
        SyncRequest::new(self.network, self.method, self.cursor())
    }

    /// Layers defaults, the config file, `env` and command-line flags.
    pub fn build_config<F>(&self, env: F) -> Result<SyncConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = SyncConfig::load(self.config.as_deref())
            .with_context(|| format!("failed to load config from {:?}", self.config))?;
        config.apply_env_overrides(env);

        if let Some(database) = &self.database {
            config.database_path = database.clone();
        }
        if let Some(key) = &self.opensea_api_key {
            config.opensea.api_key = Some(key.clone());
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if self.fail_fast {
            config.failure_policy = FailurePolicy::Abort;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Installs the global subscriber. Call once.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Validates the request, connects the collaborators and runs the sync.
///
/// Everything that can be rejected without I/O is rejected before the
/// database is opened or the node is contacted.
pub async fn run(args: &Args, config: &SyncConfig) -> Result<SyncReport> {
    let plan = SyncPlan::new(&args.to_request())?;
    let network = plan.network();

    let ledger_config = config.ledger_config(network)?;
    let index: Option<Arc<dyn AssetIndex>> = match plan {
        SyncPlan::ExternalIndex { .. } => Some(Arc::new(OpenSeaClient::for_network(config, network)?)),
        SyncPlan::EventLog { .. } | SyncPlan::Enumeration { .. } => None,
    };

    let ledger = EvmLedger::connect(&ledger_config)
        .with_context(|| format!("failed to set up ledger client for {network}"))?;
    let store = SqliteTokenStore::open(&config.database_path)
        .with_context(|| format!("failed to open database {}", config.database_path.display()))?;

    info!(
        "Kudos contract {} on {} via {}",
        ledger_config.contract_address, network, ledger_config.rpc_url
    );

    let mut coordinator = SyncCoordinator::new(network, Arc::new(ledger), Arc::new(store), config.options());
    if let Some(index) = index {
        coordinator = coordinator.with_index(index);
    }

    let report = coordinator.run(&plan).await?;
    Ok(report)
}
