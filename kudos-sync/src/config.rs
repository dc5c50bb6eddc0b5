//! Sync configuration.
//!
//! Settings are layered: defaults, then an optional JSON file, then
//! environment overrides, then command-line flags (applied by the binary).

use crate::error::{SyncError, SyncResult};
use kudos_chain::{LedgerConfig, DEFAULT_LOG_CHUNK_SIZE};
use kudos_types::Network;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default JSON-RPC endpoint for a local development chain.
pub const LOCALHOST_RPC_URL: &str = "http://localhost:8545";

/// OpenSea events API for rinkeby.
pub const OPENSEA_RINKEBY_URL: &str = "https://rinkeby-api.opensea.io/api/v1";

/// OpenSea events API for mainnet.
pub const OPENSEA_MAINNET_URL: &str = "https://api.opensea.io/api/v1";

/// Ledger connection settings for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub rpc_url: Option<String>,
    pub contract_address: Option<String>,
    /// Maximum block span of a single `eth_getLogs` request.
    pub log_chunk_size: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            contract_address: None,
            log_chunk_size: DEFAULT_LOG_CHUNK_SIZE,
        }
    }
}

/// OpenSea client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenSeaConfig {
    pub api_key: Option<String>,
    pub rinkeby_url: String,
    pub mainnet_url: String,
}

impl Default for OpenSeaConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            rinkeby_url: OPENSEA_RINKEBY_URL.to_string(),
            mainnet_url: OPENSEA_MAINNET_URL.to_string(),
        }
    }
}

impl OpenSeaConfig {
    /// Returns the API base URL for a network, if OpenSea indexes it.
    pub fn base_url(&self, network: Network) -> Option<&str> {
        match network {
            Network::Localhost => None,
            Network::Rinkeby => Some(&self.rinkeby_url),
            Network::Mainnet => Some(&self.mainnet_url),
        }
    }
}

/// Exponential backoff for transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 5_000,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub const NONE: RetryPolicy = RetryPolicy {
        max_attempts: 1,
        base_delay_ms: 0,
        max_delay_ms: 0,
    };

    /// Delay before retry number `attempt` (1-based), doubling each time and
    /// capped at `max_delay_ms`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
        let delay = self.base_delay_ms.saturating_mul(factor).min(self.max_delay_ms);
        Duration::from_millis(delay)
    }
}

/// What an ID strategy does when a single token fails after retries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the run before the next id.
    Abort,
    /// Record the failure in the report and continue.
    #[default]
    SkipAndReport,
}

/// Runtime knobs passed to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    pub retry: RetryPolicy,
    pub request_timeout: Duration,
    /// Maximum ledger or index reads in flight.
    pub concurrency: usize,
    pub failure_policy: FailurePolicy,
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncConfig::default().options()
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub database_path: PathBuf,
    pub localhost: NetworkConfig,
    pub rinkeby: NetworkConfig,
    pub mainnet: NetworkConfig,
    pub opensea: OpenSeaConfig,
    pub retry: RetryPolicy,
    pub request_timeout_ms: u64,
    pub concurrency: usize,
    pub failure_policy: FailurePolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("kudos.sqlite"),
            localhost: NetworkConfig {
                rpc_url: Some(LOCALHOST_RPC_URL.to_string()),
                ..Default::default()
            },
            rinkeby: NetworkConfig::default(),
            mainnet: NetworkConfig::default(),
            opensea: OpenSeaConfig::default(),
            retry: RetryPolicy::default(),
            request_timeout_ms: 30_000,
            concurrency: 4,
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl SyncConfig {
    /// Loads configuration from a JSON file, or returns defaults when no path
    /// is given.
    pub fn load(path: Option<&Path>) -> SyncResult<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                Ok(serde_json::from_str(&raw)?)
            }
            None => Ok(Self::default()),
        }
    }

    /// Applies `KUDOS_DATABASE`, `OPENSEA_API_KEY`, `KUDOS_<NETWORK>_RPC_URL`
    /// and `KUDOS_<NETWORK>_CONTRACT` from the given lookup.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get("KUDOS_DATABASE") {
            self.database_path = PathBuf::from(path);
        }
        if let Some(key) = get("OPENSEA_API_KEY") {
            self.opensea.api_key = Some(key);
        }
        for network in Network::ALL {
            let prefix = format!("KUDOS_{}", network.as_str().to_ascii_uppercase());
            let rpc = get(&format!("{prefix}_RPC_URL"));
            let contract = get(&format!("{prefix}_CONTRACT"));
            let net = self.network_mut(network);
            if rpc.is_some() {
                net.rpc_url = rpc;
            }
            if contract.is_some() {
                net.contract_address = contract;
            }
        }
    }

    /// Returns the settings for a network.
    pub fn network(&self, network: Network) -> &NetworkConfig {
        match network {
            Network::Localhost => &self.localhost,
            Network::Rinkeby => &self.rinkeby,
            Network::Mainnet => &self.mainnet,
        }
    }

    fn network_mut(&mut self, network: Network) -> &mut NetworkConfig {
        match network {
            Network::Localhost => &mut self.localhost,
            Network::Rinkeby => &mut self.rinkeby,
            Network::Mainnet => &mut self.mainnet,
        }
    }

    /// Builds the ledger client settings for a network.
    pub fn ledger_config(&self, network: Network) -> SyncResult<LedgerConfig> {
        let net = self.network(network);
        let rpc_url = net.rpc_url.clone().ok_or_else(|| {
            SyncError::Config(format!(
                "no RPC endpoint configured for {network}; set KUDOS_{}_RPC_URL",
                network.as_str().to_ascii_uppercase()
            ))
        })?;
        let contract_address = net.contract_address.clone().ok_or_else(|| {
            SyncError::Config(format!(
                "no Kudos contract address configured for {network}; set KUDOS_{}_CONTRACT",
                network.as_str().to_ascii_uppercase()
            ))
        })?;
        Ok(LedgerConfig {
            rpc_url,
            contract_address,
            log_chunk_size: net.log_chunk_size,
        })
    }

    /// Checks values that would otherwise fail deep inside a run.
    pub fn validate(&self) -> SyncResult<()> {
        if self.concurrency == 0 {
            return Err(SyncError::Config("concurrency must be at least 1".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(SyncError::Config("retry.max_attempts must be at least 1".into()));
        }
        if self.request_timeout_ms == 0 {
            return Err(SyncError::Config("request_timeout_ms must be positive".into()));
        }
        Ok(())
    }

    /// Runtime options for the coordinator.
    pub fn options(&self) -> SyncOptions {
        SyncOptions {
            retry: self.retry,
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            concurrency: self.concurrency.max(1),
            failure_policy: self.failure_policy,
        }
    }
}
