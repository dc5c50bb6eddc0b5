use kudos_sync::config::{LOCALHOST_RPC_URL, OPENSEA_MAINNET_URL, OPENSEA_RINKEBY_URL};
use kudos_sync::{FailurePolicy, OpenSeaClient, RetryPolicy, SyncConfig, SyncError};
use kudos_types::Network;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

const CONTRACT: &str = "0x2aea4add166ebf38b63d09a75de1a7b94aa24163";

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults() {
    let config = SyncConfig::default();
    assert_eq!(config.localhost.rpc_url.as_deref(), Some(LOCALHOST_RPC_URL));
    assert!(config.rinkeby.rpc_url.is_none());
    assert_eq!(config.opensea.base_url(Network::Rinkeby), Some(OPENSEA_RINKEBY_URL));
    assert_eq!(config.opensea.base_url(Network::Mainnet), Some(OPENSEA_MAINNET_URL));
    assert_eq!(config.opensea.base_url(Network::Localhost), None);
    assert_eq!(config.failure_policy, FailurePolicy::SkipAndReport);
    assert_eq!(config.concurrency, 4);
    config.validate().unwrap();
}

#[test]
fn load_without_path_gives_defaults() {
    assert_eq!(SyncConfig::load(None).unwrap(), SyncConfig::default());
}

#[test]
fn load_partial_json_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "database_path": "/var/lib/kudos.sqlite",
            "rinkeby": {{ "rpc_url": "https://rinkeby.example/rpc", "contract_address": "{CONTRACT}" }},
            "failure_policy": "abort",
            "retry": {{ "max_attempts": 5 }}
        }}"#
    )
    .unwrap();

    let config = SyncConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.database_path, PathBuf::from("/var/lib/kudos.sqlite"));
    assert_eq!(config.failure_policy, FailurePolicy::Abort);
    assert_eq!(config.retry.max_attempts, 5);
    assert_eq!(config.retry.base_delay_ms, RetryPolicy::default().base_delay_ms);
    assert_eq!(config.concurrency, 4);

    let ledger = config.ledger_config(Network::Rinkeby).unwrap();
    assert_eq!(ledger.rpc_url, "https://rinkeby.example/rpc");
    assert_eq!(ledger.contract_address, CONTRACT);
}

#[test]
fn load_rejects_malformed_json() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();
    assert!(matches!(
        SyncConfig::load(Some(file.path())),
        Err(SyncError::Serialization(_))
    ));
}

#[test]
fn load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        SyncConfig::load(Some(&dir.path().join("missing.json"))),
        Err(SyncError::Io(_))
    ));
}

#[test]
fn env_overrides_apply_per_network() {
    let mut config = SyncConfig::default();
    config.apply_env_overrides(env(&[
        ("KUDOS_DATABASE", "/tmp/k.sqlite"),
        ("OPENSEA_API_KEY", "secret"),
        ("KUDOS_MAINNET_RPC_URL", "https://mainnet.example"),
        ("KUDOS_MAINNET_CONTRACT", CONTRACT),
        ("KUDOS_RINKEBY_RPC_URL", "   "),
    ]));

    assert_eq!(config.database_path, PathBuf::from("/tmp/k.sqlite"));
    assert_eq!(config.opensea.api_key.as_deref(), Some("secret"));
    assert_eq!(config.mainnet.rpc_url.as_deref(), Some("https://mainnet.example"));
    assert_eq!(config.mainnet.contract_address.as_deref(), Some(CONTRACT));
    // Blank values are ignored.
    assert!(config.rinkeby.rpc_url.is_none());
    assert_eq!(config.localhost.rpc_url.as_deref(), Some(LOCALHOST_RPC_URL));
}

#[test]
fn ledger_config_requires_endpoint_and_contract() {
    let config = SyncConfig::default();
    assert!(matches!(config.ledger_config(Network::Mainnet), Err(SyncError::Config(_))));
    // Localhost has an endpoint but no contract.
    assert!(matches!(config.ledger_config(Network::Localhost), Err(SyncError::Config(_))));
}

#[test]
fn validate_rejects_zero_values() {
    let mut config = SyncConfig::default();
    config.concurrency = 0;
    assert!(config.validate().is_err());

    let mut config = SyncConfig::default();
    config.retry.max_attempts = 0;
    assert!(config.validate().is_err());

    let mut config = SyncConfig::default();
    config.request_timeout_ms = 0;
    assert!(config.validate().is_err());
}

#[test]
fn options_carry_runtime_knobs() {
    let mut config = SyncConfig::default();
    config.request_timeout_ms = 1_500;
    config.concurrency = 8;
    let options = config.options();
    assert_eq!(options.request_timeout, Duration::from_millis(1_500));
    assert_eq!(options.concurrency, 8);
    assert_eq!(options.retry, config.retry);
}

#[test]
fn retry_delay_doubles_up_to_cap() {
    let policy = RetryPolicy {
        max_attempts: 10,
        base_delay_ms: 100,
        max_delay_ms: 1_000,
    };
    assert_eq!(policy.delay_for(1), Duration::from_millis(100));
    assert_eq!(policy.delay_for(2), Duration::from_millis(200));
    assert_eq!(policy.delay_for(4), Duration::from_millis(800));
    assert_eq!(policy.delay_for(5), Duration::from_millis(1_000));
    assert_eq!(policy.delay_for(80), Duration::from_millis(1_000));
}

// ── OpenSea client construction ───────────────────────────────────

#[test]
fn opensea_client_needs_indexed_network() {
    let mut config = SyncConfig::default();
    config.opensea.api_key = Some("key".into());
    config.localhost.contract_address = Some(CONTRACT.into());
    assert!(matches!(
        OpenSeaClient::for_network(&config, Network::Localhost),
        Err(SyncError::Config(_))
    ));
}

#[test]
fn opensea_client_needs_api_key() {
    let mut config = SyncConfig::default();
    config.rinkeby.contract_address = Some(CONTRACT.into());
    assert!(matches!(
        OpenSeaClient::for_network(&config, Network::Rinkeby),
        Err(SyncError::Config(_))
    ));
}

#[test]
fn opensea_client_uses_network_base_url() {
    let mut config = SyncConfig::default();
    config.opensea.api_key = Some("key".into());
    config.mainnet.contract_address = Some(CONTRACT.into());
    let client = OpenSeaClient::for_network(&config, Network::Mainnet).unwrap();
    assert_eq!(client.base_url(), OPENSEA_MAINNET_URL);
}
