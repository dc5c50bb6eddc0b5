//! OpenSea events API client.
//!
//! One `GET {base}/events?asset_contract_address=..&token_id=..` per token,
//! authenticated with the `X-API-KEY` header. Only the first reported event
//! is used.

use super::{AssetIndex, AssetTransfer};
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use kudos_types::{Network, TokenId, TxHash};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// Response structures. Only the fields the sync reads are declared.
#[derive(Debug, Deserialize)]
struct EventsPage {
    #[serde(default)]
    asset_events: Vec<AssetEvent>,
}

#[derive(Debug, Deserialize)]
struct AssetEvent {
    asset: Option<Asset>,
    transaction: Option<Transaction>,
}

#[derive(Debug, Deserialize)]
struct Asset {
    token_id: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct Transaction {
    transaction_hash: Option<String>,
}

/// Client for the OpenSea v1 events endpoint.
pub struct OpenSeaClient {
    client: Client,
    base_url: String,
    api_key: String,
    contract_address: String,
}

impl OpenSeaClient {
    /// Creates a client for an explicit base URL.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        contract_address: impl Into<String>,
    ) -> SyncResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SyncError::Config("OpenSea API key is empty".into()));
        }
        let client = Client::builder()
            .build()
            .map_err(|e| SyncError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            contract_address: contract_address.into(),
        })
    }

    /// Creates a client for a network from configuration.
    ///
    /// Fails before any request if the network is not indexed, the API key is
    /// missing or the contract address is unknown.
    pub fn for_network(config: &SyncConfig, network: Network) -> SyncResult<Self> {
        let base_url = config.opensea.base_url(network).ok_or_else(|| {
            SyncError::Config("the OpenSea API only indexes rinkeby and mainnet".into())
        })?;
        let api_key = config.opensea.api_key.as_deref().ok_or_else(|| {
            SyncError::Config("OpenSea sync requires an API key; set OPENSEA_API_KEY".into())
        })?;
        let contract = config.network(network).contract_address.as_deref().ok_or_else(|| {
            SyncError::Config(format!("no Kudos contract address configured for {network}"))
        })?;
        Self::new(base_url, api_key, contract)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl AssetIndex for OpenSeaClient {
    fn provider_name(&self) -> &str {
        "opensea"
    }

    async fn first_transfer(&self, token_id: TokenId) -> SyncResult<AssetTransfer> {
        let id = token_id.to_string();
        let response = self
            .client
            .get(format!("{}/events", self.base_url))
            .query(&[
                ("asset_contract_address", self.contract_address.as_str()),
                ("token_id", id.as_str()),
            ])
            .header("X-API-KEY", self.api_key.as_str())
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("OpenSea request for token {token_id} failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SyncError::Network(format!("failed to read OpenSea response: {e}")))?;

        if !status.is_success() {
            return Err(SyncError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let transfer = parse_first_transfer(token_id, &body)?;
        debug!("OpenSea token_id: {}, txid: {}", transfer.token_id, transfer.tx_hash);
        Ok(transfer)
    }
}

/// Extracts `asset_events[0].asset.token_id` and
/// `asset_events[0].transaction.transaction_hash`.
fn parse_first_transfer(requested: TokenId, body: &str) -> SyncResult<AssetTransfer> {
    let page: EventsPage = serde_json::from_str(body)
        .map_err(|e| SyncError::data(requested, format!("malformed OpenSea response: {e}")))?;

    let event = page
        .asset_events
        .into_iter()
        .next()
        .ok_or_else(|| SyncError::data(requested, "OpenSea reported no asset events"))?;

    let asset = event
        .asset
        .ok_or_else(|| SyncError::data(requested, "OpenSea event has no asset"))?;
    let token_id = match &asset.token_id {
        serde_json::Value::String(s) => s.parse::<TokenId>().ok(),
        serde_json::Value::Number(n) => n.as_u64().map(TokenId::new),
        _ => None,
    }
    .ok_or_else(|| {
        SyncError::data(requested, format!("OpenSea asset has invalid token_id {}", asset.token_id))
    })?;

    let hash = event
        .transaction
        .and_then(|t| t.transaction_hash)
        .ok_or_else(|| SyncError::data(requested, "OpenSea event has no transaction hash"))?;
    let tx_hash = TxHash::parse(&hash)
        .map_err(|e| SyncError::data(requested, format!("invalid transaction hash: {e}")))?;

    Ok(AssetTransfer { token_id, tx_hash })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "0x00000000000000000000000000000000000000000000000000000000000000ab";

    #[test]
    fn parses_string_token_id() {
        let body = format!(
            r#"{{"asset_events":[{{"asset":{{"token_id":"12"}},"transaction":{{"transaction_hash":"{HASH}"}}}}]}}"#
        );
        let transfer = parse_first_transfer(TokenId::new(12), &body).unwrap();
        assert_eq!(transfer.token_id, TokenId::new(12));
        assert_eq!(transfer.tx_hash.to_string(), HASH);
    }

    #[test]
    fn parses_numeric_token_id_and_uses_first_event() {
        let body = format!(
            r#"{{"asset_events":[
                {{"asset":{{"token_id":3}},"transaction":{{"transaction_hash":"{HASH}"}}}},
                {{"asset":{{"token_id":4}},"transaction":null}}
            ]}}"#
        );
        let transfer = parse_first_transfer(TokenId::new(3), &body).unwrap();
        assert_eq!(transfer.token_id, TokenId::new(3));
    }

    #[test]
    fn empty_events_is_a_data_error() {
        let err = parse_first_transfer(TokenId::new(5), r#"{"asset_events":[]}"#).unwrap_err();
        assert!(matches!(err, SyncError::Data { token_id, .. } if token_id == TokenId::new(5)));
        assert!(!err.is_transient());
    }

    #[test]
    fn missing_transaction_is_a_data_error() {
        let body = r#"{"asset_events":[{"asset":{"token_id":"5"},"transaction":null}]}"#;
        assert!(matches!(
            parse_first_transfer(TokenId::new(5), body),
            Err(SyncError::Data { .. })
        ));
    }

    #[test]
    fn invalid_json_is_a_data_error() {
        assert!(matches!(
            parse_first_transfer(TokenId::new(1), "<html>"),
            Err(SyncError::Data { .. })
        ));
    }
}
