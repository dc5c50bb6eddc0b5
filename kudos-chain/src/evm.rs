//! alloy-backed [`KudosLedger`] over JSON-RPC.

use crate::classify::{from_contract_error, from_rpc_error};
use crate::contract::Kudos;
use crate::error::{ChainError, ChainResult};
use crate::KudosLedger;
use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{Filter, Log};
use alloy::sol_types::SolEvent;
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;
use kudos_types::{BlockNumber, TokenId, TokenState, TransferEvent, TxHash};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Largest block span requested in a single `eth_getLogs` call.
pub const DEFAULT_LOG_CHUNK_SIZE: u64 = 5_000;

/// Connection settings for one network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// HTTP JSON-RPC endpoint.
    pub rpc_url: String,
    /// Address of the Kudos contract.
    pub contract_address: String,
    /// Block span per `eth_getLogs` request.
    pub log_chunk_size: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            contract_address: String::new(),
            log_chunk_size: DEFAULT_LOG_CHUNK_SIZE,
        }
    }
}

/// Kudos contract reader on an EVM chain.
pub struct EvmLedger {
    provider: DynProvider,
    address: Address,
    log_chunk_size: u64,
}

impl EvmLedger {
    /// Builds an HTTP provider for the configured endpoint. No request is
    /// made until the first read.
    pub fn connect(config: &LedgerConfig) -> ChainResult<Self> {
        let url: Url = config
            .rpc_url
            .parse()
            .map_err(|e| ChainError::Config(format!("invalid rpc url {:?}: {e}", config.rpc_url)))?;
        let address: Address = config.contract_address.parse().map_err(|e| {
            ChainError::Config(format!(
                "invalid contract address {:?}: {e}",
                config.contract_address
            ))
        })?;
        if config.log_chunk_size == 0 {
            return Err(ChainError::Config("log_chunk_size must be positive".to_string()));
        }

        let provider = DynProvider::new(
            ProviderBuilder::new()
                .disable_recommended_fillers()
                .connect_http(url),
        );
        Ok(Self {
            provider,
            address,
            log_chunk_size: config.log_chunk_size,
        })
    }

    /// Returns the contract address.
    pub fn address(&self) -> Address {
        self.address
    }

    fn contract(&self) -> Kudos::KudosInstance<DynProvider> {
        Kudos::new(self.address, self.provider.clone())
    }
}

fn to_u64(value: U256, what: &str) -> ChainResult<u64> {
    u64::try_from(value).map_err(|_| ChainError::Decode(format!("{what} {value} does not fit in u64")))
}

fn decode_transfer(log: &Log) -> ChainResult<TransferEvent> {
    let decoded = log
        .log_decode::<Kudos::Transfer>()
        .map_err(|e| ChainError::Decode(format!("transfer log: {e}")))?;
    let data = &decoded.inner.data;

    let block_number = log
        .block_number
        .ok_or_else(|| ChainError::Decode("transfer log without block number".to_string()))?;
    let tx_hash = log
        .transaction_hash
        .ok_or_else(|| ChainError::Decode("transfer log without transaction hash".to_string()))?;

    Ok(TransferEvent {
        token_id: TokenId::new(to_u64(data._tokenId, "token id")?),
        block_number,
        log_index: log.log_index.unwrap_or_default(),
        tx_hash: TxHash::from_bytes(tx_hash.0),
        from: data._from.to_string(),
        to: data._to.to_string(),
    })
}

#[async_trait]
impl KudosLedger for EvmLedger {
    async fn head_block(&self) -> ChainResult<BlockNumber> {
        self.provider.get_block_number().await.map_err(from_rpc_error)
    }

    async fn total_supply(&self) -> ChainResult<u64> {
        let supply = self
            .contract()
            .totalSupply()
            .call()
            .await
            .map_err(from_contract_error)?;
        to_u64(supply, "total supply")
    }

    fn log_window(&self) -> u64 {
        self.log_chunk_size
    }

    async fn transfer_events(
        &self,
        from: BlockNumber,
        to: BlockNumber,
    ) -> ChainResult<Vec<TransferEvent>> {
        let mut events = Vec::new();
        let mut block = from;

        while block <= to {
            let chunk_end = block.saturating_add(self.log_chunk_size - 1).min(to);
            let filter = Filter::new()
                .address(self.address)
                .event_signature(Kudos::Transfer::SIGNATURE_HASH)
                .from_block(block)
                .to_block(chunk_end);

            let logs = self.provider.get_logs(&filter).await.map_err(from_rpc_error)?;
            debug!(from = block, to = chunk_end, count = logs.len(), "fetched transfer logs");
            for log in &logs {
                events.push(decode_transfer(log)?);
            }

            if chunk_end == BlockNumber::MAX {
                break;
            }
            block = chunk_end + 1;
        }

        events.sort_by_key(TransferEvent::ledger_position);
        Ok(events)
    }

    async fn token(&self, id: TokenId) -> ChainResult<TokenState> {
        let contract = self.contract();
        let token_id = U256::from(id.get());

        let owner = contract
            .ownerOf(token_id)
            .call()
            .await
            .map_err(from_contract_error)?;
        let token_uri = contract
            .tokenURI(token_id)
            .call()
            .await
            .map_err(from_contract_error)?;
        let kudos = contract
            .getKudosById(token_id)
            .call()
            .await
            .map_err(from_contract_error)?;

        Ok(TokenState {
            id,
            owner: owner.to_string(),
            token_uri,
            price_finney: to_u64(kudos.priceFinney, "price")?,
            num_clones_allowed: to_u64(kudos.numClonesAllowed, "clones allowed")?,
            num_clones_in_wild: to_u64(kudos.numClonesInWild, "clones in wild")?,
            cloned_from_id: to_u64(kudos.clonedFromId, "cloned from id")?,
        })
    }
}
