//! Indexing API client for balances and token metadata
//!
//! Provides access to:
//! - Native-asset balance of an account
//! - All ERC-20 balances of an account (paginated)
//! - Token metadata (symbol, name, decimals, logo)

pub mod types;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::IndexerConfig;
use crate::error::{Error, Result};
use types::{RawTokenMetadata, RpcRequest, RpcResponse, TokenBalancesPage};

pub use types::{FungibleBalance, TokenMetadata};

/// Upper bound on `alchemy_getTokenBalances` pages followed per load
const MAX_BALANCE_PAGES: usize = 50;

/// Read access to account balances and token metadata
#[async_trait]
pub trait IndexerApi: Send + Sync {
    /// Native-asset balance in wei
    async fn native_balance(&self, account: Address) -> Result<U256>;

    /// Every fungible-token balance the indexer knows for `account`, in
    /// upstream order
    async fn token_balances(&self, account: Address) -> Result<Vec<FungibleBalance>>;

    /// Metadata for a single token contract
    async fn token_metadata(&self, contract: Address) -> Result<TokenMetadata>;
}

/// Alchemy-compatible JSON-RPC client
pub struct AlchemyClient {
    /// HTTP client
    client: Client,
    /// JSON-RPC endpoint, API key included
    endpoint: String,
    /// Monotonic JSON-RPC request id
    next_id: AtomicU64,
}

impl AlchemyClient {
    /// Create a new client from configuration
    pub fn new(config: &IndexerConfig) -> Result<Self> {
        Self::with_endpoint(config.endpoint(), Duration::from_millis(config.timeout_ms))
    }

    /// Create a client against an explicit endpoint
    pub fn with_endpoint(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            next_id: AtomicU64::new(1),
        })
    }

    async fn call<P, T>(&self, method: &str, params: P) -> Result<T>
    where
        P: Serialize + Send,
        T: DeserializeOwned,
    {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        debug!("Indexer request: {}", method);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Indexer request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Network(format!("Indexer API error {}: {}", status, body)));
        }

        let rpc_response: RpcResponse<T> = response.json().await.map_err(|e| {
            Error::Deserialization(format!("Failed to parse indexer response: {}", e))
        })?;

        if let Some(error) = rpc_response.error {
            return Err(Error::Rpc(format!(
                "{} failed ({}): {}",
                method, error.code, error.message
            )));
        }

        rpc_response
            .result
            .ok_or_else(|| Error::Rpc(format!("No result in {} response", method)))
    }

    /// Latest block number, used as a connectivity check
    pub async fn block_number(&self) -> Result<u64> {
        let block: U256 = self.call("eth_blockNumber", serde_json::json!([])).await?;
        u64::try_from(block).map_err(|e| Error::Rpc(format!("Block number out of range: {}", e)))
    }
}

#[async_trait]
impl IndexerApi for AlchemyClient {
    async fn native_balance(&self, account: Address) -> Result<U256> {
        self.call("eth_getBalance", (account, "latest")).await
    }

    async fn token_balances(&self, account: Address) -> Result<Vec<FungibleBalance>> {
        let mut balances = Vec::new();
        let mut page_key: Option<String> = None;

        for page in 0..MAX_BALANCE_PAGES {
            let params = match &page_key {
                Some(key) => serde_json::json!([account, "erc20", { "pageKey": key }]),
                None => serde_json::json!([account, "erc20"]),
            };

            let result: TokenBalancesPage = self.call("alchemy_getTokenBalances", params).await?;
            debug!(
                "Token balances page {}: {} entries",
                page,
                result.token_balances.len()
            );
            balances.extend(result.token_balances.into_iter().map(FungibleBalance::from));

            match result.page_key {
                Some(key) if !key.is_empty() => page_key = Some(key),
                _ => return Ok(balances),
            }
        }

        warn!(
            "Stopped following token balance pages for {} after {} pages",
            account,
            MAX_BALANCE_PAGES
        );
        Ok(balances)
    }

    async fn token_metadata(&self, contract: Address) -> Result<TokenMetadata> {
        let raw: RawTokenMetadata = self.call("alchemy_getTokenMetadata", [contract]).await?;
        Ok(raw.into())
    }
}
