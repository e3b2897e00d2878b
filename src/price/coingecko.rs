//! CoinGecko simple-price client

use alloy::primitives::Address;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::PriceSource;
use crate::config::PriceConfig;
use crate::error::{Error, Result};

/// `{ "<id or contract>": { "usd": 1.23 } }`
type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

const VS_CURRENCY: &str = "usd";

pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    native_id: String,
    platform: String,
    api_key: Option<String>,
}

impl CoinGeckoClient {
    pub fn new(config: &PriceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            native_id: config.native_id.clone(),
            platform: config.platform.clone(),
            api_key: Some(config.api_key.clone()).filter(|k| !k.is_empty()),
        })
    }

    async fn fetch(&self, url: &str, query: &[(&str, &str)]) -> Result<SimplePriceResponse> {
        let mut request = self.client.get(url).query(query);
        if let Some(key) = &self.api_key {
            request = request.header("x-cg-demo-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(format!("Price request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Network(format!("Price API error {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Deserialization(format!("Failed to parse price response: {}", e)))
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn native_price(&self) -> Result<Option<f64>> {
        let url = format!("{}/simple/price", self.base_url);
        let prices = self
            .fetch(
                &url,
                &[("ids", self.native_id.as_str()), ("vs_currencies", VS_CURRENCY)],
            )
            .await?;

        debug!("Native price response: {:?}", prices);
        Ok(prices
            .get(&self.native_id)
            .and_then(|quote| quote.get(VS_CURRENCY))
            .copied())
    }

    async fn token_price(&self, contract: Address) -> Result<Option<f64>> {
        let url = format!("{}/simple/token_price/{}", self.base_url, self.platform);
        // Keys come back lower-cased
        let key = format!("{:#x}", contract);
        let prices = self
            .fetch(
                &url,
                &[("contract_addresses", key.as_str()), ("vs_currencies", VS_CURRENCY)],
            )
            .await?;

        Ok(prices
            .iter()
            .find(|(address, _)| address.eq_ignore_ascii_case(&key))
            .and_then(|(_, quote)| quote.get(VS_CURRENCY))
            .copied())
    }
}
