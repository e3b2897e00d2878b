//! USD price lookups
//!
//! Prices are best-effort: any failure resolves to "unknown" so that a
//! missing quote never blocks a portfolio load.

pub mod coingecko;

use alloy::primitives::Address;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::Result;

pub use coingecko::CoinGeckoClient;

/// Raw access to a price API
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// USD price of the chain's native asset
    async fn native_price(&self) -> Result<Option<f64>>;

    /// USD price of a token, by contract address
    async fn token_price(&self, contract: Address) -> Result<Option<f64>>;
}

/// Infallible price adapter used by the portfolio loader
#[derive(Clone)]
pub struct PriceLookup {
    source: Arc<dyn PriceSource>,
}

impl PriceLookup {
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self { source }
    }

    /// Best-effort USD price for `symbol`; `contract` is `None` for the
    /// native asset
    pub async fn lookup(&self, symbol: &str, contract: Option<Address>) -> Option<f64> {
        let result = match contract {
            None => self.source.native_price().await,
            Some(address) => self.source.token_price(address).await,
        };

        match result {
            Ok(Some(price)) if price.is_finite() && price >= 0.0 => Some(price),
            Ok(Some(price)) => {
                warn!("Discarding invalid price {} for {}", price, symbol);
                None
            }
            Ok(None) => {
                debug!("No price available for {}", symbol);
                None
            }
            Err(e) => {
                warn!("Price lookup failed for {}: {}", symbol, e);
                None
            }
        }
    }
}
