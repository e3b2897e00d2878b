//! Portfolio loading: balances, metadata and prices merged into display rows

use alloy::primitives::{Address, U256};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::token::TokenDisplay;
use crate::config::NativeAssetConfig;
use crate::error::Result;
use crate::indexer::{FungibleBalance, IndexerApi, TokenMetadata};
use crate::price::PriceLookup;

/// Placeholder shown when the indexer has no symbol for a token
const UNKNOWN_SYMBOL: &str = "???";

/// Largest scale a raw U256 amount can be formatted at
const MAX_TOKEN_DECIMALS: u8 = 77;

/// Builds the ordered list of balances for an account
pub struct PortfolioLoader {
    indexer: Arc<dyn IndexerApi>,
    prices: PriceLookup,
    native: NativeAssetConfig,
}

impl PortfolioLoader {
    pub fn new(indexer: Arc<dyn IndexerApi>, prices: PriceLookup, native: NativeAssetConfig) -> Self {
        Self {
            indexer,
            prices,
            native,
        }
    }

    /// Fetch every balance of `account` and return display rows, native
    /// asset first, then tokens in indexer order.
    ///
    /// Fails only when the account-level balance fetches fail. Tokens whose
    /// metadata cannot be fetched are dropped; prices that cannot be resolved
    /// are left unknown.
    pub async fn load_portfolio(&self, account: Address) -> Result<Vec<TokenDisplay>> {
        info!("Loading portfolio for {}", account);

        let (native_balance, fungible) = futures::try_join!(
            self.indexer.native_balance(account),
            self.indexer.token_balances(account),
        )?;

        let held: Vec<(Address, U256)> = fungible
            .into_iter()
            .filter(FungibleBalance::is_displayable)
            .filter_map(|b| Some((b.contract_address?, b.raw_balance?)))
            .collect();
        debug!("{} non-zero token balances", held.len());

        let metadata = join_all(
            held.iter()
                .map(|(contract, _)| self.indexer.token_metadata(*contract)),
        )
        .await;

        let mut rows = Vec::with_capacity(held.len() + 1);
        rows.push(TokenDisplay {
            contract_address: None,
            raw_balance: native_balance,
            symbol: self.native.symbol.clone(),
            name: self.native.name.clone(),
            decimals: self.native.decimals,
            price: None,
            logo_url: self.native.logo_url.clone(),
        });

        for ((contract, raw_balance), metadata) in held.into_iter().zip(metadata) {
            match metadata {
                Ok(metadata) => match token_row(contract, raw_balance, metadata) {
                    Some(row) => rows.push(row),
                    None => warn!("Dropping {}: missing or unusable decimals", contract),
                },
                Err(e) => warn!("Dropping {}: metadata fetch failed: {}", contract, e),
            }
        }

        let prices = join_all(
            rows.iter()
                .map(|row| self.prices.lookup(&row.symbol, row.contract_address)),
        )
        .await;
        for (row, price) in rows.iter_mut().zip(prices) {
            row.price = price;
        }

        info!("Loaded {} portfolio rows for {}", rows.len(), account);
        Ok(rows)
    }
}

fn token_row(contract: Address, raw_balance: U256, metadata: TokenMetadata) -> Option<TokenDisplay> {
    let decimals = metadata.decimals.filter(|d| *d <= MAX_TOKEN_DECIMALS)?;
    let symbol = metadata
        .symbol
        .unwrap_or_else(|| UNKNOWN_SYMBOL.to_string());
    let name = metadata.name.unwrap_or_else(|| symbol.clone());

    Some(TokenDisplay {
        contract_address: Some(contract),
        raw_balance,
        symbol,
        name,
        decimals,
        price: None,
        logo_url: metadata.logo_url,
    })
}
