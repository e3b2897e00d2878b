//! Configuration loading and validation

use alloy::primitives::Address;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::transfer::DelegationPolicy;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub chain: ChainConfig,
    pub indexer: IndexerConfig,
    pub price: PriceConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
    pub bulk_transfer: BulkTransferConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    #[serde(default = "default_chain_name")]
    pub name: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_explorer_url")]
    pub explorer_url: String,
    #[serde(default)]
    pub native: NativeAssetConfig,
}

/// How the chain's base currency is displayed
#[derive(Debug, Clone, Deserialize)]
pub struct NativeAssetConfig {
    #[serde(default = "default_native_symbol")]
    pub symbol: String,
    #[serde(default = "default_native_name")]
    pub name: String,
    #[serde(default = "default_native_decimals")]
    pub decimals: u8,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl Default for NativeAssetConfig {
    fn default() -> Self {
        Self {
            symbol: default_native_symbol(),
            name: default_native_name(),
            decimals: default_native_decimals(),
            logo_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexerConfig {
    /// Alchemy network slug, e.g. "eth-mainnet" or "base-sepolia"
    #[serde(default = "default_indexer_network")]
    pub network: String,
    #[serde(default)]
    pub api_key: String,
    /// Overrides the URL derived from `network` and `api_key`
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl IndexerConfig {
    /// JSON-RPC endpoint for the indexing API
    pub fn endpoint(&self) -> String {
        match &self.base_url {
            Some(url) => url.clone(),
            None => format!(
                "https://{}.g.alchemy.com/v2/{}",
                self.network, self.api_key
            ),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceConfig {
    #[serde(default = "default_price_base_url")]
    pub base_url: String,
    /// Price-by-id identifier of the native asset
    #[serde(default = "default_native_price_id")]
    pub native_id: String,
    /// Asset platform used for price-by-contract lookups
    #[serde(default = "default_price_platform")]
    pub platform: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    /// Hex-encoded secp256k1 private key (prefer SWEEPER_WALLET__PRIVATE_KEY)
    #[serde(default)]
    pub private_key: String,
    /// Whether the wallet may sign EIP-7702 authorizations on this chain
    #[serde(default = "default_true")]
    pub eip7702: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            private_key: String::new(),
            eip7702: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkTransferConfig {
    /// Deployed bulk-transfer contract
    pub contract: Address,
    #[serde(default)]
    pub delegation: DelegationPolicy,
}

fn default_chain_name() -> String {
    "mainnet".to_string()
}

fn default_chain_id() -> u64 {
    1
}

fn default_rpc_url() -> String {
    "https://ethereum-rpc.publicnode.com".to_string()
}

fn default_explorer_url() -> String {
    "https://etherscan.io".to_string()
}

fn default_native_symbol() -> String {
    "ETH".to_string()
}

fn default_native_name() -> String {
    "Ether".to_string()
}

fn default_native_decimals() -> u8 {
    18
}

fn default_indexer_network() -> String {
    "eth-mainnet".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_price_base_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

fn default_native_price_id() -> String {
    "ethereum".to_string()
}

fn default_price_platform() -> String {
    "ethereum".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Start with defaults
            .set_default("chain.name", default_chain_name())?
            .set_default("chain.chain_id", default_chain_id() as i64)?
            .set_default("chain.rpc_url", default_rpc_url())?
            .set_default("chain.explorer_url", default_explorer_url())?
            .set_default("indexer.network", default_indexer_network())?
            .set_default("indexer.timeout_ms", default_timeout_ms() as i64)?
            .set_default("price.base_url", default_price_base_url())?
            .set_default("price.timeout_ms", default_timeout_ms() as i64)?
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (SWEEPER_SECTION__KEY)
            .add_source(
                config::Environment::with_prefix("SWEEPER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.chain.chain_id == 0 {
            anyhow::bail!("chain_id must be non-zero");
        }

        if self.chain.rpc_url.trim().is_empty() {
            anyhow::bail!("rpc_url must be set");
        }
        url::Url::parse(&self.chain.rpc_url)
            .with_context(|| format!("Invalid rpc_url: {}", self.chain.rpc_url))?;

        if self.indexer.timeout_ms == 0 || self.price.timeout_ms == 0 {
            anyhow::bail!("timeout_ms must be positive");
        }

        if self.bulk_transfer.contract == Address::ZERO {
            anyhow::bail!("bulk_transfer.contract must be set to the deployed contract address");
        }

        if self.indexer.api_key.is_empty() && self.indexer.base_url.is_none() {
            tracing::warn!("indexer.api_key is not set - balance fetches will fail to authenticate");
        }

        Ok(())
    }

    /// Get masked configuration for display (hide secrets)
    pub fn masked_display(&self) -> String {
        format!(
            r#"Configuration:
  Chain:
    name: {}
    chain_id: {}
    rpc_url: {}
    explorer: {}
    native: {} ({} decimals)
  Indexer:
    network: {}
    endpoint: {}
    api_key: {}
  Price:
    base_url: {}
    native_id: {}
    platform: {}
    api_key: {}
  Wallet:
    private_key: {}
    eip7702: {}
  Bulk transfer:
    contract: {}
    delegation: {}
"#,
            self.chain.name,
            self.chain.chain_id,
            mask_url(&self.chain.rpc_url),
            self.chain.explorer_url,
            self.chain.native.symbol,
            self.chain.native.decimals,
            self.indexer.network,
            mask_url(&self.indexer.endpoint()),
            mask_secret(&self.indexer.api_key),
            self.price.base_url,
            self.price.native_id,
            self.price.platform,
            mask_secret(&self.price.api_key),
            mask_secret(&self.wallet.private_key),
            self.wallet.eip7702,
            self.bulk_transfer.contract,
            self.bulk_transfer.delegation,
        )
    }

    /// Block explorer link for a submitted transaction
    pub fn explorer_tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.chain.explorer_url.trim_end_matches('/'), tx_hash)
    }
}

/// Mask URL for display: query string, credentials and the last path
/// segment (`/v2/{key}` style endpoints) are hidden
fn mask_url(url: &str) -> String {
    let (base, has_query) = match url.split_once('?') {
        Some((base, _)) => (base, true),
        None => (url, false),
    };

    let masked = match base.split_once("://") {
        Some((scheme, rest)) => {
            let (authority, path) = match rest.split_once('/') {
                Some((authority, path)) => (authority, Some(path)),
                None => (rest, None),
            };
            let authority = match authority.rsplit_once('@') {
                Some((_, host)) => format!("***@{}", host),
                None => authority.to_string(),
            };
            match path.map(|path| (path, path.rsplit_once('/'))) {
                Some((_, Some((head, last)))) if !last.is_empty() => {
                    format!("{}://{}/{}/***", scheme, authority, head)
                }
                Some((path, None)) if !path.is_empty() => format!("{}://{}/***", scheme, authority),
                Some((path, _)) => format!("{}://{}/{}", scheme, authority, path),
                None => format!("{}://{}", scheme, authority),
            }
        }
        None => base.to_string(),
    };

    if has_query {
        format!("{}?***", masked)
    } else {
        masked
    }
}

fn mask_secret(secret: &str) -> &'static str {
    if secret.is_empty() {
        "(not set)"
    } else {
        "***"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chain: ChainConfig {
                name: default_chain_name(),
                chain_id: default_chain_id(),
                rpc_url: default_rpc_url(),
                explorer_url: default_explorer_url(),
                native: NativeAssetConfig::default(),
            },
            indexer: IndexerConfig {
                network: default_indexer_network(),
                api_key: String::new(),
                base_url: None,
                timeout_ms: default_timeout_ms(),
            },
            price: PriceConfig {
                base_url: default_price_base_url(),
                native_id: default_native_price_id(),
                platform: default_price_platform(),
                api_key: String::new(),
                timeout_ms: default_timeout_ms(),
            },
            wallet: WalletConfig::default(),
            bulk_transfer: BulkTransferConfig {
                contract: Address::ZERO,
                delegation: DelegationPolicy::default(),
            },
        }
    }
}
