//! Indexing API data types

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// One fungible-token balance as reported by the indexer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FungibleBalance {
    /// `None` when the indexer could not resolve the contract
    pub contract_address: Option<Address>,
    /// `None` when the indexer reported a per-entry error
    pub raw_balance: Option<U256>,
}

impl FungibleBalance {
    /// Holds a positive balance on a known contract
    pub fn is_displayable(&self) -> bool {
        self.contract_address.is_some() && self.raw_balance.is_some_and(|b| b > U256::ZERO)
    }
}

/// Token metadata as reported by the indexer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenMetadata {
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub decimals: Option<u8>,
    pub logo_url: Option<String>,
}

/// JSON-RPC request envelope
#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a, P: Serialize> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: P,
}

/// JSON-RPC response envelope
#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcError {
    pub code: i64,
    pub message: String,
}

/// `alchemy_getTokenBalances` result page
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenBalancesPage {
    pub token_balances: Vec<RawTokenBalance>,
    #[serde(default)]
    pub page_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawTokenBalance {
    #[serde(default)]
    pub contract_address: Option<Address>,
    #[serde(default)]
    pub token_balance: Option<U256>,
    #[serde(default)]
    pub error: Option<String>,
}

impl From<RawTokenBalance> for FungibleBalance {
    fn from(raw: RawTokenBalance) -> Self {
        let raw_balance = if raw.error.is_some() {
            None
        } else {
            raw.token_balance
        };
        Self {
            contract_address: raw.contract_address,
            raw_balance,
        }
    }
}

/// `alchemy_getTokenMetadata` result
#[derive(Debug, Deserialize)]
pub(crate) struct RawTokenMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub decimals: Option<u8>,
    #[serde(default)]
    pub logo: Option<String>,
}

impl From<RawTokenMetadata> for TokenMetadata {
    fn from(raw: RawTokenMetadata) -> Self {
        Self {
            symbol: raw.symbol.filter(|s| !s.is_empty()),
            name: raw.name.filter(|s| !s.is_empty()),
            decimals: raw.decimals,
            logo_url: raw.logo.filter(|s| !s.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_balance_page_deserialize() {
        let json = r#"{
            "address": "0x1111111111111111111111111111111111111111",
            "tokenBalances": [
                {"contractAddress": "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "tokenBalance": "0x0000000000000000000000000000000000000000000000000000000000000064"},
                {"contractAddress": "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb", "tokenBalance": null, "error": "execution reverted"}
            ],
            "pageKey": "next"
        }"#;

        let page: TokenBalancesPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.page_key.as_deref(), Some("next"));

        let balances: Vec<FungibleBalance> =
            page.token_balances.into_iter().map(Into::into).collect();
        assert_eq!(balances[0].raw_balance, Some(U256::from(100u64)));
        assert!(balances[0].is_displayable());
        assert_eq!(balances[1].raw_balance, None);
        assert!(!balances[1].is_displayable());
    }

    #[test]
    fn test_zero_balance_is_not_displayable() {
        let balance = FungibleBalance {
            contract_address: Some(Address::repeat_byte(0xaa)),
            raw_balance: Some(U256::ZERO),
        };
        assert!(!balance.is_displayable());

        let unknown_contract = FungibleBalance {
            contract_address: None,
            raw_balance: Some(U256::from(5u64)),
        };
        assert!(!unknown_contract.is_displayable());
    }

    #[test]
    fn test_metadata_blank_fields_become_none() {
        let json = r#"{"name": "USD Coin", "symbol": "", "decimals": 6, "logo": null}"#;
        let metadata: TokenMetadata = serde_json::from_str::<RawTokenMetadata>(json)
            .unwrap()
            .into();
        assert_eq!(metadata.name.as_deref(), Some("USD Coin"));
        assert_eq!(metadata.symbol, None);
        assert_eq!(metadata.decimals, Some(6));
        assert_eq!(metadata.logo_url, None);
    }
}
