//! In-memory doubles for the indexer, price source and wallet

use alloy::eips::eip7702::{Authorization, SignedAuthorization};
use alloy::primitives::{b256, Address, Signature, TxHash, U256};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::indexer::{FungibleBalance, IndexerApi, TokenMetadata};
use crate::price::PriceSource;
use crate::wallet::{AuthorizationRequest, CallRequest, Capability, Wallet};

pub struct FakeIndexer {
    native: U256,
    balances: Vec<FungibleBalance>,
    metadata: HashMap<Address, TokenMetadata>,
    failing_metadata: HashSet<Address>,
    fail_balances: bool,
}

impl FakeIndexer {
    pub fn new(native: U256) -> Self {
        Self {
            native,
            balances: Vec::new(),
            metadata: HashMap::new(),
            failing_metadata: HashSet::new(),
            fail_balances: false,
        }
    }

    pub fn with_token(mut self, contract: Address, raw: u64, symbol: &str, decimals: u8) -> Self {
        self.balances.push(FungibleBalance {
            contract_address: Some(contract),
            raw_balance: Some(U256::from(raw)),
        });
        self.metadata.insert(
            contract,
            TokenMetadata {
                symbol: Some(symbol.to_string()),
                name: Some(format!("{} Token", symbol)),
                decimals: Some(decimals),
                logo_url: None,
            },
        );
        self
    }

    pub fn failing_metadata(mut self, contract: Address) -> Self {
        self.failing_metadata.insert(contract);
        self
    }

    pub fn failing_balances(mut self) -> Self {
        self.fail_balances = true;
        self
    }
}

#[async_trait]
impl IndexerApi for FakeIndexer {
    async fn native_balance(&self, _account: Address) -> Result<U256> {
        Ok(self.native)
    }

    async fn token_balances(&self, _account: Address) -> Result<Vec<FungibleBalance>> {
        if self.fail_balances {
            return Err(Error::Network("Indexer API error 401: unauthenticated".to_string()));
        }
        Ok(self.balances.clone())
    }

    async fn token_metadata(&self, contract: Address) -> Result<TokenMetadata> {
        if self.failing_metadata.contains(&contract) {
            return Err(Error::Network("metadata timeout".to_string()));
        }
        self.metadata
            .get(&contract)
            .cloned()
            .ok_or_else(|| Error::Rpc(format!("unknown token {}", contract)))
    }
}

#[derive(Default)]
pub struct FakePrices {
    native: Option<f64>,
    tokens: HashMap<Address, f64>,
}

impl FakePrices {
    pub fn with_native(mut self, price: f64) -> Self {
        self.native = Some(price);
        self
    }

    pub fn with_token(mut self, contract: Address, price: f64) -> Self {
        self.tokens.insert(contract, price);
        self
    }
}

#[async_trait]
impl PriceSource for FakePrices {
    async fn native_price(&self) -> Result<Option<f64>> {
        Ok(self.native)
    }

    async fn token_price(&self, contract: Address) -> Result<Option<f64>> {
        Ok(self.tokens.get(&contract).copied())
    }
}

/// Records every call; delegation is unsupported unless enabled
pub struct FakeWallet {
    account: Address,
    delegation: bool,
    reject_with: Option<String>,
    authorization_requests: Mutex<Vec<AuthorizationRequest>>,
    sent: Mutex<Vec<CallRequest>>,
}

impl FakeWallet {
    pub const TX_HASH: TxHash =
        b256!("0x1111111111111111111111111111111111111111111111111111111111111111");

    pub fn new() -> Self {
        Self {
            account: Address::repeat_byte(0x11),
            delegation: false,
            reject_with: None,
            authorization_requests: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delegation(mut self) -> Self {
        self.delegation = true;
        self
    }

    pub fn rejecting(mut self, message: &str) -> Self {
        self.reject_with = Some(message.to_string());
        self
    }

    pub fn sent(&self) -> Vec<CallRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn authorization_requests(&self) -> usize {
        self.authorization_requests.lock().unwrap().len()
    }

    pub fn last_authorization_request(&self) -> Option<AuthorizationRequest> {
        self.authorization_requests.lock().unwrap().last().copied()
    }
}

#[async_trait]
impl Wallet for FakeWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        Ok(vec![self.account])
    }

    async fn sign_authorization(
        &self,
        request: AuthorizationRequest,
    ) -> Result<Capability<SignedAuthorization>> {
        self.authorization_requests.lock().unwrap().push(request);
        if !self.delegation {
            return Ok(Capability::Unsupported("wallet does not support EIP-7702".to_string()));
        }

        let authorization = Authorization {
            chain_id: U256::from(1u64),
            address: request.contract_address,
            nonce: 1,
        };
        let signature = Signature::new(U256::from(1u64), U256::from(2u64), false);
        Ok(Capability::Supported(authorization.into_signed(signature)))
    }

    async fn send_transaction(&self, call: CallRequest) -> Result<TxHash> {
        if let Some(message) = &self.reject_with {
            return Err(Error::Submission(message.clone()));
        }
        self.sent.lock().unwrap().push(call);
        Ok(Self::TX_HASH)
    }
}
