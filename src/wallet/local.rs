//! Private-key wallet backed by a JSON-RPC node

use alloy::eips::eip7702::{Authorization, SignedAuthorization};
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use async_trait::async_trait;
use tracing::{debug, info};

use super::{AuthorizationRequest, CallRequest, Capability, Executor, Wallet};
use crate::config::{ChainConfig, WalletConfig};
use crate::error::{Error, Result};

/// Wallet that signs locally and broadcasts through the configured RPC
pub struct LocalWallet {
    signer: PrivateKeySigner,
    provider: DynProvider,
    /// Chain the configuration was written for
    expected_chain_id: u64,
    /// Whether EIP-7702 authorizations may be signed
    eip7702: bool,
}

impl LocalWallet {
    /// Build the wallet from configuration. No network access happens here.
    pub fn connect(chain: &ChainConfig, wallet: &WalletConfig) -> Result<Self> {
        let key = wallet.private_key.trim();
        if key.is_empty() {
            return Err(Error::WalletUnavailable(
                "no private key configured (set SWEEPER_WALLET__PRIVATE_KEY)".to_string(),
            ));
        }

        let signer: PrivateKeySigner = key
            .parse()
            .map_err(|e| Error::WalletUnavailable(format!("Invalid private key: {}", e)))?;

        let rpc_url: url::Url = chain
            .rpc_url
            .parse()
            .map_err(|e| Error::Config(format!("Invalid rpc_url {}: {}", chain.rpc_url, e)))?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer.clone()))
            .connect_http(rpc_url)
            .erased();

        info!("Wallet connected: {}", signer.address());

        Ok(Self {
            signer,
            provider,
            expected_chain_id: chain.chain_id,
            eip7702: wallet.eip7702,
        })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Chain id reported by the node, checked against configuration
    pub async fn chain_id(&self) -> Result<u64> {
        let chain_id = self
            .provider
            .get_chain_id()
            .await
            .map_err(|e| Error::Rpc(format!("Failed to get chain id: {}", e)))?;

        if chain_id != self.expected_chain_id {
            return Err(Error::Config(format!(
                "RPC node is on chain {} but configuration expects chain {}",
                chain_id, self.expected_chain_id
            )));
        }
        Ok(chain_id)
    }

    /// Native balance of the wallet's account, in wei
    pub async fn balance(&self) -> Result<U256> {
        self.provider
            .get_balance(self.address())
            .await
            .map_err(|e| Error::Rpc(format!("Failed to get balance: {}", e)))
    }

    fn sign(&self, authorization: Authorization) -> Capability<SignedAuthorization> {
        match self.signer.sign_hash_sync(&authorization.signature_hash()) {
            Ok(signature) => Capability::Supported(authorization.into_signed(signature)),
            Err(e) => Capability::Unsupported(format!("signing failed: {}", e)),
        }
    }
}

/// Authorization nonce for a delegation sent by `executor`
fn authorization_nonce(account_nonce: u64, executor: Executor) -> u64 {
    match executor {
        // The sender's own nonce is consumed before the authorization list is processed
        Executor::SelfAccount => account_nonce + 1,
    }
}

fn to_transaction_request(from: Address, call: CallRequest) -> TransactionRequest {
    let mut tx = TransactionRequest::default()
        .with_from(from)
        .with_to(call.to)
        .with_input(call.data)
        .with_value(call.value);
    tx.authorization_list = call.authorization_list;
    tx
}

#[async_trait]
impl Wallet for LocalWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        Ok(vec![self.address()])
    }

    async fn sign_authorization(
        &self,
        request: AuthorizationRequest,
    ) -> Result<Capability<SignedAuthorization>> {
        if !self.eip7702 {
            return Ok(Capability::Unsupported(
                "EIP-7702 disabled for this wallet".to_string(),
            ));
        }

        let chain_id = self.chain_id().await?;
        let account_nonce = self
            .provider
            .get_transaction_count(self.address())
            .await
            .map_err(|e| Error::Rpc(format!("Failed to get nonce: {}", e)))?;

        let authorization = Authorization {
            chain_id: U256::from(chain_id),
            address: request.contract_address,
            nonce: authorization_nonce(account_nonce, request.executor),
        };
        debug!(
            "Signing delegation to {} at nonce {}",
            authorization.address, authorization.nonce
        );

        Ok(self.sign(authorization))
    }

    async fn send_transaction(&self, call: CallRequest) -> Result<TxHash> {
        let tx = to_transaction_request(self.address(), call);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| Error::Submission(e.to_string()))?;

        let tx_hash = *pending.tx_hash();
        info!("Transaction submitted: {}", tx_hash);
        Ok(tx_hash)
    }
}
