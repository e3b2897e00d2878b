//! Wallet capability
//!
//! The wallet is an explicitly constructed object handed to whoever needs
//! to read accounts or submit transactions:
//!
//! ```text
//! Config → LocalWallet ──┬─→ PortfolioLoader (account)
//!                        └─→ TransactionAssembler (authorization, send)
//! ```
//!
//! Optional capabilities (EIP-7702 authorizations) are negotiated through
//! [`Capability`] rather than by probing for errors.

pub mod local;

use alloy::eips::eip7702::SignedAuthorization;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;

use crate::error::Result;

pub use local::LocalWallet;

/// Outcome of asking the wallet for an optional feature
#[derive(Debug, Clone, PartialEq)]
pub enum Capability<T> {
    Supported(T),
    Unsupported(String),
}

/// Who will send the transaction that carries the authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Executor {
    /// The authorizing account sends it itself, so the authorization must
    /// use the nonce after the transaction's own
    SelfAccount,
}

/// Request for a one-time delegation authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationRequest {
    /// Contract the account delegates to
    pub contract_address: Address,
    pub executor: Executor,
}

/// Transaction handed to the wallet for signing and broadcast
#[derive(Debug, Clone, PartialEq)]
pub struct CallRequest {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub authorization_list: Option<Vec<SignedAuthorization>>,
}

/// Account access plus signing and submission
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Accounts the wallet controls; the first one is the active account
    async fn request_accounts(&self) -> Result<Vec<Address>>;

    /// Sign a delegation authorization, if the wallet can
    async fn sign_authorization(
        &self,
        request: AuthorizationRequest,
    ) -> Result<Capability<SignedAuthorization>>;

    /// Sign and broadcast; returns once the node accepted the transaction
    async fn send_transaction(&self, call: CallRequest) -> Result<TxHash>;
}
