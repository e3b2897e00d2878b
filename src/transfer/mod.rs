//! Bulk-transfer transaction assembly and submission
//!
//! ```text
//! TokenDisplay[] + Selection + recipient
//!         → TransferRequest → calldata → [authorization] → Wallet::send_transaction
//! ```

pub mod contract;
pub mod request;

use alloy::eips::eip7702::SignedAuthorization;
use alloy::primitives::{Address, TxHash};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::portfolio::{Selection, TokenDisplay};
use crate::wallet::{AuthorizationRequest, CallRequest, Capability, Executor, Wallet};

pub use contract::encode_transfer;
pub use request::TransferRequest;

/// What to do about an EIP-7702 delegation for each submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelegationPolicy {
    /// Plain contract call, no authorization requested
    Disabled,
    /// Attach an authorization when the wallet can sign one, otherwise send
    /// a plain call
    #[default]
    Prefer,
    /// Refuse to submit without an authorization
    Require,
}

impl fmt::Display for DelegationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DelegationPolicy::Disabled => "disabled",
            DelegationPolicy::Prefer => "prefer",
            DelegationPolicy::Require => "require",
        };
        f.write_str(name)
    }
}

/// Turns the selected rows into one bulk-transfer transaction
pub struct TransactionAssembler {
    wallet: Arc<dyn Wallet>,
    contract: Address,
    delegation: DelegationPolicy,
}

impl TransactionAssembler {
    pub fn new(wallet: Arc<dyn Wallet>, contract: Address, delegation: DelegationPolicy) -> Self {
        Self {
            wallet,
            contract,
            delegation,
        }
    }

    /// The unsigned call for `request`, without any authorization
    pub fn build_call(&self, request: &TransferRequest) -> CallRequest {
        CallRequest {
            to: self.contract,
            data: encode_transfer(request),
            value: request.native_amount,
            authorization_list: None,
        }
    }

    /// Validate, assemble and submit. Returns the hash once the wallet has
    /// accepted the transaction; inclusion is not awaited.
    pub async fn submit(
        &self,
        tokens: &[TokenDisplay],
        selection: &Selection,
        recipient: Option<&str>,
    ) -> Result<TxHash> {
        let request = TransferRequest::from_selection(tokens, selection, recipient)?;
        info!(
            "Submitting bulk transfer to {}: {} wei + {} tokens",
            request.recipient,
            request.native_amount,
            request.tokens.len()
        );

        let mut call = self.build_call(&request);
        call.authorization_list = self.authorization().await?.map(|auth| vec![auth]);

        self.wallet.send_transaction(call).await
    }

    async fn authorization(&self) -> Result<Option<SignedAuthorization>> {
        if self.delegation == DelegationPolicy::Disabled {
            return Ok(None);
        }

        let request = AuthorizationRequest {
            contract_address: self.contract,
            executor: Executor::SelfAccount,
        };

        match self.wallet.sign_authorization(request).await? {
            Capability::Supported(authorization) => Ok(Some(authorization)),
            Capability::Unsupported(reason) => match self.delegation {
                DelegationPolicy::Require => Err(Error::AuthorizationUnsupported(reason)),
                _ => {
                    warn!("Delegation unavailable ({}), sending a plain call", reason);
                    Ok(None)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::TokenKey;
    use crate::test_support::FakeWallet;
    use alloy::primitives::U256;
    use alloy::sol_types::SolCall;
    use contract::IBulkTransfer;

    const RECIPIENT: &str = "0x4242424242424242424242424242424242424242";

    fn contract_address() -> Address {
        Address::repeat_byte(0xc0)
    }

    fn rows() -> Vec<TokenDisplay> {
        vec![
            TokenDisplay {
                contract_address: None,
                raw_balance: U256::from(500_000_000_000_000_000u64),
                symbol: "ETH".to_string(),
                name: "Ether".to_string(),
                decimals: 18,
                price: Some(3000.0),
                logo_url: None,
            },
            TokenDisplay {
                contract_address: Some(Address::repeat_byte(0xaa)),
                raw_balance: U256::from(100u64),
                symbol: "AAA".to_string(),
                name: "Token A".to_string(),
                decimals: 6,
                price: Some(1.0),
                logo_url: None,
            },
        ]
    }

    fn select_all(tokens: &[TokenDisplay]) -> Selection {
        let mut selection = Selection::new();
        selection.select_all(tokens);
        selection
    }

    fn assembler(wallet: &Arc<FakeWallet>, delegation: DelegationPolicy) -> TransactionAssembler {
        TransactionAssembler::new(wallet.clone(), contract_address(), delegation)
    }

    #[tokio::test]
    async fn test_end_to_end_call_matches_selection() {
        let wallet = Arc::new(FakeWallet::new());
        let tokens = rows();

        let hash = assembler(&wallet, DelegationPolicy::Disabled)
            .submit(&tokens, &select_all(&tokens), Some(RECIPIENT))
            .await
            .unwrap();
        assert_eq!(hash, FakeWallet::TX_HASH);

        let sent = wallet.sent();
        assert_eq!(sent.len(), 1);
        let call = &sent[0];
        assert_eq!(call.to, contract_address());
        assert_eq!(call.value, U256::from(500_000_000_000_000_000u64));
        assert!(call.authorization_list.is_none());

        let decoded = IBulkTransfer::transferCall::abi_decode(&call.data).unwrap();
        assert_eq!(decoded.recipient, Address::repeat_byte(0x42));
        assert_eq!(decoded.ethAmount, U256::from(500_000_000_000_000_000u64));
        assert_eq!(decoded.tokens, vec![Address::repeat_byte(0xaa)]);
        assert_eq!(decoded.amounts, vec![U256::from(100u64)]);
    }

    #[tokio::test]
    async fn test_empty_selection_never_touches_wallet() {
        let wallet = Arc::new(FakeWallet::new());
        let tokens = rows();

        let err = assembler(&wallet, DelegationPolicy::Prefer)
            .submit(&tokens, &Selection::new(), Some(RECIPIENT))
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(wallet.authorization_requests(), 0);
        assert!(wallet.sent().is_empty());
    }

    #[tokio::test]
    async fn test_missing_recipient_never_touches_wallet() {
        let wallet = Arc::new(FakeWallet::new());
        let tokens = rows();

        let err = assembler(&wallet, DelegationPolicy::Prefer)
            .submit(&tokens, &select_all(&tokens), None)
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert!(wallet.sent().is_empty());
    }

    #[tokio::test]
    async fn test_prefer_attaches_authorization_when_supported() {
        let wallet = Arc::new(FakeWallet::new().with_delegation());
        let tokens = rows();

        assembler(&wallet, DelegationPolicy::Prefer)
            .submit(&tokens, &select_all(&tokens), Some(RECIPIENT))
            .await
            .unwrap();

        let sent = wallet.sent();
        let list = sent[0].authorization_list.as_ref().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].address, contract_address());
        assert_eq!(
            wallet.last_authorization_request().unwrap().executor,
            Executor::SelfAccount
        );
    }

    #[tokio::test]
    async fn test_prefer_falls_back_to_plain_call() {
        let wallet = Arc::new(FakeWallet::new());
        let tokens = rows();

        assembler(&wallet, DelegationPolicy::Prefer)
            .submit(&tokens, &select_all(&tokens), Some(RECIPIENT))
            .await
            .unwrap();

        assert_eq!(wallet.authorization_requests(), 1);
        assert!(wallet.sent()[0].authorization_list.is_none());
    }

    #[tokio::test]
    async fn test_require_fails_without_sending() {
        let wallet = Arc::new(FakeWallet::new());
        let tokens = rows();

        let err = assembler(&wallet, DelegationPolicy::Require)
            .submit(&tokens, &select_all(&tokens), Some(RECIPIENT))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::AuthorizationUnsupported(_)));
        assert!(wallet.sent().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_skips_authorization() {
        let wallet = Arc::new(FakeWallet::new().with_delegation());
        let tokens = rows();
        let mut selection = Selection::new();
        selection.toggle(TokenKey::Contract(Address::repeat_byte(0xaa)), &tokens);

        assembler(&wallet, DelegationPolicy::Disabled)
            .submit(&tokens, &selection, Some(RECIPIENT))
            .await
            .unwrap();

        assert_eq!(wallet.authorization_requests(), 0);
        assert_eq!(wallet.sent()[0].value, U256::ZERO);
    }

    #[tokio::test]
    async fn test_wallet_error_is_surfaced_verbatim() {
        let wallet = Arc::new(FakeWallet::new().rejecting("User rejected the request."));
        let tokens = rows();

        let err = assembler(&wallet, DelegationPolicy::Disabled)
            .submit(&tokens, &select_all(&tokens), Some(RECIPIENT))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "User rejected the request.");
    }

    #[test]
    fn test_delegation_policy_deserialize() {
        let policy: DelegationPolicy = serde_json::from_str(r#""require""#).unwrap();
        assert_eq!(policy, DelegationPolicy::Require);
        assert_eq!(DelegationPolicy::default(), DelegationPolicy::Prefer);
        assert_eq!(DelegationPolicy::Disabled.to_string(), "disabled");
    }
}
