//! Transfer request derived from the current selection

use alloy::primitives::{Address, U256};

use crate::error::{Error, Result};
use crate::portfolio::{Selection, TokenDisplay};

/// What one bulk-transfer call moves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub recipient: Address,
    /// Native amount in wei; also the transaction value
    pub native_amount: U256,
    /// `(contract, raw amount)` in list order
    pub tokens: Vec<(Address, U256)>,
}

impl TransferRequest {
    /// Partition the selected rows into native amount and token amounts.
    ///
    /// Fails with `InvalidInput` when the recipient is missing or malformed,
    /// or when nothing would be transferred.
    pub fn from_selection(
        tokens: &[TokenDisplay],
        selection: &Selection,
        recipient: Option<&str>,
    ) -> Result<Self> {
        let recipient = parse_recipient(recipient)?;

        let mut native_amount = U256::ZERO;
        let mut token_amounts = Vec::new();
        for token in selection.selected(tokens) {
            match token.contract_address {
                None => native_amount = token.raw_balance,
                Some(contract) => token_amounts.push((contract, token.raw_balance)),
            }
        }

        if native_amount.is_zero() && token_amounts.is_empty() {
            return Err(Error::InvalidInput(
                "nothing selected to transfer".to_string(),
            ));
        }

        Ok(Self {
            recipient,
            native_amount,
            tokens: token_amounts,
        })
    }

    pub fn is_native_only(&self) -> bool {
        self.tokens.is_empty()
    }
}

fn parse_recipient(recipient: Option<&str>) -> Result<Address> {
    let recipient = recipient.map(str::trim).unwrap_or_default();
    if recipient.is_empty() {
        return Err(Error::InvalidInput("recipient address is required".to_string()));
    }

    recipient
        .parse::<Address>()
        .map_err(|e| Error::InvalidInput(format!("invalid recipient address {}: {}", recipient, e)))
}
