//! Bulk-transfer contract interface

use alloy::primitives::Bytes;
use alloy::sol;
use alloy::sol_types::SolCall;

use super::request::TransferRequest;

sol! {
    /// Moves native value and any number of ERC-20 balances to one recipient
    interface IBulkTransfer {
        function transfer(
            address recipient,
            uint256 ethAmount,
            address[] tokens,
            uint256[] amounts
        ) external payable;
    }
}

/// ABI-encoded `transfer(recipient, ethAmount, tokens, amounts)` calldata
pub fn encode_transfer(request: &TransferRequest) -> Bytes {
    let (tokens, amounts) = request.tokens.iter().copied().unzip();

    IBulkTransfer::transferCall {
        recipient: request.recipient,
        ethAmount: request.native_amount,
        tokens,
        amounts,
    }
    .abi_encode()
    .into()
}
