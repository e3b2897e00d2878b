//! Token Sweeper Library
//!
//! Lists the native and ERC-20 balances of an account and moves any chosen
//! subset to one recipient through a single bulk-transfer contract call,
//! optionally attaching an EIP-7702 delegation authorization.

pub mod cli;
pub mod config;
pub mod error;
pub mod indexer;
pub mod portfolio;
pub mod price;
pub mod session;
pub mod transfer;
pub mod wallet;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
