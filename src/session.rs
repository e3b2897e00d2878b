//! Presentation state: loaded rows, selection, load and transaction status

use alloy::primitives::{Address, TxHash};
use std::fmt;
use tracing::{debug, warn};

use crate::error::Result;
use crate::portfolio::{PortfolioLoader, Selection, SelectionTotals, TokenDisplay, TokenKey};
use crate::transfer::TransactionAssembler;

/// Message shown for any load-level failure
pub const LOAD_FAILED_MESSAGE: &str = "Failed to fetch token balances";

/// Status of the most recent submission
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TxStatus {
    #[default]
    Idle,
    Pending,
    /// Accepted by the wallet; not necessarily mined
    Success(TxHash),
    Error(String),
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxStatus::Idle => write!(f, "idle"),
            TxStatus::Pending => write!(f, "pending"),
            TxStatus::Success(hash) => write!(f, "submitted ({})", hash),
            TxStatus::Error(message) => write!(f, "error: {}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// Identifies one portfolio load; only the newest ticket may publish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    account: Address,
}

/// Owns the three pieces of UI state and the load status.
///
/// The row list is only ever replaced wholesale, and every replacement
/// clears the selection.
#[derive(Debug, Default)]
pub struct Session {
    account: Option<Address>,
    tokens: Vec<TokenDisplay>,
    selection: Selection,
    load_state: LoadState,
    tx_status: TxStatus,
    generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn tokens(&self) -> &[TokenDisplay] {
        &self.tokens
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn tx_status(&self) -> &TxStatus {
        &self.tx_status
    }

    /// Start a load for `account`, superseding any load still in flight
    pub fn begin_load(&mut self, account: Address) -> LoadTicket {
        self.generation += 1;
        self.account = Some(account);
        self.load_state = LoadState::Loading;
        LoadTicket {
            generation: self.generation,
            account,
        }
    }

    /// Publish the outcome of a load. Returns `false` if the ticket was
    /// superseded and the result was discarded.
    pub fn complete_load(&mut self, ticket: LoadTicket, result: Result<Vec<TokenDisplay>>) -> bool {
        if ticket.generation != self.generation || self.account != Some(ticket.account) {
            debug!(
                "Discarding stale portfolio for {} (generation {})",
                ticket.account, ticket.generation
            );
            return false;
        }

        self.selection.clear();
        match result {
            Ok(tokens) => {
                self.tokens = tokens;
                self.load_state = LoadState::Loaded;
            }
            Err(e) => {
                warn!("Portfolio load failed for {}: {}", ticket.account, e);
                self.tokens.clear();
                self.load_state = LoadState::Failed(LOAD_FAILED_MESSAGE.to_string());
            }
        }
        true
    }

    /// Load and publish in one step
    pub async fn load(&mut self, loader: &PortfolioLoader, account: Address) -> &LoadState {
        let ticket = self.begin_load(account);
        let result = loader.load_portfolio(account).await;
        self.complete_load(ticket, result);
        &self.load_state
    }

    pub fn toggle(&mut self, key: TokenKey) -> bool {
        self.selection.toggle(key, &self.tokens)
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(&self.tokens);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn totals(&self) -> SelectionTotals {
        self.selection.totals(&self.tokens)
    }

    /// Submit the current selection. The selection and rows are left as
    /// they are whatever the outcome, so a failed attempt can be retried.
    pub async fn submit(
        &mut self,
        assembler: &TransactionAssembler,
        recipient: Option<&str>,
    ) -> &TxStatus {
        self.tx_status = TxStatus::Idle;
        self.tx_status = TxStatus::Pending;

        self.tx_status = match assembler
            .submit(&self.tokens, &self.selection, recipient)
            .await
        {
            Ok(hash) => TxStatus::Success(hash),
            Err(e) => TxStatus::Error(e.to_string()),
        };
        &self.tx_status
    }
}
