//! User-toggleable selection over the loaded portfolio

use rust_decimal::Decimal;
use std::collections::HashSet;

use super::token::{TokenDisplay, TokenKey};

/// Running totals over the selected rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionTotals {
    /// Sum of whole-token quantities across all selected rows
    pub quantity: Decimal,
    /// Sum of `price * quantity`; rows without a price contribute zero
    pub usd_value: Decimal,
}

/// Set of rows included in the next transfer.
///
/// Every key refers to a row of the list the selection was built against.
/// Keys that are not in that list are ignored on insert, and the owner must
/// call [`Selection::clear`] whenever the list is replaced.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    keys: HashSet<TokenKey>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `key`. Returns whether the key is now selected.
    pub fn toggle(&mut self, key: TokenKey, tokens: &[TokenDisplay]) -> bool {
        if self.keys.remove(&key) {
            return false;
        }
        if tokens.iter().any(|t| t.key() == key) {
            self.keys.insert(key);
            return true;
        }
        false
    }

    pub fn select_all(&mut self, tokens: &[TokenDisplay]) {
        self.keys = tokens.iter().map(TokenDisplay::key).collect();
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn is_selected(&self, key: &TokenKey) -> bool {
        self.keys.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Selected rows, in list order
    pub fn selected<'a>(
        &'a self,
        tokens: &'a [TokenDisplay],
    ) -> impl Iterator<Item = &'a TokenDisplay> + 'a {
        tokens.iter().filter(move |t| self.keys.contains(&t.key()))
    }

    /// Totals over the selected rows, in fixed-point arithmetic
    pub fn totals(&self, tokens: &[TokenDisplay]) -> SelectionTotals {
        self.selected(tokens)
            .fold(SelectionTotals::default(), |acc, token| SelectionTotals {
                quantity: acc.quantity.saturating_add(token.quantity()),
                usd_value: acc.usd_value.saturating_add(token.usd_value()),
            })
    }
}
