//! Display rows for native and fungible balances

use alloy::primitives::{utils::format_units, Address, U256};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::fmt;

/// Largest scale a `Decimal` can carry
const MAX_DECIMAL_SCALE: u32 = 28;

/// Identity of a row in the portfolio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenKey {
    /// The chain's base currency (no contract address)
    Native,
    /// A fungible token, keyed by its contract
    Contract(Address),
}

impl fmt::Display for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKey::Native => write!(f, "native"),
            TokenKey::Contract(address) => write!(f, "{}", address),
        }
    }
}

/// One balance as shown to the user
///
/// Rows are rebuilt from scratch on every portfolio load and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenDisplay {
    /// `None` for the native asset
    pub contract_address: Option<Address>,
    /// Balance in the token's smallest unit
    pub raw_balance: U256,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    /// USD price per whole token, if one could be resolved
    pub price: Option<f64>,
    pub logo_url: Option<String>,
}

impl TokenDisplay {
    pub fn key(&self) -> TokenKey {
        match self.contract_address {
            Some(address) => TokenKey::Contract(address),
            None => TokenKey::Native,
        }
    }

    pub fn is_native(&self) -> bool {
        self.contract_address.is_none()
    }

    /// Balance in whole tokens (`raw / 10^decimals`)
    pub fn quantity(&self) -> Decimal {
        scale_raw_amount(self.raw_balance, self.decimals)
    }

    /// USD value of the whole balance; zero when the price is unknown
    pub fn usd_value(&self) -> Decimal {
        let Some(price) = self.price.and_then(Decimal::from_f64) else {
            return Decimal::ZERO;
        };
        self.quantity().checked_mul(price).unwrap_or(Decimal::MAX)
    }

    /// Exact human-readable balance, without trailing zeros
    pub fn formatted_quantity(&self) -> String {
        match format_units(self.raw_balance, self.decimals) {
            Ok(text) => trim_fraction(&text),
            Err(_) => self.raw_balance.to_string(),
        }
    }
}

/// Convert a raw integer amount into whole units.
///
/// Exact when the amount fits a `Decimal` at the requested scale. Larger
/// amounts go through `f64` and saturate at `Decimal::MAX`. Scales that
/// cannot be formatted at all (more than 77 decimals) yield zero.
pub fn scale_raw_amount(raw: U256, decimals: u8) -> Decimal {
    let scale = u32::from(decimals);

    if scale <= MAX_DECIMAL_SCALE {
        let exact = u128::try_from(raw)
            .ok()
            .and_then(|value| i128::try_from(value).ok())
            .and_then(|value| Decimal::try_from_i128_with_scale(value, scale).ok());
        if let Some(value) = exact {
            return value;
        }
    }

    let Ok(text) = format_units(raw, decimals) else {
        return Decimal::ZERO;
    };
    text.parse::<f64>()
        .ok()
        .and_then(Decimal::from_f64)
        .unwrap_or(Decimal::MAX)
}

fn trim_fraction(text: &str) -> String {
    if !text.contains('.') {
        return text.to_string();
    }
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::ToPrimitive;
    use std::str::FromStr;

    fn token(raw: u128, decimals: u8, price: Option<f64>) -> TokenDisplay {
        TokenDisplay {
            contract_address: Some(Address::repeat_byte(0x11)),
            raw_balance: U256::from(raw),
            symbol: "TKN".to_string(),
            name: "Token".to_string(),
            decimals,
            price,
            logo_url: None,
        }
    }

    #[test]
    fn test_key_for_native_and_contract() {
        let mut row = token(1, 6, None);
        assert_eq!(row.key(), TokenKey::Contract(Address::repeat_byte(0x11)));

        row.contract_address = None;
        assert_eq!(row.key(), TokenKey::Native);
        assert!(row.is_native());
    }

    #[test]
    fn test_quantity_scales_by_decimals() {
        assert_eq!(
            token(500_000_000_000_000_000, 18, None).quantity(),
            Decimal::from_str("0.5").unwrap()
        );
        assert_eq!(token(100, 6, None).quantity(), Decimal::from_str("0.0001").unwrap());
        assert_eq!(token(42, 0, None).quantity(), Decimal::from(42));
        assert_eq!(token(0, 18, None).quantity(), Decimal::ZERO);
    }

    #[test]
    fn test_quantity_is_never_negative() {
        for (raw, decimals) in [(0u128, 0u8), (1, 30), (u128::MAX, 18), (u128::MAX, 0)] {
            assert!(token(raw, decimals, None).quantity() >= Decimal::ZERO);
        }
        assert!(scale_raw_amount(U256::MAX, 18) >= Decimal::ZERO);
    }

    #[test]
    fn test_huge_amount_falls_back_to_approximation() {
        // 10^30 raw units with 18 decimals = 10^12 whole tokens
        let raw = U256::from(10u64).pow(U256::from(30u64));
        let quantity = scale_raw_amount(raw, 18);
        let approx = quantity.to_f64().unwrap();
        assert!((approx - 1e12).abs() < 1.0);

        assert_eq!(scale_raw_amount(U256::MAX, 0), Decimal::MAX);
    }

    #[test]
    fn test_unformattable_scale_is_zero() {
        assert_eq!(scale_raw_amount(U256::from(5u64), 78), Decimal::ZERO);
        assert_eq!(scale_raw_amount(U256::MAX, u8::MAX), Decimal::ZERO);

        let bogus = token(1_000, 200, Some(1.0));
        assert_eq!(bogus.quantity(), Decimal::ZERO);
        assert_eq!(bogus.usd_value(), Decimal::ZERO);
    }

    #[test]
    fn test_usd_value() {
        let row = token(2_500_000, 6, Some(2.0));
        assert_eq!(row.usd_value(), Decimal::from(5));

        let unpriced = token(2_500_000, 6, None);
        assert_eq!(unpriced.usd_value(), Decimal::ZERO);
    }

    #[test]
    fn test_formatted_quantity() {
        assert_eq!(token(500_000_000_000_000_000, 18, None).formatted_quantity(), "0.5");
        assert_eq!(token(100, 6, None).formatted_quantity(), "0.0001");
        assert_eq!(token(0, 6, None).formatted_quantity(), "0");
        assert_eq!(token(7, 0, None).formatted_quantity(), "7");
    }
}
