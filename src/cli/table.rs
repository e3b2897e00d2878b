//! Plain-text rendering of the portfolio table

use rust_decimal::Decimal;

use crate::portfolio::{Selection, TokenDisplay};

const SYMBOL_WIDTH: usize = 10;
const NAME_WIDTH: usize = 24;

/// Render the token table with a checkbox column and a totals footer
pub fn render_portfolio(tokens: &[TokenDisplay], selection: &Selection) -> String {
    let mut lines = Vec::with_capacity(tokens.len() + 4);

    lines.push(format!(
        "{:<4}{:<10}{:<24}{:>26}{:>14}{:>16}",
        "", "SYMBOL", "NAME", "QUANTITY", "PRICE", "VALUE"
    ));

    for token in tokens {
        let checkbox = if selection.is_selected(&token.key()) {
            "[x]"
        } else {
            "[ ]"
        };
        lines.push(format!(
            "{:<4}{:<10}{:<24}{:>26}{:>14}{:>16}",
            checkbox,
            truncate(&token.symbol, SYMBOL_WIDTH - 1),
            truncate(&token.name, NAME_WIDTH - 1),
            token.formatted_quantity(),
            format_price(token.price),
            format_usd(token.usd_value()),
        ));
    }

    let totals = selection.totals(tokens);
    lines.push(String::new());
    lines.push(format!(
        "Selected: {} of {}   Quantity: {}   Value: {}",
        selection.len(),
        tokens.len(),
        totals.quantity.normalize(),
        format_usd(totals.usd_value)
    ));

    lines.join("\n")
}

/// One-line label used by the interactive picker
pub fn picker_label(token: &TokenDisplay) -> String {
    format!(
        "{} {} ({})",
        token.formatted_quantity(),
        token.symbol,
        format_usd(token.usd_value())
    )
}

pub fn format_usd(value: Decimal) -> String {
    format!("${:.2}", value.round_dp(2))
}

fn format_price(price: Option<f64>) -> String {
    match price {
        Some(price) if price >= 1.0 => format!("${:.2}", price),
        Some(price) => format!("${:.6}", price),
        None => "-".to_string(),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('~');
    out
}
