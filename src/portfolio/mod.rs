//! Account portfolio: display rows, selection and loading
//!
//! ```text
//! IndexerApi ─┬─→ PortfolioLoader → Vec<TokenDisplay> → Selection → totals
//! PriceLookup ┘
//! ```

pub mod aggregator;
pub mod selection;
pub mod token;

pub use aggregator::PortfolioLoader;
pub use selection::{Selection, SelectionTotals};
pub use token::{scale_raw_amount, TokenDisplay, TokenKey};
