//! # Domain Models
//!
//! Canonical types shared by the holdings source, the providers and the
//! valuation engine.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Holding`] | One row of the holdings table |
//! | [`Ticker`] | Normalized ticker, join key to quotes |
//! | [`Market`] | Domestic or foreign market tag |
//! | [`MarketCodes`] | Holdings-table labels mapped to [`Market`] |
//! | [`PriceQuote`] | Current and reference price, each possibly absent |
//! | [`QuoteSnapshot`] | Quotes keyed by ticker |
//! | [`ExchangeRate`] | Finite positive foreign-to-reporting multiplier |
//! | [`CurrencyPair`] | Foreign/reporting currency codes |
//!
//! Constructors validate their invariants; absent prices are `None`, never a
//! sentinel zero.

mod market;
mod models;
mod ticker;

pub use market::{Market, MarketCodes};
pub use models::{
    validate_currency_code, CurrencyPair, ExchangeRate, Holding, PriceQuote, QuoteSnapshot,
};
pub(crate) use models::validate_non_negative;
pub use ticker::Ticker;
