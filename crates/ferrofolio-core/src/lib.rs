//! Core contracts for ferrofolio.
//!
//! This crate contains:
//! - Canonical domain models and validation
//! - The holdings table loader
//! - Price and exchange-rate provider traits with Yahoo and snapshot adapters
//! - The valuation engine and portfolio totals
//! - Treemap model and response envelope

pub mod adapters;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod fetch;
pub mod holdings;
pub mod http_client;
pub mod provider;
pub mod treemap;
pub mod valuation;

pub use adapters::{SnapshotProvider, YahooAdapter};
pub use domain::{
    validate_currency_code, CurrencyPair, ExchangeRate, Holding, Market, MarketCodes, PriceQuote,
    QuoteSnapshot, Ticker,
};
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta, SCHEMA_VERSION};
pub use error::{CoreError, HoldingsError, ValidationError, ValuationError};
pub use fetch::{fetch_quotes, FetchProgress};
pub use holdings::{parse_holdings_csv, HoldingsLocation};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use provider::{
    ExchangeRateProvider, PriceProvider, ProviderError, ProviderErrorKind, ProviderFuture,
};
pub use treemap::{DivergingScale, Treemap, TreemapNode};
pub use valuation::{
    change_pct, compute, summarize, EnrichedHolding, MarketTotals, Multiplier, MultiplierTable,
    PortfolioTotals, Valuator,
};
