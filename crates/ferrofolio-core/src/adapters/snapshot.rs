use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::provider::{ExchangeRateProvider, PriceProvider, ProviderError, ProviderFuture};
use crate::{CoreError, CurrencyPair, ExchangeRate, PriceQuote, QuoteSnapshot, Ticker};

/// Offline provider backed by a saved snapshot document.
///
/// ```json
/// {
///   "exchange_rate": 7.1,
///   "quotes": {
///     "AAPL": { "current_price": 150.0, "reference_price": 145.0 },
///     "600000": { "current_price": 12.0, "reference_price": null }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotProvider {
    #[serde(default)]
    pub exchange_rate: Option<ExchangeRate>,
    #[serde(default)]
    pub quotes: QuoteSnapshot,
}

impl SnapshotProvider {
    pub fn new(quotes: QuoteSnapshot, exchange_rate: Option<ExchangeRate>) -> Self {
        Self {
            exchange_rate,
            quotes,
        }
    }

    pub fn from_json(document: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(document)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let document = std::fs::read_to_string(path).map_err(|source| {
            CoreError::Provider(ProviderError::internal(format!(
                "failed to read snapshot '{}': {source}",
                path.display()
            )))
        })?;
        Self::from_json(&document)
    }
}

impl PriceProvider for SnapshotProvider {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn price<'a>(&'a self, ticker: &'a Ticker) -> ProviderFuture<'a, PriceQuote> {
        Box::pin(async move {
            self.quotes
                .get(ticker)
                .copied()
                .ok_or_else(|| {
                    ProviderError::not_found(format!("snapshot has no quote for '{ticker}'"))
                })
        })
    }
}

impl ExchangeRateProvider for SnapshotProvider {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn exchange_rate<'a>(&'a self, pair: &'a CurrencyPair) -> ProviderFuture<'a, ExchangeRate> {
        Box::pin(async move {
            self.exchange_rate
                .ok_or_else(|| ProviderError::not_found(format!("snapshot has no rate for {pair}")))
        })
    }
}
