//! Price and exchange-rate provider contracts.
//!
//! | Contract | Input | Output |
//! |----------|-------|--------|
//! | [`PriceProvider`] | [`Ticker`] | [`PriceQuote`] |
//! | [`ExchangeRateProvider`] | [`CurrencyPair`] | [`ExchangeRate`] |
//!
//! Providers report failures as [`ProviderError`]. The valuation pipeline
//! turns a failed price lookup into an absent quote (see
//! [`fetch_quotes`](crate::fetch::fetch_quotes)); a failed exchange-rate lookup
//! is fatal for the pass.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{CurrencyPair, ExchangeRate, PriceQuote, Ticker};

/// Provider-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// The provider has no data for the requested ticker or pair.
    NotFound,
    Unavailable,
    RateLimited,
    /// The upstream payload could not be understood.
    InvalidResponse,
    Internal,
}

/// Structured provider error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    kind: ProviderErrorKind,
    message: String,
}

impl ProviderError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::NotFound, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Unavailable, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::RateLimited, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::InvalidResponse, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Internal, message)
    }

    fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ProviderErrorKind::NotFound => "provider.not_found",
            ProviderErrorKind::Unavailable => "provider.unavailable",
            ProviderErrorKind::RateLimited => "provider.rate_limited",
            ProviderErrorKind::InvalidResponse => "provider.invalid_response",
            ProviderErrorKind::Internal => "provider.internal",
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for ProviderError {}

/// Boxed future returned by provider methods.
pub type ProviderFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send + 'a>>;

/// Source of per-ticker price quotes.
///
/// Implementations must be `Send + Sync`; the fetch loop only ever awaits one
/// call at a time.
pub trait PriceProvider: Send + Sync {
    /// Short provider name used in logs and envelope metadata.
    fn name(&self) -> &'static str;

    /// Fetches the current and reference price for one ticker.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the ticker is unknown, the upstream is
    /// unreachable or rate limited, or the payload is malformed.
    fn price<'a>(&'a self, ticker: &'a Ticker) -> ProviderFuture<'a, PriceQuote>;
}

/// Source of the single exchange rate used by a valuation pass.
pub trait ExchangeRateProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn exchange_rate<'a>(&'a self, pair: &'a CurrencyPair) -> ProviderFuture<'a, ExchangeRate>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_stable_code() {
        let error = ProviderError::rate_limited("slow down");
        assert_eq!(error.kind(), ProviderErrorKind::RateLimited);
        assert_eq!(error.to_string(), "slow down (provider.rate_limited)");
    }
}
