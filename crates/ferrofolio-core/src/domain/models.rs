use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{Market, Ticker, ValidationError};

/// One row of the holdings table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub ticker: Ticker,
    pub market: Market,
    pub quantity: f64,
    /// Cost basis per unit, in the market's native currency.
    pub cost_price: f64,
}

impl Holding {
    pub fn new(
        ticker: Ticker,
        market: Market,
        quantity: f64,
        cost_price: f64,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("quantity", quantity)?;
        validate_non_negative("cost_price", cost_price)?;

        Ok(Self {
            ticker,
            market,
            quantity,
            cost_price,
        })
    }
}

/// Price snapshot for one ticker, in the ticker's native currency.
///
/// `None` means the provider could not supply the value. A genuine zero
/// price is `Some(0.0)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPriceQuote")]
pub struct PriceQuote {
    pub current_price: Option<f64>,
    /// Session open, used as an approximation of the previous close.
    pub reference_price: Option<f64>,
}

impl PriceQuote {
    pub fn new(
        current_price: Option<f64>,
        reference_price: Option<f64>,
    ) -> Result<Self, ValidationError> {
        validate_optional_non_negative("current_price", current_price)?;
        validate_optional_non_negative("reference_price", reference_price)?;

        Ok(Self {
            current_price,
            reference_price,
        })
    }

    /// Quote for a ticker whose lookup failed.
    pub const fn absent() -> Self {
        Self {
            current_price: None,
            reference_price: None,
        }
    }

    pub const fn is_priced(&self) -> bool {
        self.current_price.is_some()
    }
}

#[derive(Deserialize)]
struct RawPriceQuote {
    current_price: Option<f64>,
    reference_price: Option<f64>,
}

impl TryFrom<RawPriceQuote> for PriceQuote {
    type Error = ValidationError;

    fn try_from(raw: RawPriceQuote) -> Result<Self, Self::Error> {
        Self::new(raw.current_price, raw.reference_price)
    }
}

/// Assembled quotes keyed by ticker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteSnapshot {
    quotes: BTreeMap<Ticker, PriceQuote>,
}

impl QuoteSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ticker: Ticker, quote: PriceQuote) -> Option<PriceQuote> {
        self.quotes.insert(ticker, quote)
    }

    pub fn remove(&mut self, ticker: &Ticker) -> Option<PriceQuote> {
        self.quotes.remove(ticker)
    }

    pub fn get(&self, ticker: &Ticker) -> Option<&PriceQuote> {
        self.quotes.get(ticker)
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Ticker, &PriceQuote)> {
        self.quotes.iter()
    }
}

impl FromIterator<(Ticker, PriceQuote)> for QuoteSnapshot {
    fn from_iter<I: IntoIterator<Item = (Ticker, PriceQuote)>>(iter: I) -> Self {
        Self {
            quotes: iter.into_iter().collect(),
        }
    }
}

/// Foreign-to-reporting currency multiplier for one valuation pass.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ExchangeRate(f64);

impl ExchangeRate {
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(ValidationError::InvalidExchangeRate { value });
        }
        Ok(Self(value))
    }

    pub const fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for ExchangeRate {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ExchangeRate> for f64 {
    fn from(value: ExchangeRate) -> Self {
        value.0
    }
}

impl Display for ExchangeRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

/// The single foreign/reporting currency pair the dashboard converts through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    /// Currency foreign holdings are priced in.
    pub base: String,
    /// Reporting currency.
    pub quote: String,
}

impl CurrencyPair {
    pub fn new(base: &str, quote: &str) -> Result<Self, ValidationError> {
        let base = validate_currency_code(base)?;
        let quote = validate_currency_code(quote)?;
        if base == quote {
            return Err(ValidationError::DegenerateCurrencyPair {
                value: format!("{base}/{quote}"),
            });
        }
        Ok(Self { base, quote })
    }

    /// Yahoo Finance symbol for this pair (`CNY=X` for USD/CNY).
    pub fn yahoo_symbol(&self) -> String {
        if self.base == "USD" {
            format!("{}=X", self.quote)
        } else {
            format!("{}{}=X", self.base, self.quote)
        }
    }
}

impl Display for CurrencyPair {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// Validate and normalize currency to uppercase 3-letter code.
pub fn validate_currency_code(input: &str) -> Result<String, ValidationError> {
    let normalized = input.trim().to_ascii_uppercase();
    let is_valid = normalized.len() == 3 && normalized.chars().all(|ch| ch.is_ascii_alphabetic());

    if !is_valid {
        return Err(ValidationError::InvalidCurrency {
            value: input.to_owned(),
        });
    }

    Ok(normalized)
}

pub(crate) fn validate_non_negative(
    field: &'static str,
    value: f64,
) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

fn validate_optional_non_negative(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        validate_non_negative(field, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_currency() {
        assert_eq!(
            validate_currency_code("usd").expect("must normalize"),
            "USD"
        );
        assert!(matches!(
            validate_currency_code("USDT"),
            Err(ValidationError::InvalidCurrency { .. })
        ));
    }

    #[test]
    fn pair_maps_to_yahoo_symbol() {
        let usd_cny = CurrencyPair::new("usd", "cny").expect("valid pair");
        assert_eq!(usd_cny.yahoo_symbol(), "CNY=X");

        let eur_cny = CurrencyPair::new("EUR", "CNY").expect("valid pair");
        assert_eq!(eur_cny.yahoo_symbol(), "EURCNY=X");
    }

    #[test]
    fn pair_rejects_same_currency() {
        let err = CurrencyPair::new("CNY", "cny").expect_err("must fail");
        assert!(matches!(err, ValidationError::DegenerateCurrencyPair { .. }));
    }

    #[test]
    fn exchange_rate_must_be_positive_and_finite() {
        assert!(ExchangeRate::new(7.1).is_ok());
        for value in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                ExchangeRate::new(value),
                Err(ValidationError::InvalidExchangeRate { .. })
            ));
        }
    }

    #[test]
    fn holding_rejects_negative_quantity() {
        let ticker = Ticker::parse("AAPL").expect("ticker");
        let err = Holding::new(ticker, Market::Foreign, -1.0, 10.0).expect_err("must fail");
        assert_eq!(err, ValidationError::NegativeValue { field: "quantity" });
    }

    #[test]
    fn zero_price_is_distinct_from_absent() {
        let zero = PriceQuote::new(Some(0.0), Some(0.0)).expect("zero is valid");
        assert!(zero.is_priced());
        assert!(!PriceQuote::absent().is_priced());
    }
}
