//! Valuation engine.
//!
//! Joins a holdings table with a [`QuoteSnapshot`] and one [`ExchangeRate`]
//! and derives, per row, the percent change, the market value, the cost and
//! the profit in the reporting currency.
//!
//! Every row is a pure function of itself plus the shared rate: rows never
//! influence each other, and a missing quote only blanks the price-derived
//! fields of its own row.
//!
//! ```rust
//! use ferrofolio_core::{
//!     compute, ExchangeRate, Holding, Market, PriceQuote, QuoteSnapshot, Ticker,
//! };
//!
//! let aapl = Ticker::parse("AAPL")?;
//! let holdings = vec![Holding::new(aapl.clone(), Market::Foreign, 10.0, 100.0)?];
//! let quotes: QuoteSnapshot = [(aapl, PriceQuote::new(Some(150.0), Some(145.0))?)]
//!     .into_iter()
//!     .collect();
//!
//! let rows = compute(&holdings, &quotes, ExchangeRate::new(7.0)?)?;
//! assert_eq!(rows[0].market_value_reporting, Some(10_500.0));
//! assert_eq!(rows[0].profit_reporting, Some(3_500.0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::validate_non_negative;
use crate::{ExchangeRate, Holding, Market, PriceQuote, QuoteSnapshot, Ticker, ValuationError};

/// How a market's native prices convert into the reporting currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Multiplier {
    /// Already in the reporting currency.
    Unit,
    /// Multiply by the pass-wide exchange rate.
    ExchangeRate,
}

impl Multiplier {
    pub fn factor(self, rate: ExchangeRate) -> f64 {
        match self {
            Self::Unit => 1.0,
            Self::ExchangeRate => rate.value(),
        }
    }
}

/// Explicit market -> multiplier mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiplierTable {
    entries: BTreeMap<Market, Multiplier>,
}

impl Default for MultiplierTable {
    fn default() -> Self {
        Self {
            entries: BTreeMap::from([
                (Market::Domestic, Multiplier::Unit),
                (Market::Foreign, Multiplier::ExchangeRate),
            ]),
        }
    }
}

impl MultiplierTable {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn with_entry(mut self, market: Market, multiplier: Multiplier) -> Self {
        self.entries.insert(market, multiplier);
        self
    }

    pub fn get(&self, market: Market) -> Option<Multiplier> {
        self.entries.get(&market).copied()
    }
}

/// A holding joined with its quote and the derived reporting-currency fields.
///
/// Price-derived fields are `None` when the ticker had no usable quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedHolding {
    pub ticker: Ticker,
    pub market: Market,
    pub quantity: f64,
    pub cost_price: f64,
    pub current_price: Option<f64>,
    pub change_pct: Option<f64>,
    pub market_value_reporting: Option<f64>,
    /// Derived from static fields only, so it is defined for every row.
    pub cost_reporting: f64,
    pub profit_reporting: Option<f64>,
}

impl EnrichedHolding {
    pub const fn is_priced(&self) -> bool {
        self.market_value_reporting.is_some()
    }
}

/// Valuation engine configured with a multiplier table.
#[derive(Debug, Clone, Default)]
pub struct Valuator {
    multipliers: MultiplierTable,
}

impl Valuator {
    pub fn new(multipliers: MultiplierTable) -> Self {
        Self { multipliers }
    }

    /// Values every holding in order.
    ///
    /// # Errors
    ///
    /// Returns [`ValuationError::InvalidHolding`] for the first row whose
    /// quantity or cost price is negative or non-finite, or whose market has
    /// no multiplier. Missing quotes are never an error.
    pub fn compute(
        &self,
        holdings: &[Holding],
        quotes: &QuoteSnapshot,
        exchange_rate: ExchangeRate,
    ) -> Result<Vec<EnrichedHolding>, ValuationError> {
        holdings
            .iter()
            .enumerate()
            .map(|(index, holding)| {
                self.value_row(index + 1, holding, quotes.get(&holding.ticker), exchange_rate)
            })
            .collect()
    }

    fn value_row(
        &self,
        row: usize,
        holding: &Holding,
        quote: Option<&PriceQuote>,
        exchange_rate: ExchangeRate,
    ) -> Result<EnrichedHolding, ValuationError> {
        let invalid = |field: &'static str, reason: String| ValuationError::InvalidHolding {
            row,
            ticker: holding.ticker.to_string(),
            field,
            reason,
        };

        validate_non_negative("quantity", holding.quantity)
            .map_err(|error| invalid("quantity", error.to_string()))?;
        validate_non_negative("cost_price", holding.cost_price)
            .map_err(|error| invalid("cost_price", error.to_string()))?;
        let multiplier = self
            .multipliers
            .get(holding.market)
            .ok_or_else(|| {
                invalid(
                    "market",
                    format!("has no currency multiplier for {}", holding.market),
                )
            })?
            .factor(exchange_rate);

        let cost_reporting = holding.cost_price * holding.quantity * multiplier;
        let current_price = quote.and_then(|quote| quote.current_price);

        let (change_pct, market_value_reporting, profit_reporting) = match current_price {
            Some(price) => {
                let market_value = price * holding.quantity * multiplier;
                (
                    change_pct(price, quote.and_then(|quote| quote.reference_price)),
                    Some(market_value),
                    Some(market_value - cost_reporting),
                )
            }
            None => (None, None, None),
        };

        Ok(EnrichedHolding {
            ticker: holding.ticker.clone(),
            market: holding.market,
            quantity: holding.quantity,
            cost_price: holding.cost_price,
            current_price,
            change_pct,
            market_value_reporting,
            cost_reporting,
            profit_reporting,
        })
    }
}

/// Values `holdings` with the default multiplier table.
pub fn compute(
    holdings: &[Holding],
    quotes: &QuoteSnapshot,
    exchange_rate: ExchangeRate,
) -> Result<Vec<EnrichedHolding>, ValuationError> {
    Valuator::default().compute(holdings, quotes, exchange_rate)
}

/// Percent change from `reference` to `current`; `None` when undefined.
pub fn change_pct(current: f64, reference: Option<f64>) -> Option<f64> {
    let reference = reference.filter(|value| *value != 0.0)?;
    let pct = (current - reference) / reference * 100.0;
    pct.is_finite().then_some(pct)
}

/// Subtotals for one market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketTotals {
    pub market: Market,
    pub market_value: f64,
    pub cost: f64,
    pub profit: f64,
    pub priced_rows: usize,
    pub unpriced_rows: usize,
}

/// Portfolio-wide aggregates over the rows whose price fields are defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioTotals {
    pub market_value: f64,
    /// Cost of the priced rows only, so that `profit == market_value - cost`.
    pub cost: f64,
    pub profit: f64,
    pub return_pct: Option<f64>,
    pub priced_rows: usize,
    pub unpriced_rows: usize,
    pub by_market: Vec<MarketTotals>,
}

/// Aggregates an enriched table. Unpriced rows are counted, never summed.
pub fn summarize(rows: &[EnrichedHolding]) -> PortfolioTotals {
    let mut by_market: BTreeMap<Market, MarketTotals> = BTreeMap::new();

    for row in rows {
        let totals = by_market.entry(row.market).or_insert(MarketTotals {
            market: row.market,
            market_value: 0.0,
            cost: 0.0,
            profit: 0.0,
            priced_rows: 0,
            unpriced_rows: 0,
        });

        match (row.market_value_reporting, row.profit_reporting) {
            (Some(market_value), Some(profit)) => {
                totals.market_value += market_value;
                totals.cost += row.cost_reporting;
                totals.profit += profit;
                totals.priced_rows += 1;
            }
            _ => totals.unpriced_rows += 1,
        }
    }

    let by_market = by_market.into_values().collect::<Vec<_>>();
    let market_value = by_market.iter().map(|totals| totals.market_value).sum();
    let cost: f64 = by_market.iter().map(|totals| totals.cost).sum();
    let profit: f64 = by_market.iter().map(|totals| totals.profit).sum();

    PortfolioTotals {
        market_value,
        cost,
        profit,
        return_pct: (cost > 0.0).then(|| profit / cost * 100.0),
        priced_rows: by_market.iter().map(|totals| totals.priced_rows).sum(),
        unpriced_rows: by_market.iter().map(|totals| totals.unpriced_rows).sum(),
        by_market,
    }
}
