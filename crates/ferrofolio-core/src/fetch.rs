//! Sequential quote fetch loop.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::provider::PriceProvider;
use crate::{PriceQuote, QuoteSnapshot, Ticker};

/// Progress report emitted after each ticker completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchProgress {
    pub completed: usize,
    pub total: usize,
    pub ticker: Ticker,
    /// Whether the provider returned a current price.
    pub found: bool,
}

impl FetchProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Fetches one quote per distinct ticker, in first-seen order.
///
/// A provider failure never aborts the loop: the ticker is recorded with
/// [`PriceQuote::absent`] and the failure is logged. `progress` is called
/// once per distinct ticker after its lookup finishes.
pub async fn fetch_quotes<'t, P, I>(
    provider: &P,
    tickers: I,
    mut progress: Option<&mut dyn FnMut(FetchProgress)>,
) -> QuoteSnapshot
where
    P: PriceProvider + ?Sized,
    I: IntoIterator<Item = &'t Ticker>,
{
    let mut seen = BTreeSet::new();
    let unique = tickers
        .into_iter()
        .filter(|ticker| seen.insert(*ticker))
        .collect::<Vec<_>>();
    let total = unique.len();
    let mut snapshot = QuoteSnapshot::new();

    for (index, ticker) in unique.into_iter().enumerate() {
        let quote = match provider.price(ticker).await {
            Ok(quote) => quote,
            Err(error) => {
                tracing::warn!(
                    provider = provider.name(),
                    ticker = %ticker,
                    code = error.code(),
                    "quote unavailable: {}",
                    error.message()
                );
                PriceQuote::absent()
            }
        };

        tracing::debug!(ticker = %ticker, priced = quote.is_priced(), "quote fetched");
        let found = quote.is_priced();
        snapshot.insert(ticker.clone(), quote);

        if let Some(callback) = progress.as_deref_mut() {
            callback(FetchProgress {
                completed: index + 1,
                total,
                ticker: ticker.clone(),
                found,
            });
        }
    }

    tracing::info!(
        provider = provider.name(),
        total,
        priced = snapshot.iter().filter(|(_, quote)| quote.is_priced()).count(),
        "quote fetch complete"
    );
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::SnapshotProvider;

    fn ticker(value: &str) -> Ticker {
        Ticker::parse(value).expect("valid ticker")
    }

    #[tokio::test]
    async fn failures_become_absent_quotes_and_progress_counts_distinct_tickers() {
        let provider = SnapshotProvider::new(
            [(ticker("AAPL"), PriceQuote::new(Some(150.0), Some(145.0)).expect("quote"))]
                .into_iter()
                .collect(),
            None,
        );
        let tickers = vec![ticker("AAPL"), ticker("GONE"), ticker("AAPL")];
        let mut events = Vec::new();
        let mut record = |event: FetchProgress| events.push(event);

        let snapshot = fetch_quotes(&provider, &tickers, Some(&mut record)).await;

        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.get(&ticker("AAPL")).expect("aapl").is_priced());
        assert_eq!(snapshot.get(&ticker("GONE")), Some(&PriceQuote::absent()));

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].ticker, ticker("AAPL"));
        assert!(events[0].found);
        assert_eq!((events[1].completed, events[1].total), (2, 2));
        assert!(!events[1].found);
        assert_eq!(events[1].fraction(), 1.0);
    }

    #[tokio::test]
    async fn runs_without_progress_callback() {
        let provider = SnapshotProvider::default();
        let tickers = vec![ticker("MSFT")];

        let snapshot = fetch_quotes(&provider, &tickers, None).await;
        assert_eq!(snapshot.get(&ticker("MSFT")), Some(&PriceQuote::absent()));
    }
}
