use std::sync::Arc;

use serde::Deserialize;

use crate::http_client::{HttpClient, HttpRequest};
use crate::provider::{ExchangeRateProvider, PriceProvider, ProviderError, ProviderFuture};
use crate::{CurrencyPair, ExchangeRate, PriceQuote, Ticker};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Yahoo Finance adapter reading the one-day chart endpoint.
///
/// The current price is the session's last close (falling back to
/// `regularMarketPrice`), and the reference price is the session's first
/// open. The open stands in for the previous close, so `change_pct` is an
/// intraday move rather than a day-over-day one.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
}

impl YahooAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: String::from(DEFAULT_BASE_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}?range=1d&interval=1d",
            self.base_url,
            urlencoding::encode(symbol)
        )
    }

    async fn fetch_session(&self, symbol: &str) -> Result<SessionPrices, ProviderError> {
        let request = HttpRequest::get(self.chart_url(symbol))
            .with_header("referer", "https://finance.yahoo.com/")
            .with_timeout_ms(self.timeout_ms);

        tracing::debug!(symbol, url = %request.url, "requesting yahoo chart");

        let response = self.http_client.execute(request).await.map_err(|e| {
            ProviderError::unavailable(format!("yahoo transport error: {}", e.message()))
        })?;

        match response.status {
            404 => {
                return Err(ProviderError::not_found(format!(
                    "yahoo has no chart for '{symbol}'"
                )))
            }
            429 => {
                return Err(ProviderError::rate_limited(
                    "yahoo rate limited the chart request",
                ))
            }
            _ if !response.is_success() => {
                return Err(ProviderError::unavailable(format!(
                    "yahoo returned status {}",
                    response.status
                )))
            }
            _ => {}
        }

        parse_chart(symbol, &response.body)
    }
}

impl PriceProvider for YahooAdapter {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    fn price<'a>(&'a self, ticker: &'a Ticker) -> ProviderFuture<'a, PriceQuote> {
        Box::pin(async move {
            let session = self.fetch_session(ticker.as_str()).await?;
            if session.current.is_none() {
                return Err(ProviderError::not_found(format!(
                    "yahoo chart for '{ticker}' has no price"
                )));
            }

            PriceQuote::new(session.current, session.reference).map_err(|e| {
                ProviderError::invalid_response(format!("yahoo price for '{ticker}': {e}"))
            })
        })
    }
}

impl ExchangeRateProvider for YahooAdapter {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    fn exchange_rate<'a>(&'a self, pair: &'a CurrencyPair) -> ProviderFuture<'a, ExchangeRate> {
        Box::pin(async move {
            let symbol = pair.yahoo_symbol();
            let session = self.fetch_session(&symbol).await?;
            let rate = session.current.ok_or_else(|| {
                ProviderError::not_found(format!("yahoo chart for {pair} ({symbol}) has no rate"))
            })?;

            ExchangeRate::new(rate).map_err(|e| {
                ProviderError::invalid_response(format!("yahoo rate for {pair}: {e}"))
            })
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SessionPrices {
    current: Option<f64>,
    reference: Option<f64>,
}

fn parse_chart(symbol: &str, body: &str) -> Result<SessionPrices, ProviderError> {
    let chart: YahooChartResponse = serde_json::from_str(body).map_err(|e| {
        ProviderError::invalid_response(format!("failed to parse yahoo chart for '{symbol}': {e}"))
    })?;

    if let Some(error) = chart.chart.error {
        return Err(ProviderError::not_found(format!(
            "yahoo chart error for '{symbol}': {} {}",
            error.code.unwrap_or_default(),
            error.description.unwrap_or_default()
        )));
    }

    let result = chart
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ProviderError::not_found(format!("yahoo chart for '{symbol}' is empty")))?;

    let session = result.indicators.quote.into_iter().next().unwrap_or_default();
    let current = session
        .close
        .iter()
        .rev()
        .find_map(|value| *value)
        .or(result.meta.regular_market_price);
    let reference = session.open.iter().find_map(|value| *value);

    Ok(SessionPrices { current, reference })
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Deserialize)]
struct YahooChartError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    meta: YahooChartMeta,
    #[serde(default)]
    indicators: YahooChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct YahooChartMeta {
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}
