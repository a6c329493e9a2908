use ferrofolio_core::{change_pct, EnvelopeError, PriceQuote, Ticker};
use serde::Serialize;

use crate::cli::QuoteArgs;
use crate::error::CliError;

use super::{CommandResult, Providers};

#[derive(Debug, Serialize)]
struct QuoteRow {
    ticker: Ticker,
    current_price: Option<f64>,
    reference_price: Option<f64>,
    change_pct: Option<f64>,
}

#[derive(Debug, Serialize)]
struct QuoteResponseData {
    quotes: Vec<QuoteRow>,
}

pub async fn run(args: &QuoteArgs, providers: &Providers) -> Result<CommandResult, CliError> {
    let tickers = args
        .tickers
        .iter()
        .map(|raw| Ticker::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let mut quotes = Vec::with_capacity(tickers.len());
    let mut errors = Vec::new();

    for ticker in tickers {
        let quote = match providers.prices.price(&ticker).await {
            Ok(quote) => quote,
            Err(error) => {
                errors.push(EnvelopeError::from(&error).with_ticker(ticker.as_str()));
                PriceQuote::absent()
            }
        };

        quotes.push(QuoteRow {
            change_pct: quote
                .current_price
                .and_then(|current| change_pct(current, quote.reference_price)),
            ticker,
            current_price: quote.current_price,
            reference_price: quote.reference_price,
        });
    }

    let data = serde_json::to_value(QuoteResponseData { quotes })?;
    Ok(CommandResult::ok(data).with_errors(errors))
}
