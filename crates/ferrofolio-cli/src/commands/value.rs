use ferrofolio_core::{
    fetch_quotes, summarize, EnrichedHolding, ExchangeRate, FetchProgress, HoldingsLocation,
    PortfolioTotals, Treemap, Valuator,
};
use serde::{Deserialize, Serialize};

use crate::cli::ValueArgs;
use crate::config::DashboardConfig;
use crate::error::CliError;
use crate::output;

use super::{CommandResult, Providers};

pub const TREEMAP_ROOT: &str = "Portfolio";

/// Payload of the `value` command.
#[derive(Debug, Serialize, Deserialize)]
pub struct ValueResponseData {
    pub rows: Vec<EnrichedHolding>,
    pub totals: PortfolioTotals,
    pub treemap: Treemap,
}

pub async fn run(
    args: &ValueArgs,
    config: &DashboardConfig,
    providers: &Providers,
) -> Result<CommandResult, CliError> {
    let location = HoldingsLocation::parse(&args.holdings);
    let holdings = location
        .load(
            providers.http_client.as_ref(),
            &config.market_codes,
            config.timeout_ms,
        )
        .await?;

    let exchange_rate = match args.exchange_rate {
        Some(value) => ExchangeRate::new(value)?,
        None => providers.rates.exchange_rate(&config.pair).await?,
    };
    tracing::info!(pair = %config.pair, rate = exchange_rate.value(), "exchange rate resolved");

    let mut report = output::progress_reporter();
    let progress: Option<&mut dyn FnMut(FetchProgress)> = if args.progress {
        Some(&mut report)
    } else {
        None
    };
    let quotes = fetch_quotes(
        providers.prices.as_ref(),
        holdings.iter().map(|holding| &holding.ticker),
        progress,
    )
    .await;

    let rows = Valuator::default().compute(&holdings, &quotes, exchange_rate)?;
    let totals = summarize(&rows);
    let treemap = Treemap::build(&rows, TREEMAP_ROOT);

    let warnings = treemap
        .unpriced
        .iter()
        .map(|ticker| format!("no price for '{ticker}'; value and profit are omitted"))
        .collect::<Vec<_>>();

    let data = serde_json::to_value(ValueResponseData {
        rows,
        totals,
        treemap,
    })?;

    Ok(CommandResult::ok(data)
        .with_warnings(warnings)
        .with_exchange_rate(exchange_rate))
}
