use std::collections::BTreeMap;

use ferrofolio_core::{HoldingsLocation, Market};
use serde::Serialize;

use crate::cli::CheckArgs;
use crate::config::DashboardConfig;
use crate::error::CliError;

use super::{CommandResult, Providers};

#[derive(Debug, Serialize)]
struct CheckResponseData {
    location: String,
    rows: usize,
    distinct_tickers: usize,
    rows_by_market: BTreeMap<Market, usize>,
}

/// Loads and validates the holdings table; never touches a price provider.
pub async fn run(
    args: &CheckArgs,
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

    let mut rows_by_market = BTreeMap::new();
    for holding in &holdings {
        *rows_by_market.entry(holding.market).or_insert(0) += 1;
    }

    let mut tickers = holdings.iter().map(|holding| &holding.ticker).collect::<Vec<_>>();
    tickers.sort();
    tickers.dedup();

    let mut warnings = Vec::new();
    if holdings.is_empty() {
        warnings.push(String::from("holdings table has no rows"));
    }
    if tickers.len() < holdings.len() {
        warnings.push(format!(
            "{} rows repeat a ticker; they are valued independently",
            holdings.len() - tickers.len()
        ));
    }

    let data = serde_json::to_value(CheckResponseData {
        location: location.to_string(),
        rows: holdings.len(),
        distinct_tickers: tickers.len(),
        rows_by_market,
    })?;

    Ok(CommandResult::ok(data).with_warnings(warnings))
}
