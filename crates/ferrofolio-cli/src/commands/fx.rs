use ferrofolio_core::{CurrencyPair, ExchangeRate};
use serde::Serialize;

use crate::config::DashboardConfig;
use crate::error::CliError;

use super::{CommandResult, Providers};

#[derive(Debug, Serialize)]
struct FxResponseData<'a> {
    pair: &'a CurrencyPair,
    symbol: String,
    rate: ExchangeRate,
}

pub async fn run(
    config: &DashboardConfig,
    providers: &Providers,
) -> Result<CommandResult, CliError> {
    let rate = providers.rates.exchange_rate(&config.pair).await?;

    let data = serde_json::to_value(FxResponseData {
        pair: &config.pair,
        symbol: config.pair.yahoo_symbol(),
        rate,
    })?;

    Ok(CommandResult::ok(data).with_exchange_rate(rate))
}
