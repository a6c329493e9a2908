//! Validated runtime settings assembled from flags, environment and `.env`.

use std::path::PathBuf;

use ferrofolio_core::{validate_currency_code, CurrencyPair, MarketCodes};

use crate::cli::Cli;
use crate::error::CliError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub reporting_currency: String,
    /// Foreign currency -> reporting currency.
    pub pair: CurrencyPair,
    pub timeout_ms: u64,
    pub market_codes: MarketCodes,
    pub snapshot: Option<PathBuf>,
}

impl DashboardConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.timeout_ms == 0 {
            return Err(CliError::Config(String::from(
                "--timeout-ms must be greater than zero",
            )));
        }

        let reporting_currency = validate_currency_code(&cli.reporting_currency)?;
        let pair = CurrencyPair::new(&cli.foreign_currency, &reporting_currency)?;

        let mut market_codes = MarketCodes::default();
        for alias in &cli.market_aliases {
            market_codes.insert_spec(alias)?;
        }

        Ok(Self {
            reporting_currency,
            pair,
            timeout_ms: cli.timeout_ms,
            market_codes,
            snapshot: cli.snapshot.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use ferrofolio_core::{Market, ValidationError};

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["ferrofolio"];
        argv.extend_from_slice(args);
        argv.push("fx");
        Cli::try_parse_from(argv).expect("arguments parse")
    }

    #[test]
    fn builds_pair_and_aliases() {
        let cli = parse(&[
            "--reporting-currency",
            "cny",
            "--foreign-currency",
            "usd",
            "--market-alias",
            "hk=foreign",
        ]);
        let config = DashboardConfig::from_cli(&cli).expect("valid config");

        assert_eq!(config.reporting_currency, "CNY");
        assert_eq!(config.pair.to_string(), "USD/CNY");
        assert_eq!(config.market_codes.resolve("HK"), Ok(Market::Foreign));
        assert_eq!(config.market_codes.resolve("US"), Ok(Market::Foreign));
    }

    #[test]
    fn rejects_identical_currencies() {
        let cli = parse(&["--reporting-currency", "USD", "--foreign-currency", "USD"]);
        let err = DashboardConfig::from_cli(&cli).expect_err("must fail");
        assert!(matches!(
            err,
            CliError::Validation(ValidationError::DegenerateCurrencyPair { .. })
        ));
    }

    #[test]
    fn rejects_zero_timeout_and_bad_alias() {
        let cli = parse(&["--timeout-ms", "0"]);
        assert!(matches!(
            DashboardConfig::from_cli(&cli),
            Err(CliError::Config(_))
        ));

        let cli = parse(&["--market-alias", "HK"]);
        assert!(matches!(
            DashboardConfig::from_cli(&cli),
            Err(CliError::Validation(ValidationError::InvalidMarketAlias { .. }))
        ));
    }
}
