//! CLI argument definitions for ferrofolio.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `value` | Load holdings, fetch quotes and the rate, value the portfolio |
//! | `quote` | Fetch price quotes for tickers |
//! | `fx` | Fetch the foreign -> reporting exchange rate |
//! | `check` | Validate a holdings table without fetching prices |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table, treemap) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings as errors |
//! | `--timeout-ms` | `10000` | Per-request timeout in ms |
//! | `--log-format` | `text` | Log line format on stderr |
//! | `--reporting-currency` | `CNY` | Currency of all value figures |
//! | `--foreign-currency` | `USD` | Currency of foreign-market prices |
//! | `--market-alias` | `US=FOREIGN`, `CN=DOMESTIC` | Extra market labels |
//! | `--snapshot` | none | Read quotes and the rate from a JSON file |
//!
//! # Examples
//!
//! ```bash
//! ferrofolio value --holdings portfolio.csv --format table
//! ferrofolio value --holdings https://example.com/portfolio.csv --progress --pretty
//! ferrofolio quote AAPL 600000.SS
//! ferrofolio fx --foreign-currency USD --reporting-currency CNY
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Personal portfolio valuation in one reporting currency.
#[derive(Debug, Parser)]
#[command(name = "ferrofolio", author, version, about)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Per-request timeout in milliseconds.
    #[arg(long, global = true, env = "FERROFOLIO_TIMEOUT_MS", default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Log line format. Verbosity follows `RUST_LOG`.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Currency every value and profit figure is reported in.
    #[arg(long, global = true, env = "FERROFOLIO_REPORTING_CURRENCY", default_value = "CNY")]
    pub reporting_currency: String,

    /// Currency foreign-market prices are quoted in.
    #[arg(long, global = true, env = "FERROFOLIO_FOREIGN_CURRENCY", default_value = "USD")]
    pub foreign_currency: String,

    /// Extra holdings-table market label, as CODE=DOMESTIC or CODE=FOREIGN.
    #[arg(long = "market-alias", global = true, value_name = "CODE=MARKET")]
    pub market_aliases: Vec<String>,

    /// Serve quotes and the exchange rate from a saved JSON snapshot.
    #[arg(long, global = true, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON envelope.
    Json,
    /// Aligned text table.
    Table,
    /// Indented market/ticker tree with shares and colours.
    Treemap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Value the portfolio in the reporting currency.
    Value(ValueArgs),
    /// Fetch price quotes for one or more tickers.
    Quote(QuoteArgs),
    /// Fetch the foreign -> reporting exchange rate.
    Fx,
    /// Validate a holdings table without fetching prices.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
pub struct ValueArgs {
    /// Holdings CSV path or http(s) URL.
    #[arg(long, env = "FERROFOLIO_HOLDINGS")]
    pub holdings: String,

    /// Use this rate instead of asking the exchange-rate provider.
    #[arg(long)]
    pub exchange_rate: Option<f64>,

    /// Report per-ticker fetch progress on stderr.
    #[arg(long, default_value_t = false)]
    pub progress: bool,
}

#[derive(Debug, Args)]
pub struct QuoteArgs {
    #[arg(required = true)]
    pub tickers: Vec<String>,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Holdings CSV path or http(s) URL.
    #[arg(long, env = "FERROFOLIO_HOLDINGS")]
    pub holdings: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_value_with_globals_after_subcommand() {
        let cli = Cli::try_parse_from([
            "ferrofolio",
            "value",
            "--holdings",
            "portfolio.csv",
            "--exchange-rate",
            "7.1",
            "--format",
            "table",
            "--market-alias",
            "HK=FOREIGN",
        ])
        .expect("arguments parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.market_aliases, vec![String::from("HK=FOREIGN")]);
        match cli.command {
            Command::Value(args) => {
                assert_eq!(args.holdings, "portfolio.csv");
                assert_eq!(args.exchange_rate, Some(7.1));
                assert!(!args.progress);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn quote_requires_a_ticker() {
        assert!(Cli::try_parse_from(["ferrofolio", "quote"]).is_err());
    }
}
