mod check;
mod fx;
mod quote;
mod value;

pub use value::ValueResponseData;

use std::sync::Arc;
use std::time::Instant;

use ferrofolio_core::{
    Envelope, EnvelopeError, EnvelopeMeta, ExchangeRate, ExchangeRateProvider, HttpClient,
    PriceProvider, ReqwestHttpClient, SnapshotProvider, YahooAdapter,
};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::config::DashboardConfig;
use crate::error::CliError;

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub exchange_rate: Option<ExchangeRate>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
            exchange_rate: None,
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_errors(mut self, errors: Vec<EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }

    pub fn with_exchange_rate(mut self, exchange_rate: ExchangeRate) -> Self {
        self.exchange_rate = Some(exchange_rate);
        self
    }
}

/// Price and rate sources shared by the commands.
pub struct Providers {
    pub http_client: Arc<dyn HttpClient>,
    pub prices: Arc<dyn PriceProvider>,
    pub rates: Arc<dyn ExchangeRateProvider>,
}

impl Providers {
    pub fn from_config(config: &DashboardConfig) -> Result<Self, CliError> {
        let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());

        if let Some(path) = &config.snapshot {
            let snapshot = Arc::new(SnapshotProvider::from_path(path)?);
            tracing::info!(
                path = %path.display(),
                quotes = snapshot.quotes.len(),
                "using snapshot provider"
            );
            return Ok(Self {
                http_client,
                prices: snapshot.clone(),
                rates: snapshot,
            });
        }

        let yahoo =
            Arc::new(YahooAdapter::new(http_client.clone()).with_timeout_ms(config.timeout_ms));
        Ok(Self {
            http_client,
            prices: yahoo.clone(),
            rates: yahoo,
        })
    }
}

pub async fn run(cli: &Cli, config: &DashboardConfig) -> Result<Envelope<Value>, CliError> {
    let started = Instant::now();
    let providers = Providers::from_config(config)?;

    let command_result = match &cli.command {
        Command::Value(args) => value::run(args, config, &providers).await?,
        Command::Quote(args) => quote::run(args, &providers).await?,
        Command::Fx => fx::run(config, &providers).await?,
        Command::Check(args) => check::run(args, config, &providers).await?,
    };

    let CommandResult {
        data,
        warnings,
        errors,
        exchange_rate,
    } = command_result;

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let mut meta = EnvelopeMeta::new(config.reporting_currency.clone(), latency_ms);
    if let Some(exchange_rate) = exchange_rate {
        meta = meta.with_exchange_rate(exchange_rate);
    }
    for warning in warnings {
        meta.push_warning(warning);
    }
    meta.validate()?;

    let mut envelope = Envelope::success(meta, data);
    for error in errors {
        envelope.push_error(error)?;
    }
    Ok(envelope)
}
