use thiserror::Error;

use crate::provider::ProviderError;

/// Validation errors for domain values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("ticker length {len} exceeds max {max}")]
    TickerTooLong { len: usize, max: usize },
    #[error("ticker contains invalid character '{ch}' at index {index}")]
    TickerInvalidChar { ch: char, index: usize },

    #[error("currency must be a 3-letter uppercase ISO code: '{value}'")]
    InvalidCurrency { value: String },
    #[error("currency pair must use two different currencies: '{value}'")]
    DegenerateCurrencyPair { value: String },

    #[error("unknown market '{value}', expected DOMESTIC, FOREIGN or a configured alias")]
    UnknownMarket { value: String },
    #[error("market alias must look like CODE=DOMESTIC or CODE=FOREIGN: '{value}'")]
    InvalidMarketAlias { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("exchange rate must be finite and positive, got {value}")]
    InvalidExchangeRate { value: f64 },

    #[error("schema version must look like v<major>.<minor>.<patch>: '{value}'")]
    InvalidSchemaVersion { value: String },
    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}

/// Errors raised while reading the holdings table.
#[derive(Debug, Error)]
pub enum HoldingsError {
    #[error("failed to read holdings file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to download holdings from '{url}': {message}")]
    Download { url: String, message: String },

    #[error("malformed holdings csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("holdings table is missing required column '{column}'")]
    MissingColumn { column: &'static str },

    #[error("holdings row {row}: field '{field}' {reason}")]
    InvalidRow {
        row: usize,
        field: &'static str,
        reason: String,
    },
}

/// Input-contract violations detected by the valuation engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValuationError {
    #[error("holding {row} ({ticker}): field '{field}' {reason}")]
    InvalidHolding {
        row: usize,
        ticker: String,
        field: &'static str,
        reason: String,
    },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Holdings(#[from] HoldingsError),

    #[error(transparent)]
    Valuation(#[from] ValuationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
