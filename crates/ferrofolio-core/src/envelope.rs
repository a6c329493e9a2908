use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::provider::ProviderError;
use crate::{ExchangeRate, ValidationError};

pub const SCHEMA_VERSION: &str = "v1.0.0";

/// Standard response envelope for all `ferrofolio` machine-readable outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub meta: EnvelopeMeta,
    pub data: T,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<EnvelopeError>,
}

impl<T> Envelope<T> {
    pub fn success(meta: EnvelopeMeta, data: T) -> Self {
        Self {
            meta,
            data,
            errors: Vec::new(),
        }
    }

    pub fn push_error(&mut self, error: EnvelopeError) -> Result<(), ValidationError> {
        error.validate()?;
        self.errors.push(error);
        Ok(())
    }

    /// True when the output is incomplete: warnings or errors were recorded.
    pub fn is_partial(&self) -> bool {
        !self.meta.warnings.is_empty() || !self.errors.is_empty()
    }
}

/// Metadata attached to every envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeMeta {
    pub request_id: String,
    pub schema_version: String,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
    pub reporting_currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_rate: Option<ExchangeRate>,
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl EnvelopeMeta {
    /// Fresh metadata with a random v4 request id, stamped now.
    pub fn new(reporting_currency: impl Into<String>, latency_ms: u64) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            schema_version: String::from(SCHEMA_VERSION),
            generated_at: OffsetDateTime::now_utc(),
            reporting_currency: reporting_currency.into(),
            exchange_rate: None,
            latency_ms,
            warnings: Vec::new(),
        }
    }

    pub fn with_exchange_rate(mut self, exchange_rate: ExchangeRate) -> Self {
        self.exchange_rate = Some(exchange_rate);
        self
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn generated_at_rfc3339(&self) -> Result<String, time::error::Format> {
        self.generated_at.format(&Rfc3339)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_valid_schema_version(&self.schema_version) {
            return Err(ValidationError::InvalidSchemaVersion {
                value: self.schema_version.clone(),
            });
        }
        crate::validate_currency_code(&self.reporting_currency)?;
        Ok(())
    }
}

/// Structured error payload for partial or failed responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
}

impl EnvelopeError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let error = Self {
            code: code.into(),
            message: message.into(),
            ticker: None,
        };
        error.validate()?;
        Ok(error)
    }

    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = Some(ticker.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.code.trim().is_empty() {
            return Err(ValidationError::EmptyErrorCode);
        }

        if self.message.trim().is_empty() {
            return Err(ValidationError::EmptyErrorMessage);
        }

        Ok(())
    }
}

impl From<&ProviderError> for EnvelopeError {
    fn from(error: &ProviderError) -> Self {
        Self {
            code: error.code().to_owned(),
            message: error.message().to_owned(),
            ticker: None,
        }
    }
}

fn is_valid_schema_version(value: &str) -> bool {
    let Some(version) = value.strip_prefix('v') else {
        return false;
    };

    let parts = version.split('.').collect::<Vec<_>>();
    parts.len() == 3
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.chars().all(|ch| ch.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_meta_is_valid_and_unique() {
        let first = EnvelopeMeta::new("CNY", 12);
        let second = EnvelopeMeta::new("CNY", 12);

        assert!(first.validate().is_ok());
        assert_eq!(first.schema_version, SCHEMA_VERSION);
        assert_eq!(first.request_id.len(), 36);
        assert_ne!(first.request_id, second.request_id);
    }

    #[test]
    fn generated_at_is_rfc3339_utc() {
        let envelope = Envelope::success(EnvelopeMeta::new("CNY", 0), serde_json::json!(null));

        let value = serde_json::to_value(&envelope).expect("serializes");
        let stamp = value["meta"]["generated_at"].as_str().expect("string timestamp");
        assert!(stamp.ends_with('Z'), "{stamp}");
        assert_eq!(
            Some(stamp.to_owned()),
            envelope.meta.generated_at_rfc3339().ok()
        );

        let parsed: Envelope<serde_json::Value> =
            serde_json::from_value(value).expect("deserializes");
        assert_eq!(parsed.meta.generated_at, envelope.meta.generated_at);
    }

    #[test]
    fn rejects_bad_schema_version() {
        let mut meta = EnvelopeMeta::new("CNY", 1);
        meta.schema_version = String::from("1.0");
        assert!(matches!(
            meta.validate(),
            Err(ValidationError::InvalidSchemaVersion { .. })
        ));
    }

    #[test]
    fn rejects_empty_error_code() {
        let err = EnvelopeError::new("", "message").expect_err("must fail");
        assert!(matches!(err, ValidationError::EmptyErrorCode));
    }

    #[test]
    fn serializes_rate_and_omits_empty_lists() {
        let meta = EnvelopeMeta::new("CNY", 3)
            .with_exchange_rate(ExchangeRate::new(7.0).expect("rate"));
        let envelope = Envelope::success(meta, serde_json::json!({"rows": []}));

        let value = serde_json::to_value(&envelope).expect("serializes");
        assert_eq!(value["meta"]["exchange_rate"], 7.0);
        assert!(value["meta"].get("warnings").is_none());
        assert!(value.get("errors").is_none());
        assert!(!envelope.is_partial());
    }

    #[test]
    fn provider_errors_convert_with_code() {
        let error = EnvelopeError::from(&ProviderError::not_found("no chart"))
            .with_ticker("AAPL");
        assert_eq!(error.code, "provider.not_found");
        assert_eq!(error.ticker.as_deref(), Some("AAPL"));
    }
}
