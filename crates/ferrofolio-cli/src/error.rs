use ferrofolio_core::{CoreError, HoldingsError, ProviderError, ValidationError, ValuationError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Holdings(#[from] HoldingsError),

    #[error(transparent)]
    Valuation(#[from] ValuationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("strict mode failed: warnings={warning_count}, errors={error_count}")]
    StrictModeViolation {
        warning_count: usize,
        error_count: usize,
    },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Config(_) | Self::Holdings(_) | Self::Valuation(_) => 2,
            Self::Provider(_) => 3,
            Self::Serialization(_) => 4,
            Self::StrictModeViolation { .. } => 5,
            Self::Io(_) => 10,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::Validation(error) => Self::Validation(error),
            CoreError::Holdings(error) => Self::Holdings(error),
            CoreError::Valuation(error) => Self::Valuation(error),
            CoreError::Provider(error) => Self::Provider(error),
            CoreError::Serialization(error) => Self::Serialization(error),
        }
    }
}
