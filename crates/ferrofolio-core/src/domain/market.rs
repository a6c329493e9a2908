use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Market a holding trades in, relative to the reporting currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Market {
    /// Priced in the reporting currency; no conversion.
    Domestic,
    /// Priced in the foreign currency; converted with the exchange rate.
    Foreign,
}

impl Market {
    pub const ALL: [Self; 2] = [Self::Domestic, Self::Foreign];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Domestic => "DOMESTIC",
            Self::Foreign => "FOREIGN",
        }
    }
}

impl Display for Market {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Market {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DOMESTIC" => Ok(Self::Domestic),
            "FOREIGN" => Ok(Self::Foreign),
            _ => Err(ValidationError::UnknownMarket {
                value: value.trim().to_owned(),
            }),
        }
    }
}

/// Lookup table from the market labels found in a holdings table to [`Market`].
///
/// Labels are matched case-insensitively. The canonical names `DOMESTIC` and
/// `FOREIGN` always resolve, whatever aliases are registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketCodes {
    aliases: BTreeMap<String, Market>,
}

impl Default for MarketCodes {
    fn default() -> Self {
        let mut codes = Self::canonical();
        codes.insert("US", Market::Foreign);
        codes.insert("CN", Market::Domestic);
        codes
    }
}

impl MarketCodes {
    /// Only `DOMESTIC` and `FOREIGN`, without broker-specific aliases.
    pub fn canonical() -> Self {
        Self {
            aliases: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, code: &str, market: Market) {
        self.aliases
            .insert(code.trim().to_ascii_uppercase(), market);
    }

    /// Register an alias written as `CODE=DOMESTIC` or `CODE=FOREIGN`.
    ///
    /// `CODE` cannot be a canonical market name.
    pub fn insert_spec(&mut self, spec: &str) -> Result<(), ValidationError> {
        let invalid = || ValidationError::InvalidMarketAlias {
            value: spec.to_owned(),
        };

        let (code, market) = spec.split_once('=').ok_or_else(invalid)?;
        if code.trim().is_empty() || code.parse::<Market>().is_ok() {
            return Err(invalid());
        }
        let market = market.parse::<Market>().map_err(|_| invalid())?;
        self.insert(code, market);
        Ok(())
    }

    pub fn resolve(&self, label: &str) -> Result<Market, ValidationError> {
        if let Ok(market) = label.parse::<Market>() {
            return Ok(market);
        }

        self.aliases
            .get(&label.trim().to_ascii_uppercase())
            .copied()
            .ok_or_else(|| ValidationError::UnknownMarket {
                value: label.trim().to_owned(),
            })
    }
}
