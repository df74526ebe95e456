use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FiatCurrency {
    Usd,
    Eur,
    Cop,
}

impl FiatCurrency {
    pub const ALL: [FiatCurrency; 3] = [FiatCurrency::Usd, FiatCurrency::Eur, FiatCurrency::Cop];

    /// Lowercase code used by the price API (`vs_currencies`).
    pub fn api_code(self) -> &'static str {
        match self {
            Self::Usd => "usd",
            Self::Eur => "eur",
            Self::Cop => "cop",
        }
    }

    pub fn iso_code(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Cop => "COP",
        }
    }

    pub fn full_name(self) -> &'static str {
        match self {
            Self::Usd => "US Dollar",
            Self::Eur => "Euro",
            Self::Cop => "Colombian Peso",
        }
    }

    pub fn display_name(self) -> String {
        format!("{} ({})", self.iso_code(), self.full_name())
    }
}

impl fmt::Display for FiatCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.iso_code())
    }
}

impl FromStr for FiatCurrency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "usd" => Ok(Self::Usd),
            "eur" => Ok(Self::Eur),
            "cop" => Ok(Self::Cop),
            other => Err(anyhow!("unknown fiat currency: {other}")),
        }
    }
}
