use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use serde::Deserialize;

/// Digital assets the desk quotes, keyed by their price API identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Asset {
    Bitcoin,
    Ethereum,
    Solana,
    UsdCoin,
    Tether,
    Dogecoin,
    Ripple,
}

impl Asset {
    pub const ALL: [Asset; 7] = [
        Asset::Bitcoin,
        Asset::Ethereum,
        Asset::Solana,
        Asset::UsdCoin,
        Asset::Tether,
        Asset::Dogecoin,
        Asset::Ripple,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Bitcoin => "bitcoin",
            Self::Ethereum => "ethereum",
            Self::Solana => "solana",
            Self::UsdCoin => "usd-coin",
            Self::Tether => "tether",
            Self::Dogecoin => "dogecoin",
            Self::Ripple => "ripple",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Bitcoin => "BTC",
            Self::Ethereum => "ETH",
            Self::Solana => "SOL",
            Self::UsdCoin => "USDC",
            Self::Tether => "USDT",
            Self::Dogecoin => "DOGE",
            Self::Ripple => "XRP",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bitcoin => "Bitcoin",
            Self::Ethereum => "Ethereum",
            Self::Solana => "Solana",
            Self::UsdCoin => "USD Coin",
            Self::Tether => "Tether",
            Self::Dogecoin => "Dogecoin",
            Self::Ripple => "Ripple",
        }
    }

    /// Name as the asset select renders it, e.g. `Bitcoin (BTC)`.
    pub fn display_name(self) -> String {
        format!("{} ({})", self.name(), self.symbol())
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Asset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();

        Self::ALL
            .into_iter()
            .find(|asset| asset.id() == needle || asset.symbol().eq_ignore_ascii_case(needle))
            .ok_or_else(|| anyhow!("unknown asset: {needle}"))
    }
}
