use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};

/// Settlement network chosen on the form. Display only, never used for pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Blockchain {
    Bitcoin,
    Ethereum,
    Solana,
    Polygon,
    Tron,
    BnbSmartChain,
    Arbitrum,
    Base,
    XrpLedger,
    Dogecoin,
}

impl Blockchain {
    pub const ALL: [Blockchain; 10] = [
        Blockchain::Bitcoin,
        Blockchain::Ethereum,
        Blockchain::Solana,
        Blockchain::Polygon,
        Blockchain::Tron,
        Blockchain::BnbSmartChain,
        Blockchain::Arbitrum,
        Blockchain::Base,
        Blockchain::XrpLedger,
        Blockchain::Dogecoin,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Bitcoin => "bitcoin",
            Self::Ethereum => "ethereum",
            Self::Solana => "solana",
            Self::Polygon => "polygon",
            Self::Tron => "tron",
            Self::BnbSmartChain => "bsc",
            Self::Arbitrum => "arbitrum",
            Self::Base => "base",
            Self::XrpLedger => "xrp-ledger",
            Self::Dogecoin => "dogecoin",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Bitcoin => "Bitcoin",
            Self::Ethereum => "Ethereum (ERC-20)",
            Self::Solana => "Solana (SPL)",
            Self::Polygon => "Polygon",
            Self::Tron => "Tron (TRC-20)",
            Self::BnbSmartChain => "BNB Smart Chain (BEP-20)",
            Self::Arbitrum => "Arbitrum One",
            Self::Base => "Base",
            Self::XrpLedger => "XRP Ledger",
            Self::Dogecoin => "Dogecoin",
        }
    }
}

impl fmt::Display for Blockchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Blockchain {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase();

        Self::ALL
            .into_iter()
            .find(|chain| chain.id() == needle)
            .ok_or_else(|| anyhow!("unknown blockchain: {needle}"))
    }
}
