use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    Savings,
    Checking,
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Savings => write!(f, "Savings"),
            Self::Checking => write!(f, "Checking"),
        }
    }
}

impl FromStr for AccountType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "savings" => Ok(Self::Savings),
            "checking" => Ok(Self::Checking),
            other => Err(anyhow!("unknown account type: {other}")),
        }
    }
}
