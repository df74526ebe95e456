use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationReason {
    #[error("unknown operation \"{0}\"")]
    UnknownOperation(String),
    #[error("unknown asset \"{0}\"")]
    UnknownAsset(String),
    #[error("unknown fiat currency \"{0}\"")]
    UnknownFiat(String),
    #[error("unknown blockchain \"{0}\"")]
    UnknownBlockchain(String),
    #[error("unknown account type \"{0}\"")]
    UnknownAccountType(String),
    #[error("amount \"{0}\" is not a number")]
    InvalidAmount(String),
    #[error("amount must be greater than zero, got {0}")]
    NonPositiveAmount(f64),
    #[error("amount {amount} exceeds the largest quotable amount of {max}")]
    AmountTooLarge { amount: f64, max: f64 },
    #[error("wallet address is required")]
    MissingWalletAddress,
    #[error("email \"{0}\" is not a valid address")]
    InvalidEmail(String),
}

/// Every reason the form was refused, collected across all checks.
#[derive(Debug, Clone, PartialEq, Error)]
pub struct ValidationError {
    pub reasons: Vec<ValidationReason>,
}

impl ValidationError {
    pub fn new(reasons: Vec<ValidationReason>) -> Self {
        Self { reasons }
    }
}

impl From<ValidationReason> for ValidationError {
    fn from(reason: ValidationReason) -> Self {
        Self::new(vec![reason])
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid quote request: ")?;

        for (index, reason) in self.reasons.iter().enumerate() {
            if index > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{reason}")?;
        }

        Ok(())
    }
}
