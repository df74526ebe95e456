use thiserror::Error;

use crate::pricing::error::PriceFetchError;
use crate::validation::reason::ValidationError;

pub const PRICE_UNAVAILABLE_MESSAGE: &str =
    "Failed to fetch current prices. Please try again later.";

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    PriceFetch(#[from] PriceFetchError),

    #[error("a quote submission is already in flight")]
    SubmissionInFlight,

    #[error("quote submission was superseded or reset before it completed")]
    Cancelled,
}

impl QuoteError {
    /// Message for the inline error banner. Price failures stay generic.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(error) => {
                let reasons: Vec<String> = error.reasons.iter().map(ToString::to_string).collect();
                format!("Please check the form: {}.", reasons.join("; "))
            }
            Self::PriceFetch(_) => PRICE_UNAVAILABLE_MESSAGE.to_string(),
            Self::SubmissionInFlight => {
                "A quote is already being generated. Please wait.".to_string()
            }
            Self::Cancelled => "Quote request was cancelled.".to_string(),
        }
    }
}
