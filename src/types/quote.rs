use chrono::{DateTime, TimeDelta, Utc};

use crate::types::{
    asset::Asset,
    blockchain::Blockchain,
    fiat::FiatCurrency,
    operation::Operation,
    price::Price,
    quote_id::QuoteId,
    quote_request::{BankDetails, ContactDetails},
};

/// A computed, human-presentable record of one hypothetical trade. Never executed.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub id: QuoteId,
    pub generated_at: DateTime<Utc>,
    pub operation: Operation,
    pub asset: Asset,
    pub fiat: FiatCurrency,
    pub blockchain: Blockchain,
    pub wallet_address: String,
    pub amount: f64,
    pub spot_price: Price,
    /// Spot price after the sell-side spread.
    pub unit_price: Price,
    pub total: f64,
    pub bank: BankDetails,
    pub contact: ContactDetails,
}

impl Quote {
    /// Advisory only, nothing enforces it.
    pub fn valid_until(&self, validity: TimeDelta) -> DateTime<Utc> {
        self.generated_at + validity
    }
}
