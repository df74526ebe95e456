use crate::types::{
    account_type::AccountType, asset::Asset, blockchain::Blockchain, fiat::FiatCurrency,
    operation::Operation,
};

/// A validated submission of the quote form.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteRequest {
    pub operation: Operation,
    pub asset: Asset,
    pub fiat: FiatCurrency,
    /// Quantity in asset units, always finite and > 0.
    pub amount: f64,
    pub blockchain: Blockchain,
    pub wallet_address: String,
    pub bank: BankDetails,
    pub contact: ContactDetails,
}

/// Carried through to the quote verbatim. Never checked against a banking schema.
#[derive(Debug, Clone, PartialEq)]
pub struct BankDetails {
    pub bank_name: String,
    pub country_name: String,
    pub account_owner: String,
    pub owner_id: String,
    pub account_number: String,
    pub account_type: AccountType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDetails {
    pub email: String,
    pub cellphone: String,
    pub telegram: String,
}
