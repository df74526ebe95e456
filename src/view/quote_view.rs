use std::fmt;

use crate::types::{
    money::{format_money, format_quantity},
    quote::Quote,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewField {
    Operation,
    Asset,
    Blockchain,
    WalletAddress,
    Amount,
    UnitPrice,
    Total,
    BankName,
    Fiat,
    Country,
    AccountOwner,
    OwnerId,
    AccountNumber,
    AccountType,
    Email,
    Cellphone,
    Telegram,
    QuoteId,
    GeneratedAt,
}

impl ViewField {
    pub fn label(self) -> &'static str {
        match self {
            Self::Operation => "Operation",
            Self::Asset => "Digital Asset",
            Self::Blockchain => "Blockchain",
            Self::WalletAddress => "Wallet Address",
            Self::Amount => "Amount",
            Self::UnitPrice => "Unit Price",
            Self::Total => "Total Price",
            Self::BankName => "Bank Name",
            Self::Fiat => "Fiat Currency",
            Self::Country => "Country",
            Self::AccountOwner => "Account Owner",
            Self::OwnerId => "Owner ID",
            Self::AccountNumber => "Account Number",
            Self::AccountType => "Account Type",
            Self::Email => "Email",
            Self::Cellphone => "Phone",
            Self::Telegram => "Telegram",
            Self::QuoteId => "Quote ID",
            Self::GeneratedAt => "Date of Generation",
        }
    }
}

/// Rendered results surface. Holds display strings only, never the quote itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteView {
    visible: bool,
    fields: Vec<(ViewField, String)>,
    error: Option<String>,
}

impl QuoteView {
    pub fn render(&mut self, quote: &Quote) {
        let fields = vec![
            (ViewField::Operation, quote.operation.label().to_string()),
            (ViewField::Asset, quote.asset.display_name()),
            (ViewField::Blockchain, quote.blockchain.display_name().to_string()),
            (ViewField::WalletAddress, quote.wallet_address.clone()),
            (ViewField::Amount, format_quantity(quote.amount, quote.asset.symbol())),
            (ViewField::UnitPrice, format_money(quote.unit_price.as_f64(), quote.fiat)),
            (ViewField::Total, format_money(quote.total, quote.fiat)),
            (ViewField::BankName, quote.bank.bank_name.clone()),
            (ViewField::Fiat, quote.fiat.display_name()),
            (ViewField::Country, quote.bank.country_name.clone()),
            (ViewField::AccountOwner, quote.bank.account_owner.clone()),
            (ViewField::OwnerId, quote.bank.owner_id.clone()),
            (ViewField::AccountNumber, quote.bank.account_number.clone()),
            (ViewField::AccountType, quote.bank.account_type.to_string()),
            (ViewField::Email, quote.contact.email.clone()),
            (ViewField::Cellphone, quote.contact.cellphone.clone()),
            (ViewField::Telegram, quote.contact.telegram.clone()),
            (ViewField::QuoteId, quote.id.to_string()),
            (ViewField::GeneratedAt, format_generated_at(quote)),
        ];

        self.fields = fields;
        self.error = None;
        self.visible = true;
    }

    /// Inline error banner. The result surface stays hidden so the form can be retried.
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.fields.clear();
        self.visible = false;
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn reset(&mut self) {
        self.fields.clear();
        self.visible = false;
        self.error = None;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn field(&self, field: ViewField) -> Option<&str> {
        self.fields
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for QuoteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(error) = &self.error {
            writeln!(f, "Error: {error}")?;
        }

        if !self.visible {
            return Ok(());
        }

        for (field, value) in &self.fields {
            writeln!(f, "{:<20}{value}", format!("{}:", field.label()))?;
        }

        Ok(())
    }
}

pub fn format_generated_at(quote: &Quote) -> String {
    quote
        .generated_at
        .format("%B %-d, %Y, %I:%M %p UTC")
        .to_string()
}
