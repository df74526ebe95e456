use std::fmt;

use chrono::TimeDelta;

use crate::config::quote_config::DeskConfig;
use crate::types::{
    fiat::FiatCurrency,
    money::{format_money, format_quantity},
    operation::Operation,
    quote::Quote,
};
use crate::view::quote_view::format_generated_at;

const RULE: &str = "----------------------------------------";

/// Builds the plain-text quote shared over the clipboard and the chat handoff.
/// Output depends only on the quote and the desk settings.
#[derive(Debug, Clone)]
pub struct QuoteFormatter {
    desk: DeskConfig,
    validity: TimeDelta,
}

impl QuoteFormatter {
    pub fn new(desk: DeskConfig, validity_minutes: u32) -> Self {
        Self {
            desk,
            validity: TimeDelta::minutes(i64::from(validity_minutes)),
        }
    }

    pub fn format(&self, quote: &Quote) -> String {
        QuoteText {
            formatter: self,
            quote,
        }
        .to_string()
    }
}

struct QuoteText<'a> {
    formatter: &'a QuoteFormatter,
    quote: &'a Quote,
}

impl fmt::Display for QuoteText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quote = self.quote;
        let desk = &self.formatter.desk;
        let validity = self.formatter.validity;

        let rate_explanation = match quote.operation {
            Operation::Buy => "Market spot price",
            Operation::Sell => "Market spot price minus 2% spread",
        };

        writeln!(f, "*{} TRADING QUOTE*", desk.name.to_uppercase())?;
        writeln!(f)?;

        section(f, "DIGITAL ASSET DETAILS")?;
        writeln!(f, "Operation: {}", quote.operation.label())?;
        writeln!(f, "Digital Asset: {}", quote.asset.display_name())?;
        writeln!(f, "Blockchain: {}", quote.blockchain.display_name())?;
        writeln!(f, "Amount: {}", format_quantity(quote.amount, quote.asset.symbol()))?;
        writeln!(
            f,
            "Unit Price: {} ({rate_explanation})",
            format_money(quote.unit_price.as_f64(), quote.fiat)
        )?;
        writeln!(f, "Total Price: {}", format_money(quote.total, quote.fiat))?;
        writeln!(f, "Wallet Address: `{}`", quote.wallet_address)?;
        writeln!(f)?;

        section(f, "BANK INFORMATION")?;
        writeln!(f, "Bank Name: {}", quote.bank.bank_name)?;
        writeln!(f, "Fiat Currency: {}", quote.fiat.display_name())?;
        writeln!(f, "Country: {}", quote.bank.country_name)?;
        writeln!(f, "Account Owner: {}", quote.bank.account_owner)?;
        writeln!(f, "Owner ID: {}", quote.bank.owner_id)?;
        writeln!(f, "Account Number: {}", quote.bank.account_number)?;
        writeln!(f, "Account Type: {}", quote.bank.account_type)?;
        writeln!(f)?;

        section(f, "CONTACT INFORMATION")?;
        writeln!(f, "Email: {}", quote.contact.email)?;
        writeln!(f, "Phone: {}", quote.contact.cellphone)?;
        writeln!(f, "Telegram: {}", handle(&quote.contact.telegram))?;
        writeln!(f)?;

        section(f, "QUOTE DETAILS")?;
        writeln!(f, "Generated: {}", format_generated_at(quote))?;
        writeln!(f, "Valid For: {} minutes from generation", validity.num_minutes())?;
        writeln!(
            f,
            "Valid Until: {}",
            quote.valid_until(validity).format("%B %-d, %Y, %I:%M %p UTC")
        )?;
        writeln!(f, "Quote ID: #{}", quote.id)?;
        writeln!(f)?;

        section(f, "IMPORTANT NOTES")?;
        writeln!(f, "- This quote is subject to market fluctuations")?;
        writeln!(f, "- Please contact your OTC trading representative to execute")?;
        writeln!(f, "- All transactions are subject to KYC/AML compliance")?;
        writeln!(
            f,
            "- Minimum trade size: {} USD equivalent",
            format_money(desk.minimum_trade_usd as f64, FiatCurrency::Usd)
        )?;
        writeln!(f)?;

        section(f, "NEXT STEPS")?;
        writeln!(f, "1. Review the quote details above")?;
        writeln!(
            f,
            "2. Contact our OTC team via Telegram: {}",
            handle(&desk.telegram_handle)
        )?;
        writeln!(f, "3. Provide this quote ID for reference: #{}", quote.id)?;
        writeln!(f, "4. Complete KYC/AML verification if not already done")?;
        writeln!(f)?;

        section(f, "CONTACT OUR OTC TEAM")?;
        writeln!(f, "Email: {}", desk.email)?;
        writeln!(f, "Telegram: {}", handle(&desk.telegram_handle))?;
        writeln!(f, "Website: {}", desk.website)?;
        writeln!(f)?;
        write!(
            f,
            "This quote was generated by the {} quote system. For support, contact us at {}",
            desk.name, desk.email
        )
    }
}

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "*{title}*")?;
    writeln!(f, "{RULE}")
}

fn handle(name: &str) -> String {
    let name = name.trim().trim_start_matches('@');
    if name.is_empty() {
        String::new()
    } else {
        format!("@{name}")
    }
}
