use std::str::FromStr;

use crate::types::{
    account_type::AccountType, asset::Asset, blockchain::Blockchain, fiat::FiatCurrency,
    operation::Operation,
};
use crate::validation::{form::QuoteForm, reason::ValidationReason, validator::RequestCheck};

/// Select-backed fields must name an entry of their fixed catalog.
pub struct CatalogMembershipCheck;

impl RequestCheck for CatalogMembershipCheck {
    fn name(&self) -> &'static str {
        "CatalogMembershipCheck"
    }

    fn evaluate(&self, form: &QuoteForm) -> Result<(), Vec<ValidationReason>> {
        let reasons: Vec<ValidationReason> = [
            member::<Operation>(&form.operation, ValidationReason::UnknownOperation),
            member::<Asset>(&form.asset, ValidationReason::UnknownAsset),
            member::<FiatCurrency>(&form.fiat, ValidationReason::UnknownFiat),
            member::<Blockchain>(&form.blockchain, ValidationReason::UnknownBlockchain),
            member::<AccountType>(&form.account_type, ValidationReason::UnknownAccountType),
        ]
        .into_iter()
        .flatten()
        .collect();

        if reasons.is_empty() {
            Ok(())
        } else {
            Err(reasons)
        }
    }
}

fn member<T: FromStr>(
    raw: &str,
    reason: fn(String) -> ValidationReason,
) -> Option<ValidationReason> {
    match raw.trim().parse::<T>() {
        Ok(_) => None,
        Err(_) => Some(reason(raw.to_string())),
    }
}
