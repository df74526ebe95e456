use std::str::FromStr;

use crate::types::quote_request::{BankDetails, ContactDetails, QuoteRequest};
use crate::validation::reason::{ValidationError, ValidationReason};
use crate::validation::validator::RequestValidator;

/// Raw field values as the quote form submits them, before any parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteForm {
    pub operation: String,
    pub asset: String,
    pub fiat: String,
    pub amount: String,
    pub blockchain: String,
    pub wallet_address: String,
    pub bank_name: String,
    pub country: String,
    pub account_owner: String,
    pub owner_id: String,
    pub account_number: String,
    pub account_type: String,
    pub email: String,
    pub cellphone: String,
    pub telegram: String,
}

impl QuoteForm {
    /// Runs every check, then converts the form into a typed request.
    pub fn into_request(self, validator: &RequestValidator) -> Result<QuoteRequest, ValidationError> {
        validator.validate(&self)?;

        Ok(QuoteRequest {
            operation: parse_field(&self.operation, ValidationReason::UnknownOperation)?,
            asset: parse_field(&self.asset, ValidationReason::UnknownAsset)?,
            fiat: parse_field(&self.fiat, ValidationReason::UnknownFiat)?,
            amount: parse_field(&self.amount, ValidationReason::InvalidAmount)?,
            blockchain: parse_field(&self.blockchain, ValidationReason::UnknownBlockchain)?,
            wallet_address: self.wallet_address.trim().to_string(),
            bank: BankDetails {
                bank_name: self.bank_name,
                country_name: self.country,
                account_owner: self.account_owner,
                owner_id: self.owner_id,
                account_number: self.account_number,
                account_type: parse_field(&self.account_type, ValidationReason::UnknownAccountType)?,
            },
            contact: ContactDetails {
                email: self.email.trim().to_string(),
                cellphone: self.cellphone,
                telegram: self.telegram.trim().trim_start_matches('@').to_string(),
            },
        })
    }
}

fn parse_field<T: FromStr>(
    raw: &str,
    reason: fn(String) -> ValidationReason,
) -> Result<T, ValidationError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ValidationError::from(reason(raw.to_string())))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::validation::checks::amount::MAX_AMOUNT;
    use crate::types::{
        account_type::AccountType, asset::Asset, blockchain::Blockchain, fiat::FiatCurrency,
        operation::Operation,
    };

    pub(crate) fn sample_form() -> QuoteForm {
        QuoteForm {
            operation: "buy".into(),
            asset: "bitcoin".into(),
            fiat: "usd".into(),
            amount: "0.5".into(),
            blockchain: "bitcoin".into(),
            wallet_address: "bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh".into(),
            bank_name: "Bancolombia".into(),
            country: "Colombia".into(),
            account_owner: "Ana Gomez".into(),
            owner_id: "1020304050".into(),
            account_number: "123-456789-00".into(),
            account_type: "savings".into(),
            email: "ana@example.com".into(),
            cellphone: "+57 300 000 0000".into(),
            telegram: "@anagomez".into(),
        }
    }

    #[test]
    fn valid_form_becomes_typed_request() {
        let request = sample_form()
            .into_request(&RequestValidator::standard())
            .unwrap();

        assert_eq!(request.operation, Operation::Buy);
        assert_eq!(request.asset, Asset::Bitcoin);
        assert_eq!(request.fiat, FiatCurrency::Usd);
        assert_eq!(request.amount, 0.5);
        assert_eq!(request.blockchain, Blockchain::Bitcoin);
        assert_eq!(request.bank.account_type, AccountType::Savings);
        assert_eq!(request.bank.bank_name, "Bancolombia");
        assert_eq!(request.contact.telegram, "anagomez");
    }

    #[test]
    fn collects_every_failed_field() {
        let form = QuoteForm {
            operation: "hold".into(),
            asset: "cardano".into(),
            amount: "-3".into(),
            wallet_address: "   ".into(),
            email: "not-an-email".into(),
            ..sample_form()
        };

        let error = form
            .into_request(&RequestValidator::standard())
            .unwrap_err();

        assert!(error.reasons.contains(&ValidationReason::UnknownOperation("hold".into())));
        assert!(error.reasons.contains(&ValidationReason::UnknownAsset("cardano".into())));
        assert!(error.reasons.contains(&ValidationReason::NonPositiveAmount(-3.0)));
        assert!(error.reasons.contains(&ValidationReason::MissingWalletAddress));
        assert!(error.reasons.contains(&ValidationReason::InvalidEmail("not-an-email".into())));
        assert_eq!(error.reasons.len(), 5);
    }

    #[test]
    fn rejects_nan_and_zero_amounts() {
        for amount in ["", "abc", "NaN", "inf", "0"] {
            let form = QuoteForm {
                amount: amount.into(),
                ..sample_form()
            };

            assert!(
                form.into_request(&RequestValidator::standard()).is_err(),
                "amount {amount:?} should be refused"
            );
        }
    }

    #[test]
    fn refuses_amounts_above_the_desk_ceiling() {
        let form = QuoteForm {
            amount: "1e36".into(),
            ..sample_form()
        };

        let error = form
            .into_request(&RequestValidator::standard())
            .unwrap_err();

        assert_eq!(
            error.reasons,
            vec![ValidationReason::AmountTooLarge {
                amount: 1e36,
                max: MAX_AMOUNT,
            }]
        );

        let at_ceiling = QuoteForm {
            amount: "1000000000000".into(),
            ..sample_form()
        };
        assert!(at_ceiling.into_request(&RequestValidator::standard()).is_ok());
    }
}
