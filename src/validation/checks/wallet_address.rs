use crate::validation::{form::QuoteForm, reason::ValidationReason, validator::RequestCheck};

pub struct WalletAddressCheck;

impl RequestCheck for WalletAddressCheck {
    fn name(&self) -> &'static str {
        "WalletAddressCheck"
    }

    fn evaluate(&self, form: &QuoteForm) -> Result<(), Vec<ValidationReason>> {
        if form.wallet_address.trim().is_empty() {
            return Err(vec![ValidationReason::MissingWalletAddress]);
        }

        Ok(())
    }
}
