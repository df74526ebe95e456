use std::fmt;

use crate::validation::checks::{
    amount::AmountCheck, catalog_membership::CatalogMembershipCheck,
    contact_email::ContactEmailCheck, wallet_address::WalletAddressCheck,
};
use crate::validation::form::QuoteForm;
use crate::validation::reason::{ValidationError, ValidationReason};

pub trait RequestCheck: Send + Sync {
    fn name(&self) -> &'static str;
    fn evaluate(&self, form: &QuoteForm) -> Result<(), Vec<ValidationReason>>;
}

pub struct RequestValidator {
    checks: Vec<Box<dyn RequestCheck>>,
}

impl RequestValidator {
    pub fn new(checks: Vec<Box<dyn RequestCheck>>) -> Self {
        Self { checks }
    }

    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(CatalogMembershipCheck),
            Box::new(AmountCheck),
            Box::new(WalletAddressCheck),
            Box::new(ContactEmailCheck),
        ])
    }

    pub fn validate(&self, form: &QuoteForm) -> Result<(), ValidationError> {
        let mut reasons: Vec<ValidationReason> = Vec::new();

        for check in &self.checks {
            if let Err(mut check_reasons) = check.evaluate(form) {
                tracing::debug!(check = check.name(), reasons = ?check_reasons, "form check failed");
                reasons.append(&mut check_reasons);
            }
        }

        if reasons.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(reasons))
        }
    }
}

impl fmt::Debug for RequestValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestValidator")
            .field("checks_count", &self.checks.len())
            .finish()
    }
}
