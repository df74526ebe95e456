use crate::validation::{form::QuoteForm, reason::ValidationReason, validator::RequestCheck};

/// Largest amount, in asset units, the desk will price.
pub const MAX_AMOUNT: f64 = 1e12;

pub struct AmountCheck;

impl RequestCheck for AmountCheck {
    fn name(&self) -> &'static str {
        "AmountCheck"
    }

    fn evaluate(&self, form: &QuoteForm) -> Result<(), Vec<ValidationReason>> {
        let raw = form.amount.trim();

        let amount: f64 = raw
            .parse()
            .map_err(|_| vec![ValidationReason::InvalidAmount(raw.to_string())])?;

        if !amount.is_finite() {
            return Err(vec![ValidationReason::InvalidAmount(raw.to_string())]);
        }

        if amount <= 0.0 {
            return Err(vec![ValidationReason::NonPositiveAmount(amount)]);
        }

        if amount > MAX_AMOUNT {
            return Err(vec![ValidationReason::AmountTooLarge {
                amount,
                max: MAX_AMOUNT,
            }]);
        }

        Ok(())
    }
}
