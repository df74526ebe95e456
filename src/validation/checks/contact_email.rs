use crate::validation::{form::QuoteForm, reason::ValidationReason, validator::RequestCheck};

/// Email is optional on the quote form; when present it must look like `local@domain.tld`.
pub struct ContactEmailCheck;

impl RequestCheck for ContactEmailCheck {
    fn name(&self) -> &'static str {
        "ContactEmailCheck"
    }

    fn evaluate(&self, form: &QuoteForm) -> Result<(), Vec<ValidationReason>> {
        let email = form.email.trim();

        if email.is_empty() || looks_like_email(email) {
            return Ok(());
        }

        Err(vec![ValidationReason::InvalidEmail(email.to_string())])
    }
}

fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}
