use crate::types::fiat::FiatCurrency;

/// Formats a fiat amount with two decimals following the currency's display locale:
/// USD as en-US (`$27,500.00`), EUR as de-DE (`27.500,00 €`), COP as es-CO (`$ 27.500,00`).
pub fn format_money(amount: f64, fiat: FiatCurrency) -> String {
    if !amount.is_finite() {
        return amount.to_string();
    }

    let sign = if amount < 0.0 { "-" } else { "" };

    match fiat {
        FiatCurrency::Usd => format!("{sign}${}", group_digits(amount.abs(), ',', '.')),
        FiatCurrency::Eur => format!("{sign}{} €", group_digits(amount.abs(), '.', ',')),
        FiatCurrency::Cop => format!("{sign}$ {}", group_digits(amount.abs(), '.', ',')),
    }
}

fn group_digits(value: f64, thousands: char, decimal: char) -> String {
    let fixed = format!("{value:.2}");
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(thousands);
        }
        grouped.push(digit);
    }

    format!("{grouped}{decimal}{fraction}")
}

/// Asset quantities keep their natural precision, e.g. `0.5 BTC` or `2 ETH`.
pub fn format_quantity(amount: f64, symbol: &str) -> String {
    format!("{amount} {symbol}")
}
