use std::fmt;
use std::ops::Mul;

/// Unit price of one asset in some fiat currency.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Price(f64);

impl Price {
    pub fn new(value: f64) -> Self {
        assert!(value.is_finite(), "price must be finite");
        assert!(value >= 0.0, "price must be non-negative");

        Price(value)
    }

    /// Accepts only finite, strictly positive values, as reported by a price source.
    pub fn positive(value: f64) -> Option<Self> {
        (value.is_finite() && value > 0.0).then_some(Price(value))
    }

    pub fn as_f64(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{:.2}", self.0)
    }
}

impl Mul<f64> for Price {
    type Output = Price;

    fn mul(self, rhs: f64) -> Price {
        Price::new(self.0 * rhs)
    }
}
