use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;

const PREFIX: &str = "CVX";
const SUFFIX_LEN: usize = 8;
const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// `CVX-{base36 unix millis}-{random base36}`, uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuoteId(String);

impl QuoteId {
    pub fn generate(now: DateTime<Utc>) -> Self {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();

        let mut rng = rand::rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
            .collect();

        Self(format!("{PREFIX}-{}-{suffix}", to_base36(millis)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();

    String::from_utf8(digits).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::TimeZone;

    use super::*;

    #[test]
    fn encodes_timestamp_in_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "Z");
        assert_eq!(to_base36(36), "10");

        let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let id = QuoteId::generate(at);
        let parts: Vec<&str> = id.as_str().split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "CVX");
        assert_eq!(u64::from_str_radix(parts[1], 36).unwrap(), 1_700_000_000_000);
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert_eq!(id.as_str(), id.as_str().to_uppercase());
    }

    #[test]
    fn ids_are_unique_in_a_tight_loop() {
        let now = Utc::now();
        let ids: HashSet<QuoteId> = (0..10_000).map(|_| QuoteId::generate(now)).collect();

        assert_eq!(ids.len(), 10_000);
    }
}
