use std::collections::HashMap;

use crate::types::{asset::Asset, fiat::FiatCurrency, price::Price};

/// Approximate prices used when the price source cannot be reached: a USD
/// reference price per asset, converted through fixed currency multipliers.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackTable {
    prices_usd: HashMap<Asset, f64>,
    currency_rates: HashMap<FiatCurrency, f64>,
}

impl FallbackTable {
    pub fn new(prices_usd: HashMap<Asset, f64>, currency_rates: HashMap<FiatCurrency, f64>) -> Self {
        Self {
            prices_usd,
            currency_rates,
        }
    }

    pub fn price(&self, asset: Asset, fiat: FiatCurrency) -> Option<Price> {
        let usd = self.prices_usd.get(&asset)?;
        let rate = self.currency_rates.get(&fiat)?;

        Price::positive(usd * rate)
    }
}

impl Default for FallbackTable {
    fn default() -> Self {
        let prices_usd = HashMap::from([
            (Asset::Bitcoin, 55_000.0),
            (Asset::Ethereum, 3_000.0),
            (Asset::Solana, 120.0),
            (Asset::UsdCoin, 1.0),
            (Asset::Tether, 1.0),
            (Asset::Dogecoin, 0.12),
            (Asset::Ripple, 0.5),
        ]);

        let currency_rates = HashMap::from([
            (FiatCurrency::Usd, 1.0),
            (FiatCurrency::Eur, 0.91),
            (FiatCurrency::Cop, 3_800.0),
        ]);

        Self::new(prices_usd, currency_rates)
    }
}
