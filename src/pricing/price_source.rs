use std::collections::HashMap;

use async_trait::async_trait;

use crate::pricing::error::PriceFetchError;
use crate::types::{asset::Asset, fiat::FiatCurrency, price::Price};

#[async_trait]
pub trait PriceSource: Send + Sync {
    /// One attempt at the spot price of `asset` in `fiat`. No retries.
    async fn spot_price(&self, asset: Asset, fiat: FiatCurrency) -> Result<Price, PriceFetchError>;

    /// USD spot prices for a batch of assets in a single request. Assets the source
    /// has no price for are absent from the map.
    async fn usd_prices(&self, assets: &[Asset]) -> Result<HashMap<Asset, Price>, PriceFetchError>;
}

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Units of each fiat currency per one USD.
    async fn usd_rates(&self) -> Result<HashMap<FiatCurrency, f64>, PriceFetchError>;
}
