use std::time::Duration;

use thiserror::Error;

use crate::types::{asset::Asset, fiat::FiatCurrency};

#[derive(Debug, Error)]
pub enum PriceFetchError {
    #[error("price request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("price api returned http {status}: {body}")]
    Status { status: u16, body: String },

    #[error("price api response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid price api url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("no {fiat} price for {asset} in response")]
    MissingPrice { asset: Asset, fiat: FiatCurrency },

    #[error("price api reported unusable {fiat} price {value} for {asset}")]
    InvalidPrice {
        asset: Asset,
        fiat: FiatCurrency,
        value: f64,
    },

    #[error("no usable USD/{fiat} rate in response")]
    MissingRate { fiat: FiatCurrency },

    #[error("price request timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("price fetch failed after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<PriceFetchError>,
    },

    #[error("no fallback price configured for {asset} in {fiat}")]
    NoFallback { asset: Asset, fiat: FiatCurrency },
}
