use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use url::Url;

use crate::coingecko::coingecko_config::CoinGeckoConfig;
use crate::pricing::{error::PriceFetchError, price_source::PriceSource};
use crate::types::{asset::Asset, fiat::FiatCurrency, price::Price};

/// `{ "<asset id>": { "<fiat code>": number } }`
type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

#[derive(Clone, Debug)]
pub struct CoinGeckoClient {
    http: reqwest::Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(config: CoinGeckoConfig, request_timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &config.api_key {
            headers.insert(
                "x-cg-demo-api-key",
                HeaderValue::from_str(api_key).context("invalid COINGECKO_API_KEY header value")?,
            );
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(request_timeout)
            .build()
            .context("failed to build price api http client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn simple_price_url(&self, ids: &[&str], vs_currency: &str) -> Result<Url, PriceFetchError> {
        let mut url = Url::parse(&format!("{}/simple/price", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("ids", &ids.join(","))
            .append_pair("vs_currencies", vs_currency);

        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, PriceFetchError> {
        let resp = self.http.get(url.clone()).send().await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(PriceFetchError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        match serde_json::from_str(&text) {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                tracing::error!(error = %e, %url, %text, "failed to parse price api response");
                Err(PriceFetchError::Decode(e))
            }
        }
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn spot_price(&self, asset: Asset, fiat: FiatCurrency) -> Result<Price, PriceFetchError> {
        let url = self.simple_price_url(&[asset.id()], fiat.api_code())?;
        let body: SimplePriceResponse = self.get_json(url).await?;

        price_from_response(&body, asset, fiat)
    }

    async fn usd_prices(&self, assets: &[Asset]) -> Result<HashMap<Asset, Price>, PriceFetchError> {
        let ids: Vec<&str> = assets.iter().map(|asset| asset.id()).collect();
        let url = self.simple_price_url(&ids, FiatCurrency::Usd.api_code())?;
        let body: SimplePriceResponse = self.get_json(url).await?;

        let prices = assets
            .iter()
            .filter_map(|asset| {
                price_from_response(&body, *asset, FiatCurrency::Usd)
                    .ok()
                    .map(|price| (*asset, price))
            })
            .collect();

        Ok(prices)
    }
}

fn price_from_response(
    body: &SimplePriceResponse,
    asset: Asset,
    fiat: FiatCurrency,
) -> Result<Price, PriceFetchError> {
    let value = body
        .get(asset.id())
        .and_then(|quotes| quotes.get(fiat.api_code()))
        .copied()
        .ok_or(PriceFetchError::MissingPrice { asset, fiat })?;

    Price::positive(value).ok_or(PriceFetchError::InvalidPrice { asset, fiat, value })
}
