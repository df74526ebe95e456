use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::pricing::{error::PriceFetchError, price_source::RateSource};
use crate::types::fiat::FiatCurrency;

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    rates: HashMap<String, f64>,
}

#[derive(Clone, Debug)]
pub struct ExchangeRateClient {
    http: reqwest::Client,
    base_url: String,
}

impl ExchangeRateClient {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("failed to build exchange rate http client")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RateSource for ExchangeRateClient {
    async fn usd_rates(&self) -> Result<HashMap<FiatCurrency, f64>, PriceFetchError> {
        let resp = self
            .http
            .get(format!("{}/latest/USD", self.base_url))
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(PriceFetchError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: LatestRatesResponse = serde_json::from_str(&text)?;

        rates_from_response(&parsed)
    }
}

fn rates_from_response(
    body: &LatestRatesResponse,
) -> Result<HashMap<FiatCurrency, f64>, PriceFetchError> {
    let rates: HashMap<FiatCurrency, f64> = FiatCurrency::ALL
        .into_iter()
        .filter_map(|fiat| {
            body.rates
                .get(fiat.iso_code())
                .copied()
                .filter(|rate| rate.is_finite() && *rate > 0.0)
                .map(|rate| (fiat, rate))
        })
        .collect();

    /* NOTE: COP is the rate this book exists for */
    if !rates.contains_key(&FiatCurrency::Cop) {
        return Err(PriceFetchError::MissingRate {
            fiat: FiatCurrency::Cop,
        });
    }

    Ok(rates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_known_currencies() {
        let body: LatestRatesResponse = serde_json::from_str(
            r#"{"base":"USD","rates":{"USD":1,"EUR":0.92,"COP":3912.5,"GBP":0.79}}"#,
        )
        .unwrap();

        let rates = rates_from_response(&body).unwrap();

        assert_eq!(rates.len(), 3);
        assert_eq!(rates[&FiatCurrency::Cop], 3912.5);
        assert_eq!(rates[&FiatCurrency::Eur], 0.92);
    }

    #[test]
    fn missing_cop_rate_is_a_failure() {
        let body: LatestRatesResponse =
            serde_json::from_str(r#"{"rates":{"USD":1,"EUR":0.92}}"#).unwrap();

        assert!(matches!(
            rates_from_response(&body),
            Err(PriceFetchError::MissingRate { fiat: FiatCurrency::Cop })
        ));
    }
}
