use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::engine::session::SubmissionPolicy;
use crate::pricing::{fallback::FallbackTable, price_fetcher::FailureMode, retry::RetryPolicy};
use crate::types::{asset::Asset, fiat::FiatCurrency};

const MAX_RETRY_ATTEMPTS: u32 = 10;
const MAX_BACKOFF_STEP_MS: u64 = 60_000;

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteConfig {
    /// Base of the spot price API, e.g. `https://api.coingecko.com/api/v3`.
    pub price_api_base: String,

    /// Base of the exchange-rate API, e.g. `https://api.exchangerate-api.com/v4`.
    pub fx_api_base: String,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub on_price_fetch_failure: FailureMode,

    #[serde(default)]
    pub fallback: FallbackConfig,

    #[serde(default)]
    pub submission_policy: SubmissionPolicy,

    #[serde(default = "default_quote_validity_minutes")]
    pub quote_validity_minutes: u32,

    pub desk: DeskConfig,

    #[serde(default)]
    pub price_book: PriceBookConfig,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub backoff_step_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FallbackConfig {
    /// Reference price of each asset in USD.
    pub prices_usd: HashMap<Asset, f64>,

    /// Multiplier from USD into each fiat currency.
    pub currency_rates: HashMap<FiatCurrency, f64>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        let table = FallbackTable::default();

        Self {
            prices_usd: Asset::ALL
                .into_iter()
                .filter_map(|asset| {
                    table
                        .price(asset, FiatCurrency::Usd)
                        .map(|price| (asset, price.as_f64()))
                })
                .collect(),
            currency_rates: HashMap::from([
                (FiatCurrency::Usd, 1.0),
                (FiatCurrency::Eur, 0.91),
                (FiatCurrency::Cop, 3_800.0),
            ]),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeskConfig {
    pub name: String,
    /// Chat handle the quote is handed off to, without the leading `@`.
    pub telegram_handle: String,
    pub email: String,
    pub website: String,
    #[serde(default = "default_minimum_trade_usd")]
    pub minimum_trade_usd: u64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PriceBookConfig {
    pub price_refresh_secs: u64,
    pub fx_refresh_secs: u64,
    /// Entries older than this are reported as stale.
    pub max_age_secs: u64,
}

impl Default for PriceBookConfig {
    fn default() -> Self {
        Self {
            price_refresh_secs: 30,
            fx_refresh_secs: 3_600,
            max_age_secs: 90,
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

fn default_quote_validity_minutes() -> u32 {
    15
}

fn default_minimum_trade_usd() -> u64 {
    10_000
}

impl QuoteConfig {
    pub const FILE_NAME: &'static str = "otc_quote.yml";

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read quote config {}", path.display()))?;

        Self::from_yaml(&raw).with_context(|| format!("invalid quote config {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: QuoteConfig =
            serde_yaml::from_str(raw).context("failed to parse quote config")?;

        config.validate().context("quote config validation failed")?;

        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_millis(self.retry.backoff_step_ms),
        )
    }

    pub fn fallback_table(&self) -> FallbackTable {
        FallbackTable::new(
            self.fallback.prices_usd.clone(),
            self.fallback.currency_rates.clone(),
        )
    }

    fn validate(&self) -> Result<()> {
        if self.price_api_base.trim().is_empty() {
            bail!("price_api_base must not be empty");
        }
        if self.fx_api_base.trim().is_empty() {
            bail!("fx_api_base must not be empty");
        }
        if self.request_timeout_ms == 0 {
            bail!("request_timeout_ms must be > 0");
        }
        if self.retry.max_attempts == 0 {
            bail!("retry.max_attempts must be >= 1");
        }
        if self.retry.max_attempts > MAX_RETRY_ATTEMPTS {
            bail!("retry.max_attempts must be <= {MAX_RETRY_ATTEMPTS}");
        }
        if self.retry.backoff_step_ms > MAX_BACKOFF_STEP_MS {
            bail!("retry.backoff_step_ms must be <= {MAX_BACKOFF_STEP_MS}");
        }
        if self.quote_validity_minutes == 0 {
            bail!("quote_validity_minutes must be > 0");
        }
        if self.desk.telegram_handle.trim().trim_start_matches('@').is_empty() {
            bail!("desk.telegram_handle must not be empty");
        }
        for (asset, price) in &self.fallback.prices_usd {
            if !price.is_finite() || *price <= 0.0 {
                bail!("fallback price for {asset} must be > 0");
            }
        }
        for (fiat, rate) in &self.fallback.currency_rates {
            if !rate.is_finite() || *rate <= 0.0 {
                bail!("fallback rate for {fiat} must be > 0");
            }
        }
        if self.price_book.price_refresh_secs == 0 || self.price_book.fx_refresh_secs == 0 {
            bail!("price_book refresh intervals must be > 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
price_api_base: "https://api.coingecko.com/api/v3"
fx_api_base: "https://api.exchangerate-api.com/v4"
desk:
  name: "Convexo OTC"
  telegram_handle: "ConvexoOTC"
  email: "otc@convexo.xyz"
  website: "https://convexo.xyz"
"#;

    #[test]
    fn minimal_config_takes_defaults() {
        let config = QuoteConfig::from_yaml(MINIMAL).unwrap();

        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.on_price_fetch_failure, FailureMode::Fail);
        assert_eq!(config.submission_policy, SubmissionPolicy::Supersede);
        assert_eq!(config.quote_validity_minutes, 15);
        assert_eq!(config.desk.minimum_trade_usd, 10_000);
        assert_eq!(config.fallback_table(), FallbackTable::default());
    }

    #[test]
    fn reads_policies_and_fallback_table() {
        let raw = format!(
            "{MINIMAL}on_price_fetch_failure: fallback\nsubmission_policy: reject\nfallback:\n  prices_usd:\n    bitcoin: 60000\n  currency_rates:\n    cop: 4000\n"
        );
        let config = QuoteConfig::from_yaml(&raw).unwrap();

        assert_eq!(config.on_price_fetch_failure, FailureMode::Fallback);
        assert_eq!(config.submission_policy, SubmissionPolicy::Reject);
        assert_eq!(
            config
                .fallback_table()
                .price(Asset::Bitcoin, FiatCurrency::Cop)
                .map(|price| price.as_f64()),
            Some(240_000_000.0)
        );
    }

    #[test]
    fn rejects_bad_values() {
        let zero_attempts = format!("{MINIMAL}retry:\n  max_attempts: 0\n  backoff_step_ms: 1000\n");
        assert!(QuoteConfig::from_yaml(&zero_attempts).is_err());

        let endless_backoff =
            format!("{MINIMAL}retry:\n  max_attempts: 3\n  backoff_step_ms: 18446744073709551615\n");
        assert!(QuoteConfig::from_yaml(&endless_backoff).is_err());

        let too_many_attempts = format!("{MINIMAL}retry:\n  max_attempts: 1000\n  backoff_step_ms: 1000\n");
        assert!(QuoteConfig::from_yaml(&too_many_attempts).is_err());

        let negative_price = format!(
            "{MINIMAL}fallback:\n  prices_usd:\n    bitcoin: -1\n  currency_rates:\n    usd: 1\n"
        );
        assert!(QuoteConfig::from_yaml(&negative_price).is_err());

        let unknown_asset = format!(
            "{MINIMAL}fallback:\n  prices_usd:\n    cardano: 1\n  currency_rates:\n    usd: 1\n"
        );
        assert!(QuoteConfig::from_yaml(&unknown_asset).is_err());
    }

    #[test]
    fn shipped_config_is_valid() {
        let raw = include_str!("../../otc_quote.yml");

        assert!(QuoteConfig::from_yaml(raw).is_ok());
    }
}
