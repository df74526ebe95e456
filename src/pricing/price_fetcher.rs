use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::pricing::{
    error::PriceFetchError, fallback::FallbackTable, price_source::PriceSource,
    retry::RetryPolicy,
};
use crate::types::{asset::Asset, fiat::FiatCurrency, price::Price};

/// What to do once every retry has failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    #[default]
    Fail,
    Fallback,
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fail => write!(f, "fail"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FailurePolicy {
    Fail,
    Fallback(FallbackTable),
}

impl FailurePolicy {
    pub fn from_mode(mode: FailureMode, table: FallbackTable) -> Self {
        match mode {
            FailureMode::Fail => Self::Fail,
            FailureMode::Fallback => Self::Fallback(table),
        }
    }
}

pub struct PriceFetcher {
    source: Arc<dyn PriceSource>,
    retry: RetryPolicy,
    request_timeout: Duration,
    on_failure: FailurePolicy,
}

impl PriceFetcher {
    pub fn new(
        source: Arc<dyn PriceSource>,
        retry: RetryPolicy,
        request_timeout: Duration,
        on_failure: FailurePolicy,
    ) -> Self {
        Self {
            source,
            retry,
            request_timeout,
            on_failure,
        }
    }

    pub async fn spot_price(
        &self,
        asset: Asset,
        fiat: FiatCurrency,
    ) -> Result<Price, PriceFetchError> {
        let mut attempt = 1;

        let last_error = loop {
            match self.attempt(asset, fiat).await {
                Ok(price) => {
                    debug!(%asset, %fiat, %price, attempt, "spot price fetched");
                    return Ok(price);
                }
                Err(error) => {
                    warn!(
                        %asset,
                        %fiat,
                        attempt,
                        max_attempts = self.retry.max_attempts(),
                        %error,
                        "spot price attempt failed"
                    );

                    let Some(delay) = self.retry.delay_after(attempt) else {
                        break error;
                    };

                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        };

        match &self.on_failure {
            FailurePolicy::Fail => Err(PriceFetchError::Exhausted {
                attempts: attempt,
                last: Box::new(last_error),
            }),
            FailurePolicy::Fallback(table) => {
                let price = table
                    .price(asset, fiat)
                    .ok_or(PriceFetchError::NoFallback { asset, fiat })?;

                warn!(%asset, %fiat, %price, error = %last_error, "using fallback price");

                Ok(price)
            }
        }
    }

    async fn attempt(&self, asset: Asset, fiat: FiatCurrency) -> Result<Price, PriceFetchError> {
        match tokio::time::timeout(self.request_timeout, self.source.spot_price(asset, fiat)).await {
            Ok(result) => result,
            Err(_) => Err(PriceFetchError::Timeout {
                after: self.request_timeout,
            }),
        }
    }
}

impl fmt::Debug for PriceFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriceFetcher")
            .field("retry", &self.retry)
            .field("request_timeout", &self.request_timeout)
            .field("on_failure", &self.on_failure)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::time::Instant;

    use super::*;

    /// Replays scripted outcomes and records when each attempt happened.
    pub(crate) struct ScriptedSource {
        outcomes: Mutex<VecDeque<Option<f64>>>,
        delay: Duration,
        pub(crate) attempts: Mutex<Vec<Instant>>,
    }

    impl ScriptedSource {
        pub(crate) fn new(outcomes: impl IntoIterator<Item = Option<f64>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into_iter().collect()),
                delay: Duration::ZERO,
                attempts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn always(price: f64) -> Self {
            Self::new(std::iter::repeat_n(Some(price), 64))
        }

        pub(crate) fn failing() -> Self {
            Self::new(std::iter::repeat_n(None, 64))
        }

        pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub(crate) fn attempt_count(&self) -> usize {
            self.attempts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PriceSource for ScriptedSource {
        async fn spot_price(
            &self,
            _asset: Asset,
            _fiat: FiatCurrency,
        ) -> Result<Price, PriceFetchError> {
            self.attempts.lock().unwrap().push(Instant::now());
            let outcome = self.outcomes.lock().unwrap().pop_front().flatten();

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            outcome
                .and_then(Price::positive)
                .ok_or(PriceFetchError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                })
        }

        async fn usd_prices(
            &self,
            assets: &[Asset],
        ) -> Result<HashMap<Asset, Price>, PriceFetchError> {
            let mut prices = HashMap::new();
            for asset in assets {
                prices.insert(*asset, self.spot_price(*asset, FiatCurrency::Usd).await?);
            }
            Ok(prices)
        }
    }

    fn fetcher(source: Arc<ScriptedSource>, on_failure: FailurePolicy) -> PriceFetcher {
        PriceFetcher::new(
            source,
            RetryPolicy::default(),
            Duration::from_secs(5),
            on_failure,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn retries_three_times_with_growing_waits_then_fails() {
        let source = Arc::new(ScriptedSource::failing());
        let fetcher = fetcher(Arc::clone(&source), FailurePolicy::Fail);

        let error = fetcher
            .spot_price(Asset::Bitcoin, FiatCurrency::Usd)
            .await
            .unwrap_err();

        assert!(matches!(error, PriceFetchError::Exhausted { attempts: 3, .. }));

        let attempts = source.attempts.lock().unwrap().clone();
        assert_eq!(attempts.len(), 3);

        let first_wait = attempts[1] - attempts[0];
        let second_wait = attempts[2] - attempts[1];
        assert_eq!(first_wait, Duration::from_secs(1));
        assert_eq!(second_wait, Duration::from_secs(2));
        assert!(second_wait > first_wait);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_on_a_later_attempt() {
        let source = Arc::new(ScriptedSource::new([None, Some(55_000.0)]));
        let fetcher = fetcher(Arc::clone(&source), FailurePolicy::Fail);

        let price = fetcher
            .spot_price(Asset::Bitcoin, FiatCurrency::Usd)
            .await
            .unwrap();

        assert_eq!(price.as_f64(), 55_000.0);
        assert_eq!(source.attempt_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn falls_back_after_exhausting_retries() {
        let source = Arc::new(ScriptedSource::failing());
        let fetcher = fetcher(
            Arc::clone(&source),
            FailurePolicy::Fallback(FallbackTable::default()),
        );

        let price = fetcher
            .spot_price(Asset::Ethereum, FiatCurrency::Eur)
            .await
            .unwrap();

        assert!((price.as_f64() - 2_730.0).abs() < 1e-9);
        assert_eq!(source.attempt_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn fallback_without_entry_is_an_error() {
        let table = FallbackTable::new(HashMap::new(), HashMap::new());
        let fetcher = fetcher(
            Arc::new(ScriptedSource::failing()),
            FailurePolicy::Fallback(table),
        );

        let error = fetcher
            .spot_price(Asset::Solana, FiatCurrency::Usd)
            .await
            .unwrap_err();

        assert!(matches!(error, PriceFetchError::NoFallback { asset: Asset::Solana, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_attempts_time_out() {
        let source = Arc::new(ScriptedSource::always(3_000.0).with_delay(Duration::from_secs(30)));
        let fetcher = fetcher(Arc::clone(&source), FailurePolicy::Fail);

        let error = fetcher
            .spot_price(Asset::Ethereum, FiatCurrency::Usd)
            .await
            .unwrap_err();

        match error {
            PriceFetchError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, PriceFetchError::Timeout { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
