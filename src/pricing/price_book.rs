use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::pricing::{
    error::PriceFetchError,
    price_source::{PriceSource, RateSource},
};
use crate::types::{asset::Asset, fiat::FiatCurrency, price::Price};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceEntry {
    pub value: f64,
    pub fetched_at: Instant,
}

impl PriceEntry {
    pub fn new(value: f64, fetched_at: Instant) -> Self {
        Self { value, fetched_at }
    }

    pub fn is_stale(&self, max_age: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) > max_age
    }
}

/// Result of looking a price up in the book. Stale values are never reported as fresh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceLookup {
    Fresh(Price),
    Stale { price: Price, age: Duration },
    Missing,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSnapshot {
    pub prices_usd: HashMap<Asset, PriceEntry>,
    pub usd_rates: HashMap<FiatCurrency, PriceEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub prices_updated: usize,
    pub rates_updated: usize,
}

/// Owned cache of catalog spot prices (USD) and USD exchange rates.
pub struct PriceBook {
    price_source: Arc<dyn PriceSource>,
    rate_source: Arc<dyn RateSource>,
    assets: Vec<Asset>,
    request_timeout: Duration,
    max_age: Duration,
    snapshot: PriceSnapshot,
}

impl PriceBook {
    pub fn new(
        price_source: Arc<dyn PriceSource>,
        rate_source: Arc<dyn RateSource>,
        request_timeout: Duration,
        max_age: Duration,
    ) -> Self {
        Self {
            price_source,
            rate_source,
            assets: Asset::ALL.to_vec(),
            request_timeout,
            max_age,
            snapshot: PriceSnapshot::default(),
        }
    }

    /// Refreshes prices and rates concurrently. Each side updates its own entries;
    /// a failure on one side leaves its previous entries untouched.
    pub async fn refresh(&mut self) -> RefreshOutcome {
        let (prices, rates) = tokio::join!(self.fetch_prices(), self.fetch_rates());

        RefreshOutcome {
            prices_updated: self.apply_prices(prices),
            rates_updated: self.apply_rates(rates),
        }
    }

    pub async fn refresh_prices(&mut self) -> usize {
        let prices = self.fetch_prices().await;
        self.apply_prices(prices)
    }

    pub async fn refresh_rates(&mut self) -> usize {
        let rates = self.fetch_rates().await;
        self.apply_rates(rates)
    }

    pub fn lookup(&self, asset: Asset, fiat: FiatCurrency, now: Instant) -> PriceLookup {
        lookup_in(&self.snapshot, asset, fiat, self.max_age, now)
    }

    /// Moves the book onto a background task that refreshes prices every
    /// `price_interval` and rates every `rate_interval`, publishing each snapshot.
    pub fn spawn(mut self, price_interval: Duration, rate_interval: Duration) -> PriceBookHandle {
        let (tx, rx) = watch::channel(self.snapshot.clone());
        let max_age = self.max_age;

        let task = tokio::spawn(async move {
            let outcome = self.refresh().await;
            info!(?outcome, "price book primed");
            let _ = tx.send(self.snapshot.clone());

            let mut price_tick = tokio::time::interval(price_interval);
            let mut rate_tick = tokio::time::interval(rate_interval);
            price_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            rate_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

            /* NOTE: the first tick of an interval completes immediately */
            price_tick.tick().await;
            rate_tick.tick().await;

            loop {
                tokio::select! {
                    _ = price_tick.tick() => {
                        let updated = self.refresh_prices().await;
                        tracing::debug!(updated, "price book prices refreshed");
                    }
                    _ = rate_tick.tick() => {
                        let updated = self.refresh_rates().await;
                        tracing::debug!(updated, "price book rates refreshed");
                    }
                }

                if tx.send(self.snapshot.clone()).is_err() {
                    break;
                }
            }
        });

        PriceBookHandle { rx, max_age, task }
    }

    async fn fetch_prices(&self) -> Result<HashMap<Asset, Price>, PriceFetchError> {
        with_timeout(self.request_timeout, self.price_source.usd_prices(&self.assets)).await
    }

    async fn fetch_rates(&self) -> Result<HashMap<FiatCurrency, f64>, PriceFetchError> {
        with_timeout(self.request_timeout, self.rate_source.usd_rates()).await
    }

    fn apply_prices(&mut self, prices: Result<HashMap<Asset, Price>, PriceFetchError>) -> usize {
        match prices {
            Ok(prices) => {
                let now = Instant::now();
                for (asset, price) in &prices {
                    self.snapshot
                        .prices_usd
                        .insert(*asset, PriceEntry::new(price.as_f64(), now));
                }
                prices.len()
            }
            Err(error) => {
                warn!(%error, "price book price refresh failed, keeping previous prices");
                0
            }
        }
    }

    fn apply_rates(&mut self, rates: Result<HashMap<FiatCurrency, f64>, PriceFetchError>) -> usize {
        match rates {
            Ok(rates) => {
                let now = Instant::now();
                let mut updated = 0;
                for (fiat, rate) in rates {
                    if rate.is_finite() && rate > 0.0 {
                        self.snapshot.usd_rates.insert(fiat, PriceEntry::new(rate, now));
                        updated += 1;
                    }
                }
                updated
            }
            Err(error) => {
                warn!(%error, "price book rate refresh failed, keeping previous rates");
                0
            }
        }
    }
}

impl fmt::Debug for PriceBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriceBook")
            .field("assets", &self.assets)
            .field("max_age", &self.max_age)
            .field("prices", &self.snapshot.prices_usd.len())
            .field("rates", &self.snapshot.usd_rates.len())
            .finish()
    }
}

/// Live view of a spawned price book. Dropping it stops the refresh task.
pub struct PriceBookHandle {
    rx: watch::Receiver<PriceSnapshot>,
    max_age: Duration,
    task: JoinHandle<()>,
}

impl PriceBookHandle {
    pub fn subscribe(&self) -> watch::Receiver<PriceSnapshot> {
        self.rx.clone()
    }

    pub fn lookup(&self, asset: Asset, fiat: FiatCurrency) -> PriceLookup {
        lookup_in(&self.rx.borrow(), asset, fiat, self.max_age, Instant::now())
    }
}

impl Drop for PriceBookHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn lookup_in(
    snapshot: &PriceSnapshot,
    asset: Asset,
    fiat: FiatCurrency,
    max_age: Duration,
    now: Instant,
) -> PriceLookup {
    let Some(usd) = snapshot.prices_usd.get(&asset) else {
        return PriceLookup::Missing;
    };

    let rate = match fiat {
        FiatCurrency::Usd => PriceEntry::new(1.0, usd.fetched_at),
        other => match snapshot.usd_rates.get(&other) {
            Some(rate) => *rate,
            None => return PriceLookup::Missing,
        },
    };

    let Some(price) = Price::positive(usd.value * rate.value) else {
        return PriceLookup::Missing;
    };

    let oldest = usd.fetched_at.min(rate.fetched_at);
    let entry = PriceEntry::new(price.as_f64(), oldest);

    if entry.is_stale(max_age, now) {
        PriceLookup::Stale {
            price,
            age: now.saturating_duration_since(oldest),
        }
    } else {
        PriceLookup::Fresh(price)
    }
}

async fn with_timeout<T>(
    limit: Duration,
    fetch: impl Future<Output = Result<T, PriceFetchError>>,
) -> Result<T, PriceFetchError> {
    tokio::time::timeout(limit, fetch)
        .await
        .unwrap_or(Err(PriceFetchError::Timeout { after: limit }))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::pricing::price_fetcher::tests::ScriptedSource;

    struct FixedRates {
        rates: Mutex<Option<HashMap<FiatCurrency, f64>>>,
        calls: AtomicUsize,
    }

    impl FixedRates {
        fn new(rates: Option<HashMap<FiatCurrency, f64>>) -> Self {
            Self {
                rates: Mutex::new(rates),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RateSource for FixedRates {
        async fn usd_rates(&self) -> Result<HashMap<FiatCurrency, f64>, PriceFetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.rates
                .lock()
                .unwrap()
                .clone()
                .ok_or(PriceFetchError::MissingRate {
                    fiat: FiatCurrency::Cop,
                })
        }
    }

    /// Counts batched catalog fetches, always answering with the same price.
    struct CountingPrices {
        price: Price,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PriceSource for CountingPrices {
        async fn spot_price(
            &self,
            _asset: Asset,
            _fiat: FiatCurrency,
        ) -> Result<Price, PriceFetchError> {
            Ok(self.price)
        }

        async fn usd_prices(
            &self,
            assets: &[Asset],
        ) -> Result<HashMap<Asset, Price>, PriceFetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(assets.iter().map(|asset| (*asset, self.price)).collect())
        }
    }

    fn book(prices: ScriptedSource, rates: FixedRates) -> PriceBook {
        PriceBook::new(
            Arc::new(prices),
            Arc::new(rates),
            Duration::from_secs(5),
            Duration::from_secs(90),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_fills_prices_and_rates() {
        let mut book = book(
            ScriptedSource::always(100.0),
            FixedRates::new(Some(HashMap::from([(FiatCurrency::Cop, 4_000.0)]))),
        );

        let outcome = book.refresh().await;

        assert_eq!(outcome.prices_updated, Asset::ALL.len());
        assert_eq!(outcome.rates_updated, 1);
        assert_eq!(
            book.lookup(Asset::Solana, FiatCurrency::Cop, Instant::now()),
            PriceLookup::Fresh(Price::new(400_000.0))
        );
        assert_eq!(
            book.lookup(Asset::Solana, FiatCurrency::Eur, Instant::now()),
            PriceLookup::Missing
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_rate_refresh_keeps_prices() {
        let mut book = book(ScriptedSource::always(2.0), FixedRates::new(None));

        let outcome = book.refresh().await;

        assert_eq!(outcome.rates_updated, 0);
        assert_eq!(
            book.lookup(Asset::Tether, FiatCurrency::Usd, Instant::now()),
            PriceLookup::Fresh(Price::new(2.0))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn entries_past_max_age_are_stale() {
        let mut book = book(
            ScriptedSource::always(50.0),
            FixedRates::new(Some(HashMap::new())),
        );
        book.refresh().await;

        tokio::time::advance(Duration::from_secs(120)).await;

        match book.lookup(Asset::Bitcoin, FiatCurrency::Usd, Instant::now()) {
            PriceLookup::Stale { price, age } => {
                assert_eq!(price.as_f64(), 50.0);
                assert_eq!(age, Duration::from_secs(120));
            }
            other => panic!("expected stale lookup, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_book_publishes_snapshots() {
        let handle = book(
            ScriptedSource::always(10.0),
            FixedRates::new(Some(HashMap::from([(FiatCurrency::Eur, 0.5)]))),
        )
        .spawn(Duration::from_secs(30), Duration::from_secs(3_600));

        let mut rx = handle.subscribe();
        rx.changed().await.unwrap();

        assert_eq!(
            handle.lookup(Asset::Dogecoin, FiatCurrency::Eur),
            PriceLookup::Fresh(Price::new(5.0))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_book_refreshes_on_separate_intervals_until_dropped() {
        let prices = Arc::new(CountingPrices {
            price: Price::new(10.0),
            calls: AtomicUsize::new(0),
        });
        let rates = Arc::new(FixedRates::new(Some(HashMap::from([(
            FiatCurrency::Cop,
            4_000.0,
        )]))));
        let price_calls = || prices.calls.load(Ordering::SeqCst);
        let rate_calls = || rates.calls.load(Ordering::SeqCst);

        let handle = PriceBook::new(
            Arc::clone(&prices) as Arc<dyn PriceSource>,
            Arc::clone(&rates) as Arc<dyn RateSource>,
            Duration::from_secs(5),
            Duration::from_secs(90),
        )
        .spawn(Duration::from_secs(30), Duration::from_secs(3_600));

        tokio::time::sleep(Duration::from_secs(95)).await;
        assert_eq!(price_calls(), 4);
        assert_eq!(rate_calls(), 1);

        tokio::time::sleep(Duration::from_secs(3_510)).await;
        assert_eq!(price_calls(), 121);
        assert_eq!(rate_calls(), 2);

        drop(handle);
        tokio::time::sleep(Duration::from_secs(7_200)).await;

        assert_eq!(price_calls(), 121);
        assert_eq!(rate_calls(), 2);
    }
}
