use std::{
    future::Future,
    time::{Duration, Instant},
};

use alloy::{
    primitives::{address, Address, U160},
    providers::ProviderBuilder,
    sol,
};
use serde::Deserialize;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Uniswap V3 USDC/WETH 0.05% pool on Ethereum mainnet.
pub const USDC_WETH_POOL: Address = address!("0x88e6A0c2dDD26FEEb64F039a2c41296FcB3f5640");

const COINGECKO_URL: &str = "https://api.coingecko.com/api/v3/simple/price";

/// USD per ETH from the pool's `sqrtPriceX96`. token0 is USDC (6 decimals)
/// and token1 is WETH (18 decimals), so the raw ratio is WETH per USDC
/// scaled by 10^-12.
pub fn usd_per_eth_from_sqrt_price(sqrt_price_x96: f64) -> f64 {
    let ratio = sqrt_price_x96 / 2f64.powi(96);
    let weth_per_usdc_raw = ratio * ratio;
    if weth_per_usdc_raw > 0.0 {
        1e12 / weth_per_usdc_raw
    } else {
        0.0
    }
}

/// Remembers the last primary price for `ttl`.
#[derive(Debug)]
pub struct PriceCache {
    ttl: Duration,
    entry: Option<(f64, Instant)>,
}

impl PriceCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    pub fn get(&self, now: Instant) -> Option<f64> {
        self.entry
            .filter(|(_, fetched_at)| now.saturating_duration_since(*fetched_at) < self.ttl)
            .map(|(price, _)| price)
    }

    /// Last stored price regardless of age.
    pub fn last(&self) -> Option<f64> {
        self.entry.map(|(price, _)| price)
    }

    pub fn store(&mut self, price: f64, now: Instant) {
        self.entry = Some((price, now));
    }
}

/// Somewhere an ETH/USD quote can be fetched from.
pub trait PriceSource {
    fn name(&self) -> &'static str;

    fn get_eth_price(&self) -> impl Future<Output = crate::Result<f64>> + Send;
}

pub struct UniswapPool {
    rpc_url: Url,
    pool: Address,
}

impl UniswapPool {
    pub fn new(rpc_url: Url) -> Self {
        Self {
            rpc_url,
            pool: USDC_WETH_POOL,
        }
    }
}

impl PriceSource for UniswapPool {
    fn name(&self) -> &'static str {
        "uniswap"
    }

    async fn get_eth_price(&self) -> crate::Result<f64> {
        let provider = ProviderBuilder::new().connect_http(self.rpc_url.clone());
        let slot0 = IUniswapV3Pool::new(self.pool, provider)
            .slot0()
            .call()
            .await
            .map_err(|error| crate::Error::UniswapSlot0(Box::new(error)))?;

        let sqrt_price: U160 = slot0.sqrtPriceX96;
        let price = usd_per_eth_from_sqrt_price(sqrt_price.to_string().parse::<f64>()?);
        if price > 0.0 && price.is_finite() {
            Ok(price)
        } else {
            Err(crate::Error::ZeroPoolPrice)
        }
    }
}

pub struct CoinGecko;

impl PriceSource for CoinGecko {
    fn name(&self) -> &'static str {
        "coingecko"
    }

    async fn get_eth_price(&self) -> crate::Result<f64> {
        #[derive(Deserialize, Debug)]
        struct Quote {
            usd: Option<f64>,
        }
        #[derive(Deserialize, Debug)]
        struct SimplePrice {
            ethereum: Option<Quote>,
        }

        crate::Reqwest::get(COINGECKO_URL)?
            .query(&[("ids", "ethereum"), ("vs_currencies", "usd")])
            .receive_json::<SimplePrice>()
            .await?
            .ethereum
            .and_then(|quote| quote.usd)
            .filter(|price| *price > 0.0)
            .ok_or(crate::Error::CoinGeckoPriceMissing)
    }
}

/// ETH/USD price with an optional primary source (the Uniswap pool) and a
/// fallback (CoinGecko). Only primary quotes are cached.
pub struct PriceManager<P = UniswapPool, F = CoinGecko> {
    primary: Option<P>,
    fallback: F,
    cache: PriceCache,
    poll_interval: Duration,
}

impl PriceManager {
    pub fn new(eth_http_rpc: Option<Url>, cache_ttl: Duration, poll_interval: Duration) -> Self {
        Self::with_sources(
            eth_http_rpc.map(UniswapPool::new),
            CoinGecko,
            cache_ttl,
            poll_interval,
        )
    }
}

impl<P: PriceSource, F: PriceSource> PriceManager<P, F> {
    pub fn with_sources(
        primary: Option<P>,
        fallback: F,
        cache_ttl: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            primary,
            fallback,
            cache: PriceCache::new(cache_ttl),
            poll_interval,
        }
    }

    /// Never yields zero. A fresh cached value short-circuits the network.
    pub async fn fetch_price(&mut self) -> crate::Result<f64> {
        let now = Instant::now();
        if let Some(price) = self.cache.get(now) {
            return Ok(price);
        }

        let mut connect_err = None;

        if let Some(primary) = &self.primary {
            match primary.get_eth_price().await {
                Ok(price) => {
                    self.cache.store(price, now);
                    return Ok(price);
                }
                Err(err) => {
                    tracing::warn!(
                        source = primary.name(),
                        fallback = self.fallback.name(),
                        error = %err,
                        "primary price unavailable, falling back"
                    );
                    if err.is_connect() {
                        connect_err = Some(err);
                    }
                }
            }
        }

        match self.fallback.get_eth_price().await {
            Ok(price) => Ok(price),
            Err(err) => {
                tracing::warn!(source = self.fallback.name(), error = %err, "fallback price unavailable");
                if let Some(stale) = self.cache.last() {
                    return Ok(stale);
                }
                if err.is_connect() {
                    connect_err = Some(err);
                }
                Err(connect_err.unwrap_or(crate::Error::NoPrice))
            }
        }
    }

    /// Polls the price every `poll_interval` until `shutdown_signal` fires.
    pub fn spawn_refresh_prices_thread<C>(
        mut self,
        shutdown_signal: CancellationToken,
        on_update: C,
    ) -> tokio::task::JoinHandle<()>
    where
        P: Send + Sync + 'static,
        F: Send + Sync + 'static,
        C: Fn(crate::Result<f64>) + Send + Sync + 'static,
    {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.poll_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    _ = shutdown_signal.cancelled() => break,
                }

                tokio::select! {
                    result = self.fetch_price() => on_update(result),
                    _ = shutdown_signal.cancelled() => break,
                }
            }
        })
    }
}

sol! {
    #[sol(rpc)]
    interface IUniswapV3Pool {
        function slot0()
            external
            view
            returns (
                uint160 sqrtPriceX96,
                int24 tick,
                uint16 observationIndex,
                uint16 observationCardinality,
                uint16 observationCardinalityNext,
                uint8 feeProtocol,
                bool unlocked
            );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn sqrt_price_converts_to_usd_per_eth() {
        // sqrtPriceX96 for 2000 USDC per WETH: sqrt(1e12 / 2000) * 2^96
        let sqrt_price = (1e12f64 / 2000.0).sqrt() * 2f64.powi(96);
        let price = usd_per_eth_from_sqrt_price(sqrt_price);
        assert!((price - 2000.0).abs() < 1e-6, "{price}");
    }

    #[test]
    fn zero_sqrt_price_is_zero() {
        assert_eq!(usd_per_eth_from_sqrt_price(0.0), 0.0);
    }

    #[test]
    fn cache_expires_after_ttl() {
        let start = Instant::now();
        let mut cache = PriceCache::new(Duration::from_secs(10));
        assert_eq!(cache.get(start), None);

        cache.store(1800.5, start);
        assert_eq!(cache.get(start + Duration::from_secs(9)), Some(1800.5));
        assert_eq!(cache.get(start + Duration::from_secs(10)), None);
        assert_eq!(cache.last(), Some(1800.5));
    }

    /// Answers with a fixed price or error and counts how often it was asked.
    struct FixedSource {
        price: Option<f64>,
        connect_error: bool,
        calls: AtomicUsize,
    }

    impl FixedSource {
        fn ok(price: f64) -> Self {
            Self {
                price: Some(price),
                connect_error: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(connect_error: bool) -> Self {
            Self {
                price: None,
                connect_error,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl PriceSource for FixedSource {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn get_eth_price(&self) -> crate::Result<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.price {
                Some(price) => Ok(price),
                None if self.connect_error => Err(crate::Error::Internet(
                    Url::parse("http://127.0.0.1:9").unwrap(),
                )),
                None => Err(crate::Error::CoinGeckoPriceMissing),
            }
        }
    }

    fn manager(
        primary: Option<FixedSource>,
        fallback: FixedSource,
        ttl: Duration,
    ) -> PriceManager<FixedSource, FixedSource> {
        PriceManager::with_sources(primary, fallback, ttl, Duration::from_secs(30))
    }

    #[tokio::test]
    async fn fresh_cache_skips_network() {
        let mut manager = manager(
            Some(FixedSource::ok(1.0)),
            FixedSource::ok(2.0),
            Duration::from_secs(60),
        );
        manager.cache.store(2100.0, Instant::now());

        assert_eq!(manager.fetch_price().await.unwrap(), 2100.0);
        assert_eq!(manager.primary.as_ref().unwrap().calls(), 0);
        assert_eq!(manager.fallback.calls(), 0);
    }

    #[tokio::test]
    async fn primary_price_is_cached() {
        let mut manager = manager(
            Some(FixedSource::ok(3000.0)),
            FixedSource::ok(2.0),
            Duration::from_secs(60),
        );

        assert_eq!(manager.fetch_price().await.unwrap(), 3000.0);
        assert_eq!(manager.fetch_price().await.unwrap(), 3000.0);
        assert_eq!(manager.primary.as_ref().unwrap().calls(), 1);
        assert_eq!(manager.fallback.calls(), 0);
    }

    #[tokio::test]
    async fn failed_primary_falls_back_without_caching() {
        let mut manager = manager(
            Some(FixedSource::failing(false)),
            FixedSource::ok(2950.0),
            Duration::from_secs(60),
        );

        assert_eq!(manager.fetch_price().await.unwrap(), 2950.0);
        assert_eq!(manager.fetch_price().await.unwrap(), 2950.0);
        assert_eq!(manager.primary.as_ref().unwrap().calls(), 2);
        assert_eq!(manager.fallback.calls(), 2);
        assert_eq!(manager.cache.last(), None);
    }

    #[tokio::test]
    async fn missing_primary_goes_straight_to_fallback() {
        let mut manager = manager(None, FixedSource::ok(2800.0), Duration::from_secs(60));
        assert_eq!(manager.fetch_price().await.unwrap(), 2800.0);
        assert_eq!(manager.fallback.calls(), 1);
    }

    #[tokio::test]
    async fn stale_price_beats_errors() {
        let mut manager = manager(
            Some(FixedSource::failing(true)),
            FixedSource::failing(true),
            Duration::ZERO,
        );
        manager.cache.store(1900.0, Instant::now());

        assert_eq!(manager.fetch_price().await.unwrap(), 1900.0);
        assert_eq!(manager.primary.as_ref().unwrap().calls(), 1);
        assert_eq!(manager.fallback.calls(), 1);
    }

    #[tokio::test]
    async fn connect_error_is_reported_when_nothing_is_cached() {
        let mut manager = manager(
            Some(FixedSource::failing(true)),
            FixedSource::failing(false),
            Duration::from_secs(60),
        );

        let err = manager.fetch_price().await.unwrap_err();
        assert!(err.is_connect(), "{err:?}");
    }

    #[tokio::test]
    async fn no_price_without_connect_error() {
        let mut manager = manager(
            Some(FixedSource::failing(false)),
            FixedSource::failing(false),
            Duration::from_secs(60),
        );

        let err = manager.fetch_price().await.unwrap_err();
        assert!(matches!(err, crate::Error::NoPrice), "{err:?}");
    }

    #[test]
    fn pool_address_matches_mainnet_pool() {
        assert_eq!(
            USDC_WETH_POOL.to_string().to_lowercase(),
            "0x88e6a0c2ddd26feeb64f039a2c41296fcb3f5640"
        );
    }
}
