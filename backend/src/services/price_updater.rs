use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Refresh cadence for the background timer.
pub const UPDATE_INTERVAL: Duration = Duration::from_millis(18_000);
/// Per-source request timeout; a slow source fails over, it does not stall the cycle.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);
/// Served until the first successful fetch.
pub const FALLBACK_ETH_USD: f64 = 3400.0;
/// Prices at or above this are treated as source garbage and skipped.
pub const MAX_PLAUSIBLE_ETH_USD: f64 = 10_000.0;

const USER_AGENT: &str = "EthosRadar/1.0.0";

/// One upstream price provider: where to ask, and how to read the answer.
pub struct PriceSource {
    pub name: &'static str,
    pub url: String,
    pub extract: fn(&Value) -> Option<f64>,
}

fn extract_coingecko(body: &Value) -> Option<f64> {
    body.get("ethereum")?.get("usd")?.as_f64()
}

fn extract_binance(body: &Value) -> Option<f64> {
    body.get("price")?.as_str()?.parse().ok()
}

fn extract_coinbase(body: &Value) -> Option<f64> {
    body.get("data")?.get("rates")?.get("USD")?.as_str()?.parse().ok()
}

fn default_sources() -> Vec<PriceSource> {
    vec![
        PriceSource {
            name: "CoinGecko",
            url: "https://api.coingecko.com/api/v3/simple/price?ids=ethereum&vs_currencies=usd"
                .to_string(),
            extract: extract_coingecko,
        },
        PriceSource {
            name: "Binance",
            url: "https://api.binance.com/api/v3/ticker/price?symbol=ETHUSDT".to_string(),
            extract: extract_binance,
        },
        PriceSource {
            name: "Coinbase",
            url: "https://api.coinbase.com/v2/exchange-rates?currency=ETH".to_string(),
            extract: extract_coinbase,
        },
    ]
}

/// Last known-good ETH/USD price.
#[derive(Debug, Clone, Serialize)]
pub struct CachedPrice {
    pub eth_usd: f64,
    /// Epoch millis of the fetch that produced this value.
    pub last_updated: i64,
    /// Which source produced it ("fallback" until a fetch succeeds).
    pub source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceStats {
    pub current_price: Option<CachedPrice>,
    pub is_running: bool,
    pub update_interval_ms: u64,
    pub is_updating: bool,
}

/// Keeps a best-effort ETH/USD price warm by polling redundant upstream
/// sources in priority order. Readers only ever touch the in-memory cache,
/// so they never wait on the network.
pub struct PriceUpdater {
    client: reqwest::Client,
    sources: Vec<PriceSource>,
    cache: RwLock<Option<CachedPrice>>,
    updating: AtomicBool,
    timer: Mutex<Option<JoinHandle<()>>>,
}

/// Clears the in-flight flag when an update cycle exits, on every path.
struct UpdatingGuard<'a>(&'a AtomicBool);

impl Drop for UpdatingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl PriceUpdater {
    pub fn new() -> Self {
        Self::with_sources(default_sources())
    }

    /// Constructor with an explicit source list, in priority order.
    /// Performs no I/O; the composition root triggers the first fetch.
    pub fn with_sources(sources: Vec<PriceSource>) -> Self {
        Self {
            client: reqwest::Client::new(),
            sources,
            cache: RwLock::new(None),
            updating: AtomicBool::new(false),
            timer: Mutex::new(None),
        }
    }

    /// Current cached price. Never fails and never touches the network;
    /// before the first successful fetch this is the fallback constant.
    pub async fn current_price(&self) -> CachedPrice {
        match self.cache.read().await.as_ref() {
            Some(price) => price.clone(),
            None => CachedPrice {
                eth_usd: FALLBACK_ETH_USD,
                last_updated: Utc::now().timestamp_millis(),
                source: "fallback".to_string(),
            },
        }
    }

    /// Run one fetch-and-fail-over cycle. A second call arriving while a
    /// cycle is in flight returns immediately without issuing any requests.
    /// All source failures are swallowed; exhausting every source keeps the
    /// previous cache value.
    pub async fn update_price(&self) {
        if self
            .updating
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }
        let _guard = UpdatingGuard(&self.updating);

        for source in &self.sources {
            let Some(price) = self.try_source(source).await else {
                continue;
            };

            let mut cache = self.cache.write().await;
            // Only log price movements above 0.1% to keep the log quiet.
            let changed = match cache.as_ref() {
                Some(prev) => ((price - prev.eth_usd) / prev.eth_usd).abs() > 0.001,
                None => true,
            };
            if changed {
                info!("ETH price updated: ${:.2} ({})", price, source.name);
            }
            *cache = Some(CachedPrice {
                eth_usd: price,
                last_updated: Utc::now().timestamp_millis(),
                source: source.name.to_string(),
            });
            return;
        }

        warn!("all ETH price sources failed, keeping last known value");
    }

    async fn try_source(&self, source: &PriceSource) -> Option<f64> {
        let response = match self
            .client
            .get(&source.url)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/json")
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("{} price request failed: {}", source.name, e);
                return None;
            }
        };

        if !response.status().is_success() {
            warn!("{} returned status {}", source.name, response.status());
            return None;
        }

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!("{} returned an unreadable body: {}", source.name, e);
                return None;
            }
        };

        match (source.extract)(&body) {
            Some(price) if price.is_finite() && price > 0.0 && price < MAX_PLAUSIBLE_ETH_USD => {
                Some(price)
            }
            Some(price) => {
                warn!("{} returned implausible price {}", source.name, price);
                None
            }
            None => {
                warn!("{} response had no price field", source.name);
                None
            }
        }
    }

    /// Start the recurring refresh. Idempotent: a second call while the
    /// timer is registered is a no-op. The first tick fires one interval
    /// after start; the initial fetch is the composition root's job.
    pub async fn start_updates(self: &Arc<Self>) {
        let mut timer = self.timer.lock().await;
        if timer.is_some() {
            return;
        }

        info!(
            "starting ETH price updates (every {}s)",
            UPDATE_INTERVAL.as_secs()
        );

        let updater = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + UPDATE_INTERVAL;
            let mut interval = tokio::time::interval_at(start, UPDATE_INTERVAL);
            loop {
                interval.tick().await;
                updater.update_price().await;
            }
        });
        *timer = Some(handle);
    }

    /// Cancel the recurring refresh. Idempotent when not running.
    pub async fn stop_updates(&self) {
        let mut timer = self.timer.lock().await;
        if let Some(handle) = timer.take() {
            handle.abort();
            info!("stopped ETH price updates");
        }
    }

    /// Diagnostics snapshot, no side effects.
    pub async fn stats(&self) -> PriceStats {
        PriceStats {
            current_price: self.cache.read().await.clone(),
            is_running: self.timer.lock().await.is_some(),
            update_interval_ms: UPDATE_INTERVAL.as_millis() as u64,
            is_updating: self.updating.load(Ordering::SeqCst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(name: &'static str, base: &str, route: &str, extract: fn(&Value) -> Option<f64>) -> PriceSource {
        PriceSource {
            name,
            url: format!("{}{}", base, route),
            extract,
        }
    }

    #[tokio::test]
    async fn serves_fallback_before_first_successful_fetch() {
        let updater = PriceUpdater::with_sources(vec![]);

        let price = updater.current_price().await;
        assert_eq!(price.eth_usd, FALLBACK_ETH_USD);
        assert_eq!(price.source, "fallback");
    }

    #[tokio::test]
    async fn first_plausible_source_wins_and_later_sources_are_skipped() {
        let server = MockServer::start().await;

        // A errors at the connection level, B answers, C must never be asked
        Mock::given(method("GET"))
            .and(path("/b"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"price": "3150.42"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/c"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"ethereum": {"usd": 3200.0}})),
            )
            .expect(0)
            .mount(&server)
            .await;

        let updater = PriceUpdater::with_sources(vec![
            // port 9 is discard; the connection attempt fails outright
            source("A", "http://127.0.0.1:9", "/a", extract_coingecko),
            source("B", &server.uri(), "/b", extract_binance),
            source("C", &server.uri(), "/c", extract_coingecko),
        ]);
        updater.update_price().await;

        let price = updater.current_price().await;
        assert_eq!(price.eth_usd, 3150.42);
        assert_eq!(price.source, "B");
        server.verify().await;
    }

    #[tokio::test]
    async fn implausible_values_are_rejected() {
        let server = MockServer::start().await;

        for (route, body) in [
            ("/negative", json!({"price": "-5"})),
            ("/zero", json!({"price": "0"})),
            ("/nan", json!({"price": "NaN"})),
            ("/huge", json!({"price": "50000"})),
        ] {
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .mount(&server)
                .await;
        }

        let updater = PriceUpdater::with_sources(vec![
            source("Negative", &server.uri(), "/negative", extract_binance),
            source("Zero", &server.uri(), "/zero", extract_binance),
            source("NaN", &server.uri(), "/nan", extract_binance),
            source("Huge", &server.uri(), "/huge", extract_binance),
        ]);
        updater.update_price().await;

        // Every candidate was rejected, so the cache is still cold
        let price = updater.current_price().await;
        assert_eq!(price.source, "fallback");
        assert_eq!(price.eth_usd, FALLBACK_ETH_USD);
    }

    #[tokio::test]
    async fn concurrent_update_is_dropped_while_one_is_in_flight() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"price": "3000"}))
                    .set_delay(Duration::from_millis(250)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let updater = Arc::new(PriceUpdater::with_sources(vec![source(
            "Slow",
            &server.uri(),
            "/slow",
            extract_binance,
        )]));

        let first = {
            let updater = Arc::clone(&updater);
            tokio::spawn(async move { updater.update_price().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Second cycle must bail out immediately without a second request,
        // and readers must not block on the in-flight fetch.
        updater.update_price().await;
        let price = updater.current_price().await;
        assert_eq!(price.source, "fallback");
        assert!(updater.stats().await.is_updating);

        first.await.expect("first update should complete");
        assert_eq!(updater.current_price().await.eth_usd, 3000.0);
        assert!(!updater.stats().await.is_updating);
        server.verify().await;
    }

    #[tokio::test]
    async fn total_failure_keeps_the_last_good_value() {
        let server = MockServer::start().await;

        // First cycle succeeds, every later request gets a 500
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"price": "2950.5"})))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let updater = PriceUpdater::with_sources(vec![source(
            "Flaky",
            &server.uri(),
            "/flaky",
            extract_binance,
        )]);

        updater.update_price().await;
        let good = updater.current_price().await;
        assert_eq!(good.eth_usd, 2950.5);

        updater.update_price().await;
        let after_failure = updater.current_price().await;
        assert_eq!(after_failure.eth_usd, 2950.5);
        assert_eq!(after_failure.source, "Flaky");
        assert_eq!(after_failure.last_updated, good.last_updated);
    }

    #[tokio::test]
    async fn start_and_stop_are_idempotent() {
        let updater = Arc::new(PriceUpdater::with_sources(vec![]));
        assert!(!updater.stats().await.is_running);

        updater.start_updates().await;
        updater.start_updates().await;
        assert!(updater.stats().await.is_running);

        updater.stop_updates().await;
        assert!(!updater.stats().await.is_running);

        // Stopping again is a no-op
        updater.stop_updates().await;
        assert!(!updater.stats().await.is_running);
    }

    #[tokio::test]
    async fn stats_snapshot_reflects_cache_and_interval() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"ethereum": {"usd": 3333.0}})),
            )
            .mount(&server)
            .await;

        let updater = PriceUpdater::with_sources(vec![source(
            "CoinGecko",
            &server.uri(),
            "/ok",
            extract_coingecko,
        )]);

        let cold = updater.stats().await;
        assert!(cold.current_price.is_none());
        assert_eq!(cold.update_interval_ms, 18_000);

        updater.update_price().await;
        let warm = updater.stats().await;
        let price = warm.current_price.expect("cache should be populated");
        assert_eq!(price.eth_usd, 3333.0);
        assert_eq!(price.source, "CoinGecko");
        assert!(!warm.is_updating);
    }

    #[test]
    fn extractors_read_each_provider_shape() {
        assert_eq!(
            extract_coingecko(&json!({"ethereum": {"usd": 3421.07}})),
            Some(3421.07)
        );
        assert_eq!(extract_binance(&json!({"price": "3150.42"})), Some(3150.42));
        assert_eq!(
            extract_coinbase(&json!({"data": {"rates": {"USD": "3388.12"}}})),
            Some(3388.12)
        );
        assert_eq!(extract_coingecko(&json!({"unexpected": true})), None);
    }
}
