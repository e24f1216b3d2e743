//! Time-boxed in-memory cache shared by the gateway and the dashboard client.
//!
//! Entries are keyed by a canonical `(endpoint, params)` string so logically identical
//! requests always land on the same slot. Concurrent misses for one key share a single
//! upstream fetch.

use crate::errors::AppError;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Request parameters, kept sorted by name.
///
/// The same value produces both the cache key and the wire query string, so a cached
/// response always corresponds to the request that would have been sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams(BTreeMap<String, String>);

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.0.insert(name.into(), value.to_string());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// `a=1&b=x%20y`, names sorted, values percent-encoded.
    pub fn query_string(&self) -> String {
        self.0
            .iter()
            .map(|(name, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(name),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Canonical cache key for this parameter set under `endpoint`.
    pub fn cache_key(&self, endpoint: &str) -> String {
        format!("{}?{}", endpoint, self.query_string())
    }
}

struct CacheEntry<V> {
    data: V,
    timestamp: Instant,
}

type Flight<V> = Shared<BoxFuture<'static, Result<V, AppError>>>;

pub struct TtlCache<V> {
    name: &'static str,
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    in_flight: Mutex<HashMap<String, Flight<V>>>,
    ttl: Duration,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn with_ttl(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            entries: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `(endpoint, params)`, evicting it if it has gone stale.
    pub async fn get(&self, endpoint: &str, params: &RequestParams) -> Option<V> {
        self.get_key(&params.cache_key(endpoint)).await
    }

    pub async fn set(&self, endpoint: &str, params: &RequestParams, data: V) {
        self.set_key(params.cache_key(endpoint), data).await;
    }

    /// Evict every entry older than the TTL. Returns how many were removed.
    pub async fn cleanup(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.timestamp.elapsed() <= ttl);
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(cache = self.name, evicted, "Cache sweep");
        }
        evicted
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Cached value, or the result of `fetch` shared with every concurrent caller for the
    /// same key. Only successful results are stored.
    pub async fn get_or_fetch<F, Fut>(
        self: &Arc<Self>,
        endpoint: &str,
        params: &RequestParams,
        fetch: F,
    ) -> Result<V, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, AppError>> + Send + 'static,
    {
        let key = params.cache_key(endpoint);
        if let Some(hit) = self.get_key(&key).await {
            return Ok(hit);
        }

        let flight = {
            let mut in_flight = self.in_flight.lock().await;

            // The fetch task stores its value before deregistering, so a result that landed
            // since the first lookup is visible here.
            if let Some(hit) = self.get_key(&key).await {
                return Ok(hit);
            }

            match in_flight.get(&key) {
                Some(flight) => {
                    debug!(cache = self.name, key = %key, "Joining in-flight request");
                    flight.clone()
                }
                None => {
                    let flight = self.spawn_fetch(key.clone(), fetch());
                    in_flight.insert(key, flight.clone());
                    flight
                }
            }
        };

        flight.await
    }

    fn spawn_fetch<Fut>(self: &Arc<Self>, key: String, fut: Fut) -> Flight<V>
    where
        Fut: Future<Output = Result<V, AppError>> + Send + 'static,
    {
        let cache = Arc::clone(self);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let result = fut.await;
            if let Ok(data) = &result {
                cache.set_key(task_key.clone(), data.clone()).await;
            }
            cache.in_flight.lock().await.remove(&task_key);
            result
        });

        let cache = Arc::clone(self);
        async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => {
                    // The task never reached its own deregistration.
                    cache.in_flight.lock().await.remove(&key);
                    warn!(cache = cache.name, key = %key, error = %e, "Fetch task failed");
                    Err(AppError::internal(format!("Fetch task failed: {}", e)))
                }
            }
        }
        .boxed()
        .shared()
    }

    async fn get_key(&self, key: &str) -> Option<V> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => {
                    debug!(cache = self.name, key = %key, "Cache miss");
                    return None;
                }
                Some(entry) if entry.timestamp.elapsed() <= self.ttl => {
                    debug!(cache = self.name, key = %key, "Cache hit");
                    return Some(entry.data.clone());
                }
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|entry| entry.timestamp.elapsed() > self.ttl)
        {
            entries.remove(key);
            debug!(cache = self.name, key = %key, "Evicted stale entry");
        }
        None
    }

    async fn set_key(&self, key: String, data: V) {
        let mut entries = self.entries.write().await;
        debug!(cache = self.name, key = %key, "Cache set");
        entries.insert(
            key,
            CacheEntry {
                data,
                timestamp: Instant::now(),
            },
        );
    }

    /// Run `cleanup` every `every`, independent of request traffic.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> SweepHandle {
        let cache = Arc::clone(self);
        let token = CancellationToken::new();
        let cancel = token.clone();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        cache.cleanup().await;
                    }
                }
            }
            debug!(cache = cache.name, "Cache sweeper stopped");
        });

        SweepHandle { token, task }
    }
}

/// Owns a sweeper task. Dropping the handle cancels the sweeper.
pub struct SweepHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl SweepHandle {
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Err(e) = (&mut self.task).await {
            warn!(error = %e, "Cache sweeper ended abnormally");
        }
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn city(name: &str) -> RequestParams {
        RequestParams::new().with("city", name)
    }

    #[test]
    fn key_is_independent_of_insertion_order() {
        let a = RequestParams::new().with("a", 1).with("b", 2);
        let b = RequestParams::new().with("b", 2).with("a", 1);
        assert_eq!(a.cache_key("forecast"), b.cache_key("forecast"));
        assert_eq!(a.cache_key("forecast"), "forecast?a=1&b=2");
    }

    #[test]
    fn key_distinguishes_endpoint_and_values() {
        let params = city("Pune");
        assert_ne!(params.cache_key("forecast"), params.cache_key("hourly"));
        assert_ne!(params.cache_key("weather"), city("Paris").cache_key("weather"));
    }

    #[test]
    fn query_string_encodes_values() {
        let params = RequestParams::new().with("q", "18.52,73.85").with("city", "New York");
        assert_eq!(params.query_string(), "city=New%20York&q=18.52%2C73.85");
    }

    #[tokio::test(start_paused = true)]
    async fn get_after_set_returns_value() {
        let cache = TtlCache::with_ttl("test", Duration::from_secs(300));
        cache.set("weather", &city("Pune"), 42u32).await;
        assert_eq!(cache.get("weather", &city("Pune")).await, Some(42));
        assert_eq!(cache.get("weather", &city("Paris")).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn entry_is_fresh_at_exactly_ttl() {
        let cache = TtlCache::with_ttl("test", Duration::from_secs(300));
        cache.set("weather", &city("Pune"), 1u32).await;
        tokio::time::advance(Duration::from_secs(300)).await;
        assert_eq!(cache.get("weather", &city("Pune")).await, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_entry_is_evicted_on_read() {
        let cache = TtlCache::with_ttl("test", Duration::from_secs(300));
        cache.set("weather", &city("Pune"), 1u32).await;
        tokio::time::advance(Duration::from_secs(301)).await;

        assert_eq!(cache.get("weather", &city("Pune")).await, None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn set_overwrites_and_refreshes_timestamp() {
        let cache = TtlCache::with_ttl("test", Duration::from_secs(300));
        cache.set("weather", &city("Pune"), 1u32).await;
        tokio::time::advance(Duration::from_secs(200)).await;
        cache.set("weather", &city("Pune"), 2u32).await;
        tokio::time::advance(Duration::from_secs(200)).await;

        assert_eq!(cache.get("weather", &city("Pune")).await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_only_removes_expired_entries() {
        let cache = TtlCache::with_ttl("test", Duration::from_secs(300));
        cache.set("weather", &city("Old"), 1u32).await;
        tokio::time::advance(Duration::from_secs(200)).await;
        cache.set("weather", &city("New"), 2u32).await;
        tokio::time::advance(Duration::from_secs(150)).await;

        assert_eq!(cache.cleanup().await, 1);
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("weather", &city("New")).await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_runs_without_traffic_and_stops() {
        let cache = Arc::new(TtlCache::with_ttl("test", Duration::from_secs(10)));
        cache.set("weather", &city("Pune"), 1u32).await;
        let sweeper = cache.spawn_sweeper(Duration::from_secs(5));

        tokio::time::sleep(Duration::from_secs(16)).await;
        assert!(cache.is_empty().await);

        sweeper.stop().await;
        cache.set("weather", &city("Pune"), 1u32).await;
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_misses_share_one_fetch() {
        let cache = Arc::new(TtlCache::with_ttl("test", Duration::from_secs(300)));
        let calls = Arc::new(AtomicUsize::new(0));

        let fetch = |calls: Arc<AtomicUsize>| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok::<_, AppError>(7u32)
            }
        };

        let params = city("Pune");
        let (a, b, c) = tokio::join!(
            cache.get_or_fetch("weather", &params, fetch(calls.clone())),
            cache.get_or_fetch("weather", &params, fetch(calls.clone())),
            cache.get_or_fetch("weather", &params, fetch(calls.clone())),
        );

        assert_eq!((a.unwrap(), b.unwrap(), c.unwrap()), (7, 7, 7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get("weather", &params).await, Some(7));
    }

    #[tokio::test]
    async fn failures_are_shared_but_not_cached() {
        let cache: Arc<TtlCache<u32>> =
            Arc::new(TtlCache::with_ttl("test", Duration::from_secs(300)));
        let params = city("Nowhere");

        let result = cache
            .get_or_fetch("weather", &params, || async {
                Err::<u32, _>(AppError::upstream("No matching location found."))
            })
            .await;
        assert!(matches!(result, Err(AppError::UpstreamError(_))));
        assert!(cache.is_empty().await);

        let retry = cache
            .get_or_fetch("weather", &params, || async { Ok::<_, AppError>(3) })
            .await;
        assert_eq!(retry.unwrap(), 3);
    }

    async fn panicking_fetch() -> Result<u32, AppError> {
        panic!("provider client bug")
    }

    #[tokio::test]
    async fn panicked_fetch_does_not_block_the_key() {
        let cache: Arc<TtlCache<u32>> =
            Arc::new(TtlCache::with_ttl("test", Duration::from_secs(300)));
        let params = city("Pune");

        let first = cache
            .get_or_fetch("weather", &params, panicking_fetch)
            .await;
        assert!(matches!(first, Err(AppError::InternalError(_))));
        assert!(cache.in_flight.lock().await.is_empty());

        let retry = cache
            .get_or_fetch("weather", &params, || async { Ok::<_, AppError>(4) })
            .await;
        assert_eq!(retry.unwrap(), 4);
        assert_eq!(cache.get("weather", &params).await, Some(4));
    }

    #[tokio::test]
    async fn hit_skips_fetch() {
        let cache = Arc::new(TtlCache::with_ttl("test", Duration::from_secs(300)));
        cache.set("weather", &city("Pune"), 5u32).await;

        let value = cache
            .get_or_fetch("weather", &city("Pune"), || async {
                Err::<u32, _>(AppError::internal("fetch must not run on a cache hit"))
            })
            .await;
        assert_eq!(value.unwrap(), 5);
    }
}
