//! Shared harness for the end-to-end tests.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use rate_proxy_breaker::CircuitBreaker;
use rate_proxy_server::{app, upstream_breaker, RateCoordinator};
use rate_proxy_store::{
    CacheConfig, DistributedMutex, LockConfig, MemoryStore, RateCache, SharedStore,
};
use rate_proxy_upstream::{RateSource, UpstreamError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// Scripted upstream. Configured with per-tuple rates or a fixed failure;
/// counts every call so tests can assert the single-flight invariant.
pub struct StubUpstream {
    rates: HashMap<(String, String, String), String>,
    failure: Option<UpstreamError>,
    delay: Duration,
    calls: AtomicUsize,
}

impl StubUpstream {
    pub fn new() -> Self {
        Self {
            rates: HashMap::new(),
            failure: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn rate(mut self, period: &str, hotel: &str, room: &str, value: &str) -> Self {
        self.rates.insert(
            (period.to_owned(), hotel.to_owned(), room.to_owned()),
            value.to_owned(),
        );
        self
    }

    pub fn failing(mut self, failure: UpstreamError) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Makes every call take this long, so concurrent requests overlap.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateSource for StubUpstream {
    async fn fetch_rate(
        &self,
        period: &str,
        hotel: &str,
        room: &str,
    ) -> Result<String, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.rates
            .get(&(period.to_owned(), hotel.to_owned(), room.to_owned()))
            .cloned()
            .ok_or_else(|| UpstreamError::Protocol("no rate scripted for tuple".to_owned()))
    }
}

pub struct TestProxy {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub upstream: Arc<StubUpstream>,
}

/// Lock timings tightened so contention tests finish quickly; semantics are
/// unchanged from the production defaults.
pub fn fast_lock() -> LockConfig {
    LockConfig {
        hold_ttl: Duration::from_secs(2),
        wait_budget: Duration::from_secs(2),
        poll_interval: Duration::from_millis(10),
    }
}

pub fn proxy(upstream: StubUpstream) -> TestProxy {
    proxy_with_lock(upstream, fast_lock())
}

pub fn proxy_with_lock(upstream: StubUpstream, lock: LockConfig) -> TestProxy {
    let upstream = Arc::new(upstream);
    let store = Arc::new(MemoryStore::new());
    let shared: Arc<dyn SharedStore> = Arc::clone(&store) as Arc<dyn SharedStore>;

    let cache = RateCache::new(Arc::clone(&shared), CacheConfig::default());
    let mutex = DistributedMutex::new(Arc::clone(&shared), lock);
    let breaker = upstream_breaker(CircuitBreaker::builder().name("rate-api-test"));

    let coordinator = Arc::new(RateCoordinator::new(
        cache,
        mutex,
        breaker,
        Arc::clone(&upstream) as Arc<dyn RateSource>,
    ));

    TestProxy {
        router: app(coordinator),
        store,
        upstream,
    }
}

/// Issues a GET against the in-process router and decodes the JSON body.
pub async fn get(router: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub const SUMMER_SINGLETON: &str =
    "/pricing?period=Summer&hotel=FloatingPointResort&room=SingletonRoom";
pub const SUMMER_SINGLETON_KEY: &str = "rate:Summer:FloatingPointResort:SingletonRoom";
