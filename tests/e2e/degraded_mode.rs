//! Stale fallback and the mapping from typed failures to response statuses.

use crate::support::{
    get, proxy, proxy_with_lock, StubUpstream, SUMMER_SINGLETON, SUMMER_SINGLETON_KEY,
};
use axum::http::StatusCode;
use rate_proxy_store::{LockConfig, SharedStore};
use rate_proxy_upstream::UpstreamError;
use std::time::Duration;

async fn preload_stale(proxy: &crate::support::TestProxy, value: &str) {
    proxy
        .store
        .put(
            &format!("stale:{SUMMER_SINGLETON_KEY}"),
            value,
            Duration::from_secs(60),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn stale_rate_served_with_warning_when_upstream_fails() {
    let proxy = proxy(StubUpstream::new().failing(UpstreamError::Server("boom".into())));
    preload_stale(&proxy, "40000").await;

    let (status, body) = get(&proxy.router, SUMMER_SINGLETON).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rate"], "40000");
    assert!(
        body["warning"].as_str().unwrap().contains("cached rate"),
        "warning must mention the cached rate: {body}"
    );
}

#[tokio::test]
async fn upstream_down_without_stale_is_service_unavailable() {
    let proxy = proxy(StubUpstream::new().failing(UpstreamError::Server("boom".into())));

    let (status, body) = get(&proxy.router, SUMMER_SINGLETON).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(
        body["error"].as_str().unwrap().contains("unavailable"),
        "error must mention unavailability: {body}"
    );
}

#[tokio::test]
async fn upstream_timeout_without_stale_is_gateway_timeout() {
    let proxy = proxy(StubUpstream::new().failing(UpstreamError::Timeout));

    let (status, body) = get(&proxy.router, SUMMER_SINGLETON).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert!(
        body["error"].as_str().unwrap().contains("timeout"),
        "error must mention the timeout: {body}"
    );
}

#[tokio::test]
async fn upstream_client_error_maps_to_bad_gateway_and_never_caches() {
    let proxy = proxy(StubUpstream::new().failing(UpstreamError::Client("Unknown hotel".into())));

    let (status, body) = get(&proxy.router, SUMMER_SINGLETON).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Unknown hotel");

    // Contract failures must not poison either cache tier.
    for namespace in ["fresh", "stale"] {
        let entry = proxy
            .store
            .get(&format!("{namespace}:{SUMMER_SINGLETON_KEY}"))
            .await
            .unwrap();
        assert_eq!(entry, None);
    }
}

#[tokio::test]
async fn open_breaker_keeps_serving_stale_without_upstream_calls() {
    let proxy = proxy(StubUpstream::new().failing(UpstreamError::Server("boom".into())));
    preload_stale(&proxy, "40000").await;

    // Five failures trip the breaker; every response still comes from stale.
    for _ in 0..5 {
        let (status, body) = get(&proxy.router, SUMMER_SINGLETON).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rate"], "40000");
    }
    assert_eq!(proxy.upstream.calls(), 5);

    // With the circuit open the upstream is no longer contacted.
    for _ in 0..3 {
        let (status, body) = get(&proxy.router, SUMMER_SINGLETON).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rate"], "40000");
        assert!(body["warning"].as_str().unwrap().contains("cached rate"));
    }
    assert_eq!(proxy.upstream.calls(), 5);
}

#[tokio::test]
async fn contended_lock_without_cache_reports_busy() {
    let proxy = proxy_with_lock(
        StubUpstream::new().rate("Summer", "FloatingPointResort", "SingletonRoom", "15000"),
        LockConfig {
            hold_ttl: Duration::from_secs(2),
            wait_budget: Duration::from_millis(200),
            poll_interval: Duration::from_millis(10),
        },
    );

    // Another instance holds the key's lock for longer than our wait budget.
    proxy
        .store
        .put(
            &format!("lock:{SUMMER_SINGLETON_KEY}"),
            "other-instance",
            Duration::from_secs(30),
        )
        .await
        .unwrap();

    let (status, body) = get(&proxy.router, SUMMER_SINGLETON).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Service temporarily busy, please retry");
    assert_eq!(proxy.upstream.calls(), 0);
}
