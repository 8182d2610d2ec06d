//! Edge validation and health probes.

use crate::support::{get, proxy, StubUpstream, SUMMER_SINGLETON};
use axum::http::StatusCode;
use rate_proxy_upstream::UpstreamError;

#[tokio::test]
async fn missing_parameters_are_rejected() {
    let proxy = proxy(StubUpstream::new());

    for uri in [
        "/pricing",
        "/pricing?period=Summer",
        "/pricing?period=Summer&hotel=FloatingPointResort",
        "/pricing?period=&hotel=FloatingPointResort&room=SingletonRoom",
    ] {
        let (status, body) = get(&proxy.router, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {uri}");
        assert_eq!(body["error"], "Missing required parameters", "uri: {uri}");
    }
    assert_eq!(proxy.upstream.calls(), 0);
}

#[tokio::test]
async fn invalid_enumeration_values_are_rejected() {
    let proxy = proxy(StubUpstream::new());

    let (status, body) = get(
        &proxy.router,
        "/pricing?period=summer-2024&hotel=FloatingPointResort&room=SingletonRoom",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid period"));

    let (status, body) = get(
        &proxy.router,
        "/pricing?period=Summer&hotel=Hilton&room=SingletonRoom",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid hotel"));

    let (status, body) = get(
        &proxy.router,
        "/pricing?period=Summer&hotel=FloatingPointResort&room=Penthouse",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid room"));

    assert_eq!(proxy.upstream.calls(), 0);
}

#[tokio::test]
async fn liveness_is_unconditional() {
    let proxy = proxy(StubUpstream::new());

    let (status, body) = get(&proxy.router, "/health/live").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn readiness_follows_the_breaker() {
    let proxy = proxy(StubUpstream::new().failing(UpstreamError::Server("boom".into())));

    let (status, body) = get(&proxy.router, "/health/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["circuit_state"], "Closed");

    // Trip the breaker, then the instance must report itself degraded.
    for _ in 0..5 {
        let _ = get(&proxy.router, SUMMER_SINGLETON).await;
    }

    let (status, body) = get(&proxy.router, "/health/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["circuit_state"], "Open");
}
