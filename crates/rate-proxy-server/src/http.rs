//! HTTP edge: the pricing endpoint, health probes, and the mapping from
//! typed coordinator errors to response statuses.

use crate::coordinator::{RateCoordinator, ResolveError};
use crate::types::RateQuery;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use rate_proxy_breaker::CircuitState;
use rate_proxy_upstream::UpstreamError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;

const STALE_WARNING: &str = "Using cached rate due to temporary service issue";

#[derive(Debug, Deserialize)]
pub struct PricingParams {
    period: Option<String>,
    hotel: Option<String>,
    room: Option<String>,
}

#[derive(Debug, Serialize)]
struct RateBody {
    rate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Builds the edge router over a wired coordinator.
pub fn app(coordinator: Arc<RateCoordinator>) -> Router {
    Router::new()
        .route("/pricing", get(get_pricing))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(TraceLayer::new_for_http())
        .with_state(coordinator)
}

async fn get_pricing(
    State(coordinator): State<Arc<RateCoordinator>>,
    Query(params): Query<PricingParams>,
) -> Response {
    let query = match RateQuery::from_params(
        params.period.as_deref(),
        params.hotel.as_deref(),
        params.room.as_deref(),
    ) {
        Ok(query) => query,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, err.to_string()),
    };

    match coordinator.resolve(&query).await {
        Ok(rate) => rate_response(rate, None),
        Err(err) => degraded_response(&coordinator, &query, err).await,
    }
}

/// Degraded mode: when the freshness-producing path fails, consult the stale
/// namespace before surfacing the error. Lock contention and store outages
/// skip the fallback; only upstream-shaped failures qualify.
async fn degraded_response(
    coordinator: &RateCoordinator,
    query: &RateQuery,
    err: ResolveError,
) -> Response {
    if matches!(err, ResolveError::Upstream(_) | ResolveError::BreakerOpen) {
        let key = query.cache_key();
        if let Ok(Some(rate)) = coordinator.stale_rate(&key).await {
            warn!(%key, error = %err, "serving stale rate after upstream failure");
            return rate_response(rate, Some(STALE_WARNING));
        }
    }
    map_resolve_error(err)
}

fn map_resolve_error(err: ResolveError) -> Response {
    match err {
        ResolveError::Upstream(err @ UpstreamError::Timeout) => {
            error_response(StatusCode::GATEWAY_TIMEOUT, err.to_string())
        }
        ResolveError::Upstream(UpstreamError::Server(_) | UpstreamError::Network(_))
        | ResolveError::BreakerOpen => error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Pricing service temporarily unavailable".to_owned(),
        ),
        ResolveError::Upstream(err) => error_response(StatusCode::BAD_GATEWAY, err.to_string()),
        ResolveError::Busy => error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Service temporarily busy, please retry".to_owned(),
        ),
        ResolveError::Store(err) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

fn rate_response(rate: String, warning: Option<&'static str>) -> Response {
    (StatusCode::OK, Json(RateBody { rate, warning })).into_response()
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorBody { error })).into_response()
}

async fn health_live() -> Response {
    (StatusCode::OK, Json(serde_json::json!({"status": "alive"}))).into_response()
}

/// Readiness follows the breaker: an open circuit means this instance cannot
/// refresh rates and should be rotated out of traffic.
async fn health_ready(State(coordinator): State<Arc<RateCoordinator>>) -> Response {
    let state = coordinator.breaker_state();
    let (status, label) = match state {
        CircuitState::Open => (StatusCode::SERVICE_UNAVAILABLE, "degraded"),
        _ => (StatusCode::OK, "ready"),
    };

    (
        status,
        Json(serde_json::json!({
            "status": label,
            "circuit_state": format!("{state:?}"),
        })),
    )
        .into_response()
}
