//! HTTP client for the pricing API.

use crate::{RateSource, UpstreamError};
use async_trait::async_trait;
use reqwest::{header, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Connection settings for the pricing API.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the pricing API; the client posts to `{base_url}/pricing`.
    pub base_url: String,
    /// Optional API token, sent as a `token` header when present.
    pub token: Option<String>,
    /// Hard per-call deadline covering connect, send, and body read.
    pub call_timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://rate-api:3001".to_owned(),
            token: None,
            call_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Serialize)]
struct RateRequest<'a> {
    attributes: [RateAttributes<'a>; 1],
}

#[derive(Serialize)]
struct RateAttributes<'a> {
    period: &'a str,
    hotel: &'a str,
    room: &'a str,
}

#[derive(Deserialize)]
struct RateResponse {
    rates: Vec<RateEntry>,
}

#[derive(Deserialize)]
struct RateEntry {
    rate: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Reqwest-backed [`RateSource`].
///
/// Issues one POST per call and classifies the outcome; retry and backoff
/// policy live with the caller.
pub struct RateApiClient {
    http: reqwest::Client,
    pricing_url: String,
    token: Option<String>,
}

impl RateApiClient {
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(config.call_timeout)
            .user_agent(concat!("rate-proxy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpstreamError::Other(e.to_string()))?;

        Ok(Self {
            http,
            pricing_url: format!("{}/pricing", config.base_url.trim_end_matches('/')),
            token: config.token,
        })
    }
}

#[async_trait]
impl RateSource for RateApiClient {
    async fn fetch_rate(
        &self,
        period: &str,
        hotel: &str,
        room: &str,
    ) -> Result<String, UpstreamError> {
        debug!(%period, %hotel, %room, "upstream call starting");

        let request = RateRequest {
            attributes: [RateAttributes {
                period,
                hotel,
                room,
            }],
        };

        let mut builder = self
            .http
            .post(&self.pricing_url)
            .json(&request)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = &self.token {
            builder = builder.header("token", token);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        let rate = classify_response(status, &body)?;
        debug!(%rate, "upstream call finished");
        Ok(rate)
    }
}

fn transport_error(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout
    } else if err.is_connect() {
        UpstreamError::Network(err.to_string())
    } else {
        UpstreamError::Other(err.to_string())
    }
}

/// Maps a raw status + body into the rate or a typed failure kind.
fn classify_response(status: StatusCode, body: &str) -> Result<String, UpstreamError> {
    if status.is_client_error() {
        return Err(UpstreamError::Client(extract_error(status, body)));
    }
    if status.is_server_error() {
        return Err(UpstreamError::Server(extract_error(status, body)));
    }
    if !status.is_success() {
        return Err(UpstreamError::Other(format!(
            "unexpected upstream status {status}"
        )));
    }

    let parsed: RateResponse = serde_json::from_str(body)
        .map_err(|e| UpstreamError::Protocol(format!("invalid rate payload: {e}")))?;

    match parsed.rates.first() {
        Some(entry) if !entry.rate.is_empty() => Ok(entry.rate.clone()),
        Some(_) => Err(UpstreamError::Protocol("empty rate in response".to_owned())),
        None => Err(UpstreamError::Protocol("no rates in response".to_owned())),
    }
}

/// Best-effort extraction of the upstream `error` field.
fn extract_error(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| format!("upstream returned status {status}"))
}
