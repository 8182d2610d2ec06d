//! Runtime configuration, settable by flag or environment variable.

use clap::Parser;
use rate_proxy_breaker::{CircuitBreaker, CircuitBreakerConfigBuilder};
use rate_proxy_store::{CacheConfig, LockConfig};
use rate_proxy_upstream::{UpstreamConfig, UpstreamError};
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "rate-proxy",
    version,
    about = "Read-through caching proxy for the external pricing API"
)]
pub struct Config {
    /// Base URL of the upstream pricing API
    #[arg(long, env = "RATE_API_URL", default_value = "http://rate-api:3001")]
    pub rate_api_url: String,

    /// API token forwarded to the upstream when set
    #[arg(long, env = "RATE_API_TOKEN")]
    pub rate_api_token: Option<String>,

    /// Address of the shared store
    #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    pub redis_url: String,

    /// Listen address for the HTTP edge
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:3000")]
    pub bind_addr: SocketAddr,

    /// Upstream per-call deadline in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 5)]
    pub upstream_timeout_secs: u64,

    /// Fresh cache TTL in seconds
    #[arg(long, env = "FRESH_TTL_SECS", default_value_t = 300)]
    pub fresh_ttl_secs: u64,

    /// Stale cache TTL in seconds
    #[arg(long, env = "STALE_TTL_SECS", default_value_t = 1800)]
    pub stale_ttl_secs: u64,

    /// Lock hold TTL in seconds
    #[arg(long, env = "LOCK_HOLD_SECS", default_value_t = 10)]
    pub lock_hold_secs: u64,

    /// Lock acquire wait budget in seconds
    #[arg(long, env = "LOCK_WAIT_SECS", default_value_t = 5)]
    pub lock_wait_secs: u64,

    /// Lock acquire poll interval in milliseconds
    #[arg(long, env = "LOCK_POLL_MS", default_value_t = 100)]
    pub lock_poll_ms: u64,

    /// Failures within the window that trip the breaker
    #[arg(long, env = "BREAKER_FAILURE_THRESHOLD", default_value_t = 5)]
    pub breaker_failure_threshold: usize,

    /// Breaker rolling window in seconds
    #[arg(long, env = "BREAKER_WINDOW_SECS", default_value_t = 30)]
    pub breaker_window_secs: u64,

    /// Minimum observed calls before the breaker window is evaluated
    #[arg(long, env = "BREAKER_MINIMUM_CALLS", default_value_t = 5)]
    pub breaker_minimum_calls: usize,

    /// Seconds the breaker stays open before probing
    #[arg(long, env = "BREAKER_COOLDOWN_SECS", default_value_t = 30)]
    pub breaker_cooldown_secs: u64,

    /// Consecutive probe successes required to close the breaker
    #[arg(long, env = "BREAKER_SUCCESS_THRESHOLD", default_value_t = 2)]
    pub breaker_success_threshold: usize,
}

impl Config {
    pub fn cache(&self) -> CacheConfig {
        CacheConfig {
            fresh_ttl: Duration::from_secs(self.fresh_ttl_secs),
            stale_ttl: Duration::from_secs(self.stale_ttl_secs),
        }
    }

    pub fn lock(&self) -> LockConfig {
        LockConfig {
            hold_ttl: Duration::from_secs(self.lock_hold_secs),
            wait_budget: Duration::from_secs(self.lock_wait_secs),
            poll_interval: Duration::from_millis(self.lock_poll_ms),
        }
    }

    pub fn upstream(&self) -> UpstreamConfig {
        UpstreamConfig {
            base_url: self.rate_api_url.clone(),
            token: self.rate_api_token.clone(),
            call_timeout: Duration::from_secs(self.upstream_timeout_secs),
        }
    }

    pub fn breaker_builder(&self) -> CircuitBreakerConfigBuilder<String, UpstreamError> {
        CircuitBreaker::builder()
            .name("rate-api")
            .failure_threshold(self.breaker_failure_threshold)
            .window(Duration::from_secs(self.breaker_window_secs))
            .minimum_calls(self.breaker_minimum_calls)
            .open_cooldown(Duration::from_secs(self.breaker_cooldown_secs))
            .success_threshold(self.breaker_success_threshold)
    }
}
