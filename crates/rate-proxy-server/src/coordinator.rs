//! The orchestration state machine between the HTTP edge and the upstream
//! client: cache probe, keyed lock, double-check, breaker-wrapped fetch,
//! two-namespace write, with typed errors for everything that can go wrong.

use crate::types::RateQuery;
use rate_proxy_breaker::{
    CircuitBreaker, CircuitBreakerConfigBuilder, CircuitBreakerError, CircuitState,
};
use rate_proxy_store::{DistributedMutex, LockError, Namespace, RateCache, StoreError};
use rate_proxy_upstream::{RateSource, UpstreamError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Failures surfaced by [`RateCoordinator::resolve`].
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// The breaker refused the call without contacting the upstream.
    #[error("pricing upstream circuit is open")]
    BreakerOpen,

    /// The key's lock stayed contended through the wait budget and no cached
    /// value was available.
    #[error("service temporarily busy")]
    Busy,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Wires a breaker for the upstream with the coordinator's failure policy:
/// only infrastructure kinds (timeout, 5xx, network) count toward the window.
pub fn upstream_breaker(
    builder: CircuitBreakerConfigBuilder<String, UpstreamError>,
) -> CircuitBreaker<String, UpstreamError> {
    builder
        .failure_classifier(|result| matches!(result, Err(e) if e.is_infrastructure()))
        .build()
}

/// Resolves rates through the shared cache with cross-process single-flight.
pub struct RateCoordinator {
    cache: RateCache,
    mutex: DistributedMutex,
    breaker: CircuitBreaker<String, UpstreamError>,
    source: Arc<dyn RateSource>,
}

impl RateCoordinator {
    pub fn new(
        cache: RateCache,
        mutex: DistributedMutex,
        breaker: CircuitBreaker<String, UpstreamError>,
        source: Arc<dyn RateSource>,
    ) -> Self {
        Self {
            cache,
            mutex,
            breaker,
            source,
        }
    }

    /// Returns the rate for `query`, from the fresh cache or via a single
    /// coordinated upstream call.
    pub async fn resolve(&self, query: &RateQuery) -> Result<String, ResolveError> {
        let key = query.cache_key();

        if let Some(rate) = self.cache.get(Namespace::Fresh, &key).await? {
            return Ok(rate);
        }
        debug!(%key, "fresh cache miss");

        let lock_name = format!("lock:{key}");
        match self
            .mutex
            .with_lock(&lock_name, || self.fetch_and_store(query, &key))
            .await
        {
            Ok(outcome) => outcome,
            Err(LockError::Unavailable) => {
                warn!(%key, "lock wait budget exhausted");
                // The holder may have refreshed the key while we polled.
                match self.cache.get(Namespace::Fresh, &key).await? {
                    Some(rate) => Ok(rate),
                    None => Err(ResolveError::Busy),
                }
            }
            Err(LockError::Store(err)) => Err(err.into()),
        }
    }

    async fn fetch_and_store(&self, query: &RateQuery, key: &str) -> Result<String, ResolveError> {
        // Another instance may have refreshed the key while we waited on the
        // lock; only the first holder of a miss episode reaches the upstream.
        if let Some(rate) = self.cache.get(Namespace::Fresh, key).await? {
            return Ok(rate);
        }

        info!(%key, "fetching rate from upstream");
        let rate = self
            .breaker
            .call(self.source.fetch_rate(
                query.period.as_str(),
                query.hotel.as_str(),
                query.room.as_str(),
            ))
            .await
            .map_err(|err| match err {
                CircuitBreakerError::Open => ResolveError::BreakerOpen,
                CircuitBreakerError::Inner(err) => ResolveError::Upstream(err),
            })?;

        self.cache.write_through(key, &rate).await?;
        Ok(rate)
    }

    /// Reads the stale namespace; the edge consults this for degraded mode.
    pub async fn stale_rate(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.cache.get(Namespace::Stale, key).await
    }

    /// Current breaker state, readable without async context.
    pub fn breaker_state(&self) -> CircuitState {
        self.breaker.state_sync()
    }
}
