//! Two-tier rate cache over the shared store.

use crate::{SharedStore, StoreError};
use std::sync::Arc;
use std::time::Duration;

/// The two TTL'd views of a rate. `Fresh` satisfies the upstream's freshness
/// contract; `Stale` outlives it to support degraded mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Fresh,
    Stale,
}

impl Namespace {
    fn prefix(self) -> &'static str {
        match self {
            Namespace::Fresh => "fresh",
            Namespace::Stale => "stale",
        }
    }

    fn storage_key(self, key: &str) -> String {
        format!("{}:{}", self.prefix(), key)
    }
}

/// TTLs for the two namespaces.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    pub fresh_ttl: Duration,
    pub stale_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            fresh_ttl: Duration::from_secs(5 * 60),
            stale_ttl: Duration::from_secs(30 * 60),
        }
    }
}

/// Namespaced cache facade over a [`SharedStore`].
#[derive(Clone)]
pub struct RateCache {
    store: Arc<dyn SharedStore>,
    config: CacheConfig,
}

impl RateCache {
    pub fn new(store: Arc<dyn SharedStore>, config: CacheConfig) -> Self {
        Self { store, config }
    }

    fn ttl(&self, namespace: Namespace) -> Duration {
        match namespace {
            Namespace::Fresh => self.config.fresh_ttl,
            Namespace::Stale => self.config.stale_ttl,
        }
    }

    pub async fn get(&self, namespace: Namespace, key: &str) -> Result<Option<String>, StoreError> {
        self.store.get(&namespace.storage_key(key)).await
    }

    pub async fn put(
        &self,
        namespace: Namespace,
        key: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        self.store
            .put(&namespace.storage_key(key), value, self.ttl(namespace))
            .await
    }

    /// Writes `value` to both namespaces, fresh first. Every successful
    /// upstream response goes through here so the stale copy never misses an
    /// update the fresh copy saw.
    pub async fn write_through(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.put(Namespace::Fresh, key, value).await?;
        self.put(Namespace::Stale, key, value).await?;
        Ok(())
    }
}
