//! Shared key-value store with the two abstractions the pricing proxy builds
//! on it: a two-tier (fresh + stale) rate cache and a distributed mutex.
//!
//! The store itself is behind the [`SharedStore`] trait so the production
//! Redis backend and the in-memory test backend are interchangeable. All
//! entries are TTL-bounded; nothing here is durable.
//!
//! When the store is unreachable every operation fails with
//! [`StoreError::Unavailable`]. Callers are expected to surface that error
//! rather than bypass the store: skipping the lock layer would reintroduce
//! the thundering-herd pathology the proxy exists to prevent.

use async_trait::async_trait;
use std::time::Duration;

pub use cache::{CacheConfig, Namespace, RateCache};
pub use error::StoreError;
pub use lock::{DistributedMutex, LockConfig, LockError, LockGuard};
pub use memory::MemoryStore;
pub use self::redis::RedisStore;

mod cache;
mod error;
mod lock;
mod memory;
mod redis;

/// A shared key-value store with per-entry TTLs.
///
/// Individual operations are atomic with respect to a single key. Concurrent
/// `put`s on the same key are last-writer-wins.
#[async_trait]
pub trait SharedStore: Send + Sync {
    /// Returns the live value for `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes `value` under `key` with the given TTL, replacing any existing
    /// entry.
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Writes `value` under `key` only if no live entry exists. Returns
    /// whether the write happened.
    async fn put_nx(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, StoreError>;

    /// Deletes `key` only if its current value equals `token`. Returns
    /// whether a deletion happened.
    async fn del_if_owner(&self, key: &str, token: &str) -> Result<bool, StoreError>;
}
