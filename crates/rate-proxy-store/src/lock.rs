//! Distributed mutex over the shared store.
//!
//! A lock is a store entry whose value is the owner's token. The hold TTL
//! bounds how long a crashed holder can block other instances; release is
//! fenced on the token so a holder that outlived its TTL cannot delete a
//! successor's lock.

use crate::{SharedStore, StoreError};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, Instant};
use tracing::warn;
use uuid::Uuid;

/// Errors returned by [`DistributedMutex`] acquisition.
#[derive(Debug, Error)]
pub enum LockError {
    /// The wait budget elapsed without the lock becoming free.
    #[error("lock wait budget exhausted")]
    Unavailable,

    /// The shared store failed while acquiring.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Timing parameters for lock acquisition and hold.
#[derive(Debug, Clone, Copy)]
pub struct LockConfig {
    /// Auto-release guard against holder death. Must exceed the longest
    /// operation performed under the lock.
    pub hold_ttl: Duration,
    /// How long an acquirer polls before giving up.
    pub wait_budget: Duration,
    /// Interval between acquisition attempts.
    pub poll_interval: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            hold_ttl: Duration::from_secs(10),
            wait_budget: Duration::from_secs(5),
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Named-lock service on the shared store.
///
/// At most one holder per name at any instant across all processes, subject
/// to the hold TTL.
#[derive(Clone)]
pub struct DistributedMutex {
    store: Arc<dyn SharedStore>,
    config: LockConfig,
}

impl DistributedMutex {
    pub fn new(store: Arc<dyn SharedStore>, config: LockConfig) -> Self {
        Self { store, config }
    }

    /// Attempts to acquire the lock named `name`, polling until the wait
    /// budget is exhausted.
    pub async fn acquire(&self, name: &str) -> Result<LockGuard, LockError> {
        let token = Uuid::new_v4().to_string();
        let deadline = Instant::now() + self.config.wait_budget;

        loop {
            if self
                .store
                .put_nx(name, &token, self.config.hold_ttl)
                .await?
            {
                return Ok(LockGuard {
                    store: Arc::clone(&self.store),
                    key: name.to_owned(),
                    token,
                    released: false,
                });
            }

            if Instant::now() + self.config.poll_interval > deadline {
                return Err(LockError::Unavailable);
            }
            sleep(self.config.poll_interval).await;
        }
    }

    /// Runs `body` while holding the lock named `name`, releasing it on all
    /// exit paths. `body`'s own output is passed through untouched.
    pub async fn with_lock<F, Fut, T>(&self, name: &str, body: F) -> Result<T, LockError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let guard = self.acquire(name).await?;
        let out = body().await;
        guard.release().await;
        Ok(out)
    }
}

/// Proof of lock ownership. Prefer [`LockGuard::release`]; dropping the guard
/// without releasing spawns a best-effort release task (the hold TTL covers
/// the case where that task never runs).
pub struct LockGuard {
    store: Arc<dyn SharedStore>,
    key: String,
    token: String,
    released: bool,
}

impl LockGuard {
    /// Releases the lock. A failed release is logged and left to expire with
    /// the hold TTL.
    pub async fn release(mut self) {
        self.released = true;
        if let Err(err) = self.store.del_if_owner(&self.key, &self.token).await {
            warn!(key = %self.key, error = %err, "failed to release lock; entry expires with hold TTL");
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let store = Arc::clone(&self.store);
        let key = std::mem::take(&mut self.key);
        let token = std::mem::take(&mut self.token);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let _ = store.del_if_owner(&key, &token).await;
            });
        }
    }
}
