//! Process-local circuit breaker for calls to the upstream pricing API.
//!
//! The breaker prevents cascading failures by tracking call outcomes over a
//! rolling time window and rejecting calls outright once the upstream looks
//! unhealthy.
//!
//! ## States
//! - **Closed**: normal operation, all calls pass through
//! - **Open**: the circuit is tripped, calls are rejected immediately
//! - **Half-Open**: after a cooldown, a bounded number of probe calls test
//!   whether the upstream has recovered
//!
//! ## Example
//!
//! ```rust
//! use rate_proxy_breaker::{CircuitBreaker, CircuitBreakerError};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let breaker: CircuitBreaker<String, std::io::Error> = CircuitBreaker::builder()
//!     .failure_threshold(5)             // open at 5 failures...
//!     .window(Duration::from_secs(30))  // ...within 30 seconds
//!     .minimum_calls(5)
//!     .open_cooldown(Duration::from_secs(30))
//!     .success_threshold(2)
//!     .name("rate-api")
//!     .build();
//!
//! match breaker.call(async { Ok("42".to_string()) }).await {
//!     Ok(value) => println!("got {value}"),
//!     Err(CircuitBreakerError::Open) => eprintln!("circuit open, not calling"),
//!     Err(CircuitBreakerError::Inner(e)) => eprintln!("call failed: {e}"),
//! }
//! # }
//! ```
//!
//! Failure counting is delegated to a caller-supplied classifier so that
//! errors reflecting caller bugs (as opposed to upstream health) can be
//! excluded from the window:
//!
//! ```rust
//! use rate_proxy_breaker::CircuitBreaker;
//!
//! let breaker: CircuitBreaker<String, std::io::Error> = CircuitBreaker::builder()
//!     .failure_classifier(|result: &Result<String, std::io::Error>| {
//!         matches!(result, Err(e) if e.kind() != std::io::ErrorKind::InvalidInput)
//!     })
//!     .build();
//! ```
//!
//! ## Feature flags
//! - `tracing`: log state transitions and rejected calls via the `tracing` crate
//! - `metrics`: emit call/transition counters via the `metrics` crate

use crate::circuit::Circuit;
use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

pub use circuit::CircuitState;
pub use config::{CircuitBreakerConfig, CircuitBreakerConfigBuilder};
pub use error::CircuitBreakerError;

mod circuit;
mod config;
mod error;

pub(crate) type FailureClassifier<T, E> = dyn Fn(&Result<T, E>) -> bool + Send + Sync;
pub(crate) type SharedFailureClassifier<T, E> = Arc<FailureClassifier<T, E>>;

/// A circuit breaker that wraps individual async calls.
///
/// State is process-local and shared across tasks; cold start is `Closed`.
pub struct CircuitBreaker<T, E> {
    circuit: Mutex<Circuit>,
    state_atomic: Arc<AtomicU8>,
    config: CircuitBreakerConfig<T, E>,
}

impl<T, E> CircuitBreaker<T, E> {
    /// Returns a new builder with default settings.
    pub fn builder() -> CircuitBreakerConfigBuilder<T, E> {
        CircuitBreakerConfigBuilder::new()
    }

    pub(crate) fn new(config: CircuitBreakerConfig<T, E>) -> Self {
        let state_atomic = Arc::new(AtomicU8::new(CircuitState::Closed as u8));
        Self {
            circuit: Mutex::new(Circuit::new_with_atomic(Arc::clone(&state_atomic))),
            state_atomic,
            config,
        }
    }

    /// Runs `fut` under the breaker.
    ///
    /// In `Open`, the future is dropped without being polled and
    /// [`CircuitBreakerError::Open`] is returned immediately. Otherwise the
    /// outcome is recorded against the rolling window according to the
    /// configured failure classifier.
    pub async fn call<F>(&self, fut: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: Future<Output = Result<T, E>>,
    {
        let permitted = {
            let mut circuit = self.circuit.lock().await;
            circuit.try_acquire(&self.config)
        };

        if !permitted {
            #[cfg(feature = "tracing")]
            tracing::warn!(breaker = %self.config.name, "call rejected; circuit open");
            return Err(CircuitBreakerError::Open);
        }

        let result = fut.await;

        let mut circuit = self.circuit.lock().await;
        if (self.config.failure_classifier)(&result) {
            circuit.record_failure(&self.config);
        } else {
            circuit.record_success(&self.config);
        }

        result.map_err(CircuitBreakerError::Inner)
    }

    /// Returns the current state of the circuit.
    pub async fn state(&self) -> CircuitState {
        let circuit = self.circuit.lock().await;
        circuit.state()
    }

    /// Returns the current state without requiring async context.
    ///
    /// Safe to call from sync code (health checks, metrics collection); reads
    /// an `AtomicU8` kept synchronized with the actual state.
    pub fn state_sync(&self) -> CircuitState {
        CircuitState::from_u8(self.state_atomic.load(Ordering::Acquire))
    }

    /// Forces the circuit into the open state.
    pub async fn force_open(&self) {
        let mut circuit = self.circuit.lock().await;
        circuit.force_open(&self.config);
    }

    /// Forces the circuit into the closed state.
    pub async fn force_closed(&self) {
        let mut circuit = self.circuit.lock().await;
        circuit.force_closed(&self.config);
    }

    /// Resets the circuit to closed and clears the window.
    pub async fn reset(&self) {
        let mut circuit = self.circuit.lock().await;
        circuit.reset(&self.config);
    }
}
