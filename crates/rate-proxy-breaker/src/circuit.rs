use crate::config::CircuitBreakerConfig;
#[cfg(feature = "metrics")]
use metrics::{counter, gauge};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Represents the state of the circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CircuitState {
    /// The circuit is closed and calls are allowed.
    Closed = 0,
    /// The circuit is open and calls are rejected.
    Open = 1,
    /// The circuit is half-open and a limited number of probe calls are allowed.
    HalfOpen = 2,
}

impl CircuitState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => CircuitState::Open,
            2 => CircuitState::HalfOpen,
            _ => CircuitState::Closed,
        }
    }

    #[cfg(any(feature = "tracing", feature = "metrics"))]
    fn as_str(self) -> &'static str {
        match self {
            CircuitState::Closed => "Closed",
            CircuitState::Open => "Open",
            CircuitState::HalfOpen => "HalfOpen",
        }
    }
}

/// A call observed within the rolling window.
#[derive(Debug, Clone)]
struct CallRecord {
    timestamp: Instant,
    is_failure: bool,
}

pub(crate) struct Circuit {
    state: CircuitState,
    state_atomic: Arc<AtomicU8>,
    last_state_change: Instant,
    call_records: VecDeque<CallRecord>,
    half_open_successes: usize,
    half_open_attempts: usize,
}

impl Circuit {
    pub(crate) fn new_with_atomic(state_atomic: Arc<AtomicU8>) -> Self {
        Self {
            state: CircuitState::Closed,
            state_atomic,
            last_state_change: Instant::now(),
            call_records: VecDeque::new(),
            half_open_successes: 0,
            half_open_attempts: 0,
        }
    }

    pub fn state(&self) -> CircuitState {
        self.state
    }

    /// Drop records that have aged past the rolling window.
    fn cleanup_old_records(&mut self, config: &CircuitBreakerConfig<impl Sized, impl Sized>) {
        let now = Instant::now();
        while let Some(record) = self.call_records.front() {
            if now.duration_since(record.timestamp) > config.window {
                self.call_records.pop_front();
            } else {
                break;
            }
        }
    }

    fn window_stats(&self) -> (usize, usize) {
        let total = self.call_records.len();
        let failures = self.call_records.iter().filter(|r| r.is_failure).count();
        (total, failures)
    }

    pub fn record_success(&mut self, config: &CircuitBreakerConfig<impl Sized, impl Sized>) {
        #[cfg(feature = "metrics")]
        counter!("breaker_calls_total", "breaker" => config.name.clone(), "outcome" => "success")
            .increment(1);

        match self.state {
            CircuitState::HalfOpen => {
                self.half_open_successes += 1;
                if self.half_open_successes >= config.success_threshold {
                    self.transition_to(CircuitState::Closed, config);
                }
            }
            _ => {
                self.cleanup_old_records(config);
                self.call_records.push_back(CallRecord {
                    timestamp: Instant::now(),
                    is_failure: false,
                });
            }
        }
    }

    pub fn record_failure(&mut self, config: &CircuitBreakerConfig<impl Sized, impl Sized>) {
        #[cfg(feature = "metrics")]
        counter!("breaker_calls_total", "breaker" => config.name.clone(), "outcome" => "failure")
            .increment(1);

        match self.state {
            CircuitState::HalfOpen => {
                self.transition_to(CircuitState::Open, config);
            }
            _ => {
                self.cleanup_old_records(config);
                self.call_records.push_back(CallRecord {
                    timestamp: Instant::now(),
                    is_failure: true,
                });
                self.evaluate_window(config);
            }
        }
    }

    pub fn try_acquire(&mut self, config: &CircuitBreakerConfig<impl Sized, impl Sized>) -> bool {
        match self.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                if self.last_state_change.elapsed() >= config.open_cooldown {
                    self.transition_to(CircuitState::HalfOpen, config);
                    self.half_open_attempts += 1;
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => {
                // Probe budget: one admitted call per required success.
                let permitted = self.half_open_attempts < config.success_threshold;
                if permitted {
                    self.half_open_attempts += 1;
                }
                permitted
            }
        }
    }

    pub fn force_open(&mut self, config: &CircuitBreakerConfig<impl Sized, impl Sized>) {
        self.transition_to(CircuitState::Open, config);
    }

    pub fn force_closed(&mut self, config: &CircuitBreakerConfig<impl Sized, impl Sized>) {
        self.transition_to(CircuitState::Closed, config);
    }

    pub fn reset(&mut self, config: &CircuitBreakerConfig<impl Sized, impl Sized>) {
        self.transition_to(CircuitState::Closed, config);
    }

    fn transition_to(
        &mut self,
        state: CircuitState,
        config: &CircuitBreakerConfig<impl Sized, impl Sized>,
    ) {
        if self.state == state {
            return;
        }

        #[cfg(feature = "tracing")]
        tracing::info!(
            breaker = %config.name,
            from = self.state.as_str(),
            to = state.as_str(),
            "circuit state transition"
        );

        #[cfg(feature = "metrics")]
        {
            counter!(
                "breaker_transitions_total",
                "breaker" => config.name.clone(),
                "from" => self.state.as_str(),
                "to" => state.as_str()
            )
            .increment(1);
            gauge!("breaker_state", "breaker" => config.name.clone()).set(state as u8 as f64);
        }

        #[cfg(not(any(feature = "tracing", feature = "metrics")))]
        let _ = config;

        self.state = state;
        self.state_atomic.store(state as u8, Ordering::Release);
        self.last_state_change = Instant::now();
        self.call_records.clear();
        self.half_open_successes = 0;
        self.half_open_attempts = 0;
    }

    fn evaluate_window(&mut self, config: &CircuitBreakerConfig<impl Sized, impl Sized>) {
        let (total, failures) = self.window_stats();

        // Don't evaluate until the minimum observation threshold is met.
        if total < config.minimum_calls {
            return;
        }

        if failures >= config.failure_threshold {
            self.transition_to(CircuitState::Open, config);
        }
    }
}
