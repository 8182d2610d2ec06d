use crate::{CircuitBreaker, SharedFailureClassifier};
use std::sync::Arc;
use std::time::Duration;

/// Configuration for the circuit breaker.
pub struct CircuitBreakerConfig<T, E> {
    pub(crate) failure_threshold: usize,
    pub(crate) window: Duration,
    pub(crate) minimum_calls: usize,
    pub(crate) open_cooldown: Duration,
    pub(crate) success_threshold: usize,
    pub(crate) failure_classifier: SharedFailureClassifier<T, E>,
    pub(crate) name: String,
}

impl<T, E> CircuitBreakerConfig<T, E> {
    /// Creates a new configuration builder.
    pub fn builder() -> CircuitBreakerConfigBuilder<T, E> {
        CircuitBreakerConfigBuilder::new()
    }
}

/// Builder for configuring and constructing a [`CircuitBreaker`].
pub struct CircuitBreakerConfigBuilder<T, E> {
    failure_threshold: usize,
    window: Duration,
    minimum_calls: usize,
    open_cooldown: Duration,
    success_threshold: usize,
    failure_classifier: SharedFailureClassifier<T, E>,
    name: String,
}

impl<T, E> CircuitBreakerConfigBuilder<T, E> {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            failure_threshold: 5,
            window: Duration::from_secs(30),
            minimum_calls: 5,
            open_cooldown: Duration::from_secs(30),
            success_threshold: 2,
            failure_classifier: Arc::new(|result| result.is_err()),
            name: String::from("<unnamed>"),
        }
    }

    /// Sets the number of failures within the window at which the circuit opens.
    ///
    /// Default: 5
    pub fn failure_threshold(mut self, n: usize) -> Self {
        self.failure_threshold = n;
        self
    }

    /// Sets the duration of the rolling window over which failures are counted.
    ///
    /// Default: 30 seconds
    pub fn window(mut self, duration: Duration) -> Self {
        self.window = duration;
        self
    }

    /// Sets the minimum number of observed calls before the window is evaluated.
    ///
    /// Default: 5
    pub fn minimum_calls(mut self, n: usize) -> Self {
        self.minimum_calls = n;
        self
    }

    /// Sets the duration the circuit remains open before admitting probe calls.
    ///
    /// Default: 30 seconds
    pub fn open_cooldown(mut self, duration: Duration) -> Self {
        self.open_cooldown = duration;
        self
    }

    /// Sets the number of consecutive probe successes required to close the
    /// circuit from half-open. One probe failure reopens it.
    ///
    /// Default: 2
    pub fn success_threshold(mut self, n: usize) -> Self {
        self.success_threshold = n;
        self
    }

    /// Sets a custom failure classifier. Only results the classifier marks as
    /// failures count toward the window.
    ///
    /// Default: classifies every `Err` as a failure
    pub fn failure_classifier<F>(mut self, classifier: F) -> Self
    where
        F: Fn(&Result<T, E>) -> bool + Send + Sync + 'static,
    {
        self.failure_classifier = Arc::new(classifier);
        self
    }

    /// Give this breaker a human-readable name for observability.
    ///
    /// Default: `<unnamed>`
    pub fn name<N: Into<String>>(mut self, n: N) -> Self {
        self.name = n.into();
        self
    }

    pub(crate) fn into_config(self) -> CircuitBreakerConfig<T, E> {
        CircuitBreakerConfig {
            failure_threshold: self.failure_threshold,
            window: self.window,
            minimum_calls: self.minimum_calls,
            open_cooldown: self.open_cooldown,
            success_threshold: self.success_threshold,
            failure_classifier: self.failure_classifier,
            name: self.name,
        }
    }

    /// Builds the configured circuit breaker.
    pub fn build(self) -> CircuitBreaker<T, E> {
        CircuitBreaker::new(self.into_config())
    }
}

impl<T, E> Default for CircuitBreakerConfigBuilder<T, E> {
    fn default() -> Self {
        Self::new()
    }
}
