use thiserror::Error;

/// Typed failure kinds for a single upstream pricing call.
///
/// `Client` and `Protocol` reflect caller or contract bugs; everything the
/// circuit breaker should count lives behind [`UpstreamError::is_infrastructure`].
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    /// The per-call deadline elapsed before a response arrived.
    #[error("upstream pricing request timeout")]
    Timeout,

    /// The upstream rejected the request (HTTP 4xx).
    #[error("{0}")]
    Client(String),

    /// The upstream failed to serve the request (HTTP 5xx).
    #[error("upstream server error: {0}")]
    Server(String),

    /// DNS, connect, or socket failure before a response arrived.
    #[error("could not reach upstream: {0}")]
    Network(String),

    /// A 200 response whose body did not match the wire contract.
    #[error("unexpected upstream response shape: {0}")]
    Protocol(String),

    /// Anything that fits none of the above.
    #[error("upstream request failed: {0}")]
    Other(String),
}

impl UpstreamError {
    /// True for the kinds that reflect upstream health rather than caller or
    /// contract bugs. Only these count toward the circuit breaker window.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            UpstreamError::Timeout | UpstreamError::Server(_) | UpstreamError::Network(_)
        )
    }
}
