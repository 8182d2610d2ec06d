//! Client for the external pricing API.
//!
//! One operation: fetch the current rate for a `(period, hotel, room)` tuple.
//! The HTTP implementation enforces a hard per-call deadline and classifies
//! every outcome into a typed [`UpstreamError`] kind so the layers above
//! (circuit breaker, coordinator, edge) can make policy decisions without
//! inspecting strings. No retries happen here.

use async_trait::async_trait;

pub use client::{RateApiClient, UpstreamConfig};
pub use error::UpstreamError;

mod client;
mod error;

/// Source of rates, abstracted so tests can substitute a scripted stub for
/// the real pricing API.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetches the current rate for the tuple. The returned value is opaque:
    /// the proxy passes it through without parsing it as a number.
    async fn fetch_rate(
        &self,
        period: &str,
        hotel: &str,
        room: &str,
    ) -> Result<String, UpstreamError>;
}
