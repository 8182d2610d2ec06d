//! Pricing coordinator and HTTP edge for the rate caching proxy.
//!
//! The proxy sits in front of an expensive, rate-limited pricing API and
//! serves `(period, hotel, room)` rate lookups from a shared two-tier cache.
//! On a miss, a distributed lock guarantees that one instance at a time
//! refreshes a given key; a circuit breaker isolates a failing upstream; and
//! when the refresh path fails entirely, the edge falls back to the stale
//! cache tier.
//!
//! Wiring happens in `main`: the shared store, cache, mutex, breaker, and
//! upstream client are constructed once and passed in as explicit
//! collaborators, which is also what the test suites rely on to substitute
//! in-memory backends and scripted upstreams.

pub use config::Config;
pub use coordinator::{upstream_breaker, RateCoordinator, ResolveError};
pub use http::app;
pub use types::{Hotel, ParamError, Period, RateQuery, Room};

mod config;
mod coordinator;
mod http;
mod types;
