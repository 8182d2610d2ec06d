//! End-to-end scenario tests for the rate proxy.
//!
//! The full stack (router, coordinator, breaker, mutex, cache) is assembled
//! exactly as `main` assembles it, with two substitutions: an in-memory
//! shared store and a scripted upstream.
//!
//! - **pricing_flow**: hit/miss behavior, single-flight under concurrency
//! - **degraded_mode**: stale fallback and error-status mapping
//! - **validation**: parameter validation and health probes

mod support;

mod degraded_mode;
mod validation;
