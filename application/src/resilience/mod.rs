//! Resilience wrappers for calls to unreliable dependencies

pub mod circuit_breaker;
pub mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitError, CircuitState};
pub use retry::{RetryError, RetryPolicy, retry_with_backoff};
