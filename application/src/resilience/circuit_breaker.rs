//! Circuit Breaker over a sliding window of call outcomes
//!
//! - Closed: calls pass through; opens when the window is full and its
//!   failure rate exceeds the threshold
//! - Open: calls are rejected until the recovery timeout elapses
//! - HalfOpen: exactly one probe call is let through; its outcome closes
//!   (clearing the window) or reopens the circuit

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half_open"),
        }
    }
}

/// Configuration for circuit breaker
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitBreakerConfig {
    /// Number of most recent outcomes considered; at least 1
    pub window_size: usize,
    /// Failure rate above which the circuit opens
    pub failure_threshold: f64,
    /// Time spent open before a probe is allowed
    pub recovery_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            window_size: 10,
            failure_threshold: 0.5,
            recovery_timeout: Duration::from_secs(30),
        }
    }
}

impl CircuitBreakerConfig {
    #[must_use]
    pub fn with_window_size(mut self, size: usize) -> Self {
        self.window_size = size;
        self
    }

    #[must_use]
    pub fn with_failure_threshold(mut self, threshold: f64) -> Self {
        self.failure_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_recovery_timeout(mut self, timeout: Duration) -> Self {
        self.recovery_timeout = timeout;
        self
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum CircuitError<E> {
    /// Rejected without calling the wrapped operation
    #[error("Circuit breaker '{0}' is open")]
    Open(String),

    #[error(transparent)]
    Inner(E),
}

struct BreakerState {
    state: CircuitState,
    /// `true` = success
    window: VecDeque<bool>,
    opened_at: Option<Instant>,
    probe_in_flight: bool,
}

/// Circuit breaker for one guarded dependency
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        let config = CircuitBreakerConfig {
            window_size: config.window_size.max(1),
            ..config
        };
        Self {
            name: name.into(),
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                window: VecDeque::with_capacity(config.window_size),
                opened_at: None,
                probe_in_flight: false,
            }),
            config,
        }
    }

    pub fn with_defaults(name: impl Into<String>) -> Self {
        Self::new(name, CircuitBreakerConfig::default())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    /// Failure rate over the current window; 0 when empty.
    pub fn failure_rate(&self) -> f64 {
        let inner = self.lock();
        failure_rate(&inner.window)
    }

    /// Run `operation` through the breaker.
    pub async fn execute<T, E, F, Fut>(&self, operation: F) -> Result<T, CircuitError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut permit = self.acquire::<E>()?;
        let result = operation().await;
        permit.settled = true;
        self.record(result.is_ok());
        result.map_err(CircuitError::Inner)
    }

    fn acquire<E>(&self) -> Result<Permit<'_>, CircuitError<E>> {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => Ok(Permit::new(self, false)),
            CircuitState::Open => {
                let elapsed = inner
                    .opened_at
                    .is_none_or(|at| at.elapsed() >= self.config.recovery_timeout);
                if elapsed {
                    inner.state = CircuitState::HalfOpen;
                    inner.probe_in_flight = true;
                    info!(breaker = %self.name, "Circuit breaker half-open, sending probe");
                    Ok(Permit::new(self, true))
                } else {
                    debug!(breaker = %self.name, "Circuit breaker open, rejecting call");
                    Err(CircuitError::Open(self.name.clone()))
                }
            }
            CircuitState::HalfOpen => {
                if inner.probe_in_flight {
                    Err(CircuitError::Open(self.name.clone()))
                } else {
                    inner.probe_in_flight = true;
                    Ok(Permit::new(self, true))
                }
            }
        }
    }

    fn record(&self, success: bool) {
        let mut inner = self.lock();
        if inner.window.len() >= self.config.window_size {
            inner.window.pop_front();
        }
        inner.window.push_back(success);

        match (inner.state, success) {
            (CircuitState::HalfOpen, true) => {
                inner.state = CircuitState::Closed;
                inner.window.clear();
                inner.opened_at = None;
                inner.probe_in_flight = false;
                info!(breaker = %self.name, "Circuit breaker closed");
            }
            (CircuitState::HalfOpen, false) => {
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                inner.probe_in_flight = false;
                warn!(breaker = %self.name, "Probe failed, circuit breaker reopened");
            }
            (CircuitState::Closed, false) => {
                let rate = failure_rate(&inner.window);
                if inner.window.len() >= self.config.window_size
                    && rate > self.config.failure_threshold
                {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(Instant::now());
                    warn!(
                        breaker = %self.name,
                        failure_rate = rate,
                        "Circuit breaker opened"
                    );
                }
            }
            _ => {}
        }
    }

    /// A probe dropped before it settled frees the half-open slot.
    fn abandon_probe(&self) {
        let mut inner = self.lock();
        if inner.state == CircuitState::HalfOpen {
            inner.probe_in_flight = false;
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn failure_rate(window: &VecDeque<bool>) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let failures = window.iter().filter(|ok| !**ok).count();
    failures as f64 / window.len() as f64
}

struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    probe: bool,
    settled: bool,
}

impl<'a> Permit<'a> {
    fn new(breaker: &'a CircuitBreaker, probe: bool) -> Self {
        Self {
            breaker,
            probe,
            settled: false,
        }
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if self.probe && !self.settled {
            self.breaker.abandon_probe();
        }
    }
}
