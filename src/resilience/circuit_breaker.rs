//! Circuit breaker guarding calls to a remote dependency.
//!
//! # States
//! - Closed: normal operation, calls pass through and are recorded
//! - Open: dependency assumed down, calls are rejected without running
//! - Half-Open: a limited number of trial calls probe for recovery
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure rate over the sliding window >= threshold
//! Open → Half-Open: first call after the open wait duration
//! Half-Open → Closed: trial calls finish below the threshold
//! Half-Open → Open: trial calls finish at or above the threshold
//! ```
//!
//! # Design Decisions
//! - Count-based window; the rate is only evaluated once
//!   `minimum_number_of_calls` outcomes are buffered
//! - Open → Half-Open is evaluated lazily when a permission is requested
//! - One mutex per breaker: window update and transition happen together
//! - Every transition bumps a generation; outcomes carrying an older
//!   generation are discarded

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::CircuitBreakerConfig;
use crate::observability::metrics;

/// Externally visible breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when the breaker refuses to let a call through.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("circuit breaker '{name}' is {state} and does not permit further calls")]
pub struct CallNotPermitted {
    pub name: String,
    pub state: CircuitState,
}

/// Failure of a call routed through [`CircuitBreaker::run`].
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    #[error(transparent)]
    NotPermitted(#[from] CallNotPermitted),

    #[error("protected call failed: {0}")]
    Failed(#[source] E),
}

/// Point-in-time view of a breaker, served by the admin endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakerSnapshot {
    pub name: String,
    pub state: CircuitState,
    /// Failure percentage, absent until enough calls are buffered.
    pub failure_rate: Option<f32>,
    pub buffered_calls: usize,
    pub failed_calls: usize,
    pub not_permitted_calls: u64,
    pub transitions: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

/// Fixed-size ring of the most recent call outcomes.
#[derive(Debug)]
struct SlidingWindow {
    outcomes: VecDeque<Outcome>,
    capacity: usize,
    failures: usize,
}

impl SlidingWindow {
    fn new(capacity: usize) -> Self {
        Self {
            outcomes: VecDeque::with_capacity(capacity),
            capacity,
            failures: 0,
        }
    }

    fn record(&mut self, outcome: Outcome) {
        if self.outcomes.len() == self.capacity {
            if let Some(Outcome::Failure) = self.outcomes.pop_front() {
                self.failures -= 1;
            }
        }
        self.outcomes.push_back(outcome);
        if outcome == Outcome::Failure {
            self.failures += 1;
        }
    }

    fn len(&self) -> usize {
        self.outcomes.len()
    }

    fn failures(&self) -> usize {
        self.failures
    }

    /// Failure percentage, or `None` while fewer than `minimum` calls are buffered.
    fn failure_rate(&self, minimum: usize) -> Option<f32> {
        let len = self.outcomes.len();
        if len == 0 || len < minimum {
            return None;
        }
        Some(self.failures as f32 * 100.0 / len as f32)
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Closed,
    Open { since: Instant },
    HalfOpen { admitted: usize },
}

impl Phase {
    fn state(&self) -> CircuitState {
        match self {
            Phase::Closed => CircuitState::Closed,
            Phase::Open { .. } => CircuitState::Open,
            Phase::HalfOpen { .. } => CircuitState::HalfOpen,
        }
    }
}

#[derive(Debug)]
struct Inner {
    phase: Phase,
    window: SlidingWindow,
    generation: u64,
    not_permitted: u64,
    transitions: u64,
}

/// A named circuit breaker. Share it behind an `Arc`.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    /// Create a closed breaker.
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        let window = SlidingWindow::new(config.sliding_window_size);
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(Inner {
                phase: Phase::Closed,
                window,
                generation: 0,
                not_permitted: 0,
                transitions: 0,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Current state. An open breaker whose wait has elapsed still reports
    /// `Open` until the next permission request moves it to half-open.
    pub fn state(&self) -> CircuitState {
        self.lock().phase.state()
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let inner = self.lock();
        let minimum = match inner.phase {
            Phase::HalfOpen { .. } => self.config.permitted_calls_in_half_open,
            _ => self.config.minimum_number_of_calls,
        };
        BreakerSnapshot {
            name: self.name.clone(),
            state: inner.phase.state(),
            failure_rate: inner.window.failure_rate(minimum),
            buffered_calls: inner.window.len(),
            failed_calls: inner.window.failures(),
            not_permitted_calls: inner.not_permitted,
            transitions: inner.transitions,
        }
    }

    /// Ask for permission to make one call.
    ///
    /// The returned permit must be settled with `record_success` or
    /// `record_failure`; dropping it unsettled only frees a half-open slot.
    pub fn try_acquire(self: &Arc<Self>) -> Result<CallPermit, CallNotPermitted> {
        let mut inner = self.lock();

        let phase = inner.phase;
        let probe = match phase {
            Phase::Closed => false,
            Phase::Open { since } => {
                if since.elapsed() < self.config.wait_duration_in_open_state() {
                    return Err(self.reject(&mut inner));
                }
                self.transition(&mut inner, Phase::HalfOpen { admitted: 1 });
                true
            }
            Phase::HalfOpen { admitted } => {
                if admitted >= self.config.permitted_calls_in_half_open {
                    return Err(self.reject(&mut inner));
                }
                inner.phase = Phase::HalfOpen { admitted: admitted + 1 };
                true
            }
        };

        Ok(CallPermit {
            breaker: self.clone(),
            generation: inner.generation,
            probe,
            settled: false,
        })
    }

    /// Run `action` under the breaker, recording its outcome.
    pub async fn run<F, Fut, T, E>(self: &Arc<Self>, action: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let permit = self.try_acquire()?;
        match action().await {
            Ok(value) => {
                permit.record_success();
                Ok(value)
            }
            Err(e) => {
                permit.record_failure();
                Err(BreakerError::Failed(e))
            }
        }
    }

    /// Like [`run`](Self::run), but every error is turned into a value by `fallback`.
    pub async fn run_with_fallback<F, Fut, T, E, FB>(self: &Arc<Self>, action: F, fallback: FB) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        FB: FnOnce(BreakerError<E>) -> T,
    {
        match self.run(action).await {
            Ok(value) => value,
            Err(e) => fallback(e),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reject(&self, inner: &mut Inner) -> CallNotPermitted {
        inner.not_permitted += 1;
        metrics::record_breaker_call(&self.name, "not_permitted");
        CallNotPermitted {
            name: self.name.clone(),
            state: inner.phase.state(),
        }
    }

    fn on_outcome(&self, generation: u64, outcome: Outcome) {
        metrics::record_breaker_call(&self.name, outcome.as_str());

        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::debug!(
                breaker = %self.name,
                outcome = outcome.as_str(),
                "Discarding outcome from a previous breaker state"
            );
            return;
        }

        let phase = inner.phase;
        match phase {
            Phase::Closed => {
                inner.window.record(outcome);
                if let Some(rate) = inner.window.failure_rate(self.config.minimum_number_of_calls) {
                    if rate >= self.config.failure_rate_threshold {
                        tracing::warn!(
                            breaker = %self.name,
                            failure_rate = rate,
                            threshold = self.config.failure_rate_threshold,
                            "Failure rate exceeded threshold"
                        );
                        self.transition(&mut inner, Phase::Open { since: Instant::now() });
                    }
                }
            }
            Phase::HalfOpen { .. } => {
                inner.window.record(outcome);
                let trials = self.config.permitted_calls_in_half_open;
                if let Some(rate) = inner.window.failure_rate(trials) {
                    if rate >= self.config.failure_rate_threshold {
                        self.transition(&mut inner, Phase::Open { since: Instant::now() });
                    } else {
                        self.transition(&mut inner, Phase::Closed);
                    }
                }
            }
            // Entering Open bumps the generation, so no live permit can land here.
            Phase::Open { .. } => {}
        }
    }

    fn release_probe(&self, generation: u64) {
        let mut inner = self.lock();
        if inner.generation != generation {
            return;
        }
        let phase = inner.phase;
        if let Phase::HalfOpen { admitted } = phase {
            inner.phase = Phase::HalfOpen {
                admitted: admitted.saturating_sub(1),
            };
        }
    }

    fn transition(&self, inner: &mut Inner, to: Phase) {
        let from = inner.phase.state();
        let window_size = match to {
            Phase::HalfOpen { .. } => self.config.permitted_calls_in_half_open,
            _ => self.config.sliding_window_size,
        };

        inner.phase = to;
        inner.window = SlidingWindow::new(window_size);
        inner.generation += 1;
        inner.transitions += 1;

        let to = to.state();
        if to == CircuitState::Open {
            tracing::warn!(breaker = %self.name, from = %from, to = %to, "Circuit breaker state transition");
        } else {
            tracing::info!(breaker = %self.name, from = %from, to = %to, "Circuit breaker state transition");
        }
        metrics::record_breaker_state(&self.name, to);
    }
}

/// Permission to make one call through a breaker.
#[derive(Debug)]
pub struct CallPermit {
    breaker: Arc<CircuitBreaker>,
    generation: u64,
    probe: bool,
    settled: bool,
}

impl CallPermit {
    pub fn record_success(mut self) {
        self.settled = true;
        self.breaker.on_outcome(self.generation, Outcome::Success);
    }

    pub fn record_failure(mut self) {
        self.settled = true;
        self.breaker.on_outcome(self.generation, Outcome::Failure);
    }

    /// True if this permit is a half-open trial call.
    pub fn is_probe(&self) -> bool {
        self.probe
    }
}

impl Drop for CallPermit {
    fn drop(&mut self) {
        if !self.settled && self.probe {
            self.breaker.release_probe(self.generation);
        }
    }
}
