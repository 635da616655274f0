//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to the album upstream:
//!     → registry.rs (lookup-or-create the named breaker)
//!     → circuit_breaker.rs (permit or reject; reject → fallback)
//!     → timeouts.rs (deadline on the outbound call)
//!     → circuit_breaker.rs (record success / failure, maybe transition)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - A timeout counts as a failure, same as a transport or status error
//! - No retries: a failed call falls straight back

pub mod circuit_breaker;
pub mod registry;
pub mod timeouts;

pub use circuit_breaker::{
    BreakerError, BreakerSnapshot, CallNotPermitted, CallPermit, CircuitBreaker, CircuitState,
};
pub use registry::BreakerRegistry;
pub use timeouts::{with_timeout, Elapsed};
