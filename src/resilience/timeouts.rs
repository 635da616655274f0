//! Timeout enforcement.
//!
//! Uses Tokio's timer; the wrapped future is dropped (cancelled) when the
//! deadline passes. Elapse is its own error value so callers can tell it
//! apart from transport failures in logs, even though the breaker counts
//! both the same way.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// The deadline passed before the operation completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation timed out after {0:?}")]
pub struct Elapsed(pub Duration);

/// Run `future` with a deadline of `duration`.
pub async fn with_timeout<F>(duration: Duration, future: F) -> Result<F::Output, Elapsed>
where
    F: Future,
{
    tokio::time::timeout(duration, future)
        .await
        .map_err(|_| Elapsed(duration))
}
