//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Logging/metrics → Bind → Serve
//!
//! Shutdown:
//!     signals.rs (SIGINT/SIGTERM)
//!     → shutdown.rs broadcast
//!     → server stops accepting, drains in-flight requests, exits
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
