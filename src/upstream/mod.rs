//! Outbound calls.
//!
//! One shared `reqwest::Client` per process; its default pooling provides
//! connection reuse across requests.

pub mod client;

pub use client::{UpstreamClient, UpstreamError};
