//! Album listing.
//!
//! # Data Flow
//! ```text
//! GET /albums
//!     → AlbumService::get_album_list
//!     → breaker "albums" (registry)
//!     → UpstreamClient::fetch_text | DEFAULT_ALBUM_LIST
//! ```

pub mod service;

pub use service::{AlbumService, DEFAULT_ALBUM_LIST};
