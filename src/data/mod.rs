//! Market data acquisition.
//!
//! - the fetcher seam and its stub dispatcher (`fetcher`)
//! - fixed per-source payloads (`sources`)

pub mod fetcher;
pub mod sources;

pub use fetcher::*;
