//! Domain types used throughout the updater.
//!
//! This module defines:
//!
//! - the closed enumerations stored in the table (`Product`, `BusinessModel`, `ValidationStatus`)
//! - the market data sources (`SourceId`, `SourceEndpoint`)
//! - rows and transient payloads (`PricingRecord`, `FetchedData`)
//! - run configuration (`UpdaterConfig`)

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
