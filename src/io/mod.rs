//! Input/output helpers.
//!
//! - pricing table read/append (`store`)
//! - presentation data binding (`presentation`)

pub mod presentation;
pub mod store;

pub use presentation::*;
pub use store::*;
