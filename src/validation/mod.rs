//! Validation of freshly fetched figures against stored history.

pub mod consistency;

pub use consistency::*;
