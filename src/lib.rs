//! `roi-updater` library crate.
//!
//! The binary (`roi`) is a thin wrapper around this library so that:
//!
//! - the update cycle and report are testable without spawning processes
//! - fetchers and presentation patchers can be swapped through traits

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
pub mod validation;
