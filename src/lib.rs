//! `orbit-census` library crate.
//!
//! The binary (`orbit`) is a thin wrapper around this library so that:
//!
//! - the census core is testable without spawning processes or touching the network
//! - providers, cache and front-ends can be swapped independently

pub mod app;
pub mod census;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod tui;
