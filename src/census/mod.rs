//! Orbit census: classification and aggregation.
//!
//! This is the pure core of the crate. Nothing in here touches the network,
//! the filesystem or the clock, so both the CLI and the TUI (and any catalog
//! source) can feed it without adaptation.

pub mod aggregate;
pub mod classify;

pub use aggregate::*;
pub use classify::*;

/// Validation failures raised by the census core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CensusError {
    #[error("Unknown object category '{0}' (expected `active` or `debris`).")]
    UnknownCategory(String),
}
