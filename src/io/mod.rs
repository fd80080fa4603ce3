//! Input/output helpers.
//!
//! - CSV ingest + schema normalization (`ingest`)
//! - snapshot cache on disk (`cache`)
//! - census exports (CSV/JSON) (`export`)

pub mod cache;
pub mod export;
pub mod ingest;

pub use cache::*;
pub use export::*;
pub use ingest::*;
