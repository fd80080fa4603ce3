//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - classification labels (`OrbitRegime`, `Category`)
//! - the normalized catalog row (`CatalogRecord`)
//! - collector choices (`Provider`, `RefreshPolicy`)

pub mod types;

pub use types::*;
