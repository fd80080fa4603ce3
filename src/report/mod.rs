//! Reporting utilities: search, summaries and formatted terminal output.

pub mod format;
pub mod search;

pub use format::*;
pub use search::*;
