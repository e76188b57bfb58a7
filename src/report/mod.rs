//! Reporting: human-readable output for a run.

pub mod format;

pub use format::*;
