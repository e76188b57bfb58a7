//! Domain types shared by all pipeline stages.

pub mod types;

pub use types::*;
