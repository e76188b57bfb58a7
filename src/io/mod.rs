//! Input/output helpers.
//!
//! - sales CSV ingest + daily aggregation (`sales`)
//! - feature record export (`export`)

pub mod export;
pub mod sales;

pub use export::*;
pub use sales::*;
