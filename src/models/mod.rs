//! Regression models that turn a feature row into a stock estimate.
//!
//! `model` holds the inference seam (the `Regressor` trait and rounding);
//! `artifact` holds the on-disk format and its schema checks.

pub mod artifact;
pub mod model;

pub use artifact::*;
pub use model::*;
