//! `opening-stock` library crate.
//!
//! The binary (`stock`) is a thin wrapper around this library so that:
//!
//! - every pipeline stage is testable without spawning processes or hitting
//!   the network
//! - the model and weather source can be swapped at the seams
//!   (`models::Regressor`, `app::pipeline::run_prediction_with`)

pub mod app;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod features;
pub mod io;
pub mod models;
pub mod report;
