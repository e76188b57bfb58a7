//! Command-line parsing for the opening-stock recommender.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! pipeline. Every flag here only overrides a config value; running `stock`
//! with no flags uses the config file and environment as-is.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::config::Overrides;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "stock", version, about = "Daily opening-stock recommendation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the forecast, build features, run the model and print the recommendation.
    Predict(PredictArgs),
    /// Build and print the feature row without loading a model.
    Features(FeatureArgs),
    /// Print the school-holiday flag and public-holiday day type for a date.
    Calendar(CalendarArgs),
}

/// Options shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct CommonArgs {
    /// Config file (TOML). Defaults to `stock.toml` if present.
    #[arg(long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Date to predict for (YYYY-MM-DD). Defaults to today (local time).
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,
}

/// Options for the sales and weather inputs.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// Sales CSV export.
    #[arg(long, value_name = "CSV")]
    pub sales: Option<PathBuf>,

    /// Category substring to aggregate (case-insensitive).
    #[arg(long)]
    pub category: Option<String>,

    /// Forecast location, e.g. "Perth,AU".
    #[arg(long)]
    pub city: Option<String>,

    /// Write the feature row to JSON.
    #[arg(long = "export-features", value_name = "JSON")]
    pub export_features: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub inputs: InputArgs,

    /// Model artifact (JSON).
    #[arg(long, value_name = "JSON")]
    pub model: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct FeatureArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub inputs: InputArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct CalendarArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

impl InputArgs {
    pub fn overrides(&self, model: Option<PathBuf>) -> Overrides {
        Overrides {
            sales_path: self.sales.clone(),
            category: self.category.clone(),
            model_path: model,
            city: self.city.clone(),
        }
    }
}
