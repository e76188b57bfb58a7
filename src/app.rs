//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - installs logging
//! - parses CLI arguments
//! - loads configuration
//! - runs the pipeline
//! - prints reports and writes the optional feature export

use std::env;
use std::io::IsTerminal;

use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing_subscriber::filter::EnvFilter;

use crate::cli::{CalendarArgs, Command, CommonArgs, FeatureArgs, PredictArgs};
use crate::config::{AppConfig, Overrides};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `stock` binary.
pub fn run() -> Result<(), AppError> {
    init_tracing();

    // `stock` and `stock --date ...` behave like `stock predict ...`.
    let argv = rewrite_args(env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Predict(args) => handle_predict(args).map(|_| ()),
        Command::Features(args) => handle_features(args),
        Command::Calendar(args) => handle_calendar(args),
    }
}

/// Print the recommendation and return the unit count.
pub fn handle_predict(args: PredictArgs) -> Result<i64, AppError> {
    let overrides = args.inputs.overrides(args.model.clone());
    let config = load_config(&args.common, &overrides)?;
    let date = resolve_date(&args.common);

    let run = pipeline::run_prediction(&config, date)?;
    println!("{}", crate::report::format_recommendation(&run, &config.product));

    if let Some(path) = &args.inputs.export_features {
        crate::io::export::write_features_json(path, run.context.date, &run.context.features)?;
    }

    Ok(run.prediction.units)
}

fn handle_features(args: FeatureArgs) -> Result<(), AppError> {
    let config = load_config(&args.common, &args.inputs.overrides(None))?;
    let date = resolve_date(&args.common);

    let weather = pipeline::fetch_weather(&config)?;
    let run = pipeline::build_feature_run(&config, date, weather)?;
    println!("{}", crate::report::format_features(&run));

    if let Some(path) = &args.inputs.export_features {
        crate::io::export::write_features_json(path, run.date, &run.features)?;
    }
    Ok(())
}

fn handle_calendar(args: CalendarArgs) -> Result<(), AppError> {
    let config = load_config(&args.common, &Overrides::default())?;
    let date = resolve_date(&args.common);

    let flags = pipeline::classify_date(&config, date);
    println!(
        "{date}: School Holiday: {} | Public Holiday type: {}",
        if flags.school_holiday { "Yes" } else { "No" },
        flags.day_type
    );
    Ok(())
}

fn load_config(common: &CommonArgs, overrides: &Overrides) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load(common.config.as_deref())?;
    config.apply(overrides)?;
    config.log_config();
    Ok(config)
}

fn resolve_date(common: &CommonArgs) -> NaiveDate {
    common.date.unwrap_or_else(|| Local::now().date_naive())
}

/// Install the global `tracing` subscriber.
///
/// Logs go to stderr so stdout carries only the report. Level comes from
/// `RUST_LOG` if set, else `STOCK_LOG_LEVEL`, else `warn`. Colors follow
/// `FORCE_COLOR` (`1|true|yes` / `0|false|no`), else TTY detection.
fn init_tracing() {
    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stderr().is_terminal(),
    };

    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("STOCK_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("error") => "error",
            _ => "warn",
        };
        EnvFilter::new(format!("{level},reqwest=warn,hyper=warn"))
    };

    // try_init: a subscriber may already be installed.
    let _ = tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

/// Rewrite argv so `stock` defaults to `stock predict`.
///
/// Rules:
/// - `stock`                         -> `stock predict`
/// - `stock --date 2025-04-24 ...`   -> `stock predict --date 2025-04-24 ...`
/// - `stock --help/--version/-h`     -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("predict".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "predict" | "features" | "calendar");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "predict".to_string());
        return argv;
    }

    argv
}
