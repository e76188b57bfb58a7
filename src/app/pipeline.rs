//! Shared prediction pipeline used by every subcommand.
//!
//! Keeping the workflow in one place avoids duplicating it:
//! sales history -> calendar flags -> weather -> features -> model -> units
//!
//! The CLI handlers only decide what to print.

use chrono::NaiveDate;

use crate::calendar::HolidayCalendar;
use crate::config::AppConfig;
use crate::data::WeatherClient;
use crate::domain::{CalendarFlags, FeatureRecord, WeatherSnapshot};
use crate::error::AppError;
use crate::features::{FeatureInputs, build_features};
use crate::io::{SalesHistory, load_daily_sales};
use crate::models::{ModelArtifact, Prediction, Regressor, predict_units};

/// Everything computed up to (not including) the model call.
#[derive(Debug, Clone)]
pub struct FeatureRun {
    pub date: NaiveDate,
    pub sales: SalesHistory,
    pub weather: WeatherSnapshot,
    pub calendar: CalendarFlags,
    pub features: FeatureRecord,
}

/// All outputs of a full prediction run.
#[derive(Debug, Clone)]
pub struct PredictionRun {
    pub context: FeatureRun,
    pub prediction: Prediction,
}

/// Execute the full pipeline for `date`: load sales, classify the date,
/// fetch the forecast, build features, load the model and predict.
pub fn run_prediction(config: &AppConfig, date: NaiveDate) -> Result<PredictionRun, AppError> {
    let sales = load_daily_sales(&config.sales.path, &config.sales.category)?;
    let calendar = classify_date(config, date);
    let weather = fetch_weather(config)?;
    let context = assemble(date, sales, calendar, weather);

    let model = ModelArtifact::load(&config.model.path)?;
    predict(context, &model)
}

/// Execute the pipeline with a pre-fetched forecast and an already loaded model.
///
/// Nothing here touches the network.
pub fn run_prediction_with(
    config: &AppConfig,
    date: NaiveDate,
    weather: WeatherSnapshot,
    model: &dyn Regressor,
) -> Result<PredictionRun, AppError> {
    let context = build_feature_run(config, date, weather)?;
    predict(context, model)
}

/// Build the feature row for `date` from a given forecast.
pub fn build_feature_run(config: &AppConfig, date: NaiveDate, weather: WeatherSnapshot) -> Result<FeatureRun, AppError> {
    let sales = load_daily_sales(&config.sales.path, &config.sales.category)?;
    let calendar = classify_date(config, date);
    Ok(assemble(date, sales, calendar, weather))
}

/// School-holiday flag and day type for `date` under the configured calendar.
pub fn classify_date(config: &AppConfig, date: NaiveDate) -> CalendarFlags {
    let flags = HolidayCalendar::around(date, &config.calendar).classify(date);
    tracing::info!(
        %date,
        school_holiday = flags.school_holiday,
        day_type = %flags.day_type,
        "classified date"
    );
    flags
}

pub fn fetch_weather(config: &AppConfig) -> Result<WeatherSnapshot, AppError> {
    WeatherClient::from_config(&config.weather)?.fetch_forecast(&config.weather.city)
}

fn assemble(date: NaiveDate, sales: SalesHistory, calendar: CalendarFlags, weather: WeatherSnapshot) -> FeatureRun {
    let features = build_features(&FeatureInputs {
        date,
        daily: &sales.daily,
        weather: &weather,
        calendar,
    });
    tracing::debug!(?features, "built feature record");

    FeatureRun {
        date,
        sales,
        weather,
        calendar,
        features,
    }
}

fn predict(context: FeatureRun, model: &dyn Regressor) -> Result<PredictionRun, AppError> {
    let prediction = predict_units(model, &context.features)?;
    tracing::info!(raw = prediction.raw, units = prediction.units, "prediction complete");
    Ok(PredictionRun { context, prediction })
}
