//! Formatted terminal output.
//!
//! Formatting lives here so the pipeline stays free of presentation and the
//! exact report text is testable.

use crate::app::pipeline::{FeatureRun, PredictionRun};
use crate::domain::FeatureRecord;

/// The daily recommendation summary.
pub fn format_recommendation(run: &PredictionRun, product: &str) -> String {
    let ctx = &run.context;
    let mut out = String::new();

    out.push_str(&format!(
        "\n--- {} Opening Stock Prediction ({}) ---\n",
        title_case(product),
        ctx.date
    ));
    out.push_str(&format!(
        "Weather: Max Temp={:.1}°C, Rain={:.1}mm, Clouds={}\n",
        ctx.weather.max_temp, ctx.weather.rain_mm, ctx.weather.cloud_pct
    ));
    out.push_str(&format!(
        "School Holiday: {} | Public Holiday type: {}\n",
        if ctx.calendar.school_holiday { "Yes" } else { "No" },
        ctx.calendar.day_type
    ));
    out.push_str(&format!(
        "Recommended opening {} stock: {} units\n",
        product.to_lowercase(),
        run.prediction.units
    ));

    out
}

/// The feature row as an aligned name/value table.
pub fn format_features(run: &FeatureRun) -> String {
    let mut out = String::new();
    out.push_str(&format!("Features for {} (schema v{}):\n", run.date, crate::domain::FEATURE_SCHEMA_VERSION));
    out.push_str(&format!(
        "History: {} day(s), {} matching row(s) of {} read\n",
        run.sales.daily.len(),
        run.sales.rows_matched,
        run.sales.rows_read
    ));
    out.push_str(&format_feature_table(&run.features));
    out
}

pub fn format_feature_table(features: &FeatureRecord) -> String {
    let mut out = String::new();
    for (name, value) in crate::domain::FEATURE_NAMES.iter().zip(features.to_vector()) {
        out.push_str(&format!("  {name:<14} {}\n", fmt_value(value)));
    }
    out
}

fn fmt_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.3}")
    }
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
