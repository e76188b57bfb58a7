//! Inference entry point and rounding to whole units.
//!
//! The pipeline only needs one primitive from a model: map a table of feature
//! rows to one estimate per row. Everything else (artifact format, schema
//! checks) lives in `artifact`.

use crate::domain::FeatureRecord;
use crate::error::AppError;

/// A trained regressor over [`FeatureRecord`] rows.
pub trait Regressor {
    /// One estimate per input row, in input order.
    fn predict(&self, rows: &[FeatureRecord]) -> Vec<f64>;
}

/// Raw model output and the unit count recommended from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub raw: f64,
    pub units: i64,
}

/// Run `model` on a single feature row and round the estimate.
pub fn predict_units(model: &dyn Regressor, features: &FeatureRecord) -> Result<Prediction, AppError> {
    let out = model.predict(std::slice::from_ref(features));
    let raw = *out
        .first()
        .ok_or_else(|| AppError::model("Model returned no prediction."))?;
    if !raw.is_finite() {
        return Err(AppError::model(format!(
            "Model returned a non-finite prediction ({raw}); check the sales history (avg_7={}).",
            features.avg_7
        )));
    }

    let units = round_units(raw);
    tracing::debug!(raw, units, "model prediction");
    Ok(Prediction { raw, units })
}

/// Round to the nearest whole unit, ties to even (12.5 → 12, 13.5 → 14).
pub fn round_units(raw: f64) -> i64 {
    raw.round_ties_even() as i64
}
