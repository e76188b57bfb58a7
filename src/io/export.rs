//! Export the feature row a prediction was made from.
//!
//! The export is meant for auditing: it records exactly what the model saw,
//! keyed by schema name, so a surprising recommendation can be traced back to
//! its inputs.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{FEATURE_SCHEMA_VERSION, FeatureRecord};
use crate::error::{AppError, ErrorKind};

#[derive(Debug, Serialize)]
struct FeatureExport<'a> {
    date: NaiveDate,
    schema_version: u32,
    features: &'a FeatureRecord,
}

/// Write the feature record for `date` as pretty JSON.
///
/// A NaN `avg_7` is written as `null`.
pub fn write_features_json(path: &Path, date: NaiveDate, features: &FeatureRecord) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            ErrorKind::Config,
            format!("Failed to create feature export '{}': {e}", path.display()),
        )
    })?;

    let export = FeatureExport {
        date,
        schema_version: FEATURE_SCHEMA_VERSION,
        features,
    };

    serde_json::to_writer_pretty(file, &export)
        .map_err(|e| AppError::new(ErrorKind::Config, format!("Failed to write feature export: {e}")))?;

    tracing::info!(path = %path.display(), "wrote feature export");
    Ok(())
}
