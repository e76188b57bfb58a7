//! Model artifact loading and schema validation.
//!
//! An artifact is a JSON file written by the training side:
//!
//! ```json
//! {
//!   "schema_version": 1,
//!   "feature_names": ["TempBand", "RainBand", "...", "avg_7"],
//!   "estimator": { "kind": "forest", "trees": [ { "nodes": [ ... ] } ] }
//! }
//! ```
//!
//! `feature_names` must equal [`FEATURE_NAMES`] exactly (names and order).
//! Loading fails otherwise, so a model trained on a different column layout
//! can never be fed this crate's rows.
//!
//! Two estimators are supported:
//! - `linear`: `intercept + Σ coefficients[i] * x[i]`
//! - `forest`: mean over binary regression trees; a row goes left when
//!   `x[feature] <= threshold` (NaN goes right)

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::domain::{FEATURE_COUNT, FEATURE_NAMES, FEATURE_SCHEMA_VERSION, FeatureRecord};
use crate::error::AppError;
use crate::models::model::Regressor;

#[derive(Debug, Clone, Deserialize)]
pub struct ModelArtifact {
    pub schema_version: u32,
    pub feature_names: Vec<String>,
    pub estimator: Estimator,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Estimator {
    Linear(LinearModel),
    Forest(ForestModel),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForestModel {
    pub trees: Vec<Tree>,
}

/// Flat node array; node 0 is the root.
#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

impl ModelArtifact {
    /// Load and validate an artifact from disk.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path)
            .map_err(|e| AppError::model(format!("Failed to open model artifact '{}': {e}", path.display())))?;
        let artifact: Self = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| AppError::model(format!("Invalid model artifact '{}': {e}", path.display())))?;
        artifact.validate()?;

        tracing::info!(
            path = %path.display(),
            estimator = artifact.estimator.kind_name(),
            "loaded model artifact"
        );
        Ok(artifact)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, AppError> {
        let artifact: Self =
            serde_json::from_str(raw).map_err(|e| AppError::model(format!("Invalid model artifact: {e}")))?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Check the declared input schema and the estimator's structure.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.schema_version != FEATURE_SCHEMA_VERSION {
            return Err(AppError::model(format!(
                "Model schema version {} does not match feature schema version {FEATURE_SCHEMA_VERSION}.",
                self.schema_version
            )));
        }

        let expected: Vec<&str> = FEATURE_NAMES.to_vec();
        let declared: Vec<&str> = self.feature_names.iter().map(String::as_str).collect();
        if declared != expected {
            return Err(AppError::model(format!(
                "Model input schema mismatch.\n  model expects: [{}]\n  features are : [{}]",
                declared.join(", "),
                expected.join(", ")
            )));
        }

        match &self.estimator {
            Estimator::Linear(m) => m.validate(),
            Estimator::Forest(m) => m.validate(),
        }
    }
}

impl Estimator {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Estimator::Linear(_) => "linear",
            Estimator::Forest(_) => "forest",
        }
    }
}

impl LinearModel {
    fn validate(&self) -> Result<(), AppError> {
        if self.coefficients.len() != FEATURE_COUNT {
            return Err(AppError::model(format!(
                "Linear model has {} coefficients; expected {FEATURE_COUNT}.",
                self.coefficients.len()
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(AppError::model("Linear model has non-finite parameters."));
        }
        Ok(())
    }

    pub fn predict_row(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(x.iter())
                .map(|(c, v)| c * v)
                .sum::<f64>()
    }
}

impl ForestModel {
    fn validate(&self) -> Result<(), AppError> {
        if self.trees.is_empty() {
            return Err(AppError::model("Forest model has no trees."));
        }
        for (t, tree) in self.trees.iter().enumerate() {
            tree.validate().map_err(|msg| AppError::model(format!("Tree {t}: {msg}")))?;
        }
        Ok(())
    }

    pub fn predict_row(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict_row(x)).sum();
        sum / self.trees.len() as f64
    }
}

impl Tree {
    /// Every split must point at existing nodes further down the array, so
    /// traversal always terminates.
    fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("no nodes".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= FEATURE_COUNT {
                        return Err(format!("node {i} splits on feature {feature} (only {FEATURE_COUNT})"));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {i} has a NaN threshold"));
                    }
                    for child in [left, right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(format!("node {i} has invalid child index {child}"));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("node {i} has a non-finite leaf value"));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn predict_row(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

impl Regressor for ModelArtifact {
    fn predict(&self, rows: &[FeatureRecord]) -> Vec<f64> {
        rows.iter()
            .map(|row| {
                let x = row.to_vector();
                match &self.estimator {
                    Estimator::Linear(m) => m.predict_row(&x),
                    Estimator::Forest(m) => m.predict_row(&x),
                }
            })
            .collect()
    }
}
