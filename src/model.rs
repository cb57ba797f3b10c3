//! Sleep model artifacts
//!
//! A trained model is shipped as a small JSON artifact holding the coefficients
//! of a linear regression over the three form features:
//!
//! ```text
//! actual_sleep = intercept + wake * w + estimated_sleep * s + coffee * c
//! ```
//!
//! The output is predicted actual sleep in seconds.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ModelError;
use crate::predictor::{SleepFeatures, SleepPredictor};

/// Artifact format version understood by this crate
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Regression coefficients, one per feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub wake: f64,
    pub estimated_sleep: f64,
    pub coffee: f64,
}

/// Linear regression model predicting actual sleep in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSleepModel {
    pub name: String,
    pub format_version: u32,
    pub intercept: f64,
    pub coefficients: Coefficients,
}

impl LinearSleepModel {
    pub fn new(name: impl Into<String>, intercept: f64, coefficients: Coefficients) -> Self {
        Self {
            name: name.into(),
            format_version: MODEL_FORMAT_VERSION,
            intercept,
            coefficients,
        }
    }

    /// Parse and validate an artifact
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let model: Self = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        serde_json::to_string_pretty(self).map_err(ModelError::JsonError)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(ModelError::UnsupportedFormat(self.format_version));
        }

        let named = [
            ("intercept", self.intercept),
            ("wake", self.coefficients.wake),
            ("estimated_sleep", self.coefficients.estimated_sleep),
            ("coffee", self.coefficients.coffee),
        ];
        for (name, value) in named {
            if !value.is_finite() {
                return Err(ModelError::InvalidCoefficient(format!("{name} = {value}")));
            }
        }

        Ok(())
    }
}

impl SleepPredictor for LinearSleepModel {
    fn predict(&self, features: &SleepFeatures) -> Result<f64, ModelError> {
        let c = &self.coefficients;
        let seconds = self.intercept
            + c.wake * features.wake
            + c.estimated_sleep * features.estimated_sleep
            + c.coffee * features.coffee;

        if !seconds.is_finite() || seconds < 0.0 {
            return Err(ModelError::InvalidPrediction(seconds));
        }
        Ok(seconds)
    }
}

/// Loads the artifact from disk on every prediction.
///
/// Nothing is cached, so a model file replaced between calls takes effect
/// immediately and a missing file fails only the call that needs it.
#[derive(Debug, Clone)]
pub struct ArtifactPredictor {
    path: PathBuf,
}

impl ArtifactPredictor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SleepPredictor for ArtifactPredictor {
    fn predict(&self, features: &SleepFeatures) -> Result<f64, ModelError> {
        let model = LinearSleepModel::from_path(&self.path)?;
        tracing::debug!(model = %model.name, path = %self.path.display(), "loaded sleep model");
        model.predict(features)
    }
}
