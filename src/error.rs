//! Error types for BetterRest

use thiserror::Error;

/// Title shown to the user when a bedtime cannot be computed
pub const ERROR_TITLE: &str = "Error";

/// Message shown to the user when a bedtime cannot be computed
pub const PREDICTION_FAILED_MESSAGE: &str = "Could not calculate the bedtime";

/// The single failure an estimate can produce.
///
/// The `Display` output is the fixed user-facing message. The `reason` is
/// kept for logs and machine-readable reports only.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimationError {
    #[error("Could not calculate the bedtime")]
    PredictionFailed { reason: String },
}

impl EstimationError {
    pub fn prediction_failed(reason: impl Into<String>) -> Self {
        EstimationError::PredictionFailed {
            reason: reason.into(),
        }
    }

    /// Alert title for the presentation layer
    pub fn title(&self) -> &'static str {
        ERROR_TITLE
    }

    /// Alert message for the presentation layer
    pub fn message(&self) -> &'static str {
        PREDICTION_FAILED_MESSAGE
    }

    /// Underlying cause, not meant for end users
    pub fn reason(&self) -> &str {
        match self {
            EstimationError::PredictionFailed { reason } => reason,
        }
    }
}

impl From<ModelError> for EstimationError {
    fn from(e: ModelError) -> Self {
        EstimationError::prediction_failed(e.to_string())
    }
}

/// Errors raised while loading or evaluating a sleep model artifact
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Cannot read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid model JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unsupported model format version: {0}")]
    UnsupportedFormat(u32),

    #[error("Invalid model coefficient: {0}")]
    InvalidCoefficient(String),

    #[error("Model produced an invalid prediction: {0}")]
    InvalidPrediction(f64),

    #[error("Predictor unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised while loading or validating an estimator configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid range for {field}: {reason}")]
    InvalidRange { field: &'static str, reason: String },

    #[error("Invalid time of day: {0}")]
    InvalidTime(String),
}
