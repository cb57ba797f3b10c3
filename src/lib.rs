//! BetterRest - Bedtime estimation core
//!
//! Estimates a recommended bedtime from a desired wake-up time, a target sleep
//! duration and daily coffee intake. A trained regression model predicts how
//! much sleep the user will actually get; the bedtime is the wake-up time minus
//! that prediction.
//!
//! ## Modules
//!
//! - **Estimation**: [`BedtimeEstimator`] over any [`SleepPredictor`]
//! - **Formatting**: [`DurationFormatter`] labels for the sleep stepper
//! - **Models**: JSON regression artifacts ([`LinearSleepModel`])

pub mod config;
pub mod error;
pub mod estimator;
pub mod formatter;
pub mod model;
pub mod predictor;
pub mod presentation;
pub mod report;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::{EstimatorConfig, InputPolicy};
pub use error::{ConfigError, EstimationError, ModelError};
pub use estimator::{BedtimeEstimator, Estimate};
pub use formatter::{format_duration, DurationFormatter, PluralRule};
pub use model::{ArtifactPredictor, LinearSleepModel};
pub use predictor::{SleepFeatures, SleepPredictor};
pub use types::{Bedtime, CoffeeCups, DesiredSleepHours, WakeTime};

/// Crate version embedded in every report
pub const REST_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "better-rest";
