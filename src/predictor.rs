//! Sleep prediction capability
//!
//! The trained regression model is opaque to the estimator: anything that maps
//! the three form features to predicted actual sleep (in seconds) can stand in
//! for it.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Model input, in the units the model was trained on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SleepFeatures {
    /// Wake-up time in seconds past midnight
    pub wake: f64,
    /// Desired sleep in hours
    pub estimated_sleep: f64,
    /// Cups of coffee per day
    pub coffee: f64,
}

/// Predicts actual sleep in seconds
pub trait SleepPredictor {
    fn predict(&self, features: &SleepFeatures) -> Result<f64, ModelError>;
}

/// Adapts a closure into a [`SleepPredictor`]
pub struct FnPredictor<F>(F);

pub fn from_fn<F>(f: F) -> FnPredictor<F>
where
    F: Fn(&SleepFeatures) -> Result<f64, ModelError>,
{
    FnPredictor(f)
}

impl<F> SleepPredictor for FnPredictor<F>
where
    F: Fn(&SleepFeatures) -> Result<f64, ModelError>,
{
    fn predict(&self, features: &SleepFeatures) -> Result<f64, ModelError> {
        (self.0)(features)
    }
}

impl<P: SleepPredictor + ?Sized> SleepPredictor for Box<P> {
    fn predict(&self, features: &SleepFeatures) -> Result<f64, ModelError> {
        (**self).predict(features)
    }
}

/// Predictor that always fails, for hosts that could not load a model
#[derive(Debug, Clone)]
pub struct UnavailablePredictor {
    reason: String,
}

impl UnavailablePredictor {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl SleepPredictor for UnavailablePredictor {
    fn predict(&self, _features: &SleepFeatures) -> Result<f64, ModelError> {
        Err(ModelError::Unavailable(self.reason.clone()))
    }
}
