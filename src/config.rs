//! Estimator configuration
//!
//! Form defaults, input ranges, and the policies that decide what happens to
//! out-of-range input and how duration labels are pluralized. Loaded from JSON;
//! every field is optional and falls back to the form's stock values.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::formatter::PluralRule;
use crate::types::{CupsRange, HoursRange, WakeTime};

/// What the estimator does with input outside its range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputPolicy {
    /// Pull the value to the nearest allowed one and log a warning
    #[default]
    Clamp,
    /// Fail the estimate
    Reject,
}

/// Initial values shown by the form
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormDefaults {
    pub wake_time: WakeTime,
    pub sleep_hours: f64,
    pub coffee_cups: u32,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            wake_time: WakeTime::default(),
            sleep_hours: 8.0,
            coffee_cups: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    pub defaults: FormDefaults,
    pub sleep_hours: HoursRange,
    pub coffee_cups: CupsRange,
    pub input_policy: InputPolicy,
    pub plural_rule: PluralRule,
}

impl EstimatorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::JsonError)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let hours = &self.sleep_hours;
        if !(hours.min.is_finite() && hours.max.is_finite() && hours.step.is_finite()) {
            return Err(ConfigError::InvalidRange {
                field: "sleep_hours",
                reason: "bounds and step must be finite".to_string(),
            });
        }
        if hours.min < 0.0 || hours.min > hours.max {
            return Err(ConfigError::InvalidRange {
                field: "sleep_hours",
                reason: format!("min {} must be non-negative and <= max {}", hours.min, hours.max),
            });
        }
        if hours.step <= 0.0 {
            return Err(ConfigError::InvalidRange {
                field: "sleep_hours",
                reason: format!("step {} must be positive", hours.step),
            });
        }
        if !hours.contains(self.defaults.sleep_hours) {
            return Err(ConfigError::InvalidRange {
                field: "defaults.sleep_hours",
                reason: format!(
                    "{} is outside {}..={}",
                    self.defaults.sleep_hours, hours.min, hours.max
                ),
            });
        }

        let cups = &self.coffee_cups;
        if cups.min > cups.max {
            return Err(ConfigError::InvalidRange {
                field: "coffee_cups",
                reason: format!("min {} must be <= max {}", cups.min, cups.max),
            });
        }
        if !cups.contains(i64::from(self.defaults.coffee_cups)) {
            return Err(ConfigError::InvalidRange {
                field: "defaults.coffee_cups",
                reason: format!(
                    "{} is outside {}..={}",
                    self.defaults.coffee_cups, cups.min, cups.max
                ),
            });
        }

        Ok(())
    }
}
