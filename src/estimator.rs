//! Bedtime estimation
//!
//! This module provides the single estimation entry point: validate the form
//! input, ask the sleep model how much sleep the user will actually get, and
//! count that back from the wake-up time.

use chrono::Duration;

use crate::config::{EstimatorConfig, InputPolicy};
use crate::error::{ConfigError, EstimationError};
use crate::formatter::DurationFormatter;
use crate::predictor::{SleepFeatures, SleepPredictor};
use crate::types::{Bedtime, CoffeeCups, DesiredSleepHours, WakeTime};

/// A successful estimate together with the inputs it was computed from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub wake_time: WakeTime,
    pub sleep_hours: DesiredSleepHours,
    pub coffee_cups: CoffeeCups,
    pub predicted_sleep_seconds: f64,
    pub bedtime: Bedtime,
}

/// Computes bedtimes from a [`SleepPredictor`].
///
/// Holds no per-call state; the same inputs always reach the predictor in the
/// same form.
pub struct BedtimeEstimator<P> {
    predictor: P,
    config: EstimatorConfig,
}

impl<P: SleepPredictor> BedtimeEstimator<P> {
    pub fn new(predictor: P) -> Self {
        Self {
            predictor,
            config: EstimatorConfig::default(),
        }
    }

    /// Build with a custom config, rejecting invalid ranges up front
    pub fn with_config(predictor: P, config: EstimatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { predictor, config })
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    /// Formatter following the configured pluralization rule
    pub fn formatter(&self) -> DurationFormatter {
        DurationFormatter::new(self.config.plural_rule)
    }

    /// Recommended bedtime for waking at `wake_up`.
    ///
    /// Out-of-range `desired_sleep_hours` and `coffee_cups` are clamped or
    /// rejected according to the configured [`InputPolicy`]. Any predictor
    /// failure is reported as [`EstimationError::PredictionFailed`].
    pub fn estimate(
        &self,
        wake_up: WakeTime,
        desired_sleep_hours: f64,
        coffee_cups: i64,
    ) -> Result<Bedtime, EstimationError> {
        self.estimate_detailed(wake_up, desired_sleep_hours, coffee_cups)
            .map(|estimate| estimate.bedtime)
    }

    /// Same as [`estimate`](Self::estimate), also returning the accepted
    /// inputs and the raw prediction
    pub fn estimate_detailed(
        &self,
        wake_up: WakeTime,
        desired_sleep_hours: f64,
        coffee_cups: i64,
    ) -> Result<Estimate, EstimationError> {
        let sleep_hours = self.accept_sleep_hours(desired_sleep_hours)?;
        let coffee_cups = self.accept_coffee_cups(coffee_cups)?;

        let features = SleepFeatures {
            wake: f64::from(wake_up.seconds_past_midnight()),
            estimated_sleep: sleep_hours.value(),
            coffee: f64::from(coffee_cups.value()),
        };

        let predicted = self.predictor.predict(&features).map_err(|e| {
            tracing::warn!(error = %e, wake = %wake_up, "sleep prediction failed");
            EstimationError::from(e)
        })?;

        let sleep = prediction_to_duration(predicted)?;
        let bedtime = Bedtime::before(wake_up, sleep);

        tracing::debug!(
            wake = %wake_up,
            sleep_hours = sleep_hours.value(),
            coffee_cups = coffee_cups.value(),
            predicted_sleep_seconds = predicted,
            bedtime = %bedtime,
            day_offset = bedtime.day_offset(),
            "estimated bedtime"
        );

        Ok(Estimate {
            wake_time: wake_up,
            sleep_hours,
            coffee_cups,
            predicted_sleep_seconds: predicted,
            bedtime,
        })
    }

    fn accept_sleep_hours(&self, hours: f64) -> Result<DesiredSleepHours, EstimationError> {
        let range = &self.config.sleep_hours;
        let accepted = match self.config.input_policy {
            InputPolicy::Clamp => DesiredSleepHours::clamped(hours, range),
            InputPolicy::Reject => DesiredSleepHours::checked(hours, range),
        };

        match accepted {
            Some(value) => {
                if value.value() != hours {
                    tracing::warn!(
                        requested = hours,
                        accepted = value.value(),
                        "sleep hours adjusted"
                    );
                }
                Ok(value)
            }
            None => Err(EstimationError::prediction_failed(format!(
                "sleep hours {hours} not a {}-step value in {}..={}",
                range.step, range.min, range.max
            ))),
        }
    }

    fn accept_coffee_cups(&self, cups: i64) -> Result<CoffeeCups, EstimationError> {
        let range = &self.config.coffee_cups;
        match self.config.input_policy {
            InputPolicy::Clamp => {
                let value = CoffeeCups::clamped(cups, range);
                if i64::from(value.value()) != cups {
                    tracing::warn!(
                        requested = cups,
                        accepted = value.value(),
                        "coffee cups clamped"
                    );
                }
                Ok(value)
            }
            InputPolicy::Reject => CoffeeCups::checked(cups, range).ok_or_else(|| {
                EstimationError::prediction_failed(format!(
                    "coffee cups {cups} outside {}..={}",
                    range.min, range.max
                ))
            }),
        }
    }
}

/// Whole milliseconds of predicted sleep
fn prediction_to_duration(seconds: f64) -> Result<Duration, EstimationError> {
    // One week is far beyond anything the model can legitimately return
    const MAX_SECONDS: f64 = 7.0 * 86_400.0;

    if !seconds.is_finite() || !(0.0..=MAX_SECONDS).contains(&seconds) {
        return Err(EstimationError::prediction_failed(format!(
            "predicted sleep of {seconds} seconds is out of bounds"
        )));
    }
    Ok(Duration::milliseconds((seconds * 1000.0).round() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ModelError, PREDICTION_FAILED_MESSAGE};
    use crate::model::{Coefficients, LinearSleepModel};
    use crate::predictor::{from_fn, UnavailablePredictor};
    use crate::types::{CupsRange, HoursRange};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    /// Returns a fixed prediction and records what it was asked
    struct FakePredictor {
        seconds: f64,
        calls: RefCell<Vec<SleepFeatures>>,
    }

    impl FakePredictor {
        fn constant(seconds: f64) -> Self {
            Self {
                seconds,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl SleepPredictor for FakePredictor {
        fn predict(&self, features: &SleepFeatures) -> Result<f64, ModelError> {
            self.calls.borrow_mut().push(*features);
            Ok(self.seconds)
        }
    }

    fn seven_am() -> WakeTime {
        WakeTime::new(7, 0).unwrap()
    }

    #[test]
    fn test_eight_hours_before_seven() {
        let estimator = BedtimeEstimator::new(FakePredictor::constant(8.0 * 3600.0));
        let bedtime = estimator.estimate(seven_am(), 8.0, 1).unwrap();

        assert_eq!(bedtime.to_string(), "23:00");
        assert_eq!(bedtime.day_offset(), -1);
    }

    #[test]
    fn test_features_passed_to_predictor() {
        let estimator = BedtimeEstimator::new(FakePredictor::constant(28_800.0));
        let wake = WakeTime::new(6, 30).unwrap();
        estimator.estimate(wake, 7.5, 3).unwrap();

        let calls = estimator.predictor().calls.borrow();
        assert_eq!(
            calls.as_slice(),
            &[SleepFeatures {
                wake: 23_400.0,
                estimated_sleep: 7.5,
                coffee: 3.0,
            }]
        );
    }

    #[test]
    fn test_predictor_failure_is_prediction_failed() {
        let estimator = BedtimeEstimator::new(UnavailablePredictor::new("model missing"));
        let err = estimator.estimate(seven_am(), 8.0, 1).unwrap_err();

        assert!(matches!(err, EstimationError::PredictionFailed { .. }));
        assert_eq!(err.to_string(), PREDICTION_FAILED_MESSAGE);
        assert_eq!(err.title(), "Error");
        assert!(err.reason().contains("model missing"));
    }

    #[test]
    fn test_invalid_prediction_is_prediction_failed() {
        for bad in [f64::NAN, f64::INFINITY, -60.0, 30.0 * 86_400.0] {
            let estimator = BedtimeEstimator::new(from_fn(move |_: &SleepFeatures| Ok(bad)));
            let result = estimator.estimate(seven_am(), 8.0, 1);
            assert!(
                matches!(result, Err(EstimationError::PredictionFailed { .. })),
                "prediction {bad} should fail"
            );
        }
    }

    #[test]
    fn test_estimate_is_idempotent() {
        let model = LinearSleepModel::new(
            "linear",
            0.0,
            Coefficients {
                wake: 0.0,
                estimated_sleep: 3600.0,
                coffee: 1800.0,
            },
        );
        let estimator = BedtimeEstimator::new(model);

        let first = estimator.estimate(seven_am(), 8.0, 2).unwrap();
        let second = estimator.estimate(seven_am(), 8.0, 2).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.to_string(), "22:00");
    }

    #[test]
    fn test_coffee_bounds_accepted() {
        let estimator = BedtimeEstimator::new(FakePredictor::constant(28_800.0));
        assert!(estimator.estimate(seven_am(), 8.0, 0).is_ok());
        assert!(estimator.estimate(seven_am(), 8.0, 20).is_ok());

        let mut config = EstimatorConfig::default();
        config.input_policy = InputPolicy::Reject;
        let strict =
            BedtimeEstimator::with_config(FakePredictor::constant(28_800.0), config).unwrap();
        assert!(strict.estimate(seven_am(), 8.0, 0).is_ok());
        assert!(strict.estimate(seven_am(), 8.0, 20).is_ok());
    }

    #[test]
    fn test_clamp_policy_adjusts_inputs() {
        let estimator = BedtimeEstimator::new(FakePredictor::constant(28_800.0));
        let estimate = estimator.estimate_detailed(seven_am(), 15.0, 42).unwrap();

        assert_eq!(estimate.sleep_hours.value(), 12.0);
        assert_eq!(estimate.coffee_cups.value(), 20);

        let calls = estimator.predictor().calls.borrow();
        assert_eq!(calls[0].estimated_sleep, 12.0);
        assert_eq!(calls[0].coffee, 20.0);
    }

    #[test]
    fn test_reject_policy_fails_without_calling_predictor() {
        let mut config = EstimatorConfig::default();
        config.input_policy = InputPolicy::Reject;
        let estimator =
            BedtimeEstimator::with_config(FakePredictor::constant(28_800.0), config).unwrap();

        assert!(estimator.estimate(seven_am(), 3.0, 1).is_err());
        assert!(estimator.estimate(seven_am(), 8.0, 21).is_err());
        assert!(estimator.estimate(seven_am(), 8.0, -1).is_err());
        assert!(estimator.predictor().calls.borrow().is_empty());
    }

    #[test]
    fn test_reject_policy_refuses_off_step_hours() {
        let mut config = EstimatorConfig::default();
        config.input_policy = InputPolicy::Reject;
        let estimator =
            BedtimeEstimator::with_config(FakePredictor::constant(28_800.0), config).unwrap();

        let err = estimator.estimate(seven_am(), 7.3, 1).unwrap_err();
        assert!(err.reason().contains("0.5-step"));
        assert!(estimator.predictor().calls.borrow().is_empty());

        assert!(estimator.estimate(seven_am(), 7.5, 1).is_ok());
    }

    #[test]
    fn test_inverted_range_rejected_at_construction() {
        let mut config = EstimatorConfig::default();
        config.sleep_hours = HoursRange {
            min: 12.0,
            max: 4.0,
            step: 0.5,
        };
        let result = BedtimeEstimator::with_config(FakePredictor::constant(28_800.0), config);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidRange {
                field: "sleep_hours",
                ..
            })
        ));

        let mut config = EstimatorConfig::default();
        config.coffee_cups = CupsRange { min: 20, max: 0 };
        let result = BedtimeEstimator::with_config(FakePredictor::constant(28_800.0), config);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidRange {
                field: "coffee_cups",
                ..
            })
        ));
    }

    #[test]
    fn test_nan_sleep_hours_fails() {
        let estimator = BedtimeEstimator::new(FakePredictor::constant(28_800.0));
        let err = estimator.estimate(seven_am(), f64::NAN, 1).unwrap_err();
        assert!(err.reason().contains("sleep hours"));
    }

    #[test]
    fn test_detailed_estimate_reports_prediction() {
        let estimator = BedtimeEstimator::new(FakePredictor::constant(27_000.0));
        let estimate = estimator
            .estimate_detailed(WakeTime::new(6, 0).unwrap(), 7.5, 1)
            .unwrap();

        assert_eq!(estimate.predicted_sleep_seconds, 27_000.0);
        assert_eq!(estimate.bedtime.to_string(), "22:30");
        assert_eq!(estimate.wake_time.to_string(), "06:00");
    }
}
