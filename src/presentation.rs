//! Presentation helpers
//!
//! What the form shows once an estimate is in: the alert title and message,
//! the fallback time when there is no bedtime, and the static form copy.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::EstimationError;
use crate::types::Bedtime;

pub const APP_TITLE: &str = "BetterRest";
pub const WAKE_PROMPT: &str = "When would you like to wake up?";
pub const SLEEP_PROMPT: &str = "Desired amount of sleep";
pub const COFFEE_PROMPT: &str = "Daily coffee intake";
pub const COFFEE_FOOTER: &str =
    "Each cup of coffee increases required sleep time by around 30 minutes";
pub const BEDTIME_HEADER: &str = "Your recommended bedtime is:";
pub const BEDTIME_TITLE: &str = "Your bedtime is...";

/// Title and message pair for a modal alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn from_result(result: &Result<Bedtime, EstimationError>) -> Self {
        match result {
            Ok(bedtime) => Self {
                title: BEDTIME_TITLE.to_string(),
                message: bedtime.short_display(),
            },
            Err(e) => Self::from_error(e),
        }
    }

    pub fn from_error(error: &EstimationError) -> Self {
        Self {
            title: error.title().to_string(),
            message: error.message().to_string(),
        }
    }
}

/// Time of day to show in the bedtime row: the bedtime, or `now` when the
/// estimate failed
pub fn bedtime_or_now(result: &Result<Bedtime, EstimationError>, now: NaiveTime) -> NaiveTime {
    match result {
        Ok(bedtime) => bedtime.time(),
        Err(_) => now,
    }
}

/// Picker label for a cup count
pub fn cups_label(cups: u32) -> String {
    if cups == 1 {
        "1 cup".to_string()
    } else {
        format!("{cups} cups")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WakeTime;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_success_alert() {
        let bedtime = Bedtime::before(WakeTime::new(7, 0).unwrap(), Duration::hours(8));
        let alert = Alert::from_result(&Ok(bedtime));
        assert_eq!(
            alert,
            Alert {
                title: "Your bedtime is...".to_string(),
                message: "11:00 PM".to_string(),
            }
        );
    }

    #[test]
    fn test_error_alert() {
        let err = EstimationError::prediction_failed("model missing");
        let alert = Alert::from_result(&Err(err));
        assert_eq!(alert.title, "Error");
        assert_eq!(alert.message, "Could not calculate the bedtime");
    }

    #[test]
    fn test_bedtime_or_now() {
        let now = NaiveTime::from_hms_opt(15, 42, 0).unwrap();
        let bedtime = Bedtime::before(WakeTime::new(6, 0).unwrap(), Duration::hours(8));

        assert_eq!(bedtime_or_now(&Ok(bedtime), now).to_string(), "22:00:00");
        let failed = Err(EstimationError::prediction_failed("boom"));
        assert_eq!(bedtime_or_now(&failed, now), now);
    }

    #[test]
    fn test_cups_label() {
        assert_eq!(cups_label(0), "0 cups");
        assert_eq!(cups_label(1), "1 cup");
        assert_eq!(cups_label(20), "20 cups");
    }
}
