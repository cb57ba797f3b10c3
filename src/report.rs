//! Estimate report encoding
//!
//! Encodes an estimate, successful or not, into the JSON document handed to
//! hosts over FFI and printed by the CLI.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EstimationError;
use crate::estimator::Estimate;
use crate::formatter::DurationFormatter;
use crate::presentation::{cups_label, BEDTIME_TITLE};
use crate::types::WakeTime;
use crate::{PRODUCER_NAME, REST_VERSION};

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Form values as submitted, before any clamping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub wake_time: WakeTime,
    pub sleep_hours: f64,
    pub coffee_cups: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportOutcome {
    Ok {
        title: String,
        /// Accepted desired sleep in hours
        sleep_hours: f64,
        sleep_label: String,
        /// Accepted cups of coffee
        coffee_cups: u32,
        coffee_label: String,
        predicted_sleep_seconds: f64,
        /// `HH:MM`, 24-hour
        bedtime: String,
        /// Days relative to the wake-up day (-1 is the night before)
        day_offset: i64,
        /// Short display form, e.g. `11:00 PM`
        display: String,
    },
    Error {
        title: String,
        message: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateReport {
    pub report_version: String,
    pub report_id: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub request: EstimateRequest,
    pub outcome: ReportOutcome,
}

impl EstimateReport {
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, ReportOutcome::Ok { .. })
    }
}

/// Report encoder stamping every report with producer metadata
pub struct ReportEncoder {
    instance_id: String,
    formatter: DurationFormatter,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new(DurationFormatter::default())
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new(formatter: DurationFormatter) -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
            formatter,
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String, formatter: DurationFormatter) -> Self {
        Self {
            instance_id,
            formatter,
        }
    }

    pub fn encode(
        &self,
        request: EstimateRequest,
        result: &Result<Estimate, EstimationError>,
    ) -> EstimateReport {
        let outcome = match result {
            Ok(estimate) => ReportOutcome::Ok {
                title: BEDTIME_TITLE.to_string(),
                sleep_hours: estimate.sleep_hours.value(),
                sleep_label: self.formatter.format(estimate.sleep_hours.value()),
                coffee_cups: estimate.coffee_cups.value(),
                coffee_label: cups_label(estimate.coffee_cups.value()),
                predicted_sleep_seconds: estimate.predicted_sleep_seconds,
                bedtime: estimate.bedtime.to_string(),
                day_offset: estimate.bedtime.day_offset(),
                display: estimate.bedtime.short_display(),
            },
            Err(e) => ReportOutcome::Error {
                title: e.title().to_string(),
                message: e.message().to_string(),
                reason: e.reason().to_string(),
            },
        };

        EstimateReport {
            report_version: REPORT_VERSION.to_string(),
            report_id: Uuid::new_v4().to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: REST_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            request,
            outcome,
        }
    }

    /// Encode to JSON string
    pub fn encode_to_json(
        &self,
        request: EstimateRequest,
        result: &Result<Estimate, EstimationError>,
    ) -> Result<String, serde_json::Error> {
        let report = self.encode(request, result);
        serde_json::to_string_pretty(&report)
    }
}
