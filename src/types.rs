//! Core types for the BetterRest estimator
//!
//! Form inputs (wake time, desired sleep, coffee intake), the ranges that bound
//! them, and the computed bedtime.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

pub const SECONDS_PER_HOUR: u32 = 3600;
pub const SECONDS_PER_MINUTE: u32 = 60;
const MILLIS_PER_DAY: i64 = 86_400_000;
const STEP_TOLERANCE: f64 = 1e-9;

/// Time of day the user wants to wake up. Only hour and minute are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WakeTime {
    hour: u32,
    minute: u32,
}

impl WakeTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    /// Drop everything below minute precision
    pub fn from_time(time: NaiveTime) -> Self {
        Self {
            hour: time.hour(),
            minute: time.minute(),
        }
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Seconds past midnight, the `wake` feature of the sleep model
    pub fn seconds_past_midnight(&self) -> u32 {
        self.hour * SECONDS_PER_HOUR + self.minute * SECONDS_PER_MINUTE
    }
}

impl Default for WakeTime {
    fn default() -> Self {
        Self { hour: 8, minute: 0 }
    }
}

impl fmt::Display for WakeTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for WakeTime {
    type Err = ConfigError;

    /// Accepts `HH:MM` (24-hour) or `H:MM AM` / `H:MM PM`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&trimmed.to_uppercase(), "%I:%M %p"))
            .map(Self::from_time)
            .map_err(|_| ConfigError::InvalidTime(s.to_string()))
    }
}

impl TryFrom<String> for WakeTime {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WakeTime> for String {
    fn from(value: WakeTime) -> Self {
        value.to_string()
    }
}

/// Allowed values for desired sleep, as offered by the stepper
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoursRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for HoursRange {
    fn default() -> Self {
        Self {
            min: 4.0,
            max: 12.0,
            step: 0.5,
        }
    }
}

impl HoursRange {
    pub fn contains(&self, hours: f64) -> bool {
        hours >= self.min && hours <= self.max
    }

    /// Whether `hours` lies on the step grid counted from `min`
    pub fn is_on_step(&self, hours: f64) -> bool {
        (self.clamp(hours) - hours).abs() < STEP_TOLERANCE
    }

    /// Clamp into range, then snap to the nearest step counted from `min`.
    ///
    /// Never panics; an inverted range or a non-positive step yields `min`.
    pub fn clamp(&self, hours: f64) -> f64 {
        if !self.is_well_formed() {
            return self.min;
        }
        let clamped = hours.max(self.min).min(self.max);
        let steps = ((clamped - self.min) / self.step).round();
        (self.min + steps * self.step).min(self.max)
    }

    /// Every value the stepper can show, lowest first
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        let count = if self.is_well_formed() {
            ((self.max - self.min) / self.step).floor() as usize
        } else {
            0
        };
        (0..=count).map(move |i| self.min + i as f64 * self.step)
    }

    fn is_well_formed(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.step.is_finite()
            && self.step > 0.0
            && self.min <= self.max
    }
}

/// Allowed values for daily coffee intake, as offered by the picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CupsRange {
    pub min: u32,
    pub max: u32,
}

impl Default for CupsRange {
    fn default() -> Self {
        Self { min: 0, max: 20 }
    }
}

impl CupsRange {
    pub fn contains(&self, cups: i64) -> bool {
        cups >= i64::from(self.min) && cups <= i64::from(self.max)
    }

    /// Never panics; an inverted range yields `min`
    pub fn clamp(&self, cups: i64) -> u32 {
        if self.min > self.max || cups <= i64::from(self.min) {
            self.min
        } else if cups >= i64::from(self.max) {
            self.max
        } else {
            // Strictly between two u32 bounds
            cups as u32
        }
    }
}

/// Target total sleep, always inside its [`HoursRange`]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct DesiredSleepHours(f64);

impl DesiredSleepHours {
    /// Clamp and snap into range. `None` for NaN or infinite input.
    pub fn clamped(hours: f64, range: &HoursRange) -> Option<Self> {
        if !hours.is_finite() {
            return None;
        }
        Some(Self(range.clamp(hours)))
    }

    /// Refuse values outside the range or off the step grid
    pub fn checked(hours: f64, range: &HoursRange) -> Option<Self> {
        if !hours.is_finite() || !range.contains(hours) || !range.is_on_step(hours) {
            return None;
        }
        Some(Self(range.clamp(hours)))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for DesiredSleepHours {
    fn default() -> Self {
        Self(8.0)
    }
}

/// Cups of coffee per day, always inside its [`CupsRange`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CoffeeCups(u32);

impl CoffeeCups {
    pub fn clamped(cups: i64, range: &CupsRange) -> Self {
        Self(range.clamp(cups))
    }

    pub fn checked(cups: i64, range: &CupsRange) -> Option<Self> {
        range.contains(cups).then(|| Self(range.clamp(cups)))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl Default for CoffeeCups {
    fn default() -> Self {
        Self(1)
    }
}

/// Recommended bedtime: wake time minus predicted actual sleep.
///
/// `day_offset` counts calendar days relative to the wake-up day, so a
/// bedtime of 23:00 before a 07:00 alarm has `day_offset == -1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bedtime {
    time: NaiveTime,
    day_offset: i64,
}

impl Bedtime {
    /// Subtract `sleep` from `wake`, tracking day rollover
    pub fn before(wake: WakeTime, sleep: Duration) -> Self {
        let wake_ms = i64::from(wake.seconds_past_midnight()) * 1000;
        let total_ms = wake_ms - sleep.num_milliseconds();

        let day_offset = total_ms.div_euclid(MILLIS_PER_DAY);
        let time = NaiveTime::default()
            + Duration::milliseconds(total_ms.rem_euclid(MILLIS_PER_DAY));

        Self { time, day_offset }
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    pub fn hour(&self) -> u32 {
        self.time.hour()
    }

    pub fn minute(&self) -> u32 {
        self.time.minute()
    }

    pub fn day_offset(&self) -> i64 {
        self.day_offset
    }

    pub fn is_previous_day(&self) -> bool {
        self.day_offset == -1
    }

    /// Anchor to a calendar date, given the date of the wake-up
    pub fn on(&self, wake_date: NaiveDate) -> Option<NaiveDateTime> {
        let date = wake_date.checked_add_signed(Duration::days(self.day_offset))?;
        Some(date.and_time(self.time))
    }

    /// Short time-of-day string, e.g. `11:00 PM`
    pub fn short_display(&self) -> String {
        self.time.format("%-I:%M %p").to_string()
    }
}

impl fmt::Display for Bedtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.time.format("%H:%M"))
    }
}
