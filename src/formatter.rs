//! Duration labels
//!
//! Turns a fractional hour count such as `7.5` into the label shown next to
//! the sleep stepper, e.g. `7 hours 30 minutes`.

use serde::{Deserialize, Serialize};

/// Rule deciding between the singular and plural noun form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluralRule {
    /// Singular when `n % 10 == 1 && n != 11` (1, 21, 31, ...)
    #[default]
    Legacy,
    /// Singular only when `n == 1`
    English,
}

impl PluralRule {
    pub fn is_singular(&self, n: u64) -> bool {
        match self {
            PluralRule::Legacy => n % 10 == 1 && n != 11,
            PluralRule::English => n == 1,
        }
    }
}

/// Formats fractional hours as `H hour(s) M minute(s)`
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationFormatter {
    rule: PluralRule,
}

impl DurationFormatter {
    pub fn new(rule: PluralRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> PluralRule {
        self.rule
    }

    /// Format `hours` as a label.
    ///
    /// Minutes are rounded down and the minutes clause is left out entirely
    /// when it is zero. Negative or non-finite input formats as zero hours.
    pub fn format(&self, hours: f64) -> String {
        let (whole, minutes) = split_hours(hours);

        let mut label = self.counted(whole, "hour", "hours");
        if minutes != 0 {
            label.push(' ');
            label.push_str(&self.counted(minutes, "minute", "minutes"));
        }
        label
    }

    fn counted(&self, n: u64, singular: &str, plural: &str) -> String {
        let noun = if self.rule.is_singular(n) {
            singular
        } else {
            plural
        };
        format!("{n} {noun}")
    }
}

/// Format with the default pluralization rule
pub fn format_duration(hours: f64) -> String {
    DurationFormatter::default().format(hours)
}

/// Whole hours and the remaining whole minutes
fn split_hours(hours: f64) -> (u64, u64) {
    let hours = if hours.is_finite() && hours > 0.0 {
        hours
    } else {
        0.0
    };
    let whole = hours.floor();
    let minutes = ((hours - whole) * 60.0).floor();
    (whole as u64, minutes as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HoursRange;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_whole_hours_omit_minutes() {
        assert_eq!(format_duration(8.0), "8 hours");
        assert_eq!(format_duration(12.0), "12 hours");
    }

    #[test]
    fn test_half_hours() {
        assert_eq!(format_duration(7.5), "7 hours 30 minutes");
        assert_eq!(format_duration(4.5), "4 hours 30 minutes");
    }

    #[test]
    fn test_every_stepper_value_has_hour_numeral() {
        for hours in HoursRange::default().values() {
            let label = format_duration(hours);
            let numeral = (hours.floor() as u64).to_string();
            assert!(
                label.starts_with(&format!("{numeral} ")),
                "{label} should start with {numeral}"
            );
            assert!(!label.ends_with(' '));
        }
    }

    #[test]
    fn test_minutes_round_down() {
        // 0.99 h = 59.4 min
        assert_eq!(format_duration(1.99), "1 hour 59 minutes");
        assert_eq!(format_duration(2.0 + 1.0 / 60.0 + 1e-9), "2 hours 1 minute");
    }

    #[test]
    fn test_legacy_rule() {
        let rule = PluralRule::Legacy;
        assert!(rule.is_singular(1));
        assert!(rule.is_singular(21));
        assert!(!rule.is_singular(11));
        assert!(!rule.is_singular(0));
        assert!(!rule.is_singular(8));

        let formatter = DurationFormatter::new(rule);
        assert_eq!(formatter.format(11.0), "11 hours");
        assert_eq!(formatter.format(21.35), "21 hour 21 minute");
    }

    #[test]
    fn test_english_rule() {
        let formatter = DurationFormatter::new(PluralRule::English);
        assert_eq!(formatter.format(1.0), "1 hour");
        assert_eq!(formatter.format(21.35), "21 hours 21 minutes");
    }

    #[test]
    fn test_bad_input_formats_as_zero() {
        assert_eq!(format_duration(-2.0), "0 hours");
        assert_eq!(format_duration(f64::NAN), "0 hours");
    }
}
