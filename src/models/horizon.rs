//! Planning horizon and day arithmetic.
//!
//! Days are zero-based indices counted from the first Monday of the
//! horizon, so `day % 7` is the weekday (0 = Monday .. 6 = Sunday).

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Number of days in a week.
pub const DAYS_PER_WEEK: u32 = 7;

/// Weekday names indexed by `day % 7`.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Weekday / weekend classification of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    /// Monday to Friday.
    Weekday,
    /// Saturday and Sunday.
    Weekend,
}

/// Weekday index (0 = Monday).
#[inline]
pub fn weekday(day: u32) -> u8 {
    (day % DAYS_PER_WEEK) as u8
}

/// Day type of a day index.
#[inline]
pub fn day_type(day: u32) -> DayType {
    if weekday(day) < 5 {
        DayType::Weekday
    } else {
        DayType::Weekend
    }
}

/// Parses a weekday name (case-insensitive, surrounding whitespace ignored).
pub fn parse_weekday(name: &str) -> Option<u8> {
    let name = name.trim();
    WEEKDAY_NAMES
        .iter()
        .position(|w| w.eq_ignore_ascii_case(name))
        .map(|i| i as u8)
}

/// A horizon of whole weeks starting on a Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Horizon {
    /// Number of weeks (default: 10, i.e. 70 days).
    pub weeks: u32,
}

impl Default for Horizon {
    fn default() -> Self {
        Self { weeks: 10 }
    }
}

impl Horizon {
    /// Creates a horizon of `weeks` weeks.
    pub fn new(weeks: u32) -> Self {
        Self { weeks }
    }

    /// Total number of days.
    #[inline]
    pub fn days(&self) -> u32 {
        self.weeks * DAYS_PER_WEEK
    }

    /// Whether a day index falls inside the horizon.
    #[inline]
    pub fn contains(&self, day: u32) -> bool {
        day < self.days()
    }

    /// Day range of week `week` (zero-based).
    pub fn week_days(&self, week: u32) -> Range<u32> {
        let start = week * DAYS_PER_WEEK;
        start..start + DAYS_PER_WEEK
    }

    /// Iterates over all day indices.
    pub fn iter_days(&self) -> Range<u32> {
        0..self.days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_type() {
        assert_eq!(day_type(0), DayType::Weekday);
        assert_eq!(day_type(4), DayType::Weekday);
        assert_eq!(day_type(5), DayType::Weekend);
        assert_eq!(day_type(6), DayType::Weekend);
        assert_eq!(day_type(7), DayType::Weekday);
        assert_eq!(day_type(69), DayType::Weekend);
    }

    #[test]
    fn test_parse_weekday() {
        assert_eq!(parse_weekday("monday"), Some(0));
        assert_eq!(parse_weekday("  SUNDAY "), Some(6));
        assert_eq!(parse_weekday("Thursday"), Some(3));
        assert_eq!(parse_weekday("funday"), None);
        assert_eq!(parse_weekday(""), None);
    }

    #[test]
    fn test_default_horizon() {
        let h = Horizon::default();
        assert_eq!(h.days(), 70);
        assert!(h.contains(69));
        assert!(!h.contains(70));
        assert_eq!(h.week_days(9), 63..70);
    }
}
