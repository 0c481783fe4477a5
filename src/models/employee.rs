//! Employee model.
//!
//! An employee carries a target-hour budget for the whole horizon and two
//! kinds of exclusions: recurring weekdays and individual days.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::horizon::WEEKDAY_NAMES;

/// A staffable employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique name (also used as identifier).
    pub name: String,
    /// Expected hours across the horizon (base hours × multiplier).
    pub target_hours: f64,
    /// Individually unavailable day indices.
    pub unavailable_days: BTreeSet<u32>,
    /// Recurring unavailable weekdays (0 = Monday .. 6 = Sunday).
    pub unavailable_weekdays: BTreeSet<u8>,
}

impl Employee {
    /// Creates an employee with no exclusions.
    pub fn new(name: impl Into<String>, target_hours: f64) -> Self {
        Self {
            name: name.into(),
            target_hours,
            unavailable_days: BTreeSet::new(),
            unavailable_weekdays: BTreeSet::new(),
        }
    }

    /// Creates an employee whose target is `base_hours × multiplier`.
    pub fn with_multiplier(name: impl Into<String>, base_hours: f64, multiplier: f64) -> Self {
        Self::new(name, base_hours * multiplier)
    }

    /// Adds individually unavailable days.
    pub fn with_unavailable_days(mut self, days: impl IntoIterator<Item = u32>) -> Self {
        self.unavailable_days.extend(days);
        self
    }

    /// Adds recurring unavailable weekdays.
    pub fn with_unavailable_weekdays(mut self, weekdays: impl IntoIterator<Item = u8>) -> Self {
        self.unavailable_weekdays.extend(weekdays);
        self
    }

    /// Target in tenths of an hour.
    #[inline]
    pub fn target_tenths(&self) -> i64 {
        (self.target_hours * 10.0).round() as i64
    }

    /// Recurring unavailable weekday names, in weekday order.
    pub fn unavailable_weekday_names(&self) -> Vec<&'static str> {
        self.unavailable_weekdays
            .iter()
            .filter_map(|&w| WEEKDAY_NAMES.get(w as usize).copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_target() {
        let e = Employee::with_multiplier("Alice", 420.0, 1.0);
        assert_eq!(e.target_hours, 420.0);
        assert_eq!(e.target_tenths(), 4200);

        let e = Employee::with_multiplier("Bob", 420.0, 0.35);
        assert_eq!(e.target_tenths(), 1470);
    }

    #[test]
    fn test_exclusions() {
        let e = Employee::new("Alice", 100.0)
            .with_unavailable_days([3, 1, 3])
            .with_unavailable_weekdays([6, 0]);
        assert_eq!(e.unavailable_days.iter().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(e.unavailable_weekday_names(), vec!["Monday", "Sunday"]);
    }
}
