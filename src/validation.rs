//! Input validation and schedule verification.
//!
//! `validate_roster` checks a roster before the model is built. Detects:
//! - An empty roster
//! - Blank or duplicate names
//! - Individual exclusions outside the horizon
//! - Recurring weekdays outside 0..=6
//! - Negative or non-finite targets
//!
//! `verify_schedule` re-checks a decoded schedule against the hard
//! constraints the model encoded. A clean solve yields no violations.

use std::collections::{HashMap, HashSet};

use crate::availability::Availability;
use crate::models::{Employee, Horizon, Schedule, ShiftCatalog, Violation};
use crate::roster::Roster;
use crate::search::MarginWindow;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The roster has no employees.
    EmptyRoster,
    /// An employee has an empty or whitespace-only name.
    BlankName,
    /// Two employees share a name.
    DuplicateName,
    /// An individual exclusion lies outside the horizon.
    DayOutOfRange,
    /// A recurring weekday is not in 0..=6.
    WeekdayOutOfRange,
    /// A target is negative or not a number.
    InvalidTarget,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a roster against a horizon.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_roster(roster: &Roster, horizon: &Horizon) -> ValidationResult {
    let mut errors = Vec::new();

    if roster.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyRoster,
            "Roster has no employees",
        ));
    }

    let mut names = HashSet::new();
    for (i, e) in roster.employees.iter().enumerate() {
        let name = e.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::BlankName,
                format!("Employee #{} has no name", i + 1),
            ));
        } else if !names.insert(name) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateName,
                format!("Duplicate employee name: {name}"),
            ));
        }

        for &d in e.unavailable_days.iter().filter(|&&d| !horizon.contains(d)) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DayOutOfRange,
                format!(
                    "Employee '{}' excludes day {d}, outside 0..{}",
                    e.name,
                    horizon.days()
                ),
            ));
        }

        for &w in e.unavailable_weekdays.iter().filter(|&&w| w > 6) {
            errors.push(ValidationError::new(
                ValidationErrorKind::WeekdayOutOfRange,
                format!("Employee '{}' excludes weekday {w}, outside 0..=6", e.name),
            ));
        }

        if !e.target_hours.is_finite() || e.target_hours < 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidTarget,
                format!("Employee '{}' has invalid target {}", e.name, e.target_hours),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks a schedule against coverage, availability, one-shift-per-day and
/// the hour band for `window`.
///
/// `availability` rows must follow `employees`.
pub fn verify_schedule(
    schedule: &Schedule,
    employees: &[Employee],
    availability: &Availability,
    catalog: &ShiftCatalog,
    horizon: &Horizon,
    window: &MarginWindow,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    for day in horizon.iter_days() {
        for shift in catalog.shifts_on(day) {
            let n = schedule.slot_count(day, &shift.code);
            if n != 1 {
                violations.push(Violation::coverage_gap(
                    day,
                    &shift.code,
                    format!("Day {day} shift {} staffed {n} times", shift.code),
                ));
            }
        }
    }

    let index: HashMap<&str, usize> = employees
        .iter()
        .enumerate()
        .map(|(i, e)| (e.name.as_str(), i))
        .collect();

    let mut per_day: HashMap<(&str, u32), usize> = HashMap::new();
    for a in &schedule.assignments {
        *per_day.entry((a.employee.as_str(), a.day)).or_default() += 1;
        match index.get(a.employee.as_str()) {
            Some(&idx) if !availability.is_available(idx, a.day) => {
                violations.push(Violation::employee_unavailable(
                    &a.employee,
                    format!("'{}' assigned {} on unavailable day {}", a.employee, a.shift, a.day),
                ));
            }
            None => {
                violations.push(Violation::employee_unavailable(
                    &a.employee,
                    format!("'{}' is not on the roster", a.employee),
                ));
            }
            _ => {}
        }
    }

    let mut doubled: Vec<_> = per_day.into_iter().filter(|(_, n)| *n > 1).collect();
    doubled.sort();
    for ((employee, day), n) in doubled {
        violations.push(Violation::double_booking(
            employee,
            format!("'{employee}' holds {n} shifts on day {day}"),
        ));
    }

    for e in employees {
        let scheduled: i64 = schedule
            .assignments_for_employee(&e.name)
            .iter()
            .map(|a| (a.hours * 10.0).round() as i64)
            .sum();
        if !window.admits(e.target_tenths(), scheduled) {
            let (lo, hi) = window.bounds_tenths(e.target_tenths());
            violations.push(Violation::hour_band(
                &e.name,
                format!(
                    "'{}' scheduled {:.1}h outside [{:.1}h, {:.1}h]",
                    e.name,
                    scheduled as f64 / 10.0,
                    lo as f64 / 10.0,
                    hi as f64 / 10.0
                ),
            ));
        }
    }

    violations
}
