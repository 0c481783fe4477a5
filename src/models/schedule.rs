//! Schedule (solution) model.
//!
//! A schedule is the set of employee-day-shift assignments produced by one
//! successful solve. It may carry violations found when the decoded
//! assignment is re-checked against the roster.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::horizon::{day_type, DayType};

/// A complete schedule (solution to a rostering problem).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    /// Employee-day-shift assignments, sorted by employee then day.
    pub assignments: Vec<Assignment>,
    /// Constraint violations detected in this schedule.
    pub violations: Vec<Violation>,
}

/// "Employee works shift on day."
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Employee name.
    pub employee: String,
    /// Day index.
    pub day: u32,
    /// Shift code.
    pub shift: String,
    /// Shift duration (hours).
    pub hours: f64,
}

/// A constraint violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity (employee name or `day/shift` slot).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of constraint violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// A shift slot has no employee, or more than one.
    CoverageGap,
    /// An employee holds more than one shift on a day.
    DoubleBooking,
    /// An employee is assigned on a day they are unavailable.
    EmployeeUnavailable,
    /// Scheduled hours fall outside the margin band.
    HourBand,
}

impl Assignment {
    /// Creates a new assignment.
    pub fn new(employee: impl Into<String>, day: u32, shift: impl Into<String>, hours: f64) -> Self {
        Self {
            employee: employee.into(),
            day,
            shift: shift.into(),
            hours,
        }
    }

    /// Day type of the assigned day.
    #[inline]
    pub fn day_type(&self) -> DayType {
        day_type(self.day)
    }
}

impl Violation {
    /// Creates a coverage violation for a `(day, shift)` slot.
    pub fn coverage_gap(day: u32, shift: &str, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::CoverageGap,
            entity_id: format!("{day}/{shift}"),
            message: message.into(),
            severity: 100,
        }
    }

    /// Creates a double-booking violation.
    pub fn double_booking(employee: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::DoubleBooking,
            entity_id: employee.into(),
            message: message.into(),
            severity: 95,
        }
    }

    /// Creates an availability violation.
    pub fn employee_unavailable(employee: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::EmployeeUnavailable,
            entity_id: employee.into(),
            message: message.into(),
            severity: 90,
        }
    }

    /// Creates an hour-band violation.
    pub fn hour_band(employee: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::HourBand,
            entity_id: employee.into(),
            message: message.into(),
            severity: 60,
        }
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assignment.
    pub fn add_assignment(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    /// Adds a violation.
    pub fn add_violation(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Whether the schedule has no violations.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns all assignments for an employee.
    pub fn assignments_for_employee(&self, employee: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.employee == employee)
            .collect()
    }

    /// Returns all assignments on a day.
    pub fn assignments_on_day(&self, day: u32) -> Vec<&Assignment> {
        self.assignments.iter().filter(|a| a.day == day).collect()
    }

    /// The shift an employee works on a day, if any.
    pub fn assignment_on(&self, employee: &str, day: u32) -> Option<&Assignment> {
        self.assignments
            .iter()
            .find(|a| a.employee == employee && a.day == day)
    }

    /// Total scheduled hours for an employee.
    pub fn scheduled_hours(&self, employee: &str) -> f64 {
        self.assignments_for_employee(employee)
            .iter()
            .map(|a| a.hours)
            .sum()
    }

    /// Scheduled hours for every employee that has assignments.
    pub fn hours_by_employee(&self) -> HashMap<String, f64> {
        let mut hours: HashMap<String, f64> = HashMap::new();
        for a in &self.assignments {
            *hours.entry(a.employee.clone()).or_insert(0.0) += a.hours;
        }
        hours
    }

    /// Number of employees assigned to a `(day, shift)` slot.
    pub fn slot_count(&self, day: u32, shift: &str) -> usize {
        self.assignments
            .iter()
            .filter(|a| a.day == day && a.shift == shift)
            .count()
    }

    /// Sorts assignments by employee name, then day.
    pub fn sort(&mut self) {
        self.assignments
            .sort_by(|a, b| a.employee.cmp(&b.employee).then(a.day.cmp(&b.day)));
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }
}
