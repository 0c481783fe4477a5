//! Employee availability.
//!
//! Combines two exclusion sources into a per-employee, per-day boolean.
//!
//! # Precedence
//! Neither source overrides the other. A day is unavailable iff:
//! - its weekday (`day % 7`) is a recurring exclusion, OR
//! - the day itself is an individual exclusion.
//!
//! Days outside the horizon are never available.

use crate::models::{weekday, Employee, Horizon};

/// Whether `employee` can work on `day`.
#[inline]
pub fn is_available(employee: &Employee, day: u32) -> bool {
    !(employee.unavailable_weekdays.contains(&weekday(day))
        || employee.unavailable_days.contains(&day))
}

/// Precomputed availability matrix (employee × day).
///
/// Rows follow the order of the employee slice it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    days: u32,
    rows: Vec<Vec<bool>>,
}

impl Availability {
    /// Computes availability for every employee over the horizon.
    ///
    /// # Complexity
    /// O(employees × days)
    pub fn compute(employees: &[Employee], horizon: &Horizon) -> Self {
        let rows = employees
            .iter()
            .map(|e| horizon.iter_days().map(|d| is_available(e, d)).collect())
            .collect();
        Self {
            days: horizon.days(),
            rows,
        }
    }

    /// Whether employee `employee_idx` can work on `day`.
    ///
    /// Out-of-range employees or days report `false`.
    #[inline]
    pub fn is_available(&self, employee_idx: usize, day: u32) -> bool {
        self.rows
            .get(employee_idx)
            .and_then(|row| row.get(day as usize))
            .copied()
            .unwrap_or(false)
    }

    /// Number of available days for an employee.
    pub fn available_days(&self, employee_idx: usize) -> usize {
        self.rows
            .get(employee_idx)
            .map(|row| row.iter().filter(|&&a| a).count())
            .unwrap_or(0)
    }

    /// Number of employees available on a day.
    pub fn staff_on(&self, day: u32) -> usize {
        (0..self.rows.len())
            .filter(|&e| self.is_available(e, day))
            .count()
    }

    /// Number of employee rows.
    pub fn employee_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of days covered.
    pub fn days(&self) -> u32 {
        self.days
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_no_exclusions() {
        let e = Employee::new("Alice", 100.0);
        assert!((0..70).all(|d| is_available(&e, d)));
    }

    #[test]
    fn test_recurring_weekday() {
        let e = Employee::new("Alice", 100.0).with_unavailable_weekdays([2]);
        assert!(!is_available(&e, 2));
        assert!(!is_available(&e, 9));
        assert!(!is_available(&e, 65));
        assert!(is_available(&e, 3));
    }

    #[test]
    fn test_individual_and_recurring_combine() {
        let e = Employee::new("Alice", 100.0)
            .with_unavailable_weekdays([0])
            .with_unavailable_days([14, 20]);
        // Day 14 is excluded by both sources.
        assert!(!is_available(&e, 14));
        assert!(!is_available(&e, 20));
        assert!(!is_available(&e, 21));
        assert!(is_available(&e, 15));
    }

    #[test]
    fn test_matrix_bounds() {
        let employees = vec![Employee::new("A", 1.0), Employee::new("B", 1.0).with_unavailable_days([3])];
        let avail = Availability::compute(&employees, &Horizon::new(1));
        assert_eq!(avail.days(), 7);
        assert_eq!(avail.employee_count(), 2);
        assert!(avail.is_available(0, 6));
        assert!(!avail.is_available(0, 7));
        assert!(!avail.is_available(2, 0));
        assert_eq!(avail.available_days(1), 6);
        assert_eq!(avail.staff_on(3), 1);
    }

    proptest! {
        #[test]
        fn prop_availability_is_or_of_sources(
            weekdays in proptest::collection::btree_set(0u8..7, 0..4),
            days in proptest::collection::btree_set(0u32..70, 0..20),
            day in 0u32..70,
        ) {
            let e = Employee::new("P", 10.0)
                .with_unavailable_weekdays(weekdays.clone())
                .with_unavailable_days(days.clone());
            let expected = !(weekdays.contains(&((day % 7) as u8)) || days.contains(&day));
            prop_assert_eq!(is_available(&e, day), expected);

            let avail = Availability::compute(std::slice::from_ref(&e), &Horizon::default());
            prop_assert_eq!(avail.is_available(0, day), expected);
        }
    }
}
