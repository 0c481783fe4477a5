//! Weekly projection of a solved schedule.
//!
//! Splits the horizon into contiguous 7-day blocks in ascending order and
//! renders one table per block: a row per employee, a column per day.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use crate::availability::Availability;
use crate::models::{Employee, Horizon, Schedule};

/// Content of one employee-day cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Cell {
    /// The employee works this shift code.
    Shift(String),
    /// Available but not scheduled.
    Off,
    /// Excluded by a recurring or individual unavailability.
    Unavailable,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Shift(code) => f.write_str(code),
            Cell::Off => f.write_str("Off"),
            Cell::Unavailable => f.write_str("Unavailable"),
        }
    }
}

/// One employee's row in a weekly view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyRow {
    /// Employee name.
    pub employee: String,
    /// One cell per day of the week.
    pub cells: Vec<Cell>,
}

/// A 7-day block of the schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyView {
    /// Zero-based week number.
    pub week: u32,
    /// Days covered, ascending.
    pub days: Range<u32>,
    /// Rows in roster order.
    pub rows: Vec<WeeklyRow>,
}

impl WeeklyView {
    /// Sheet name ("Week 1", "Week 2", ...).
    pub fn title(&self) -> String {
        format!("Week {}", self.week + 1)
    }

    /// Column labels using 1-based absolute day numbers ("Day 8".."Day 14").
    pub fn column_labels(&self) -> Vec<String> {
        self.days.clone().map(|d| format!("Day {}", d + 1)).collect()
    }

    /// Cell for an employee on an absolute day index.
    pub fn cell(&self, employee: &str, day: u32) -> Option<&Cell> {
        if !self.days.contains(&day) {
            return None;
        }
        self.rows
            .iter()
            .find(|r| r.employee == employee)
            .and_then(|r| r.cells.get((day - self.days.start) as usize))
    }
}

/// Projects schedules onto weekly views.
pub struct ScheduleProjector<'a> {
    employees: &'a [Employee],
    availability: &'a Availability,
    horizon: Horizon,
}

impl<'a> ScheduleProjector<'a> {
    /// Creates a projector. `availability` rows must follow `employees`.
    pub fn new(employees: &'a [Employee], availability: &'a Availability, horizon: Horizon) -> Self {
        Self {
            employees,
            availability,
            horizon,
        }
    }

    /// Classifies one employee-day.
    ///
    /// Unavailability wins over any assignment.
    fn classify(&self, employee_idx: usize, day: u32, assigned: Option<&str>) -> Cell {
        if !self.availability.is_available(employee_idx, day) {
            return Cell::Unavailable;
        }
        match assigned {
            Some(code) => Cell::Shift(code.to_string()),
            None => Cell::Off,
        }
    }

    /// Projects a schedule into `horizon.weeks` weekly views.
    pub fn project(&self, schedule: &Schedule) -> Vec<WeeklyView> {
        let assigned: HashMap<(&str, u32), &str> = schedule
            .assignments
            .iter()
            .map(|a| ((a.employee.as_str(), a.day), a.shift.as_str()))
            .collect();

        (0..self.horizon.weeks)
            .map(|week| {
                let days = self.horizon.week_days(week);
                let rows = self
                    .employees
                    .iter()
                    .enumerate()
                    .map(|(e, employee)| WeeklyRow {
                        employee: employee.name.clone(),
                        cells: days
                            .clone()
                            .map(|d| {
                                self.classify(e, d, assigned.get(&(employee.name.as_str(), d)).copied())
                            })
                            .collect(),
                    })
                    .collect();
                WeeklyView { week, days, rows }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Assignment;
    use proptest::prelude::*;

    fn project(employees: &[Employee], schedule: &Schedule, horizon: Horizon) -> Vec<WeeklyView> {
        let avail = Availability::compute(employees, &horizon);
        ScheduleProjector::new(employees, &avail, horizon).project(schedule)
    }

    #[test]
    fn test_ten_weeks_by_default() {
        let employees = vec![Employee::new("A", 10.0)];
        let views = project(&employees, &Schedule::new(), Horizon::default());
        assert_eq!(views.len(), 10);
        assert_eq!(views[0].title(), "Week 1");
        assert_eq!(views[9].days, 63..70);
        assert_eq!(views[1].column_labels()[0], "Day 8");
        assert_eq!(views[1].column_labels()[6], "Day 14");
    }

    #[test]
    fn test_cell_classification() {
        let employees = vec![
            Employee::new("A", 10.0).with_unavailable_days([2]),
            Employee::new("B", 10.0),
        ];
        let mut schedule = Schedule::new();
        schedule.add_assignment(Assignment::new("A", 0, "FA", 2.5));
        schedule.add_assignment(Assignment::new("B", 2, "AB", 6.0));

        let views = project(&employees, &schedule, Horizon::new(1));
        let w = &views[0];
        assert_eq!(w.cell("A", 0), Some(&Cell::Shift("FA".into())));
        assert_eq!(w.cell("A", 1), Some(&Cell::Off));
        assert_eq!(w.cell("A", 2), Some(&Cell::Unavailable));
        assert_eq!(w.cell("B", 2), Some(&Cell::Shift("AB".into())));
        assert_eq!(w.cell("B", 7), None);
        assert_eq!(w.cell("Z", 0), None);
    }

    #[test]
    fn test_recurring_and_individual_exclusions() {
        // Mondays off plus an individual exclusion on day 14 (also a Monday).
        let employees = vec![Employee::new("A", 10.0)
            .with_unavailable_weekdays([0])
            .with_unavailable_days([14])];
        let mut schedule = Schedule::new();
        schedule.add_assignment(Assignment::new("A", 15, "FB", 2.5));

        let views = project(&employees, &schedule, Horizon::default());
        for day in (0..70).step_by(7) {
            let view = &views[(day / 7) as usize];
            assert_eq!(view.cell("A", day), Some(&Cell::Unavailable), "day {day}");
        }
        assert_eq!(views[2].cell("A", 14), Some(&Cell::Unavailable));
        assert_eq!(views[2].cell("A", 15), Some(&Cell::Shift("FB".into())));
        assert_eq!(views[2].cell("A", 16), Some(&Cell::Off));
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Shift("SA".into()).to_string(), "SA");
        assert_eq!(Cell::Off.to_string(), "Off");
        assert_eq!(Cell::Unavailable.to_string(), "Unavailable");
    }

    proptest! {
        #[test]
        fn prop_weeks_partition_horizon(weeks in 1u32..15, staff in 1usize..4) {
            let employees: Vec<Employee> =
                (0..staff).map(|i| Employee::new(format!("E{i}"), 10.0)).collect();
            let horizon = Horizon::new(weeks);
            let views = project(&employees, &Schedule::new(), horizon);

            prop_assert_eq!(views.len() as u32, weeks);
            let mut seen = Vec::new();
            for (w, view) in views.iter().enumerate() {
                prop_assert_eq!(view.week, w as u32);
                prop_assert_eq!(view.days.len(), 7);
                prop_assert_eq!(view.rows.len(), staff);
                for row in &view.rows {
                    prop_assert_eq!(row.cells.len(), 7);
                }
                seen.extend(view.days.clone());
            }
            let expected: Vec<u32> = horizon.iter_days().collect();
            prop_assert_eq!(seen, expected);
        }
    }
}
