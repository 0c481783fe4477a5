//! Roster input.
//!
//! A `Roster` is the list of employees for one run. It is produced by a
//! `RosterSource`; the engine never inspects which source was used.
//!
//! - **`SampleRoster`**: randomized multipliers and exclusions
//! - **`ManualRoster`**: free-text entries (form fields or a TOML file)
//!   parsed leniently; malformed values are dropped or replaced with a
//!   fallback and logged

mod manual;
mod sample;

pub use manual::{parse_day_list, parse_multiplier, parse_weekday_list, ManualEntry, ManualRoster};
pub use sample::SampleRoster;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

use crate::config::PlannerConfig;
use crate::models::{Employee, Horizon};
use crate::validation::{validate_roster, ValidationError};

/// Produces a roster for one run.
pub trait RosterSource {
    /// Builds the roster. Randomized fallbacks draw from `rng`.
    fn produce(&self, config: &PlannerConfig, rng: &mut dyn RngCore) -> Roster;
}

/// Employees for one planning run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    /// Employees, in display order.
    pub employees: Vec<Employee>,
}

impl Roster {
    /// Creates a roster.
    pub fn new(employees: Vec<Employee>) -> Self {
        Self { employees }
    }

    /// Whether the roster has no employees.
    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    /// Number of employees.
    pub fn len(&self) -> usize {
        self.employees.len()
    }

    /// Sum of target hours.
    pub fn total_target_hours(&self) -> f64 {
        self.employees.iter().map(|e| e.target_hours).sum()
    }

    /// Returns a copy with input problems repaired, plus what was repaired.
    ///
    /// - blank names become `Employee N`
    /// - duplicate names get a `#2`, `#3`, ... suffix
    /// - days outside the horizon and weekdays above 6 are dropped
    /// - negative or non-finite targets become 0
    pub fn sanitized(&self, horizon: &Horizon) -> (Roster, Vec<ValidationError>) {
        let issues = validate_roster(self, horizon).err().unwrap_or_default();

        let mut seen: HashSet<String> = HashSet::new();
        let employees = self
            .employees
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let mut e = e.clone();
                if e.name.trim().is_empty() {
                    e.name = format!("Employee {}", i + 1);
                } else {
                    e.name = e.name.trim().to_string();
                }
                if seen.contains(&e.name) {
                    let base = e.name.clone();
                    let mut n = 2;
                    while seen.contains(&format!("{base} #{n}")) {
                        n += 1;
                    }
                    e.name = format!("{base} #{n}");
                }
                seen.insert(e.name.clone());

                e.unavailable_days.retain(|&d| horizon.contains(d));
                e.unavailable_weekdays.retain(|&w| w < 7);
                if !e.target_hours.is_finite() || e.target_hours < 0.0 {
                    e.target_hours = 0.0;
                }
                e
            })
            .collect();

        for issue in &issues {
            warn!(kind = ?issue.kind, "{}", issue.message);
        }
        (Roster { employees }, issues)
    }
}
