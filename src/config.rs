//! Planner configuration.
//!
//! Every knob has a default, so an empty file (or no file) is a valid
//! configuration:
//!
//! ```toml
//! base_hours = 420.0
//! allowed_multipliers = [0.35, 0.4, 0.45, 0.5, 0.55, 0.6, 0.65, 0.7, 0.75, 0.8, 0.85, 0.9, 0.95, 1.0]
//!
//! [horizon]
//! weeks = 10
//!
//! [margin]
//! initial_lower = 0.67
//! initial_upper = 0.73
//! step = 0.01
//! max_attempts = 10
//!
//! [solver]
//! time_limit = "60s"
//!
//! [sample]
//! employees = ["Alice", "Bob"]
//! min_total_hours = 1850.0
//! max_total_hours = 2000.0
//! ```
//!
//! A custom shift catalog replaces the standard one via `[[catalog.shifts]]`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cp::SolverConfig;
use crate::error::{Result, RosterError};
use crate::models::{DayType, Horizon, ShiftCatalog};
use crate::search::MarginPolicy;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Hours a multiplier of 1.0 corresponds to over the horizon.
    pub base_hours: f64,
    /// Multipliers a manual or sampled employee may carry.
    pub allowed_multipliers: Vec<f64>,
    /// Planning horizon.
    pub horizon: Horizon,
    /// Shifts to staff.
    pub catalog: ShiftCatalog,
    /// Hour-band relaxation.
    pub margin: MarginPolicy,
    /// Solver settings.
    pub solver: SolverConfig,
    /// Sample roster generation.
    pub sample: SampleConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            base_hours: 420.0,
            allowed_multipliers: default_multipliers(),
            horizon: Horizon::default(),
            catalog: ShiftCatalog::standard(),
            margin: MarginPolicy::default(),
            solver: SolverConfig::default(),
            sample: SampleConfig::default(),
        }
    }
}

/// `0.35, 0.40, ..., 1.00`.
fn default_multipliers() -> Vec<f64> {
    (7..=20).map(|i| i as f64 * 0.05).collect()
}

/// Sample roster settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    /// Employee names.
    pub employees: Vec<String>,
    /// Lower end of the accepted aggregate target.
    pub min_total_hours: f64,
    /// Upper end of the accepted aggregate target.
    pub max_total_hours: f64,
    /// Multiplier redraws before the last draw is kept.
    pub max_draws: u32,
    /// Distinct individual exclusions per employee.
    pub individual_days: usize,
    /// Chance that an employee has one recurring weekday off.
    pub recurring_probability: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            employees: ["Alice", "Bob", "Charlie", "David", "Eva", "Frank", "Grace", "Henry"]
                .into_iter()
                .map(String::from)
                .collect(),
            min_total_hours: 1850.0,
            max_total_hours: 2000.0,
            max_draws: 50,
            individual_days: 5,
            recurring_probability: 0.5,
        }
    }
}

impl PlannerConfig {
    /// Reads and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading configuration");
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PlannerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks internal consistency.
    pub fn validate(&self) -> Result<()> {
        if !(self.base_hours.is_finite() && self.base_hours > 0.0) {
            return Err(RosterError::Config(format!(
                "base_hours must be positive (got {})",
                self.base_hours
            )));
        }
        if self.allowed_multipliers.is_empty() {
            return Err(RosterError::Config("allowed_multipliers is empty".into()));
        }
        if let Some(m) = self
            .allowed_multipliers
            .iter()
            .find(|m| !(m.is_finite() && **m > 0.0))
        {
            return Err(RosterError::Config(format!(
                "allowed multipliers must be positive (got {m})"
            )));
        }
        if self.horizon.weeks == 0 {
            return Err(RosterError::Config("horizon must span at least one week".into()));
        }
        if self.catalog.shifts.is_empty() {
            return Err(RosterError::Config("shift catalog is empty".into()));
        }
        for day_type in [DayType::Weekday, DayType::Weekend] {
            if self.catalog.shifts_for(day_type).next().is_none() {
                return Err(RosterError::Config(format!(
                    "shift catalog has no {day_type:?} shifts"
                )));
            }
        }
        if let Some(s) = self.catalog.shifts.iter().find(|s| s.tenths() <= 0) {
            return Err(RosterError::Config(format!(
                "shift {} must have positive hours (got {})",
                s.code, s.hours
            )));
        }
        self.margin.validate().map_err(RosterError::Config)?;
        if self.sample.min_total_hours > self.sample.max_total_hours {
            return Err(RosterError::Config(format!(
                "sample.min_total_hours {} exceeds sample.max_total_hours {}",
                self.sample.min_total_hours, self.sample.max_total_hours
            )));
        }
        Ok(())
    }
}
