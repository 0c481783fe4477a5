//! Manually entered rosters.
//!
//! Entries hold raw text exactly as typed into a form. Parsing never fails:
//! bad tokens are skipped, and a missing or disallowed multiplier is
//! replaced by a random allowed one. Every repair is logged at `warn`.
//!
//! ```toml
//! [[employee]]
//! name = "Alice"
//! multiplier = "0.5"
//! unavailable_days = "3, 17, 40"
//! unavailable_weekdays = "Sunday"
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use rand::seq::IndexedRandom;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Roster, RosterSource};
use crate::config::PlannerConfig;
use crate::error::Result;
use crate::models::horizon::parse_weekday;
use crate::models::{Employee, Horizon};

/// One employee as entered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManualEntry {
    /// Employee name.
    pub name: String,
    /// Multiplier text; blank picks a random allowed value.
    pub multiplier: Option<String>,
    /// Comma-separated day indices.
    pub unavailable_days: String,
    /// Comma-separated weekday names or numbers (0 = Monday).
    pub unavailable_weekdays: String,
}

impl ManualEntry {
    /// Entry with a name and multiplier text.
    pub fn new(name: impl Into<String>, multiplier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            multiplier: Some(multiplier.into()),
            ..Self::default()
        }
    }

    /// Sets the individual exclusion text.
    pub fn with_days(mut self, days: impl Into<String>) -> Self {
        self.unavailable_days = days.into();
        self
    }

    /// Sets the recurring exclusion text.
    pub fn with_weekdays(mut self, weekdays: impl Into<String>) -> Self {
        self.unavailable_weekdays = weekdays.into();
        self
    }
}

/// A roster built from manual entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualRoster {
    /// Entries in display order.
    #[serde(rename = "employee", default)]
    pub entries: Vec<ManualEntry>,
}

impl ManualRoster {
    /// Creates a roster from entries.
    pub fn new(entries: Vec<ManualEntry>) -> Self {
        Self { entries }
    }

    /// Parses `[[employee]]` tables.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Reads `[[employee]]` tables from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }
}

impl RosterSource for ManualRoster {
    fn produce(&self, config: &PlannerConfig, rng: &mut dyn RngCore) -> Roster {
        let employees = self
            .entries
            .iter()
            .filter(|entry| {
                let keep = !entry.name.trim().is_empty();
                if !keep {
                    warn!("skipping manual entry without a name");
                }
                keep
            })
            .map(|entry| {
                let name = entry.name.trim();
                let multiplier = entry
                    .multiplier
                    .as_deref()
                    .filter(|m| !m.trim().is_empty())
                    .and_then(|m| parse_multiplier(name, m, &config.allowed_multipliers))
                    .unwrap_or_else(|| {
                        let m = config.allowed_multipliers.choose(rng).copied().unwrap_or(1.0);
                        warn!(employee = name, multiplier = m, "using random multiplier");
                        m
                    });
                Employee::with_multiplier(name, config.base_hours, multiplier)
                    .with_unavailable_days(parse_day_list(name, &entry.unavailable_days, &config.horizon))
                    .with_unavailable_weekdays(parse_weekday_list(name, &entry.unavailable_weekdays))
            })
            .collect();
        Roster::new(employees)
    }
}

/// Parses a multiplier, accepting only values in `allowed`.
pub fn parse_multiplier(employee: &str, raw: &str, allowed: &[f64]) -> Option<f64> {
    let raw = raw.trim();
    match raw.parse::<f64>() {
        Ok(m) => match allowed.iter().find(|a| (*a - m).abs() < 1e-9) {
            Some(&a) => Some(a),
            None => {
                warn!(employee, multiplier = m, "multiplier not in allowed set");
                None
            }
        },
        Err(_) => {
            warn!(employee, input = raw, "unreadable multiplier");
            None
        }
    }
}

/// Parses comma-separated day indices inside `horizon`.
pub fn parse_day_list(employee: &str, raw: &str, horizon: &Horizon) -> BTreeSet<u32> {
    tokens(raw)
        .filter_map(|token| match token.parse::<u32>() {
            Ok(d) if horizon.contains(d) => Some(d),
            Ok(d) => {
                warn!(employee, day = d, days = horizon.days(), "day outside horizon, ignoring");
                None
            }
            Err(_) => {
                warn!(employee, token, "unreadable day, ignoring");
                None
            }
        })
        .collect()
}

/// Parses comma-separated weekday names (any case) or numbers 0..=6.
pub fn parse_weekday_list(employee: &str, raw: &str) -> BTreeSet<u8> {
    tokens(raw)
        .filter_map(|token| {
            let parsed = parse_weekday(token).or_else(|| token.parse::<u8>().ok().filter(|w| *w < 7));
            if parsed.is_none() {
                warn!(employee, token, "unrecognized weekday, ignoring");
            }
            parsed
        })
        .collect()
}

fn tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|t| !t.is_empty())
}
