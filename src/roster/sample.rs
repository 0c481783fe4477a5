//! Randomized sample rosters.
//!
//! Multipliers are redrawn as a whole until the team's aggregate target
//! falls inside the configured band, or the draw budget runs out (in which
//! case the last draw is kept). Each employee then gets a fixed number of
//! distinct individual exclusions and, with some probability, one
//! recurring weekday off.

use rand::seq::{index, IndexedRandom};
use rand::{Rng, RngCore};
use tracing::{debug, warn};

use super::{Roster, RosterSource};
use crate::config::PlannerConfig;
use crate::models::Employee;

/// Randomized roster over a fixed list of names.
#[derive(Debug, Clone)]
pub struct SampleRoster {
    names: Vec<String>,
}

impl SampleRoster {
    /// Sample roster for the given names.
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Sample roster for the names configured under `[sample]`.
    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new(config.sample.employees.iter().cloned())
    }

    fn draw_multipliers(&self, config: &PlannerConfig, rng: &mut dyn RngCore) -> Vec<f64> {
        let sample = &config.sample;
        let allowed = &config.allowed_multipliers;
        let mut multipliers = Vec::new();

        for draw in 1..=sample.max_draws.max(1) {
            multipliers = self
                .names
                .iter()
                .map(|_| allowed.choose(rng).copied().unwrap_or(1.0))
                .collect();
            let total = config.base_hours * multipliers.iter().sum::<f64>();
            if (sample.min_total_hours..=sample.max_total_hours).contains(&total) {
                debug!(draw, total, "sample multipliers accepted");
                return multipliers;
            }
        }

        warn!(
            draws = sample.max_draws,
            min = sample.min_total_hours,
            max = sample.max_total_hours,
            "no multiplier draw met the aggregate target band, proceeding with the last draw"
        );
        multipliers
    }
}

impl RosterSource for SampleRoster {
    fn produce(&self, config: &PlannerConfig, rng: &mut dyn RngCore) -> Roster {
        let multipliers = self.draw_multipliers(config, rng);
        let days = config.horizon.days() as usize;
        let picks = config.sample.individual_days.min(days);

        let employees = self
            .names
            .iter()
            .zip(multipliers)
            .map(|(name, m)| {
                let individual = index::sample(rng, days, picks).into_iter().map(|d| d as u32);
                let mut e = Employee::with_multiplier(name.clone(), config.base_hours, m)
                    .with_unavailable_days(individual);
                if rng.random_bool(config.sample.recurring_probability.clamp(0.0, 1.0)) {
                    e.unavailable_weekdays.insert(rng.random_range(0..7u8));
                }
                e
            })
            .collect();

        Roster::new(employees)
    }
}
