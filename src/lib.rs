//! Shift rostering engine.
//!
//! Assigns employees to shifts over a multi-week horizon so that every
//! shift slot is staffed exactly once, nobody works on a day they are
//! unavailable or holds two shifts on one day, and each employee's hours
//! stay within a band around their target. The band starts narrow and is
//! widened step by step until the constraint model becomes feasible.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Employee`, `ShiftType`, `ShiftCatalog`,
//!   `Horizon`, `Schedule`, `Assignment`, `Violation`
//! - **`availability`**: Employee × day availability matrix
//! - **`cp`**: 0-1 constraint model, its builder, and the solver seam
//! - **`search`**: Margin-relaxing feasibility search (explicit state machine)
//! - **`projection`**: Weekly views of a solved schedule
//! - **`analytics`**: Per-employee workload and shift-mix indicators
//! - **`roster`**: Roster sources (randomized sample, manual entry)
//! - **`validation`**: Roster checks and schedule verification
//! - **`planner`**: End-to-end pipeline
//! - **`report`**: Text, CSV and JSON output
//!
//! # Example
//!
//! ```no_run
//! use u_roster::config::PlannerConfig;
//! use u_roster::planner::Planner;
//! use u_roster::roster::{RosterSource, SampleRoster};
//!
//! let config = PlannerConfig::default();
//! let roster = SampleRoster::from_config(&config).produce(&config, &mut rand::rng());
//! let plan = Planner::with_default_solver(config)?.plan(&roster)?;
//! println!("{}", u_roster::report::render_text(&plan));
//! # Ok::<(), u_roster::RosterError>(())
//! ```
//!
//! # References
//!
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of
//!   applications, methods and models"
//! - Burke et al. (2004), "The state of the art of nurse rostering"

pub mod analytics;
pub mod availability;
pub mod config;
pub mod cp;
pub mod error;
pub mod logging;
pub mod models;
pub mod planner;
pub mod projection;
pub mod report;
pub mod roster;
pub mod search;
pub mod validation;

pub use error::{Result, RosterError};
