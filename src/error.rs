//! Crate-level error type.
//!
//! Only two failures abort a planning run: the feasibility search running
//! out of attempts, and the solver itself failing. Malformed roster input is
//! recovered where it is parsed and never surfaces here.

use thiserror::Error;

use crate::cp::SolverError;
use crate::search::MarginWindow;

/// Errors produced by the rostering engine and its I/O surface.
#[derive(Debug, Error)]
pub enum RosterError {
    /// No window within the attempt budget admitted a full-coverage schedule.
    #[error("no feasible schedule after {attempts} attempts (last window {last_window})")]
    Infeasible {
        /// Number of solve attempts made.
        attempts: u32,
        /// Widest window tried.
        last_window: MarginWindow,
    },

    /// Nothing left to schedule after input repair.
    #[error("roster has no employees")]
    EmptyRoster,

    /// The external solver failed or did not respond.
    #[error("solver unavailable: {0}")]
    SolverUnavailable(String),

    /// Configuration values are inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<SolverError> for RosterError {
    fn from(err: SolverError) -> Self {
        RosterError::SolverUnavailable(err.to_string())
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, RosterError>;
