//! CP-based rostering formulation.
//!
//! Bridges rostering domain models to a 0-1 integer program and to the
//! solver that decides it.
//!
//! - **`model`**: solver-agnostic `CpModel` (boolean variables, integer
//!   linear constraints, objective) and `CpSolution`
//! - **`solver`**: the `CpSolver` seam and the `good_lp`-backed `MilpSolver`
//! - **`builder`**: `ShiftCpBuilder`, which formulates one margin window
//!   and decodes solutions into schedules
//!
//! # Reference
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of
//!   applications, methods and models"

mod builder;
mod model;
mod solver;

pub use builder::{ShiftCpBuilder, VarKey};
pub use model::{
    BoolVar, Comparison, CpModel, CpSolution, LinearConstraint, LinearExpr, Objective, SolveStatus,
};
pub use solver::{CpSolver, MilpSolver, SolverConfig, SolverError};
