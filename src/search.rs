//! Margin-relaxing feasibility search.
//!
//! Full shift coverage is a hard constraint, so the only lever for
//! restoring feasibility is how tightly each employee's hours must track
//! their target. The search starts with a narrow band and widens it
//! symmetrically by a fixed step after every failed attempt.
//!
//! # State Machine
//!
//! ```text
//!             solve ok
//! Searching ───────────▶ Found
//!   │   ▲
//!   │   │ failed, attempt < max (widen)
//!   └───┘
//!   │ failed, attempt == max
//!   ▼
//! ExhaustedAttempts
//! ```
//!
//! `MarginPolicy::transition` is a pure function of the current state and
//! the solver verdict; `FeasibilitySearch` drives it against a solver.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cp::{CpSolver, ShiftCpBuilder, SolveStatus, SolverConfig, SolverError};
use crate::models::Schedule;

const BASIS: i64 = 10_000;

/// Fractional band `[lower, upper]` applied to target hours.
///
/// Stored in basis points (1/10000) so repeated widening is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarginWindow {
    lower_bp: u32,
    upper_bp: u32,
}

impl MarginWindow {
    /// Creates a window from fractions (e.g. `0.67`, `0.73`).
    pub fn new(lower: f64, upper: f64) -> Self {
        Self::from_basis_points(to_basis_points(lower), to_basis_points(upper))
    }

    /// Creates a window from basis points.
    pub const fn from_basis_points(lower_bp: u32, upper_bp: u32) -> Self {
        Self { lower_bp, upper_bp }
    }

    /// Lower fraction.
    pub fn lower(&self) -> f64 {
        self.lower_bp as f64 / BASIS as f64
    }

    /// Upper fraction.
    pub fn upper(&self) -> f64 {
        self.upper_bp as f64 / BASIS as f64
    }

    /// Lower bound in basis points.
    pub fn lower_basis_points(&self) -> u32 {
        self.lower_bp
    }

    /// Upper bound in basis points.
    pub fn upper_basis_points(&self) -> u32 {
        self.upper_bp
    }

    /// Widens by `step_bp` on both sides. The lower bound stops at zero.
    pub fn widened(&self, step_bp: u32) -> Self {
        Self {
            lower_bp: self.lower_bp.saturating_sub(step_bp),
            upper_bp: self.upper_bp.saturating_add(step_bp),
        }
    }

    /// Whether `self` contains `other` and is strictly larger.
    pub fn strictly_contains(&self, other: &MarginWindow) -> bool {
        self.lower_bp <= other.lower_bp && self.upper_bp >= other.upper_bp && self != other
    }

    /// Hour bounds for a target, both in tenths of an hour.
    ///
    /// Both bounds truncate toward zero.
    pub fn bounds_tenths(&self, target_tenths: i64) -> (i64, i64) {
        (
            target_tenths * self.lower_bp as i64 / BASIS,
            target_tenths * self.upper_bp as i64 / BASIS,
        )
    }

    /// Whether `scheduled_tenths` lies within the band for `target_tenths`.
    pub fn admits(&self, target_tenths: i64, scheduled_tenths: i64) -> bool {
        let (lo, hi) = self.bounds_tenths(target_tenths);
        (lo..=hi).contains(&scheduled_tenths)
    }
}

impl fmt::Display for MarginWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}%..{}%",
            self.lower_bp as f64 / 100.0,
            self.upper_bp as f64 / 100.0
        )
    }
}

fn to_basis_points(fraction: f64) -> u32 {
    (fraction * BASIS as f64).round().max(0.0) as u32
}

/// Search progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// About to try `window` as attempt number `attempt` (1-based).
    Searching { attempt: u32, window: MarginWindow },
    /// Attempt `attempt` found a schedule with `window`.
    Found { attempt: u32, window: MarginWindow },
    /// Every attempt failed; `last_window` was the widest tried.
    ExhaustedAttempts { attempts: u32, last_window: MarginWindow },
}

impl SearchState {
    /// Whether no further attempts will be made.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SearchState::Searching { .. })
    }
}

/// Relaxation policy: initial window, step, and attempt budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginPolicy {
    /// Initial lower fraction (default: 0.67).
    pub initial_lower: f64,
    /// Initial upper fraction (default: 0.73).
    pub initial_upper: f64,
    /// Widening per failed attempt, applied to both sides (default: 0.01).
    pub step: f64,
    /// Maximum number of solve attempts (default: 10).
    pub max_attempts: u32,
}

impl Default for MarginPolicy {
    fn default() -> Self {
        Self {
            initial_lower: 0.67,
            initial_upper: 0.73,
            step: 0.01,
            max_attempts: 10,
        }
    }
}

impl MarginPolicy {
    /// The first window tried.
    pub fn initial_window(&self) -> MarginWindow {
        MarginWindow::new(self.initial_lower, self.initial_upper)
    }

    /// Step in basis points.
    pub fn step_basis_points(&self) -> u32 {
        to_basis_points(self.step)
    }

    /// The initial search state.
    pub fn initial_state(&self) -> SearchState {
        SearchState::Searching {
            attempt: 1,
            window: self.initial_window(),
        }
    }

    /// Next state after an attempt in `state` returned `status`.
    ///
    /// Terminal states are returned unchanged.
    pub fn transition(&self, state: SearchState, status: SolveStatus) -> SearchState {
        match state {
            SearchState::Searching { attempt, window } => {
                if status.is_solution_found() {
                    SearchState::Found { attempt, window }
                } else if attempt < self.max_attempts {
                    SearchState::Searching {
                        attempt: attempt + 1,
                        window: window.widened(self.step_basis_points()),
                    }
                } else {
                    SearchState::ExhaustedAttempts {
                        attempts: attempt,
                        last_window: window,
                    }
                }
            }
            terminal => terminal,
        }
    }

    /// Checks internal consistency.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.initial_lower >= 0.0 && self.initial_lower < self.initial_upper) {
            return Err(format!(
                "margin window must satisfy 0 <= lower < upper (got {}..{})",
                self.initial_lower, self.initial_upper
            ));
        }
        if self.step_basis_points() == 0 {
            return Err(format!("margin step must be positive (got {})", self.step));
        }
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".into());
        }
        Ok(())
    }
}

/// One solve attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Attempt number (1-based).
    pub attempt: u32,
    /// Window tried.
    pub window: MarginWindow,
    /// Solver verdict.
    pub status: SolveStatus,
    /// Solve time (ms).
    pub elapsed_ms: u64,
}

/// Terminal result of a search.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// A schedule satisfying coverage and the hour band of `window`.
    Found {
        attempt: u32,
        window: MarginWindow,
        schedule: Schedule,
        history: Vec<AttemptRecord>,
    },
    /// No schedule within the attempt budget.
    Exhausted {
        attempts: u32,
        last_window: MarginWindow,
        history: Vec<AttemptRecord>,
    },
}

impl SearchOutcome {
    /// Attempts made.
    pub fn history(&self) -> &[AttemptRecord] {
        match self {
            SearchOutcome::Found { history, .. } | SearchOutcome::Exhausted { history, .. } => {
                history
            }
        }
    }
}

/// Drives build → solve cycles under a `MarginPolicy`.
pub struct FeasibilitySearch<'a> {
    builder: ShiftCpBuilder<'a>,
    policy: &'a MarginPolicy,
    solver_config: &'a SolverConfig,
}

impl<'a> FeasibilitySearch<'a> {
    /// Creates a search over `builder`'s problem.
    pub fn new(
        builder: ShiftCpBuilder<'a>,
        policy: &'a MarginPolicy,
        solver_config: &'a SolverConfig,
    ) -> Self {
        Self {
            builder,
            policy,
            solver_config,
        }
    }

    /// Runs the search to a terminal state.
    ///
    /// Solver failures abort immediately without retry.
    pub fn run<S: CpSolver + ?Sized>(&self, solver: &S) -> Result<SearchOutcome, SolverError> {
        let mut state = self.policy.initial_state();
        let mut history = Vec::new();
        let mut schedule = Schedule::new();

        while let SearchState::Searching { attempt, window } = state {
            info!(
                attempt,
                max_attempts = self.policy.max_attempts,
                %window,
                "scheduling attempt"
            );
            let (decoded, solution) = self.builder.solve(solver, self.solver_config, &window)?;
            history.push(AttemptRecord {
                attempt,
                window,
                status: solution.status,
                elapsed_ms: solution.elapsed.as_millis() as u64,
            });
            info!(attempt, status = %solution.status, elapsed = ?solution.elapsed, "attempt finished");

            state = self.policy.transition(state, solution.status);
            if solution.is_solution_found() {
                schedule = decoded;
            }
        }

        match state {
            SearchState::Found { attempt, window } => {
                info!(attempt, %window, "solution found");
                Ok(SearchOutcome::Found {
                    attempt,
                    window,
                    schedule,
                    history,
                })
            }
            SearchState::ExhaustedAttempts {
                attempts,
                last_window,
            }
            | SearchState::Searching {
                attempt: attempts,
                window: last_window,
            } => {
                warn!(attempts, %last_window, "no feasible schedule within attempt budget");
                Ok(SearchOutcome::Exhausted {
                    attempts,
                    last_window,
                    history,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::Availability;
    use crate::cp::{CpModel, CpSolution};
    use crate::models::{Employee, Horizon, ShiftCatalog};
    use std::cell::RefCell;
    use std::time::Duration;

    /// Replays a fixed list of verdicts; found verdicts carry an all-false
    /// assignment.
    struct ScriptedSolver {
        script: RefCell<Vec<SolveStatus>>,
        seen: RefCell<Vec<String>>,
    }

    impl ScriptedSolver {
        fn new(mut script: Vec<SolveStatus>) -> Self {
            script.reverse();
            Self {
                script: RefCell::new(script),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl CpSolver for ScriptedSolver {
        fn solve(&self, model: &CpModel, _: &SolverConfig) -> Result<CpSolution, SolverError> {
            self.seen.borrow_mut().push(model.name().to_string());
            let status = self
                .script
                .borrow_mut()
                .pop()
                .unwrap_or(SolveStatus::Infeasible);
            Ok(match status {
                SolveStatus::Optimal | SolveStatus::Feasible => {
                    CpSolution::found(status, vec![false; model.var_count()], Duration::ZERO)
                }
                SolveStatus::Infeasible => CpSolution::infeasible(Duration::ZERO),
                SolveStatus::Unknown => CpSolution::unknown(Duration::ZERO),
            })
        }
    }

    struct FailingSolver;

    impl CpSolver for FailingSolver {
        fn solve(&self, _: &CpModel, _: &SolverConfig) -> Result<CpSolution, SolverError> {
            Err(SolverError::Backend("license server down".into()))
        }
    }

    fn fixture() -> (Vec<Employee>, Horizon, ShiftCatalog) {
        (
            vec![Employee::new("A", 40.0), Employee::new("B", 40.0)],
            Horizon::new(1),
            ShiftCatalog::standard(),
        )
    }

    #[test]
    fn test_window_basics() {
        let w = MarginWindow::new(0.67, 0.73);
        assert_eq!(w.lower_basis_points(), 6700);
        assert_eq!(w.upper_basis_points(), 7300);
        assert!((w.lower() - 0.67).abs() < 1e-12);
        assert_eq!(w.to_string(), "67%..73%");

        let wider = w.widened(100);
        assert_eq!(wider, MarginWindow::new(0.66, 0.74));
        assert!(wider.strictly_contains(&w));
        assert!(!w.strictly_contains(&w));
        assert!(!w.strictly_contains(&wider));
    }

    #[test]
    fn test_window_lower_saturates() {
        let w = MarginWindow::from_basis_points(50, 9000).widened(100);
        assert_eq!(w.lower_basis_points(), 0);
        assert_eq!(w.upper_basis_points(), 9100);
        assert!(w.strictly_contains(&MarginWindow::from_basis_points(50, 9000)));
    }

    #[test]
    fn test_bounds_tenths_truncate() {
        let w = MarginWindow::new(0.67, 0.73);
        // 147.0h target = 1470 tenths: 984.9 → 984, 1073.1 → 1073
        assert_eq!(w.bounds_tenths(1470), (984, 1073));
        assert!(w.admits(1470, 984));
        assert!(w.admits(1470, 1073));
        assert!(!w.admits(1470, 1074));
        assert_eq!(w.bounds_tenths(0), (0, 0));
    }

    #[test]
    fn test_transition_found() {
        let p = MarginPolicy::default();
        let next = p.transition(p.initial_state(), SolveStatus::Feasible);
        assert_eq!(
            next,
            SearchState::Found {
                attempt: 1,
                window: MarginWindow::new(0.67, 0.73)
            }
        );
        assert!(next.is_terminal());
        // Terminal states absorb further verdicts.
        assert_eq!(p.transition(next, SolveStatus::Infeasible), next);
    }

    #[test]
    fn test_transition_widens_on_failure() {
        let p = MarginPolicy::default();
        for status in [SolveStatus::Infeasible, SolveStatus::Unknown] {
            let next = p.transition(p.initial_state(), status);
            assert_eq!(
                next,
                SearchState::Searching {
                    attempt: 2,
                    window: MarginWindow::new(0.66, 0.74)
                }
            );
        }
    }

    #[test]
    fn test_transition_monotone_until_exhausted() {
        let p = MarginPolicy::default();
        let mut state = p.initial_state();
        let mut prev: Option<MarginWindow> = None;
        let mut windows = 0;

        while let SearchState::Searching { window, .. } = state {
            if let Some(prev) = prev {
                assert!(window.strictly_contains(&prev));
            }
            prev = Some(window);
            windows += 1;
            state = p.transition(state, SolveStatus::Infeasible);
        }

        assert_eq!(windows, 10);
        assert_eq!(
            state,
            SearchState::ExhaustedAttempts {
                attempts: 10,
                last_window: MarginWindow::new(0.58, 0.82)
            }
        );
    }

    #[test]
    fn test_policy_validation() {
        assert!(MarginPolicy::default().validate().is_ok());
        let bad = MarginPolicy {
            step: 0.0,
            ..MarginPolicy::default()
        };
        assert!(bad.validate().is_err());
        let bad = MarginPolicy {
            initial_lower: 0.8,
            initial_upper: 0.7,
            ..MarginPolicy::default()
        };
        assert!(bad.validate().is_err());
        let bad = MarginPolicy {
            max_attempts: 0,
            ..MarginPolicy::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_search_found_on_third_attempt() {
        let (employees, horizon, catalog) = fixture();
        let avail = Availability::compute(&employees, &horizon);
        let builder = ShiftCpBuilder::new(&employees, horizon, &catalog, &avail);
        let policy = MarginPolicy::default();
        let config = SolverConfig::default();
        let solver = ScriptedSolver::new(vec![
            SolveStatus::Infeasible,
            SolveStatus::Unknown,
            SolveStatus::Feasible,
        ]);

        let outcome = FeasibilitySearch::new(builder, &policy, &config)
            .run(&solver)
            .unwrap();

        match outcome {
            SearchOutcome::Found {
                attempt,
                window,
                history,
                ..
            } => {
                assert_eq!(attempt, 3);
                assert_eq!(window, MarginWindow::new(0.65, 0.75));
                let statuses: Vec<SolveStatus> = history.iter().map(|h| h.status).collect();
                assert_eq!(
                    statuses,
                    vec![SolveStatus::Infeasible, SolveStatus::Unknown, SolveStatus::Feasible]
                );
            }
            other => panic!("expected Found, got {other:?}"),
        }
        assert_eq!(solver.seen.borrow().len(), 3);
        assert_eq!(solver.seen.borrow()[2], "roster[65%..75%]");
    }

    #[test]
    fn test_search_exhausts_budget() {
        let (employees, horizon, catalog) = fixture();
        let avail = Availability::compute(&employees, &horizon);
        let builder = ShiftCpBuilder::new(&employees, horizon, &catalog, &avail);
        let policy = MarginPolicy::default();
        let config = SolverConfig::default();
        let solver = ScriptedSolver::new(vec![]);

        let outcome = FeasibilitySearch::new(builder, &policy, &config)
            .run(&solver)
            .unwrap();

        assert_eq!(outcome.history().len(), 10);
        match outcome {
            SearchOutcome::Exhausted {
                attempts,
                last_window,
                ..
            } => {
                assert_eq!(attempts, 10);
                assert_eq!(last_window, MarginWindow::new(0.58, 0.82));
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[test]
    fn test_search_propagates_solver_failure() {
        let (employees, horizon, catalog) = fixture();
        let avail = Availability::compute(&employees, &horizon);
        let builder = ShiftCpBuilder::new(&employees, horizon, &catalog, &avail);
        let policy = MarginPolicy::default();
        let config = SolverConfig::default();

        let err = FeasibilitySearch::new(builder, &policy, &config)
            .run(&FailingSolver)
            .unwrap_err();
        assert!(err.to_string().contains("license server down"));
    }
}
