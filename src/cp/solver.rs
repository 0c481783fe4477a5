//! Solver boundary.
//!
//! `CpSolver` is the request/response seam to the combinatorial search.
//! The default implementation hands the model to `good_lp` with the
//! pure-Rust `microlp` branch-and-bound backend.
//!
//! # Deadline
//! A solve with a time limit runs on a worker thread and the caller waits
//! at most `time_limit`. On expiry the result is `SolveStatus::Unknown`.
//! `microlp` cannot be interrupted, so the late worker is kept and at most
//! one worker is alive per solver:
//!
//! - the next solve first waits (within its own limit) for the late worker
//!   and reports `Unknown` without spawning if it is still running
//! - `settle` blocks until the late worker has exited

use std::fmt;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use good_lp::{
    constraint, microlp, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::model::{Comparison, CpModel, CpSolution, LinearExpr, Objective, SolveStatus};

/// Failures of the solving capability itself (not of the model).
#[derive(Debug, Error)]
pub enum SolverError {
    /// The backend reported an error.
    #[error("solver backend error: {0}")]
    Backend(String),
    /// The solve worker terminated without producing a result.
    #[error("solver worker terminated without a result")]
    WorkerLost,
}

/// Per-invocation solver settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Wall-clock bound per solve. `None` = unbounded.
    #[serde(with = "humantime_serde")]
    pub time_limit: Option<Duration>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit: Some(Duration::from_secs(60)),
        }
    }
}

impl SolverConfig {
    /// Sets the time limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Removes the time limit.
    pub fn unbounded() -> Self {
        Self { time_limit: None }
    }
}

/// A 0-1 integer program solver.
pub trait CpSolver {
    /// Solves `model`.
    ///
    /// Returns `Err` only when the solver itself fails; infeasible or
    /// inconclusive searches are reported through `CpSolution::status`.
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> Result<CpSolution, SolverError>;

    /// Blocks until no background work from earlier solves remains.
    fn settle(&self) {}
}

impl<S: CpSolver + ?Sized> CpSolver for &S {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> Result<CpSolution, SolverError> {
        (**self).solve(model, config)
    }

    fn settle(&self) {
        (**self).settle()
    }
}

type SolveResult = Result<CpSolution, SolverError>;
type Backend = fn(&CpModel) -> SolveResult;

/// A solve running on its own thread.
#[derive(Debug)]
struct Worker {
    handle: JoinHandle<()>,
    rx: Receiver<SolveResult>,
}

impl Worker {
    fn spawn(backend: Backend, model: CpModel) -> Result<Self, SolverError> {
        let (tx, rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("u-roster-solve".into())
            .spawn(move || {
                // The receiver may have given up already.
                let _ = tx.send(backend(&model));
            })
            .map_err(|e| SolverError::Backend(format!("failed to spawn solve worker: {e}")))?;
        Ok(Self { handle, rx })
    }

    /// Waits up to `limit` for the result. Gives the worker back if it is
    /// still running.
    fn wait(self, limit: Duration) -> Result<SolveResult, Worker> {
        let result = match self.rx.recv_timeout(limit) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => return Err(self),
            Err(RecvTimeoutError::Disconnected) => Err(SolverError::WorkerLost),
        };
        if self.handle.join().is_err() {
            return Ok(Err(SolverError::WorkerLost));
        }
        Ok(result)
    }

    fn join(self) {
        let _ = self.handle.join();
    }
}

/// MILP-backed solver (`good_lp` + `microlp`).
pub struct MilpSolver {
    backend: Backend,
    late: Mutex<Option<Worker>>,
}

impl fmt::Debug for MilpSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MilpSolver")
            .field("idle", &self.is_idle())
            .finish()
    }
}

impl Default for MilpSolver {
    fn default() -> Self {
        Self::with_backend(solve_blocking)
    }
}

impl MilpSolver {
    /// Creates a new solver.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_backend(backend: Backend) -> Self {
        Self {
            backend,
            late: Mutex::new(None),
        }
    }

    /// Whether no worker from an earlier solve is still running.
    pub fn is_idle(&self) -> bool {
        match self.late.lock() {
            Ok(late) => late.as_ref().map_or(true, |w| w.handle.is_finished()),
            Err(_) => false,
        }
    }
}

impl CpSolver for MilpSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> Result<CpSolution, SolverError> {
        let Some(limit) = config.time_limit else {
            self.settle();
            return (self.backend)(model);
        };

        let started = Instant::now();
        let mut late = self
            .late
            .lock()
            .map_err(|_| SolverError::Backend("solver state poisoned".into()))?;

        if let Some(previous) = late.take() {
            match previous.wait(limit) {
                Ok(_) => debug!("late solve worker finished"),
                Err(previous) => {
                    *late = Some(previous);
                    warn!(model = model.name(), ?limit, "previous solve still running, attempt skipped");
                    return Ok(CpSolution::unknown(started.elapsed()));
                }
            }
        }

        let remaining = limit.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            return Ok(CpSolution::unknown(started.elapsed()));
        }

        match Worker::spawn(self.backend, model.clone())?.wait(remaining) {
            Ok(result) => result,
            Err(worker) => {
                warn!(model = model.name(), ?limit, "solve deadline reached");
                *late = Some(worker);
                Ok(CpSolution::unknown(started.elapsed()))
            }
        }
    }

    fn settle(&self) {
        let worker = match self.late.lock() {
            Ok(mut late) => late.take(),
            Err(_) => None,
        };
        if let Some(worker) = worker {
            debug!("waiting for late solve worker");
            worker.join();
        }
    }
}

impl Drop for MilpSolver {
    fn drop(&mut self) {
        if let Ok(late) = self.late.get_mut() {
            if let Some(worker) = late.take() {
                worker.join();
            }
        }
    }
}

fn to_expression(expr: &LinearExpr, vars: &[Variable]) -> Expression {
    expr.terms
        .iter()
        .fold(Expression::from(0.0), |acc, &(var, coefficient)| {
            acc + (coefficient as f64) * vars[var.index()]
        })
}

fn solve_blocking(model: &CpModel) -> Result<CpSolution, SolverError> {
    let started = Instant::now();

    let mut problem_vars = ProblemVariables::new();
    let vars: Vec<Variable> = (0..model.var_count())
        .map(|_| problem_vars.add(variable().binary()))
        .collect();

    let (objective, optimizing) = match model.objective() {
        Objective::Maximize(expr) => (to_expression(expr, &vars), true),
        Objective::Feasibility => (Expression::from(0.0), false),
    };
    let mut problem = problem_vars.maximise(objective).using(microlp);

    for c in model.constraints() {
        // Constant rows are decided here; the backend only sees real rows.
        if c.expr.is_empty() {
            if c.is_satisfied_by(&[]) {
                continue;
            }
            debug!(constraint = %c.name, "constant constraint cannot hold");
            return Ok(CpSolution::infeasible(started.elapsed()));
        }
        let lhs = to_expression(&c.expr, &vars);
        let rhs = c.rhs as f64;
        problem = problem.with(match c.comparison {
            Comparison::Le => constraint!(lhs <= rhs),
            Comparison::Ge => constraint!(lhs >= rhs),
            Comparison::Eq => constraint!(lhs == rhs),
        });
    }

    match problem.solve() {
        Ok(solution) => {
            let values: Vec<bool> = vars.iter().map(|&v| solution.value(v) > 0.5).collect();
            let status = if optimizing {
                SolveStatus::Optimal
            } else {
                SolveStatus::Feasible
            };
            Ok(CpSolution::found(status, values, started.elapsed()))
        }
        Err(ResolutionError::Infeasible) => Ok(CpSolution::infeasible(started.elapsed())),
        Err(ResolutionError::Unbounded) => Ok(CpSolution::unknown(started.elapsed())),
        Err(other) => Err(SolverError::Backend(other.to_string())),
    }
}
