//! Solver-agnostic constraint model.
//!
//! A `CpModel` is a pure 0-1 integer program: boolean variables, integer
//! linear constraints over them, and an optional linear objective. It is
//! plain data so it can be handed across a thread boundary to a solver.

use std::fmt;
use std::time::Duration;

/// Handle to a boolean decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoolVar(usize);

impl BoolVar {
    /// Position of the variable in the model (and in solution vectors).
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Integer linear expression `Σ coefficient × var`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    /// `(variable, coefficient)` terms.
    pub terms: Vec<(BoolVar, i64)>,
}

impl LinearExpr {
    /// Creates an empty expression (evaluates to 0).
    pub fn new() -> Self {
        Self::default()
    }

    /// Unweighted sum of variables.
    pub fn sum(vars: impl IntoIterator<Item = BoolVar>) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1)).collect(),
        }
    }

    /// Weighted sum of variables.
    pub fn weighted(terms: impl IntoIterator<Item = (BoolVar, i64)>) -> Self {
        Self {
            terms: terms.into_iter().collect(),
        }
    }

    /// Adds a term.
    pub fn add_term(&mut self, var: BoolVar, coefficient: i64) {
        self.terms.push((var, coefficient));
    }

    /// Whether the expression has no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluates the expression under an assignment.
    ///
    /// Variables beyond the end of `values` count as false.
    pub fn evaluate(&self, values: &[bool]) -> i64 {
        self.terms
            .iter()
            .filter(|(v, _)| values.get(v.index()).copied().unwrap_or(false))
            .map(|(_, c)| c)
            .sum()
    }
}

/// Relational operator of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `expr <= rhs`
    Le,
    /// `expr >= rhs`
    Ge,
    /// `expr == rhs`
    Eq,
}

/// `expr (<= | >= | ==) rhs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraint {
    /// Diagnostic label.
    pub name: String,
    /// Left-hand side.
    pub expr: LinearExpr,
    /// Operator.
    pub comparison: Comparison,
    /// Right-hand side.
    pub rhs: i64,
}

impl LinearConstraint {
    /// Whether the constraint holds under an assignment.
    pub fn is_satisfied_by(&self, values: &[bool]) -> bool {
        let lhs = self.expr.evaluate(values);
        match self.comparison {
            Comparison::Le => lhs <= self.rhs,
            Comparison::Ge => lhs >= self.rhs,
            Comparison::Eq => lhs == self.rhs,
        }
    }
}

/// Optimization goal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Objective {
    /// Any satisfying assignment will do.
    #[default]
    Feasibility,
    /// Maximize a linear expression.
    Maximize(LinearExpr),
}

/// A 0-1 integer program.
#[derive(Debug, Clone, Default)]
pub struct CpModel {
    name: String,
    var_names: Vec<String>,
    constraints: Vec<LinearConstraint>,
    objective: Objective,
}

impl CpModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declares a new boolean variable.
    pub fn new_bool_var(&mut self, name: impl Into<String>) -> BoolVar {
        self.var_names.push(name.into());
        BoolVar(self.var_names.len() - 1)
    }

    /// Name of a variable.
    pub fn var_name(&self, var: BoolVar) -> Option<&str> {
        self.var_names.get(var.index()).map(String::as_str)
    }

    /// Adds `expr <= rhs`.
    pub fn add_le(&mut self, name: impl Into<String>, expr: LinearExpr, rhs: i64) {
        self.add(name, expr, Comparison::Le, rhs);
    }

    /// Adds `expr >= rhs`.
    pub fn add_ge(&mut self, name: impl Into<String>, expr: LinearExpr, rhs: i64) {
        self.add(name, expr, Comparison::Ge, rhs);
    }

    /// Adds `expr == rhs`.
    pub fn add_eq(&mut self, name: impl Into<String>, expr: LinearExpr, rhs: i64) {
        self.add(name, expr, Comparison::Eq, rhs);
    }

    fn add(&mut self, name: impl Into<String>, expr: LinearExpr, comparison: Comparison, rhs: i64) {
        self.constraints.push(LinearConstraint {
            name: name.into(),
            expr,
            comparison,
            rhs,
        });
    }

    /// Sets the objective.
    pub fn set_objective(&mut self, objective: Objective) {
        self.objective = objective;
    }

    /// The objective.
    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    /// All constraints.
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Number of variables.
    pub fn var_count(&self) -> usize {
        self.var_names.len()
    }

    /// Number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Constraints violated by an assignment.
    pub fn violated_constraints(&self, values: &[bool]) -> Vec<&LinearConstraint> {
        self.constraints
            .iter()
            .filter(|c| !c.is_satisfied_by(values))
            .collect()
    }

    /// Whether an assignment satisfies every constraint.
    pub fn is_satisfied_by(&self, values: &[bool]) -> bool {
        self.constraints.iter().all(|c| c.is_satisfied_by(values))
    }
}

/// Solver verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SolveStatus {
    /// Proven optimal assignment.
    Optimal,
    /// Satisfying assignment, optimality not proven.
    Feasible,
    /// Proven unsatisfiable.
    Infeasible,
    /// No verdict (e.g. deadline reached).
    Unknown,
}

impl SolveStatus {
    /// Whether the status carries an assignment.
    #[inline]
    pub fn is_solution_found(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Feasible => "feasible",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Solver response.
#[derive(Debug, Clone)]
pub struct CpSolution {
    /// Verdict.
    pub status: SolveStatus,
    /// Variable values (empty unless a solution was found).
    pub values: Vec<bool>,
    /// Wall-clock solve time.
    pub elapsed: Duration,
}

impl CpSolution {
    /// A found assignment.
    pub fn found(status: SolveStatus, values: Vec<bool>, elapsed: Duration) -> Self {
        Self {
            status,
            values,
            elapsed,
        }
    }

    /// An infeasibility verdict.
    pub fn infeasible(elapsed: Duration) -> Self {
        Self {
            status: SolveStatus::Infeasible,
            values: Vec::new(),
            elapsed,
        }
    }

    /// An inconclusive result.
    pub fn unknown(elapsed: Duration) -> Self {
        Self {
            status: SolveStatus::Unknown,
            values: Vec::new(),
            elapsed,
        }
    }

    /// Whether an assignment is present.
    pub fn is_solution_found(&self) -> bool {
        self.status.is_solution_found()
    }

    /// Value of a variable (false if absent).
    #[inline]
    pub fn value(&self, var: BoolVar) -> bool {
        self.values.get(var.index()).copied().unwrap_or(false)
    }
}
