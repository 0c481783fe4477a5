//! Rostering CP formulation.
//!
//! Translates employees, the horizon, the shift catalog, and availability
//! into a `CpModel` for one margin window, and decodes solver output back
//! into a `Schedule`.
//!
//! # Formulation
//!
//! One boolean `x[e, d, s]` per employee, day, and shift staffed on that
//! day's type, with:
//!
//! | Constraint | Form |
//! |------------|------|
//! | One shift per day | `Σ_s x[e,d,s] <= 1` |
//! | Availability | `x[e,d,s] == 0` when `e` is unavailable on `d` |
//! | Hour band | `lo(e) <= Σ_{d,s} tenths(s) · x[e,d,s] <= hi(e)` |
//! | Coverage | `Σ_e x[e,d,s] == 1` |
//!
//! Hours are compared in tenths so the solver works on integers only.
//! The objective maximizes the number of assignments; coverage already
//! fixes that number, so it only acts as a tie-break.

use std::ops::Range;

use tracing::debug;

use super::model::{BoolVar, CpModel, CpSolution, LinearExpr, Objective};
use super::solver::{CpSolver, SolverConfig, SolverError};
use crate::availability::Availability;
use crate::models::{day_type, Assignment, Employee, Horizon, Schedule, ShiftCatalog};
use crate::search::MarginWindow;

/// Coordinates of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarKey {
    /// Employee index.
    pub employee: usize,
    /// Day index.
    pub day: u32,
    /// Shift index into `ShiftCatalog::shifts`.
    pub shift: usize,
}

/// Builds rostering models for successive margin windows.
///
/// The variable layout is independent of the window, so it is computed
/// once and every model built by the same builder shares it.
///
/// # Example
/// ```
/// use u_roster::availability::Availability;
/// use u_roster::cp::ShiftCpBuilder;
/// use u_roster::models::{Employee, Horizon, ShiftCatalog};
/// use u_roster::search::MarginWindow;
///
/// let employees = vec![Employee::new("Alice", 40.0), Employee::new("Bob", 40.0)];
/// let horizon = Horizon::new(1);
/// let catalog = ShiftCatalog::standard();
/// let availability = Availability::compute(&employees, &horizon);
///
/// let builder = ShiftCpBuilder::new(&employees, horizon, &catalog, &availability);
/// let model = builder.build(&MarginWindow::new(0.67, 0.73));
/// // 2 employees × (5 weekdays × 4 + 2 weekend days × 2)
/// assert_eq!(model.var_count(), 48);
/// ```
pub struct ShiftCpBuilder<'a> {
    employees: &'a [Employee],
    horizon: Horizon,
    catalog: &'a ShiftCatalog,
    availability: &'a Availability,
    keys: Vec<VarKey>,
    /// Key ranges per `(employee, day)`, row-major.
    day_ranges: Vec<Range<usize>>,
}

impl<'a> ShiftCpBuilder<'a> {
    /// Creates a builder and lays out the decision variables.
    pub fn new(
        employees: &'a [Employee],
        horizon: Horizon,
        catalog: &'a ShiftCatalog,
        availability: &'a Availability,
    ) -> Self {
        let mut keys = Vec::new();
        let mut day_ranges = Vec::with_capacity(employees.len() * horizon.days() as usize);

        for employee in 0..employees.len() {
            for day in horizon.iter_days() {
                let start = keys.len();
                let dt = day_type(day);
                for (shift, _) in catalog
                    .shifts
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.day_type == dt)
                {
                    keys.push(VarKey {
                        employee,
                        day,
                        shift,
                    });
                }
                day_ranges.push(start..keys.len());
            }
        }

        Self {
            employees,
            horizon,
            catalog,
            availability,
            keys,
            day_ranges,
        }
    }

    /// Number of decision variables per model.
    pub fn var_count(&self) -> usize {
        self.keys.len()
    }

    /// Variable coordinates, in model order.
    pub fn keys(&self) -> &[VarKey] {
        &self.keys
    }

    fn day_range(&self, employee: usize, day: u32) -> Range<usize> {
        let idx = employee * self.horizon.days() as usize + day as usize;
        self.day_ranges.get(idx).cloned().unwrap_or(0..0)
    }

    fn var_for(&self, vars: &[BoolVar], employee: usize, day: u32, shift: usize) -> Option<BoolVar> {
        self.day_range(employee, day)
            .find(|&i| self.keys[i].shift == shift)
            .map(|i| vars[i])
    }

    /// Builds the model for one margin window.
    pub fn build(&self, window: &MarginWindow) -> CpModel {
        let mut model = CpModel::new(format!("roster[{window}]"));

        let vars: Vec<BoolVar> = self
            .keys
            .iter()
            .map(|k| {
                model.new_bool_var(format!(
                    "{}_{}_{}",
                    self.employees[k.employee].name, k.day, self.catalog.shifts[k.shift].code
                ))
            })
            .collect();

        for (e, employee) in self.employees.iter().enumerate() {
            for day in self.horizon.iter_days() {
                let day_vars: Vec<BoolVar> = self.day_range(e, day).map(|i| vars[i]).collect();
                if day_vars.is_empty() {
                    continue;
                }

                if !self.availability.is_available(e, day) {
                    for &v in &day_vars {
                        model.add_eq(
                            format!("unavailable[{},{day}]", employee.name),
                            LinearExpr::sum([v]),
                            0,
                        );
                    }
                }

                model.add_le(
                    format!("one_shift[{},{day}]", employee.name),
                    LinearExpr::sum(day_vars),
                    1,
                );
            }

            let hours = LinearExpr::weighted(
                self.keys
                    .iter()
                    .zip(&vars)
                    .filter(|(k, _)| k.employee == e)
                    .map(|(k, &v)| (v, self.catalog.shifts[k.shift].tenths())),
            );
            let (lo, hi) = window.bounds_tenths(employee.target_tenths());
            model.add_ge(format!("min_hours[{}]", employee.name), hours.clone(), lo);
            model.add_le(format!("max_hours[{}]", employee.name), hours, hi);
        }

        for day in self.horizon.iter_days() {
            let dt = day_type(day);
            for (s, shift) in self
                .catalog
                .shifts
                .iter()
                .enumerate()
                .filter(|(_, sh)| sh.day_type == dt)
            {
                let staff = LinearExpr::sum(
                    (0..self.employees.len()).filter_map(|e| self.var_for(&vars, e, day, s)),
                );
                model.add_eq(format!("cover[{day},{}]", shift.code), staff, 1);
            }
        }

        model.set_objective(Objective::Maximize(LinearExpr::sum(vars)));

        debug!(
            window = %window,
            vars = model.var_count(),
            constraints = model.constraint_count(),
            "roster model built"
        );
        model
    }

    /// Decodes a solver assignment into a schedule.
    ///
    /// Returns an empty schedule if the solution carries no assignment.
    pub fn decode(&self, solution: &CpSolution) -> Schedule {
        let mut schedule = Schedule::new();
        if !solution.is_solution_found() {
            return schedule;
        }

        for (i, key) in self.keys.iter().enumerate() {
            if solution.values.get(i).copied().unwrap_or(false) {
                let shift = &self.catalog.shifts[key.shift];
                schedule.add_assignment(Assignment::new(
                    &self.employees[key.employee].name,
                    key.day,
                    &shift.code,
                    shift.hours,
                ));
            }
        }
        schedule.sort();
        schedule
    }

    /// Builds, solves, and decodes one window.
    pub fn solve<S: CpSolver + ?Sized>(
        &self,
        solver: &S,
        config: &SolverConfig,
        window: &MarginWindow,
    ) -> Result<(Schedule, CpSolution), SolverError> {
        let model = self.build(window);
        let solution = solver.solve(&model, config)?;
        let schedule = self.decode(&solution);
        Ok((schedule, solution))
    }
}
