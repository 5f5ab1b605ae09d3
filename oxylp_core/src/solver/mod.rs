//! Module for solving optimization models
//!
//! [`solve`] is the single entry point: continuous models go straight to
//! the simplex solver, models with integer or binary variables go through
//! the branch-and-bound driver. Either way the result is a well-formed
//! [`Solution`]; Infeasible, Unbounded, and SubOptimal are statuses on
//! the solution, never errors.

mod branch_and_bound;
mod simplex;
pub mod solution;
mod standard_form;

use log::debug;
use thiserror::Error;

use crate::configuration::SolveOptions;
use crate::model::model::{Model, ModelError};
use crate::solver::simplex::RelaxationOutcome;

pub use solution::{Solution, Status};

/// Solve a model under the given options
///
/// # Examples
/// ```rust
/// use oxylp_core::configuration::SolveOptions;
/// use oxylp_core::model::{ConstraintSense, LinearExpr, Model, ObjectiveSense, VariableType};
/// use oxylp_core::solver::{solve, Status};
///
/// let mut model = Model::new_maximization();
/// model.add_new_variable("x", VariableType::Continuous, 0.0, 10.0).unwrap();
/// model.set_objective(LinearExpr::term("x", 1.0), ObjectiveSense::Maximize);
/// model.add_constraint(LinearExpr::term("x", 2.0), ConstraintSense::LessEqual, 8.0, None).unwrap();
///
/// let solution = solve(&model, &SolveOptions::default()).unwrap();
/// assert_eq!(solution.status(), Status::Optimal);
/// assert_eq!(solution.value("x"), Some(4.0));
/// ```
///
/// # Errors
/// Only hard failures surface as errors: an objective referencing
/// undeclared variables, or the simplex pivot cap tripping on numeric
/// degeneracy. Everything else is a [`Status`] on the returned solution.
pub fn solve(model: &Model, options: &SolveOptions) -> Result<Solution, SolverError> {
    model.validate_for_solve()?;
    debug!(
        "solve: {} variables, {} constraints, {:?}",
        model.num_variables(),
        model.num_constraints(),
        model.model_type()
    );
    if model.has_integer_variables() {
        return branch_and_bound::solve_mixed_integer(model, options);
    }
    Ok(match simplex::solve_relaxation(model, options)? {
        RelaxationOutcome::Optimal { values, objective } => Solution::report(
            model,
            Status::Optimal,
            objective,
            values,
            options.integrality_tolerance,
        ),
        RelaxationOutcome::Infeasible => Solution::without_values(Status::Infeasible),
        RelaxationOutcome::Unbounded => Solution::without_values(Status::Unbounded),
    })
}

/// Hard solver failures
///
/// These abort a solve outright. Solver status outcomes (infeasible,
/// unbounded, limits) are not errors and are reported on the
/// [`Solution`] instead.
#[derive(Error, Debug)]
pub enum SolverError {
    /// The simplex pivot cap tripped, indicating degeneracy or cycling
    #[error("simplex exceeded the pivot cap after {pivots} pivots")]
    PivotLimit { pivots: usize },
    /// The solver reached a state that should be unreachable
    #[error("simplex reached an impossible state: {detail}")]
    Numeric { detail: String },
    /// The model failed solve-time validation
    #[error(transparent)]
    Model(#[from] ModelError),
}
