//! Depth-first branch-and-bound over model clones with tightened bounds
//!
//! Each subproblem is an independently owned clone of the model, so a
//! node's bound tightening never leaks into its siblings. Depth-first
//! traversal keeps the open list proportional to tree depth. Limits are
//! consulted at the top of every iteration; tripping one stops the search
//! and reports the best incumbent as SubOptimal.
use std::time::Instant;

use indexmap::IndexMap;
use log::{debug, trace};

use crate::configuration::SolveOptions;
use crate::model::model::Model;
use crate::model::objective::ObjectiveSense;
use crate::solver::simplex::{self, RelaxationOutcome};
use crate::solver::solution::{Solution, Status};
use crate::solver::SolverError;

/// Best integer-feasible solution found so far
struct Incumbent {
    objective: f64,
    values: IndexMap<String, f64>,
}

/// Solve a model with integer or binary variables to proven optimality
pub(crate) fn solve_mixed_integer(
    model: &Model,
    options: &SolveOptions,
) -> Result<Solution, SolverError> {
    let deadline = options.time_limit.map(|limit| Instant::now() + limit);
    let sense = model.objective().sense;
    let mut open: Vec<Model> = vec![model.clone()];
    let mut incumbent: Option<Incumbent> = None;
    let mut nodes: u64 = 0;

    while let Some(node) = open.pop() {
        if limit_tripped(deadline, nodes, options) {
            debug!(
                "branch and bound: limit reached after {} nodes, {} subproblems still open",
                nodes,
                open.len() + 1
            );
            return Ok(match incumbent {
                Some(best) => Solution::report(
                    model,
                    Status::SubOptimal,
                    best.objective,
                    best.values,
                    options.integrality_tolerance,
                ),
                None => Solution::without_values(Status::SubOptimal),
            });
        }
        nodes += 1;

        // A degenerate relaxation failure aborts the whole run
        let (values, objective) = match simplex::solve_relaxation(&node, options)? {
            RelaxationOutcome::Infeasible => {
                trace!("node {}: relaxation infeasible, pruned", nodes);
                continue;
            }
            RelaxationOutcome::Unbounded => return Ok(Solution::without_values(Status::Unbounded)),
            RelaxationOutcome::Optimal { values, objective } => (values, objective),
        };

        if let Some(best) = &incumbent {
            if !improves(objective, best.objective, sense, options.epsilon) {
                trace!(
                    "node {}: bound {} no better than incumbent {}, pruned",
                    nodes,
                    objective,
                    best.objective
                );
                continue;
            }
        }

        match most_fractional(&node, &values, options.integrality_tolerance) {
            None => {
                debug!(
                    "node {}: integer feasible, new incumbent objective {}",
                    nodes, objective
                );
                incumbent = Some(Incumbent { objective, values });
            }
            Some((id, value)) => {
                trace!("node {}: branching on {} = {}", nodes, id, value);
                let variable = node.get_variable(&id).unwrap();
                let lower = variable.lower_bound;
                let upper = variable.upper_bound;
                // The ceiling child is pushed first so the floor child is
                // explored first; a child whose tightened bounds cross is
                // infeasible and never created
                let ceiling = value.ceil();
                if ceiling <= upper {
                    let mut child = node.clone();
                    child.update_variable_bounds(&id, ceiling, upper)?;
                    open.push(child);
                }
                let floor = value.floor();
                if floor >= lower {
                    let mut child = node.clone();
                    child.update_variable_bounds(&id, lower, floor)?;
                    open.push(child);
                }
            }
        }
    }

    Ok(match incumbent {
        Some(best) => {
            debug!(
                "branch and bound: search exhausted after {} nodes, objective {}",
                nodes, best.objective
            );
            Solution::report(
                model,
                Status::Optimal,
                best.objective,
                best.values,
                options.integrality_tolerance,
            )
        }
        None => Solution::without_values(Status::Infeasible),
    })
}

fn limit_tripped(deadline: Option<Instant>, nodes: u64, options: &SolveOptions) -> bool {
    if options.node_limit.is_some_and(|limit| nodes >= limit) {
        return true;
    }
    deadline.is_some_and(|at| Instant::now() >= at)
}

/// Whether a relaxation bound can still beat the incumbent
fn improves(candidate: f64, best: f64, sense: ObjectiveSense, epsilon: f64) -> bool {
    match sense {
        ObjectiveSense::Minimize => candidate < best - epsilon,
        ObjectiveSense::Maximize => candidate > best + epsilon,
    }
}

/// The integral variable whose relaxed value is farthest from a whole
/// number, ties going to the earliest declared
fn most_fractional(
    model: &Model,
    values: &IndexMap<String, f64>,
    tolerance: f64,
) -> Option<(String, f64)> {
    let mut best: Option<(String, f64, f64)> = None;
    for (id, variable) in model.variables() {
        if !variable.is_integral() {
            continue;
        }
        let value = values[id];
        let distance = (value - value.round()).abs();
        if distance <= tolerance {
            continue;
        }
        if best.as_ref().is_none_or(|(_, _, farthest)| distance > *farthest) {
            best = Some((id.clone(), value, distance));
        }
    }
    best.map(|(id, value, _)| (id, value))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::model::constraint::ConstraintSense;
    use crate::model::expression::LinearExpr;
    use crate::model::variable::VariableType;

    fn single_variable_model() -> Model {
        // Maximize x with 2x <= 5, x integer in [0, 10]; relaxation gives
        // x = 2.5, the integer optimum is 2
        let mut model = Model::new_maximization();
        model
            .add_new_variable("x", VariableType::Integer, 0.0, 10.0)
            .unwrap();
        model.set_objective(LinearExpr::term("x", 1.0), ObjectiveSense::Maximize);
        model
            .add_constraint(LinearExpr::term("x", 2.0), ConstraintSense::LessEqual, 5.0, None)
            .unwrap();
        model
    }

    #[test]
    fn fractional_relaxation_branches_to_integer() {
        let model = single_variable_model();
        let solution = solve_mixed_integer(&model, &SolveOptions::default()).unwrap();
        assert_eq!(solution.status(), Status::Optimal);
        assert_relative_eq!(solution.objective_value().unwrap(), 2.0, epsilon = 1e-6);
        assert_relative_eq!(solution.value("x").unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn binary_knapsack() {
        // Maximize 5a + 4b + 3c subject to 2a + 3b + c <= 4; the
        // relaxation is fractional, the integer optimum picks a and c
        let mut model = Model::new_maximization();
        for id in ["a", "b", "c"] {
            model.add_variable(crate::model::variable::Variable::binary(id)).unwrap();
        }
        model.set_objective(
            LinearExpr::sum([("a", 5.0), ("b", 4.0), ("c", 3.0)]),
            ObjectiveSense::Maximize,
        );
        model
            .add_constraint(
                LinearExpr::sum([("a", 2.0), ("b", 3.0), ("c", 1.0)]),
                ConstraintSense::LessEqual,
                4.0,
                None,
            )
            .unwrap();

        let solution = solve_mixed_integer(&model, &SolveOptions::default()).unwrap();
        assert_eq!(solution.status(), Status::Optimal);
        assert_relative_eq!(solution.objective_value().unwrap(), 8.0, epsilon = 1e-6);
        assert_relative_eq!(solution.value("a").unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(solution.value("b").unwrap(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(solution.value("c").unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn infeasible_integer_model() {
        // 2x = 3 has no integer solution for x in [0, 5]
        let mut model = Model::new_minimization();
        model
            .add_new_variable("x", VariableType::Integer, 0.0, 5.0)
            .unwrap();
        model.set_objective(LinearExpr::term("x", 1.0), ObjectiveSense::Minimize);
        model
            .add_constraint(LinearExpr::term("x", 2.0), ConstraintSense::Equal, 3.0, None)
            .unwrap();

        let solution = solve_mixed_integer(&model, &SolveOptions::default()).unwrap();
        assert_eq!(solution.status(), Status::Infeasible);
        assert_eq!(solution.objective_value(), None);
    }

    #[test]
    fn node_limit_zero_reports_sub_optimal_without_values() {
        let model = single_variable_model();
        let options = crate::configuration::SolveOptionsBuilder::default()
            .node_limit(Some(0))
            .build()
            .unwrap();
        let solution = solve_mixed_integer(&model, &options).unwrap();
        assert_eq!(solution.status(), Status::SubOptimal);
        assert_eq!(solution.objective_value(), None);
        assert!(solution.variable_values().is_none());
    }

    #[test]
    fn node_limit_keeps_best_incumbent() {
        // Node 1 is the fractional root, node 2 the floor child, which is
        // integer feasible; the limit then trips with the ceiling child
        // still open
        let model = single_variable_model();
        let options = crate::configuration::SolveOptionsBuilder::default()
            .node_limit(Some(2))
            .build()
            .unwrap();
        let solution = solve_mixed_integer(&model, &options).unwrap();
        assert_eq!(solution.status(), Status::SubOptimal);
        assert_relative_eq!(solution.objective_value().unwrap(), 2.0, epsilon = 1e-6);
        assert_relative_eq!(solution.value("x").unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn time_limit_already_expired() {
        let model = single_variable_model();
        let options = crate::configuration::SolveOptionsBuilder::default()
            .time_limit(Some(std::time::Duration::ZERO))
            .build()
            .unwrap();
        let solution = solve_mixed_integer(&model, &options).unwrap();
        assert_eq!(solution.status(), Status::SubOptimal);
    }

    #[test]
    fn most_fractional_prefers_earliest_on_ties() {
        let mut model = Model::new_minimization();
        model
            .add_new_variable("a", VariableType::Integer, 0.0, 10.0)
            .unwrap();
        model
            .add_new_variable("b", VariableType::Integer, 0.0, 10.0)
            .unwrap();
        let mut values = IndexMap::new();
        values.insert("a".to_string(), 1.5);
        values.insert("b".to_string(), 2.5);
        let (id, value) = most_fractional(&model, &values, 1e-6).unwrap();
        assert_eq!(id, "a");
        assert_relative_eq!(value, 1.5);
    }

    #[test]
    fn most_fractional_picks_farthest() {
        let mut model = Model::new_minimization();
        model
            .add_new_variable("a", VariableType::Integer, 0.0, 10.0)
            .unwrap();
        model
            .add_new_variable("b", VariableType::Integer, 0.0, 10.0)
            .unwrap();
        let mut values = IndexMap::new();
        values.insert("a".to_string(), 1.9);
        values.insert("b".to_string(), 2.6);
        let (id, _) = most_fractional(&model, &values, 1e-6).unwrap();
        assert_eq!(id, "b");
    }
}
