//! Solution entity and reporting of solver output onto model variables
use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::model::Model;

/// Status of a finished solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// A provably optimal solution was found
    Optimal,
    /// The constraints admit no solution
    Infeasible,
    /// The objective can be improved without bound
    Unbounded,
    /// A limit was reached before optimality was proven; the best
    /// solution found so far is reported when one exists
    SubOptimal,
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Optimal => write!(f, "Optimal"),
            Status::Infeasible => write!(f, "Infeasible"),
            Status::Unbounded => write!(f, "Unbounded"),
            Status::SubOptimal => write!(f, "SubOptimal"),
        }
    }
}

/// The result of solving a model
///
/// Always well formed: callers must inspect [`status`](Solution::status)
/// before trusting the objective or variable values, which are absent for
/// Infeasible and Unbounded results (and for SubOptimal results where no
/// incumbent was found before the limit tripped).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    status: Status,
    objective_value: Option<f64>,
    variable_values: Option<IndexMap<String, f64>>,
}

impl Solution {
    /// Package raw solver output as a solution
    ///
    /// Values are keyed by the original model's variable ids (subproblem
    /// clones share those ids). Integer and binary variables within the
    /// integrality tolerance of a whole number are rounded onto it;
    /// continuous variables are reported exactly as solved.
    pub(crate) fn report(
        model: &Model,
        status: Status,
        objective: f64,
        mut values: IndexMap<String, f64>,
        integrality_tolerance: f64,
    ) -> Solution {
        for (id, variable) in model.variables() {
            if !variable.is_integral() {
                continue;
            }
            if let Some(value) = values.get_mut(id) {
                let nearest = value.round();
                if (*value - nearest).abs() <= integrality_tolerance {
                    *value = nearest;
                }
            }
        }
        Solution {
            status,
            objective_value: Some(objective),
            variable_values: Some(values),
        }
    }

    /// A result carrying only a status, no values
    pub(crate) fn without_values(status: Status) -> Solution {
        Solution {
            status,
            objective_value: None,
            variable_values: None,
        }
    }

    /// The status of the solve
    pub fn status(&self) -> Status {
        self.status
    }

    /// The achieved objective value, present for Optimal and SubOptimal
    /// results
    pub fn objective_value(&self) -> Option<f64> {
        self.objective_value
    }

    /// The value assigned to a variable, by id
    pub fn value(&self, id: &str) -> Option<f64> {
        self.variable_values.as_ref()?.get(id).copied()
    }

    /// All variable values in declaration order, when present
    pub fn variable_values(&self) -> Option<&IndexMap<String, f64>> {
        self.variable_values.as_ref()
    }
}

impl Display for Solution {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Status: {}", self.status)?;
        if let Some(objective) = self.objective_value {
            writeln!(f, "Objective: {}", objective)?;
        }
        if let Some(values) = &self.variable_values {
            for (id, value) in values {
                writeln!(f, "{}: {}", id, value)?;
            }
        }
        Ok(())
    }
}
