//! Module providing representation of a model's objective
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::model::expression::LinearExpr;

/// The objective of an optimization model
///
/// A model carries exactly one objective. Setting a new objective on a
/// model replaces the previous one without error (last write wins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    /// The linear expression being optimized
    pub expression: LinearExpr,
    /// Whether the expression is minimized or maximized
    pub sense: ObjectiveSense,
}

impl Objective {
    /// Create a new empty objective with the given sense
    pub fn new(sense: ObjectiveSense) -> Self {
        Objective {
            expression: LinearExpr::new(),
            sense,
        }
    }

    /// Create a minimization objective over the given expression
    pub fn minimize(expression: LinearExpr) -> Self {
        Objective {
            expression,
            sense: ObjectiveSense::Minimize,
        }
    }

    /// Create a maximization objective over the given expression
    pub fn maximize(expression: LinearExpr) -> Self {
        Objective {
            expression,
            sense: ObjectiveSense::Maximize,
        }
    }
}

/// Represents the sense of the objective, whether it should be maximized
/// or minimized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectiveSense {
    /// The objective should be minimized
    Minimize,
    /// The objective should be maximized
    Maximize,
}

impl Display for ObjectiveSense {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectiveSense::Minimize => write!(f, "Minimize"),
            ObjectiveSense::Maximize => write!(f, "Maximize"),
        }
    }
}
