//! Module providing representation of linear constraints
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::model::expression::LinearExpr;

/// A named linear constraint, `expression <sense> rhs`
///
/// The right hand side is always a plain constant: any constant offset on
/// the expression side is folded into the rhs when the constraint is
/// constructed, so `x + 3 <= 10` is stored as `x <= 7`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Used to identify the constraint, unique within a model
    pub name: String,
    /// Left hand side terms (constant folded out)
    expression: LinearExpr,
    /// Relation between the left hand side and the rhs
    pub sense: ConstraintSense,
    /// The right hand side constant
    pub rhs: f64,
}

impl Constraint {
    /// Create a new constraint, folding the expression constant into the rhs
    ///
    /// # Parameters
    /// - `name`: Identifier for the constraint
    /// - `expression`: The left hand side
    /// - `sense`: The relational operator
    /// - `rhs`: The right hand side constant
    ///
    /// # Examples
    /// ```rust
    /// use oxylp_core::model::constraint::{Constraint, ConstraintSense};
    /// use oxylp_core::model::expression::LinearExpr;
    /// let lhs = LinearExpr::term("x", 1.0).with_constant(3.0);
    /// let constraint = Constraint::new("cap", lhs, ConstraintSense::LessEqual, 10.0);
    /// assert_eq!(constraint.rhs, 7.0);
    /// assert_eq!(constraint.expression().constant(), 0.0);
    /// ```
    pub fn new(name: &str, expression: LinearExpr, sense: ConstraintSense, rhs: f64) -> Self {
        let constant = expression.constant();
        let mut expression = expression;
        expression.add_constant(-constant);
        let folded_rhs = rhs - constant;
        Constraint {
            name: name.to_string(),
            expression,
            sense,
            rhs: folded_rhs,
        }
    }

    /// The left hand side of the constraint
    pub fn expression(&self) -> &LinearExpr {
        &self.expression
    }

    /// Whether an assignment of variable values satisfies the constraint
    /// to within `tolerance`
    pub fn is_satisfied(
        &self,
        values: &indexmap::IndexMap<String, f64>,
        tolerance: f64,
    ) -> Option<bool> {
        let lhs = self.expression.evaluate(values)?;
        Some(match self.sense {
            ConstraintSense::LessEqual => lhs <= self.rhs + tolerance,
            ConstraintSense::Equal => (lhs - self.rhs).abs() <= tolerance,
            ConstraintSense::GreaterEqual => lhs >= self.rhs - tolerance,
        })
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} {} {}",
            self.name,
            self.expression.terms_to_string(),
            self.sense,
            self.rhs
        )
    }
}

/// The relational operator of a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintSense {
    /// Left hand side must be less than or equal to the rhs
    LessEqual,
    /// Left hand side must equal the rhs
    Equal,
    /// Left hand side must be greater than or equal to the rhs
    GreaterEqual,
}

impl Display for ConstraintSense {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstraintSense::LessEqual => write!(f, "<="),
            ConstraintSense::Equal => write!(f, "="),
            ConstraintSense::GreaterEqual => write!(f, ">="),
        }
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;

    #[test]
    fn constant_folds_into_rhs() {
        let lhs = LinearExpr::term("x", 2.0).with_constant(-4.0);
        let constraint = Constraint::new("c", lhs, ConstraintSense::Equal, 6.0);
        assert_eq!(constraint.rhs, 10.0);
        assert_eq!(constraint.expression().constant(), 0.0);
        assert_eq!(constraint.expression().coefficient("x"), Some(2.0));
    }

    #[test]
    fn satisfaction_check() {
        let constraint = Constraint::new(
            "c",
            LinearExpr::term("x", 1.0),
            ConstraintSense::LessEqual,
            5.0,
        );
        let mut values = IndexMap::new();
        values.insert("x".to_string(), 4.0);
        assert_eq!(constraint.is_satisfied(&values, 1e-9), Some(true));
        values.insert("x".to_string(), 5.5);
        assert_eq!(constraint.is_satisfied(&values, 1e-9), Some(false));
    }

    #[test]
    fn display_form() {
        let constraint = Constraint::new(
            "cap",
            LinearExpr::term("x", 1.0).with_term("y", 2.0),
            ConstraintSense::GreaterEqual,
            4.0,
        );
        assert_eq!(format!("{}", constraint), "cap: 1*x + 2*y >= 4");
    }
}
