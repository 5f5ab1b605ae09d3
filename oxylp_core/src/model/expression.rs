//! Module providing linear expressions over model variables
use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A linear combination of variables plus a constant offset
///
/// Represents `sum(coefficient_i * variable_i) + constant`. Terms are
/// keyed by variable id and kept in insertion order; adding a term for a
/// variable that already appears merges the two by summing coefficients,
/// so a variable occurs at most once in any expression.
///
/// # Examples
/// ```rust
/// use oxylp_core::model::expression::LinearExpr;
/// // 3*x + 2*y + 1
/// let expr = LinearExpr::new()
///     .with_term("x", 3.0)
///     .with_term("y", 2.0)
///     .with_constant(1.0);
/// assert_eq!(expr.coefficient("x"), Some(3.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearExpr {
    terms: IndexMap<String, f64>,
    constant: f64,
}

impl LinearExpr {
    /// Create a new empty expression
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an expression with a single term
    pub fn term(variable: &str, coefficient: f64) -> Self {
        LinearExpr::new().with_term(variable, coefficient)
    }

    /// Build an expression by summing `(variable, coefficient)` pairs
    ///
    /// Duplicate variables are merged by summation.
    pub fn sum<'a, I>(terms: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut expr = LinearExpr::new();
        for (variable, coefficient) in terms {
            expr.add_term(variable, coefficient);
        }
        expr
    }

    /// Add a term to the expression, merging with any existing term for
    /// the same variable by summing coefficients
    pub fn add_term(&mut self, variable: &str, coefficient: f64) -> &mut Self {
        *self.terms.entry(variable.to_string()).or_insert(0.0) += coefficient;
        self
    }

    /// Consuming version of [`add_term`](LinearExpr::add_term) for chaining
    pub fn with_term(mut self, variable: &str, coefficient: f64) -> Self {
        self.add_term(variable, coefficient);
        self
    }

    /// Add to the constant offset
    pub fn add_constant(&mut self, value: f64) -> &mut Self {
        self.constant += value;
        self
    }

    /// Consuming version of [`add_constant`](LinearExpr::add_constant)
    pub fn with_constant(mut self, value: f64) -> Self {
        self.add_constant(value);
        self
    }

    /// The coefficient for a variable, None if the variable does not appear
    pub fn coefficient(&self, variable: &str) -> Option<f64> {
        self.terms.get(variable).copied()
    }

    /// The constant offset of the expression
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Iterate over `(variable id, coefficient)` pairs in insertion order
    pub fn terms(&self) -> impl Iterator<Item = (&str, f64)> {
        self.terms.iter().map(|(id, coef)| (id.as_str(), *coef))
    }

    /// Number of distinct variables in the expression
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the expression has no terms (the constant may be nonzero)
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluate the expression against an assignment of variable values
    ///
    /// Returns None if any variable in the expression is missing from the
    /// assignment.
    pub fn evaluate(&self, values: &IndexMap<String, f64>) -> Option<f64> {
        let mut total = self.constant;
        for (id, coef) in &self.terms {
            total += coef * values.get(id)?;
        }
        Some(total)
    }

    /// Create a string representation of the terms in the expression
    pub(crate) fn terms_to_string(&self) -> String {
        if self.terms.is_empty() {
            return "0".to_string();
        }
        let mut str_rep = String::new();
        for (i, (id, coef)) in self.terms.iter().enumerate() {
            if i == 0 {
                str_rep.push_str(&format!("{}*{}", coef, id));
            } else {
                str_rep.push_str(&format!(" + {}*{}", coef, id));
            }
        }
        str_rep
    }
}

impl Display for LinearExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.constant == 0.0 {
            write!(f, "{}", self.terms_to_string())
        } else {
            write!(f, "{} + {}", self.terms_to_string(), self.constant)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_terms_merge() {
        let expr = LinearExpr::new()
            .with_term("x", 2.0)
            .with_term("y", 1.0)
            .with_term("x", 3.0);
        assert_eq!(expr.len(), 2);
        assert_eq!(expr.coefficient("x"), Some(5.0));
        assert_eq!(expr.coefficient("y"), Some(1.0));
    }

    #[test]
    fn sum_builds_from_pairs() {
        let expr = LinearExpr::sum([("a", 1.0), ("b", 2.0), ("a", -1.0)]);
        assert_eq!(expr.coefficient("a"), Some(0.0));
        assert_eq!(expr.coefficient("b"), Some(2.0));
    }

    #[test]
    fn evaluate_with_constant() {
        let expr = LinearExpr::term("x", 2.0).with_constant(5.0);
        let mut values = IndexMap::new();
        values.insert("x".to_string(), 3.0);
        assert_eq!(expr.evaluate(&values), Some(11.0));
    }

    #[test]
    fn evaluate_missing_variable() {
        let expr = LinearExpr::term("x", 2.0);
        let values = IndexMap::new();
        assert_eq!(expr.evaluate(&values), None);
    }

    #[test]
    fn display_form() {
        let expr = LinearExpr::new().with_term("x", 3.0).with_term("y", 2.0);
        assert_eq!(format!("{}", expr), "3*x + 2*y");
    }
}
