//! Module providing representation of optimization model variables
use std::fmt::{Display, Formatter};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// A decision variable in an optimization model
///
/// Variables are created through the [`VariableBuilder`] (or the
/// convenience constructors) and added to a
/// [`Model`](crate::model::model::Model), which owns them. Bounds default
/// to `[0, +inf)`; binary variables default to `[0, 1]`.
///
/// # Examples
/// ```rust
/// use oxylp_core::model::variable::{VariableBuilder, VariableType};
/// let x = VariableBuilder::default()
///     .id("x")
///     .variable_type(VariableType::Integer)
///     .upper_bound(10.0)
///     .build()
///     .unwrap();
/// assert_eq!(x.lower_bound, 0.0);
/// ```
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct Variable {
    /// Used to identify the variable, unique within a model
    pub id: String,
    /// Domain of the variable (see [`VariableType`])
    #[builder(default = "VariableType::Continuous")]
    pub variable_type: VariableType,
    /// Lowest value the variable can take
    #[builder(default = "0.0")]
    pub lower_bound: f64,
    /// Highest value the variable can take
    #[builder(default = "f64::INFINITY")]
    pub upper_bound: f64,
}

impl Variable {
    /// Create a continuous variable with the given bounds
    pub fn continuous(id: &str, lower_bound: f64, upper_bound: f64) -> Variable {
        Variable {
            id: id.to_string(),
            variable_type: VariableType::Continuous,
            lower_bound,
            upper_bound,
        }
    }

    /// Create an integer variable with the given bounds
    pub fn integer(id: &str, lower_bound: f64, upper_bound: f64) -> Variable {
        Variable {
            id: id.to_string(),
            variable_type: VariableType::Integer,
            lower_bound,
            upper_bound,
        }
    }

    /// Create a binary variable (bounds fixed to `[0, 1]`)
    pub fn binary(id: &str) -> Variable {
        Variable {
            id: id.to_string(),
            variable_type: VariableType::Binary,
            lower_bound: 0.0,
            upper_bound: 1.0,
        }
    }

    /// Whether the variable must take an integral value in a solution
    pub fn is_integral(&self) -> bool {
        matches!(
            self.variable_type,
            VariableType::Integer | VariableType::Binary
        )
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.id, self.variable_type)
    }
}

/// Represents the domain of a variable in an optimization model
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum VariableType {
    /// Continuous variable
    Continuous,
    /// Integer variable
    Integer,
    /// Binary variable
    Binary,
}

impl Display for VariableType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableType::Continuous => write!(f, "CONTINUOUS"),
            VariableType::Integer => write!(f, "INTEGER"),
            VariableType::Binary => write!(f, "BINARY"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let x = VariableBuilder::default().id("x").build().unwrap();
        assert_eq!(x.variable_type, VariableType::Continuous);
        assert_eq!(x.lower_bound, 0.0);
        assert!(x.upper_bound.is_infinite());
    }

    #[test]
    fn binary_bounds() {
        let b = Variable::binary("pick");
        assert_eq!(b.lower_bound, 0.0);
        assert_eq!(b.upper_bound, 1.0);
        assert!(b.is_integral());
    }

    #[test]
    fn display_includes_type() {
        let y = Variable::integer("y", 0.0, 5.0);
        assert_eq!(format!("{}", y), "y:INTEGER");
    }
}
