//! Module for building optimization models

pub mod constraint;
pub mod expression;
pub mod model;
pub mod objective;
pub mod variable;

pub use constraint::{Constraint, ConstraintSense};
pub use expression::LinearExpr;
pub use model::{Model, ModelError, ModelType};
pub use objective::{Objective, ObjectiveSense};
pub use variable::{Variable, VariableBuilder, VariableType};
