//! Provides struct representing an optimization model
use indexmap::IndexMap;
use thiserror::Error;

use crate::model::constraint::{Constraint, ConstraintSense};
use crate::model::expression::LinearExpr;
use crate::model::objective::{Objective, ObjectiveSense};
use crate::model::variable::{Variable, VariableBuilder, VariableType};

/// An optimization model
///
/// Built incrementally by declaring variables, adding constraints, and
/// setting an objective, then passed read-only into
/// [`solve`](crate::solver::solve). Solving never mutates the model;
/// it can be solved repeatedly, including after tightening variable
/// bounds between solves.
///
/// Serialization goes through [`crate::io::json`], which revalidates on
/// the way back in.
#[derive(Debug, Clone)]
pub struct Model {
    /// Objective to optimize
    objective: Objective,
    /// Variables of the model, keyed by id in declaration order
    variables: IndexMap<String, Variable>,
    /// Constraints of the model, keyed by name in insertion order
    constraints: IndexMap<String, Constraint>,
    /// Type of model (see [`ModelType`])
    model_type: ModelType,
}

impl Model {
    // region Creation Functions
    /// Create a new model with an empty objective of the given sense
    pub fn new(objective_sense: ObjectiveSense) -> Self {
        Model {
            objective: Objective::new(objective_sense),
            variables: IndexMap::new(),
            constraints: IndexMap::new(),
            model_type: ModelType::LinearContinuous,
        }
    }

    /// Create a new maximization model
    pub fn new_maximization() -> Self {
        Self::new(ObjectiveSense::Maximize)
    }

    /// Create a new minimization model
    pub fn new_minimization() -> Self {
        Self::new(ObjectiveSense::Minimize)
    }
    // endregion Creation Functions

    // region Adding Variables
    /// Add a variable to the model
    ///
    /// # Errors
    /// - [`ModelError::DuplicateVariable`] if a variable with the same id
    ///   was already declared
    /// - [`ModelError::InvalidBounds`] if `lower_bound > upper_bound`, a
    ///   bound is NaN, or a binary variable's bounds are not within `[0, 1]`
    pub fn add_variable(&mut self, variable: Variable) -> Result<(), ModelError> {
        self.validate_variable(&variable)?;
        if variable.is_integral() {
            self.model_type = ModelType::LinearMixedInteger;
        }
        self.variables.insert(variable.id.clone(), variable);
        Ok(())
    }

    /// Create a new variable and add it to the model
    pub fn add_new_variable(
        &mut self,
        id: &str,
        variable_type: VariableType,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ModelError> {
        let new_var = VariableBuilder::default()
            .id(id)
            .variable_type(variable_type)
            .lower_bound(lower_bound)
            .upper_bound(upper_bound)
            .build()
            .unwrap();
        self.add_variable(new_var)
    }
    // endregion Adding Variables

    // region Adding Constraints
    /// Add a constraint built from an expression, sense, and rhs
    ///
    /// A name is generated (`"c" + ordinal`) when none is given. Any
    /// constant on the expression side is folded into the rhs.
    ///
    /// # Returns
    /// The name under which the constraint was stored.
    ///
    /// # Errors
    /// - [`ModelError::DuplicateConstraintName`] if the given name collides
    /// - [`ModelError::UnknownVariable`] if the expression references a
    ///   variable not declared on this model
    /// - [`ModelError::NonFiniteCoefficient`] if any coefficient is not finite
    pub fn add_constraint(
        &mut self,
        expression: LinearExpr,
        sense: ConstraintSense,
        rhs: f64,
        name: Option<&str>,
    ) -> Result<String, ModelError> {
        self.validate_expression(&expression)?;
        let name = match name {
            Some(given) => {
                if self.constraints.contains_key(given) {
                    return Err(ModelError::DuplicateConstraintName(given.to_string()));
                }
                given.to_string()
            }
            None => self.next_constraint_name(),
        };
        let constraint = Constraint::new(&name, expression, sense, rhs);
        self.constraints.insert(name.clone(), constraint);
        Ok(name)
    }

    /// Generate the next free auto-assigned constraint name
    fn next_constraint_name(&self) -> String {
        let mut ordinal = self.constraints.len();
        loop {
            let candidate = format!("c{}", ordinal);
            if !self.constraints.contains_key(&candidate) {
                return candidate;
            }
            ordinal += 1;
        }
    }
    // endregion Adding Constraints

    // region Objective
    /// Set the objective, replacing any previously set one
    ///
    /// Overwriting is deliberate last-write-wins behavior and is not an
    /// error. Variables referenced by the objective are checked when the
    /// model is solved, not here.
    pub fn set_objective(&mut self, expression: LinearExpr, sense: ObjectiveSense) {
        self.objective = Objective { expression, sense };
    }

    /// Update the objective sense of the model
    pub fn update_objective_sense(&mut self, sense: ObjectiveSense) {
        self.objective.sense = sense;
    }
    // endregion Objective

    // region Update Variable Bounds
    /// Update the bounds of a variable
    ///
    /// Used between solves (branch-and-bound tightens bounds on cloned
    /// models this way).
    pub fn update_variable_bounds(
        &mut self,
        id: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ModelError> {
        let variable = self
            .variables
            .get_mut(id)
            .ok_or_else(|| ModelError::UnknownVariable(id.to_string()))?;
        if lower_bound.is_nan() || upper_bound.is_nan() || lower_bound > upper_bound {
            return Err(ModelError::InvalidBounds(id.to_string()));
        }
        variable.lower_bound = lower_bound;
        variable.upper_bound = upper_bound;
        Ok(())
    }
    // endregion Update Variable Bounds

    // region Accessors
    /// The model's objective
    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    /// The variables of the model in declaration order
    pub fn variables(&self) -> &IndexMap<String, Variable> {
        &self.variables
    }

    /// The constraints of the model in insertion order
    pub fn constraints(&self) -> &IndexMap<String, Constraint> {
        &self.constraints
    }

    /// Look up a variable by id
    pub fn get_variable(&self, id: &str) -> Option<&Variable> {
        self.variables.get(id)
    }

    /// Current number of variables in the model
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Current number of constraints in the model
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// The type of the model (see [`ModelType`])
    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    /// Whether any variable requires an integral value
    pub fn has_integer_variables(&self) -> bool {
        self.model_type == ModelType::LinearMixedInteger
    }
    // endregion Accessors

    // region Validation Functions
    /// Check that a variable is valid to add to this model
    fn validate_variable(&self, variable: &Variable) -> Result<(), ModelError> {
        if self.variables.contains_key(&variable.id) {
            return Err(ModelError::DuplicateVariable(variable.id.clone()));
        }
        let lb = variable.lower_bound;
        let ub = variable.upper_bound;
        if lb.is_nan() || ub.is_nan() || lb > ub {
            return Err(ModelError::InvalidBounds(variable.id.clone()));
        }
        // A +inf lower or -inf upper bound leaves no value to take
        if lb == f64::INFINITY || ub == f64::NEG_INFINITY {
            return Err(ModelError::InvalidBounds(variable.id.clone()));
        }
        if variable.variable_type == VariableType::Binary && (lb < 0.0 || ub > 1.0) {
            return Err(ModelError::InvalidBounds(variable.id.clone()));
        }
        Ok(())
    }

    /// Check that an expression references only declared variables with
    /// finite coefficients
    fn validate_expression(&self, expression: &LinearExpr) -> Result<(), ModelError> {
        for (id, coefficient) in expression.terms() {
            if !self.variables.contains_key(id) {
                return Err(ModelError::UnknownVariable(id.to_string()));
            }
            if !coefficient.is_finite() {
                return Err(ModelError::NonFiniteCoefficient(id.to_string()));
            }
        }
        Ok(())
    }

    /// Check the model is ready to be solved
    ///
    /// Constraints are validated as they are added; the objective is only
    /// checked here because `set_objective` deliberately never fails.
    pub(crate) fn validate_for_solve(&self) -> Result<(), ModelError> {
        self.validate_expression(&self.objective.expression)
    }
    // endregion Validation Functions
}

/// Types of optimization models
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelType {
    /// Linear objective and constraints, continuous variables only
    LinearContinuous,
    /// Linear objective and constraints, with integer or binary variables
    LinearMixedInteger,
}

/// Errors associated with building a Model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Error when trying to add a variable with the same id as an existing variable
    #[error("Tried to add a variable with the same id as an existing variable: {0}")]
    DuplicateVariable(String),
    /// Error when trying to add or update a variable with invalid bounds
    #[error("Invalid bounds for variable {0}")]
    InvalidBounds(String),
    /// Error when trying to add a constraint with the same name as an existing constraint
    #[error("Tried to add a constraint with the same name as an existing constraint: {0}")]
    DuplicateConstraintName(String),
    /// Error when an expression references a variable not declared on the model
    #[error("Expression references a variable not declared on this model: {0}")]
    UnknownVariable(String),
    /// Error when an expression carries a non-finite coefficient
    #[error("Coefficient for variable {0} is not finite")]
    NonFiniteCoefficient(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_model() {
        // Catch fire test
        let _ = Model::new(ObjectiveSense::Maximize);

        let max_model = Model::new_maximization();
        assert_eq!(max_model.objective().sense, ObjectiveSense::Maximize);

        let min_model = Model::new_minimization();
        assert_eq!(min_model.objective().sense, ObjectiveSense::Minimize);
    }

    #[test]
    fn add_variables() {
        let mut model = Model::new_minimization();
        model
            .add_new_variable("x", VariableType::Continuous, 0.0, 100.0)
            .unwrap();
        assert_eq!(model.model_type(), ModelType::LinearContinuous);

        model
            .add_new_variable("y", VariableType::Integer, 0.0, 100.0)
            .unwrap();
        assert_eq!(model.model_type(), ModelType::LinearMixedInteger);
        assert_eq!(model.num_variables(), 2);

        // Declaration order is preserved
        let ids: Vec<&str> = model.variables().keys().map(|k| k.as_str()).collect();
        assert_eq!(ids, vec!["x", "y"]);
    }

    #[test]
    fn duplicate_variable_rejected() {
        let mut model = Model::new_minimization();
        model
            .add_new_variable("x", VariableType::Continuous, 0.0, 1.0)
            .unwrap();
        let res = model.add_new_variable("x", VariableType::Continuous, 0.0, 2.0);
        assert_eq!(res, Err(ModelError::DuplicateVariable("x".to_string())));
    }

    #[test]
    fn invalid_bounds_rejected() {
        let mut model = Model::new_minimization();
        let res = model.add_new_variable("x", VariableType::Continuous, 100.0, 64.0);
        assert_eq!(res, Err(ModelError::InvalidBounds("x".to_string())));

        // Binary bounds must stay within [0, 1]
        let res = model.add_new_variable("b", VariableType::Binary, 0.0, 2.0);
        assert_eq!(res, Err(ModelError::InvalidBounds("b".to_string())));
    }

    #[test]
    fn add_constraint_with_name() {
        let mut model = Model::new_minimization();
        model
            .add_new_variable("x", VariableType::Continuous, 0.0, 10.0)
            .unwrap();
        let name = model
            .add_constraint(
                LinearExpr::term("x", 2.0),
                ConstraintSense::LessEqual,
                8.0,
                Some("cap"),
            )
            .unwrap();
        assert_eq!(name, "cap");
        assert_eq!(model.num_constraints(), 1);

        let res = model.add_constraint(
            LinearExpr::term("x", 1.0),
            ConstraintSense::LessEqual,
            5.0,
            Some("cap"),
        );
        assert_eq!(
            res,
            Err(ModelError::DuplicateConstraintName("cap".to_string()))
        );
    }

    #[test]
    fn auto_generated_constraint_names() {
        let mut model = Model::new_minimization();
        model
            .add_new_variable("x", VariableType::Continuous, 0.0, 10.0)
            .unwrap();
        let first = model
            .add_constraint(LinearExpr::term("x", 1.0), ConstraintSense::LessEqual, 5.0, None)
            .unwrap();
        assert_eq!(first, "c0");
        let second = model
            .add_constraint(LinearExpr::term("x", 1.0), ConstraintSense::GreaterEqual, 1.0, None)
            .unwrap();
        assert_eq!(second, "c1");
    }

    #[test]
    fn auto_name_skips_taken_names() {
        let mut model = Model::new_minimization();
        model
            .add_new_variable("x", VariableType::Continuous, 0.0, 10.0)
            .unwrap();
        model
            .add_constraint(
                LinearExpr::term("x", 1.0),
                ConstraintSense::LessEqual,
                5.0,
                Some("c0"),
            )
            .unwrap();
        let generated = model
            .add_constraint(LinearExpr::term("x", 1.0), ConstraintSense::GreaterEqual, 1.0, None)
            .unwrap();
        assert_eq!(generated, "c1");
    }

    #[test]
    fn unknown_variable_in_constraint() {
        let mut model = Model::new_minimization();
        let res = model.add_constraint(
            LinearExpr::term("ghost", 1.0),
            ConstraintSense::LessEqual,
            5.0,
            None,
        );
        assert_eq!(res, Err(ModelError::UnknownVariable("ghost".to_string())));
    }

    #[test]
    fn objective_overwrite_is_silent() {
        let mut model = Model::new_minimization();
        model
            .add_new_variable("x", VariableType::Continuous, 0.0, 10.0)
            .unwrap();
        model.set_objective(LinearExpr::term("x", 1.0), ObjectiveSense::Minimize);
        model.set_objective(LinearExpr::term("x", -1.0), ObjectiveSense::Maximize);
        assert_eq!(model.objective().sense, ObjectiveSense::Maximize);
        assert_eq!(model.objective().expression.coefficient("x"), Some(-1.0));
    }

    #[test]
    fn update_bounds() {
        let mut model = Model::new_minimization();
        model
            .add_new_variable("x", VariableType::Integer, 0.0, 10.0)
            .unwrap();
        model.update_variable_bounds("x", 2.0, 5.0).unwrap();
        let x = model.get_variable("x").unwrap();
        assert_eq!(x.lower_bound, 2.0);
        assert_eq!(x.upper_bound, 5.0);

        let res = model.update_variable_bounds("x", 6.0, 5.0);
        assert_eq!(res, Err(ModelError::InvalidBounds("x".to_string())));
        let res = model.update_variable_bounds("ghost", 0.0, 1.0);
        assert_eq!(res, Err(ModelError::UnknownVariable("ghost".to_string())));
    }
}
