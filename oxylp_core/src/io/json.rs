//! Module providing JSON IO for oxylp models
use serde::{Deserialize, Serialize};

use crate::io::IoError;
use crate::model::constraint::{Constraint, ConstraintSense};
use crate::model::expression::LinearExpr;
use crate::model::model::Model;
use crate::model::objective::ObjectiveSense;
use crate::model::variable::{Variable, VariableType};

// region JSON Model
/// Represents a JSON serialized model, used for reading and writing
/// models in json format
///
/// Deserialized data is rebuilt through the regular model-building API,
/// so invalid input (duplicate ids, crossed bounds) is rejected the same
/// way it would be at build time.
#[derive(Serialize, Deserialize)]
struct JsonModel {
    objective_sense: ObjectiveSense,
    objective: LinearExpr,
    variables: Vec<JsonVariable>,
    constraints: Vec<JsonConstraint>,
}

#[derive(Serialize, Deserialize)]
struct JsonVariable {
    id: String,
    variable_type: VariableType,
    lower_bound: f64,
    upper_bound: f64,
}

#[derive(Serialize, Deserialize)]
struct JsonConstraint {
    name: String,
    expression: LinearExpr,
    sense: ConstraintSense,
    rhs: f64,
}
// endregion JSON Model

// region Conversions
impl From<&Variable> for JsonVariable {
    fn from(variable: &Variable) -> Self {
        JsonVariable {
            id: variable.id.clone(),
            variable_type: variable.variable_type,
            lower_bound: variable.lower_bound,
            upper_bound: variable.upper_bound,
        }
    }
}

impl From<JsonVariable> for Variable {
    fn from(variable: JsonVariable) -> Self {
        Variable {
            id: variable.id,
            variable_type: variable.variable_type,
            lower_bound: variable.lower_bound,
            upper_bound: variable.upper_bound,
        }
    }
}

impl From<&Constraint> for JsonConstraint {
    fn from(constraint: &Constraint) -> Self {
        JsonConstraint {
            name: constraint.name.clone(),
            expression: constraint.expression().clone(),
            sense: constraint.sense,
            rhs: constraint.rhs,
        }
    }
}

impl From<&Model> for JsonModel {
    fn from(model: &Model) -> Self {
        JsonModel {
            objective_sense: model.objective().sense,
            objective: model.objective().expression.clone(),
            variables: model.variables().values().map(JsonVariable::from).collect(),
            constraints: model
                .constraints()
                .values()
                .map(JsonConstraint::from)
                .collect(),
        }
    }
}
// endregion Conversions

/// Serialize a model to a JSON string
pub fn model_to_json(model: &Model) -> Result<String, IoError> {
    serde_json::to_string_pretty(&JsonModel::from(model)).map_err(IoError::Serialize)
}

/// Rebuild a model from a JSON string produced by [`model_to_json`]
pub fn model_from_json(data: &str) -> Result<Model, IoError> {
    let parsed: JsonModel = serde_json::from_str(data).map_err(IoError::Deserialize)?;
    let mut model = Model::new(parsed.objective_sense);
    for variable in parsed.variables {
        model.add_variable(Variable::from(variable))?;
    }
    for constraint in parsed.constraints {
        model.add_constraint(
            constraint.expression,
            constraint.sense,
            constraint.rhs,
            Some(&constraint.name),
        )?;
    }
    model.set_objective(parsed.objective, parsed.objective_sense);
    Ok(model)
}
