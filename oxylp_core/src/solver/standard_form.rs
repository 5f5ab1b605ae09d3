//! Conversion of a model into equality standard form for the simplex solver
//!
//! Every constraint becomes an equality row (inequalities get a
//! slack/surplus column), and every variable is substituted so that the
//! internal columns all live in `[0, span]`:
//!
//! - finite lower bound: `x = lower + x'` with `span = upper - lower`
//! - no finite lower, finite upper: `x = upper - x'` (mirrored)
//! - free both ways: `x = x_pos - x_neg`, two columns
//!
//! Finite upper bounds stay on the columns as spans for the
//! bounded-variable pivoting rule; they never become constraint rows, so
//! the matrix size is proportional to the model's constraints.
use indexmap::IndexMap;
use nalgebra::{DMatrix, DVector};

use crate::model::constraint::ConstraintSense;
use crate::model::model::Model;
use crate::model::objective::ObjectiveSense;

/// A model lowered to `A x = b`, `0 <= x <= span`, minimize `cost . x`
pub(crate) struct StandardForm {
    /// Constraint matrix, one row per model constraint
    pub a: DMatrix<f64>,
    /// Right hand side after substitutions (entries may be negative)
    pub b: DVector<f64>,
    /// Cost vector, always in minimize orientation
    pub cost: DVector<f64>,
    /// Upper bound of each column in the shifted space (lower is always 0)
    pub span: Vec<f64>,
    /// How each column maps back onto model variables
    pub columns: Vec<ColumnOrigin>,
    /// Slack column and sign for each row, None for equality rows
    pub slack_of_row: Vec<Option<(usize, f64)>>,
}

/// Records the substitution that produced a column
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ColumnOrigin {
    /// `x = lower + column`
    Shifted { var: usize, lower: f64 },
    /// `x = upper - column`
    Mirrored { var: usize, upper: f64 },
    /// Positive part of a free variable
    FreePositive { var: usize },
    /// Negative part of a free variable
    FreeNegative { var: usize },
    /// Slack or surplus column for a constraint row
    Slack,
}

impl StandardForm {
    /// Lower a model into standard form
    ///
    /// Expressions are validated when they are added to the model, so the
    /// variable lookups here cannot fail.
    pub(crate) fn build(model: &Model) -> StandardForm {
        let num_rows = model.num_constraints();

        // Plan the variable columns
        let mut columns: Vec<ColumnOrigin> = Vec::new();
        let mut span: Vec<f64> = Vec::new();
        // Per variable: substitution offset and (column, multiplier) pairs
        let mut offsets: Vec<f64> = Vec::with_capacity(model.num_variables());
        let mut var_columns: Vec<Vec<(usize, f64)>> = Vec::with_capacity(model.num_variables());
        for (var, variable) in model.variables().values().enumerate() {
            let lower = variable.lower_bound;
            let upper = variable.upper_bound;
            if lower.is_finite() {
                let col = columns.len();
                columns.push(ColumnOrigin::Shifted { var, lower });
                span.push(upper - lower);
                offsets.push(lower);
                var_columns.push(vec![(col, 1.0)]);
            } else if upper.is_finite() {
                let col = columns.len();
                columns.push(ColumnOrigin::Mirrored { var, upper });
                span.push(f64::INFINITY);
                offsets.push(upper);
                var_columns.push(vec![(col, -1.0)]);
            } else {
                let positive = columns.len();
                columns.push(ColumnOrigin::FreePositive { var });
                span.push(f64::INFINITY);
                let negative = columns.len();
                columns.push(ColumnOrigin::FreeNegative { var });
                span.push(f64::INFINITY);
                offsets.push(0.0);
                var_columns.push(vec![(positive, 1.0), (negative, -1.0)]);
            }
        }

        // Slack/surplus columns, one per inequality row
        let mut slack_of_row: Vec<Option<(usize, f64)>> = vec![None; num_rows];
        for (row, constraint) in model.constraints().values().enumerate() {
            let sign = match constraint.sense {
                ConstraintSense::LessEqual => 1.0,
                ConstraintSense::GreaterEqual => -1.0,
                ConstraintSense::Equal => continue,
            };
            let col = columns.len();
            columns.push(ColumnOrigin::Slack);
            span.push(f64::INFINITY);
            slack_of_row[row] = Some((col, sign));
        }

        let num_cols = columns.len();
        let mut a = DMatrix::zeros(num_rows, num_cols);
        let mut b = DVector::zeros(num_rows);
        for (row, constraint) in model.constraints().values().enumerate() {
            let mut rhs = constraint.rhs;
            for (id, coefficient) in constraint.expression().terms() {
                let var = model.variables().get_index_of(id).unwrap();
                rhs -= coefficient * offsets[var];
                for &(col, multiplier) in &var_columns[var] {
                    a[(row, col)] += coefficient * multiplier;
                }
            }
            if let Some((col, sign)) = slack_of_row[row] {
                a[(row, col)] = sign;
            }
            b[row] = rhs;
        }

        let mut cost = DVector::zeros(num_cols);
        for (id, coefficient) in model.objective().expression.terms() {
            let var = model.variables().get_index_of(id).unwrap();
            for &(col, multiplier) in &var_columns[var] {
                cost[col] += coefficient * multiplier;
            }
        }
        if model.objective().sense == ObjectiveSense::Maximize {
            cost = -cost;
        }

        StandardForm {
            a,
            b,
            cost,
            span,
            columns,
            slack_of_row,
        }
    }

    /// Map internal column values back onto model variable ids
    pub(crate) fn recover(&self, model: &Model, x: &DVector<f64>) -> IndexMap<String, f64> {
        let mut values: IndexMap<String, f64> = model
            .variables()
            .keys()
            .map(|id| (id.clone(), 0.0))
            .collect();
        for (col, origin) in self.columns.iter().enumerate() {
            match *origin {
                ColumnOrigin::Shifted { var, lower } => {
                    *values.get_index_mut(var).unwrap().1 = lower + x[col];
                }
                ColumnOrigin::Mirrored { var, upper } => {
                    *values.get_index_mut(var).unwrap().1 = upper - x[col];
                }
                ColumnOrigin::FreePositive { var } => {
                    *values.get_index_mut(var).unwrap().1 += x[col];
                }
                ColumnOrigin::FreeNegative { var } => {
                    *values.get_index_mut(var).unwrap().1 -= x[col];
                }
                ColumnOrigin::Slack => {}
            }
        }
        values
    }
}
