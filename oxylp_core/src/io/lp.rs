//! Module for rendering models in LP format
//!
//! Produces the CPLEX-style LP text representation of a model as a
//! string: objective, constraints, bounds, and integrality sections. The
//! core performs no file IO; callers decide where the text goes.
use crate::model::constraint::ConstraintSense;
use crate::model::expression::LinearExpr;
use crate::model::model::Model;
use crate::model::objective::ObjectiveSense;
use crate::model::variable::VariableType;

/// Render a model as LP-format text
pub fn write_lp(model: &Model) -> String {
    let mut out = String::new();
    out.push_str("\\ Generated by oxylp\n");

    match model.objective().sense {
        ObjectiveSense::Minimize => out.push_str("Minimize\n"),
        ObjectiveSense::Maximize => out.push_str("Maximize\n"),
    }
    out.push_str(" obj: ");
    push_terms(&mut out, &model.objective().expression);
    out.push('\n');

    out.push_str("Subject To\n");
    for constraint in model.constraints().values() {
        out.push_str(&format!(" {}: ", constraint.name));
        push_terms(&mut out, constraint.expression());
        let sense = match constraint.sense {
            ConstraintSense::LessEqual => "<=",
            ConstraintSense::Equal => "=",
            ConstraintSense::GreaterEqual => ">=",
        };
        out.push_str(&format!(" {} {}\n", sense, constraint.rhs));
    }

    out.push_str("Bounds\n");
    for variable in model.variables().values() {
        // Binary variables are implied [0, 1] by the Binaries section,
        // and [0, +inf) is the LP-format default
        if variable.variable_type == VariableType::Binary {
            continue;
        }
        let lower = variable.lower_bound;
        let upper = variable.upper_bound;
        let line = match (lower.is_finite(), upper.is_finite()) {
            (true, true) => format!(" {} <= {} <= {}\n", lower, variable.id, upper),
            (true, false) => {
                if lower == 0.0 {
                    continue;
                }
                format!(" {} >= {}\n", variable.id, lower)
            }
            (false, true) => format!(" -inf <= {} <= {}\n", variable.id, upper),
            (false, false) => format!(" {} free\n", variable.id),
        };
        out.push_str(&line);
    }

    let generals: Vec<&str> = model
        .variables()
        .values()
        .filter(|v| v.variable_type == VariableType::Integer)
        .map(|v| v.id.as_str())
        .collect();
    if !generals.is_empty() {
        out.push_str("Generals\n");
        for id in generals {
            out.push_str(&format!(" {}\n", id));
        }
    }

    let binaries: Vec<&str> = model
        .variables()
        .values()
        .filter(|v| v.variable_type == VariableType::Binary)
        .map(|v| v.id.as_str())
        .collect();
    if !binaries.is_empty() {
        out.push_str("Binaries\n");
        for id in binaries {
            out.push_str(&format!(" {}\n", id));
        }
    }

    out.push_str("End\n");
    out
}

/// Append `c1 x1 + c2 x2 - c3 x3` style terms
fn push_terms(out: &mut String, expression: &LinearExpr) {
    let mut first = true;
    for (id, coefficient) in expression.terms() {
        if first {
            if coefficient < 0.0 {
                out.push_str("- ");
            }
            first = false;
        } else if coefficient < 0.0 {
            out.push_str(" - ");
        } else {
            out.push_str(" + ");
        }
        let magnitude = coefficient.abs();
        if magnitude != 1.0 {
            out.push_str(&format!("{} ", magnitude));
        }
        out.push_str(id);
    }
    if first {
        out.push('0');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::objective::ObjectiveSense;

    #[test]
    fn renders_all_sections() {
        let mut model = Model::new_minimization();
        model
            .add_new_variable("x", VariableType::Continuous, 0.0, 4.0)
            .unwrap();
        model
            .add_new_variable("n", VariableType::Integer, 2.0, f64::INFINITY)
            .unwrap();
        model
            .add_new_variable("b", VariableType::Binary, 0.0, 1.0)
            .unwrap();
        model.set_objective(
            LinearExpr::sum([("x", 2.0), ("n", 1.0), ("b", -3.0)]),
            ObjectiveSense::Minimize,
        );
        model
            .add_constraint(
                LinearExpr::sum([("x", 1.0), ("n", 1.0)]),
                ConstraintSense::GreaterEqual,
                5.0,
                Some("cover"),
            )
            .unwrap();

        let text = write_lp(&model);
        let expected = "\\ Generated by oxylp\n\
                        Minimize\n \
                        obj: 2 x + n - 3 b\n\
                        Subject To\n \
                        cover: x + n >= 5\n\
                        Bounds\n \
                        0 <= x <= 4\n \
                        n >= 2\n\
                        Generals\n \
                        n\n\
                        Binaries\n \
                        b\n\
                        End\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn empty_objective_renders_zero() {
        let mut model = Model::new_maximization();
        model
            .add_new_variable("x", VariableType::Continuous, 0.0, f64::INFINITY)
            .unwrap();
        let text = write_lp(&model);
        assert!(text.contains("Maximize\n obj: 0\n"));
        // Default bounds need no entry
        assert!(text.contains("Bounds\nEnd\n"));
    }
}
