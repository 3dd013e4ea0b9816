//! Evaluation of parsed guard expressions.

use serde_json::Value;

use crate::Variables;
use crate::variables::{ABSENT_TEXT, Lookup, render_value};

use super::parser::{CompareOp, Expr, Operand};

/// Operand after variable substitution.
#[derive(Debug, Clone, PartialEq)]
enum Scalar {
    /// The `None` keyword.
    NoneLiteral,
    /// A variable that resolved to nothing.
    Absent,
    Text(String),
    Bool(bool),
    Number(String),
}

impl Scalar {
    fn text(&self) -> String {
        match self {
            Self::NoneLiteral | Self::Absent => ABSENT_TEXT.to_owned(),
            Self::Text(text) | Self::Number(text) => text.clone(),
            Self::Bool(true) => "True".to_owned(),
            Self::Bool(false) => "False".to_owned(),
        }
    }

    fn truthy(&self) -> bool {
        match self {
            Self::NoneLiteral | Self::Absent => false,
            Self::Text(text) => !text.is_empty(),
            Self::Bool(flag) => *flag,
            Self::Number(text) => text.parse::<f64>().is_ok_and(|n| n != 0.0),
        }
    }
}

pub(super) fn evaluate(expr: &Expr, vars: &Variables) -> bool {
    match expr {
        Expr::Not(inner) => !evaluate(inner, vars),
        Expr::And(terms) => terms.iter().all(|term| evaluate(term, vars)),
        Expr::Truthy(operand) => resolve(operand, vars).truthy(),
        Expr::Compare { op, left, right } => {
            let lhs = resolve(left, vars);
            let rhs = resolve(right, vars);
            match op {
                CompareOp::Eq => equals(&lhs, &rhs),
                CompareOp::NotEq => !equals(&lhs, &rhs),
                CompareOp::In => rhs.text().contains(&lhs.text()),
            }
        }
    }
}

/// `None` only equals a value that resolved to nothing; everything else
/// compares by rendered text.
fn equals(lhs: &Scalar, rhs: &Scalar) -> bool {
    match (lhs, rhs) {
        (Scalar::NoneLiteral | Scalar::Absent, Scalar::NoneLiteral | Scalar::Absent) => true,
        (Scalar::NoneLiteral, _) | (_, Scalar::NoneLiteral) => false,
        _ => lhs.text() == rhs.text(),
    }
}

fn resolve(operand: &Operand, vars: &Variables) -> Scalar {
    match operand {
        Operand::None => Scalar::NoneLiteral,
        Operand::Placeholder(path) => match vars.lookup(path) {
            Lookup::Absent => Scalar::Absent,
            Lookup::Found(Value::Bool(flag)) => Scalar::Bool(*flag),
            Lookup::Found(Value::Number(number)) => Scalar::Number(number.to_string()),
            Lookup::Found(value) => Scalar::Text(render_value(value)),
        },
        Operand::Literal(text) => match Variables::sole_placeholder(text) {
            Some(path) => match vars.lookup(path) {
                Lookup::Absent => Scalar::Absent,
                Lookup::Found(value) => Scalar::Text(render_value(value)),
            },
            None => Scalar::Text(vars.render(text).into_owned()),
        },
    }
}
