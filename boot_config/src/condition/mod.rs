//! Guard expressions attached to `$include` directives.
//!
//! The language is deliberately small:
//!
//! ```text
//! condition   := conjunction
//! conjunction := negation ('and' negation)*
//! negation    := 'not' negation | comparison
//! comparison  := operand (('==' | '!=' | 'in') operand)?
//! operand     := 'quoted' | "quoted" | ${run:path} | None
//! ```
//!
//! Placeholders inside quoted literals are rendered as text before
//! comparison; a literal made of a single placeholder that finds nothing
//! still compares equal to `None`. A bare operand is tested for truthiness.

mod eval;
mod lexer;
mod parser;

use std::fmt;

use crate::Variables;

pub use parser::{CompareOp, Expr, Operand};

/// Failure to parse a condition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at offset {offset}")]
pub struct ConditionError {
    /// Character offset of the failure within the expression.
    pub offset: usize,
    /// Description of what was expected.
    pub message: String,
}

impl ConditionError {
    pub(crate) fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

/// A parsed guard expression.
///
/// # Examples
///
/// ```
/// use boot_config::{Condition, Variables};
/// use serde_json::json;
///
/// let vars = Variables::new(json!({"transport": "http,xmpp"}));
/// let condition = Condition::parse("'xmpp' in '${run:transport}'").expect("valid");
/// assert!(condition.evaluate(&vars));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    source: String,
    expr: Expr,
}

impl Condition {
    /// Parses an expression.
    ///
    /// # Errors
    ///
    /// Returns a [`ConditionError`] for unknown tokens, unterminated
    /// literals, missing operands and trailing input.
    pub fn parse(source: &str) -> Result<Self, ConditionError> {
        let tokens = lexer::tokenize(source)?;
        let expr = parser::parse(&tokens, source.chars().count())?;
        Ok(Self {
            source: source.to_owned(),
            expr,
        })
    }

    /// Evaluates the expression against `vars`.
    #[must_use]
    pub fn evaluate(&self, vars: &Variables) -> bool {
        eval::evaluate(&self.expr, vars)
    }

    /// Expression text as written.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parsed syntax tree.
    #[must_use]
    pub const fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests;
