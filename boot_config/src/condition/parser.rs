//! Recursive-descent parser producing [`Expr`] trees.

use super::ConditionError;
use super::lexer::{Token, TokenKind};

/// A leaf of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// Quoted text; placeholders inside are rendered at evaluation.
    Literal(String),
    /// Bare `${run:path}`, evaluated to the variable's native value.
    Placeholder(String),
    /// The `None` keyword.
    None,
}

/// Binary comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `in` (substring test)
    In,
}

/// Parsed guard expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// `not expr`
    Not(Box<Expr>),
    /// `a and b and …`
    And(Vec<Expr>),
    /// `left op right`
    Compare {
        /// Operator.
        op: CompareOp,
        /// Left-hand operand.
        left: Operand,
        /// Right-hand operand.
        right: Operand,
    },
    /// A lone operand, tested for truthiness.
    Truthy(Operand),
}

pub(super) fn parse(tokens: &[Token], end: usize) -> Result<Expr, ConditionError> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        end,
    };
    if tokens.is_empty() {
        return Err(ConditionError::new(0, "empty condition"));
    }
    let expr = parser.conjunction()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(ConditionError::new(
            token.offset,
            format!("unexpected {}", describe(&token.kind)),
        )),
    }
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    end: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next_is_word(&self, word: &str) -> bool {
        matches!(self.peek(), Some(Token { kind: TokenKind::Word(w), .. }) if w == word)
    }

    fn conjunction(&mut self) -> Result<Expr, ConditionError> {
        let mut terms = vec![self.negation()?];
        while self.next_is_word("and") {
            self.pos += 1;
            terms.push(self.negation()?);
        }
        if terms.len() == 1 {
            if let Some(single) = terms.pop() {
                return Ok(single);
            }
        }
        Ok(Expr::And(terms))
    }

    fn negation(&mut self) -> Result<Expr, ConditionError> {
        if self.next_is_word("not") {
            self.pos += 1;
            return Ok(Expr::Not(Box::new(self.negation()?)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, ConditionError> {
        let left = self.operand()?;
        let op = match self.peek().map(|token| &token.kind) {
            Some(TokenKind::Eq) => CompareOp::Eq,
            Some(TokenKind::NotEq) => CompareOp::NotEq,
            Some(TokenKind::Word(w)) if w == "in" => CompareOp::In,
            _ => return Ok(Expr::Truthy(left)),
        };
        self.pos += 1;
        let right = self.operand()?;
        Ok(Expr::Compare { op, left, right })
    }

    fn operand(&mut self) -> Result<Operand, ConditionError> {
        let Some(token) = self.peek() else {
            return Err(ConditionError::new(self.end, "expected an operand"));
        };
        let offset = token.offset;
        let operand = match &token.kind {
            TokenKind::Literal(text) => Operand::Literal(text.clone()),
            TokenKind::Placeholder(path) => Operand::Placeholder(path.clone()),
            TokenKind::Word(word) => word_operand(word, offset)?,
            other => {
                return Err(ConditionError::new(
                    offset,
                    format!("expected an operand but found {}", describe(other)),
                ));
            }
        };
        self.pos += 1;
        Ok(operand)
    }
}

fn word_operand(word: &str, offset: usize) -> Result<Operand, ConditionError> {
    match word {
        "None" => Ok(Operand::None),
        "and" | "not" | "in" => Err(ConditionError::new(
            offset,
            format!("expected an operand but found keyword '{word}'"),
        )),
        "or" => Err(ConditionError::new(offset, "'or' is not supported")),
        other => Err(ConditionError::new(
            offset,
            format!("unknown word '{other}'; quote literal text"),
        )),
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Literal(text) => format!("literal '{text}'"),
        TokenKind::Placeholder(path) => format!("placeholder '${{run:{path}}}'"),
        TokenKind::Word(word) => format!("'{word}'"),
        TokenKind::Eq => "'=='".to_owned(),
        TokenKind::NotEq => "'!='".to_owned(),
    }
}
