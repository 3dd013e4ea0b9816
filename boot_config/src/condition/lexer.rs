//! Tokenizer for guard expressions.

use super::ConditionError;

#[derive(Debug, Clone, PartialEq)]
pub(super) enum TokenKind {
    /// Quoted literal, quotes removed, placeholders left untouched.
    Literal(String),
    /// Bare `${run:path}`; holds the path.
    Placeholder(String),
    /// Unquoted word: a keyword or `None`.
    Word(String),
    Eq,
    NotEq,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Token {
    pub(super) kind: TokenKind,
    pub(super) offset: usize,
}

pub(super) fn tokenize(source: &str) -> Result<Vec<Token>, ConditionError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;
    while let Some(&c) = chars.get(pos) {
        let start = pos;
        let kind = match c {
            ws if ws.is_whitespace() => {
                pos += 1;
                continue;
            }
            '\'' | '"' => {
                let (text, next) = quoted(&chars, pos, c)?;
                pos = next;
                TokenKind::Literal(text)
            }
            '$' if chars.get(pos + 1) == Some(&'{') => {
                let (path, next) = placeholder(&chars, pos)?;
                pos = next;
                TokenKind::Placeholder(path)
            }
            '=' if chars.get(pos + 1) == Some(&'=') => {
                pos += 2;
                TokenKind::Eq
            }
            '!' if chars.get(pos + 1) == Some(&'=') => {
                pos += 2;
                TokenKind::NotEq
            }
            first if is_word_char(first) => {
                let mut word = String::new();
                while let Some(&w) = chars.get(pos).filter(|w| is_word_char(**w)) {
                    word.push(w);
                    pos += 1;
                }
                TokenKind::Word(word)
            }
            other => return Err(ConditionError::new(pos, format!("unexpected character '{other}'"))),
        };
        tokens.push(Token {
            kind,
            offset: start,
        });
    }
    Ok(tokens)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// Reads a literal opened at `start`; returns its text and the next offset.
fn quoted(chars: &[char], start: usize, quote: char) -> Result<(String, usize), ConditionError> {
    let mut text = String::new();
    let mut pos = start + 1;
    loop {
        match chars.get(pos) {
            Some(&c) if c == quote => return Ok((text, pos + 1)),
            Some('\\') => {
                let escaped = chars
                    .get(pos + 1)
                    .ok_or_else(|| ConditionError::new(pos, "dangling escape in literal"))?;
                text.push(*escaped);
                pos += 2;
            }
            Some(&c) => {
                text.push(c);
                pos += 1;
            }
            None => return Err(ConditionError::new(start, "unterminated string literal")),
        }
    }
}

/// Reads `${run:path}` starting at `start`; returns the path and the next offset.
fn placeholder(chars: &[char], start: usize) -> Result<(String, usize), ConditionError> {
    let mut body = String::new();
    let mut pos = start + 2;
    loop {
        match chars.get(pos) {
            Some('}') => break,
            Some(&c) => {
                body.push(c);
                pos += 1;
            }
            None => return Err(ConditionError::new(start, "unterminated placeholder")),
        }
    }
    let path = body
        .strip_prefix("run:")
        .ok_or_else(|| ConditionError::new(start, format!("unsupported placeholder '${{{body}}}'")))?;
    Ok((path.trim().to_owned(), pos + 1))
}
