//! Tolerant JSON reader for boot fragments.
//!
//! Accepts standard JSON plus the relaxations found in hand-written
//! fragments: `//` and `/* */` comments, trailing commas in arrays and
//! objects, and `{{ … }}` as an alternate spelling of an object literal.
//! Object members are returned in source order with duplicates preserved.

use std::fmt;

use serde_json::Number;

use super::node::{Entry, Item, Node};

/// Syntax failure with its location in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// One-based line number.
    pub line: usize,
    /// One-based column number, counted in characters.
    pub column: usize,
    /// Description of what was expected.
    pub message: String,
}

impl ParseError {
    /// Renders the location as `line L, column C`.
    #[must_use]
    pub fn location(&self) -> String {
        format!("line {}, column {}", self.line, self.column)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.location())
    }
}

impl std::error::Error for ParseError {}

/// Parses `text` into an unresolved [`Node`] tree.
///
/// # Errors
///
/// Returns a [`ParseError`] when the text is not a single well-formed value.
///
/// # Examples
///
/// ```
/// use boot_config::document::{Entry, Node, parse_node};
///
/// let node = parse_node("{ /* c */ \"a\": 1, }").expect("valid fragment");
/// let Node::Object(entries) = node else { panic!("object expected") };
/// assert!(matches!(entries.first(), Some(Entry::Field(key, _)) if key == "a"));
/// ```
pub fn parse_node(text: &str) -> Result<Node, ParseError> {
    let mut reader = Reader::new(text);
    reader.skip_trivia()?;
    if reader.peek().is_none() {
        return Err(reader.error("document is empty"));
    }
    let node = reader.value()?;
    reader.skip_trivia()?;
    if reader.peek().is_some() {
        return Err(reader.error("unexpected content after the top-level value"));
    }
    Ok(node)
}

struct Reader {
    chars: Vec<char>,
    pos: usize,
}

impl Reader {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        self.error_at(self.pos, message)
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> ParseError {
        let mut line = 1;
        let mut column = 1;
        for c in self.chars.iter().take(offset) {
            if *c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        ParseError {
            line,
            column,
            message: message.into(),
        }
    }

    fn expect(&mut self, wanted: char) -> Result<(), ParseError> {
        match self.peek() {
            Some(c) if c == wanted => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{wanted}' but found '{c}'"))),
            None => Err(self.error(format!("expected '{wanted}' but reached end of input"))),
        }
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match (self.peek(), self.peek_next()) {
                (Some(c), _) if c.is_whitespace() || c == '\u{feff}' => self.pos += 1,
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => self.block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    fn block_comment(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        self.pos += 2;
        loop {
            match (self.peek(), self.peek_next()) {
                (Some('*'), Some('/')) => {
                    self.pos += 2;
                    return Ok(());
                }
                (Some(_), _) => self.pos += 1,
                (None, _) => return Err(self.error_at(start, "unterminated block comment")),
            }
        }
    }

    fn value(&mut self) -> Result<Node, ParseError> {
        match self.peek() {
            Some('{') if self.peek_next() == Some('{') => {
                self.pos += 2;
                let node = self.object_members()?;
                self.skip_trivia()?;
                self.expect('}')?;
                Ok(node)
            }
            Some('{') => {
                self.pos += 1;
                self.object_members()
            }
            Some('[') => {
                self.pos += 1;
                self.array_items()
            }
            Some('"') => Ok(Node::String(self.string()?)),
            Some(c) if c == '-' || c.is_ascii_digit() => self.number(),
            Some(c) if c.is_ascii_alphabetic() => self.literal(),
            Some(c) => Err(self.error(format!("unexpected character '{c}'"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    /// Reads members after an opening brace, consuming the closing brace.
    fn object_members(&mut self) -> Result<Node, ParseError> {
        let mut entries = Vec::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                Some('}') => {
                    self.pos += 1;
                    return Ok(Node::Object(entries));
                }
                Some('"') => {}
                Some(c) => return Err(self.error(format!("expected a quoted key but found '{c}'"))),
                None => return Err(self.error("unterminated object")),
            }
            let key = self.string()?;
            self.skip_trivia()?;
            self.expect(':')?;
            self.skip_trivia()?;
            let value = self.value()?;
            entries.push(Entry::Field(key, value));
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => self.pos += 1,
                Some('}') => {}
                Some(c) => return Err(self.error(format!("expected ',' or '}}' but found '{c}'"))),
                None => return Err(self.error("unterminated object")),
            }
        }
    }

    /// Reads elements after an opening bracket, consuming the closing bracket.
    fn array_items(&mut self) -> Result<Node, ParseError> {
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                Some(']') => {
                    self.pos += 1;
                    return Ok(Node::Array(items));
                }
                None => return Err(self.error("unterminated array")),
                Some(_) => {}
            }
            items.push(Item::Value(self.value()?));
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(']') => {}
                Some(c) => return Err(self.error(format!("expected ',' or ']' but found '{c}'"))),
                None => return Err(self.error("unterminated array")),
            }
        }
    }

    fn string(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        self.expect('"')?;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => out.push(self.escape()?),
                Some('\n') => return Err(self.error_at(start, "newline inside string literal")),
                Some(c) => out.push(c),
                None => return Err(self.error_at(start, "unterminated string literal")),
            }
        }
    }

    fn escape(&mut self) -> Result<char, ParseError> {
        match self.bump() {
            Some('"') => Ok('"'),
            Some('\\') => Ok('\\'),
            Some('/') => Ok('/'),
            Some('b') => Ok('\u{8}'),
            Some('f') => Ok('\u{c}'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('t') => Ok('\t'),
            Some('u') => self.unicode_escape(),
            Some(c) => Err(self.error(format!("invalid escape sequence '\\{c}'"))),
            None => Err(self.error("unterminated escape sequence")),
        }
    }

    fn unicode_escape(&mut self) -> Result<char, ParseError> {
        let high = self.hex4()?;
        if !(0xD800..0xDC00).contains(&high) {
            return char::from_u32(high).ok_or_else(|| self.error("invalid unicode escape"));
        }
        if self.peek() != Some('\\') || self.peek_next() != Some('u') {
            return Err(self.error("unpaired surrogate in unicode escape"));
        }
        self.pos += 2;
        let low = self.hex4()?;
        if !(0xDC00..0xE000).contains(&low) {
            return Err(self.error("invalid low surrogate in unicode escape"));
        }
        let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
        char::from_u32(combined).ok_or_else(|| self.error("invalid unicode escape"))
    }

    fn hex4(&mut self) -> Result<u32, ParseError> {
        let mut code = 0;
        for _ in 0..4 {
            let digit = self
                .bump()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error("expected four hexadecimal digits"))?;
            code = code * 16 + digit;
        }
        Ok(code)
    }

    fn number(&mut self) -> Result<Node, ParseError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E') {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text: String = self.chars.iter().skip(start).take(self.pos - start).collect();
        text.parse::<Number>()
            .map(Node::Number)
            .map_err(|_| self.error_at(start, format!("invalid number '{text}'")))
    }

    fn literal(&mut self) -> Result<Node, ParseError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric()) {
            self.pos += 1;
        }
        let word: String = self.chars.iter().skip(start).take(self.pos - start).collect();
        match word.as_str() {
            "true" => Ok(Node::Bool(true)),
            "false" => Ok(Node::Bool(false)),
            "null" => Ok(Node::Null),
            _ => Err(self.error_at(start, format!("unknown literal '{word}'"))),
        }
    }
}
