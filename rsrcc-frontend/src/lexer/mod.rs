//! Character-level scanner
//!
//! The translator pulls tokens on demand: names, numerals and operators.
//! Every token routine leaves the scanner on the first non-blank character
//! after the token, so one character of lookahead is always meaningful.
//! Probing for a production that turns out not to match is undone with
//! [`Scanner::mark`] / [`Scanner::reset`].

pub mod operators;

pub use operators::Operator;

use rsrcc_common::{CompilerError, SourceLocation};

/// Largest numeral magnitude. It denotes the word `i32::MIN`, so that
/// `-2147483648` can be written.
pub const MAX_NUMERAL: u32 = 1 << 31;

/// Saved scanner position for bounded rewind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    position: usize,
    line: u32,
    column: u32,
}

/// Source scanner
pub struct Scanner {
    pub(crate) input: Vec<char>,
    pub(crate) position: usize,
    pub(crate) line: u32,
    pub(crate) column: u32,
    filename: String,
}

impl Scanner {
    /// Create a new scanner positioned at the first character of `input`
    pub fn new(input: &str, filename: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            filename: filename.to_string(),
        }
    }

    /// Get current character
    pub(crate) fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    pub(crate) fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    /// Advance to next character
    pub(crate) fn advance(&mut self) -> Option<char> {
        if let Some(ch) = self.current_char() {
            self.position += 1;
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            Some(ch)
        } else {
            None
        }
    }

    /// Get current location
    pub fn current_location(&self) -> SourceLocation {
        SourceLocation::new(&self.filename, self.line, self.column)
    }

    pub fn mark(&self) -> Mark {
        Mark {
            position: self.position,
            line: self.line,
            column: self.column,
        }
    }

    /// Rewind to a position taken earlier with [`Scanner::mark`]
    pub fn reset(&mut self, mark: Mark) {
        self.position = mark.position;
        self.line = mark.line;
        self.column = mark.column;
    }

    /// Skip whitespace and `//` line comments
    pub fn skip_white(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == '/' && self.peek_char(1) == Some('/') {
                while let Some(ch) = self.advance() {
                    if ch == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    /// Lookahead character after skipping blanks
    pub fn peek(&mut self) -> Option<char> {
        self.skip_white();
        self.current_char()
    }

    pub fn at_eof(&mut self) -> bool {
        self.peek().is_none()
    }

    /// Whether the lookahead can start a name
    pub fn at_name(&mut self) -> bool {
        self.peek().is_some_and(is_name_start)
    }

    /// Whether the lookahead can start a numeral
    pub fn at_numeral(&mut self) -> bool {
        self.peek().is_some_and(|ch| ch.is_ascii_digit())
    }

    /// Human-readable description of the lookahead for diagnostics
    pub fn describe_lookahead(&mut self) -> String {
        match self.peek() {
            Some(ch) => format!("'{}'", ch),
            None => "end of input".to_string(),
        }
    }

    /// Build a syntax error at the current position
    pub fn expected(&mut self, what: &str) -> CompilerError {
        let found = self.describe_lookahead();
        CompilerError::syntax_error(what, found, self.current_location())
    }

    /// Read an identifier or keyword
    pub fn get_name(&mut self) -> Result<String, CompilerError> {
        if !self.at_name() {
            return Err(self.expected("identifier"));
        }

        let mut name = String::new();
        while let Some(ch) = self.current_char() {
            if is_name_char(ch) {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        self.skip_white();
        Ok(name)
    }

    /// Read a decimal numeral of at most `MAX_NUMERAL`. The magnitude
    /// 2147483648 reads as the word `i32::MIN`, which negation leaves as is.
    pub fn get_num(&mut self) -> Result<i32, CompilerError> {
        if !self.at_numeral() {
            return Err(self.expected("numeral"));
        }

        let location = self.current_location();
        let mut digits = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        self.skip_white();

        match digits.parse::<u32>() {
            Ok(value) if value <= MAX_NUMERAL => Ok(value as i32),
            _ => Err(CompilerError::syntax_error(
                "numeral fitting in a 32-bit word",
                digits,
                location,
            )),
        }
    }

    /// Consume the literal character `expected` or fail
    pub fn match_char(&mut self, expected: char) -> Result<(), CompilerError> {
        if self.peek() == Some(expected) {
            self.advance();
            self.skip_white();
            Ok(())
        } else {
            Err(self.expected(&format!("'{}'", expected)))
        }
    }

    /// Consume `expected` if it is the lookahead
    pub fn accept_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            self.skip_white();
            true
        } else {
            false
        }
    }

    /// Consume the name `word` if it is next, leaving the scanner untouched
    /// otherwise
    pub fn accept_word(&mut self, word: &str) -> Result<bool, CompilerError> {
        if !self.at_name() {
            return Ok(false);
        }
        let mark = self.mark();
        if self.get_name()? == word {
            Ok(true)
        } else {
            self.reset(mark);
            Ok(false)
        }
    }
}

pub(crate) fn is_name_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

pub(crate) fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}
