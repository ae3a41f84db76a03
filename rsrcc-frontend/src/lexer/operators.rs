//! Operator scanning
//!
//! Operators are matched longest-first: characters are consumed while they
//! still form a prefix of some operator, then the scanner backs off to the
//! longest complete operator it saw.

use crate::lexer::Scanner;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Pipe,           // |
    PipePipe,       // ||
    Ampersand,      // &
    AmpersandAmpersand, // &&
    Tilde,          // ~
    Bang,           // !
    Less,           // <
    Greater,        // >
    LessEqual,      // <=
    GreaterEqual,   // >=
    EqualEqual,     // ==
    BangEqual,      // !=
    Plus,           // +
    Minus,          // -
    Star,           // *
    Slash,          // /
    LeftShift,      // <<
    RightShift,     // >>
}

const OPERATORS: [(&str, Operator); 18] = [
    ("|", Operator::Pipe),
    ("||", Operator::PipePipe),
    ("&", Operator::Ampersand),
    ("&&", Operator::AmpersandAmpersand),
    ("~", Operator::Tilde),
    ("!", Operator::Bang),
    ("<", Operator::Less),
    (">", Operator::Greater),
    ("<=", Operator::LessEqual),
    (">=", Operator::GreaterEqual),
    ("==", Operator::EqualEqual),
    ("!=", Operator::BangEqual),
    ("+", Operator::Plus),
    ("-", Operator::Minus),
    ("*", Operator::Star),
    ("/", Operator::Slash),
    ("<<", Operator::LeftShift),
    (">>", Operator::RightShift),
];

impl Operator {
    pub fn from_text(text: &str) -> Option<Operator> {
        OPERATORS
            .iter()
            .find(|(spelling, _)| *spelling == text)
            .map(|(_, op)| *op)
    }

    pub fn as_str(self) -> &'static str {
        OPERATORS
            .iter()
            .find(|(_, op)| *op == self)
            .map(|(spelling, _)| *spelling)
            .unwrap_or("?")
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn is_operator_prefix(text: &str) -> bool {
    OPERATORS.iter().any(|(spelling, _)| spelling.starts_with(text))
}

impl Scanner {
    /// Match the longest operator at the lookahead.
    ///
    /// Returns `None` and leaves the position unchanged (apart from skipped
    /// blanks) when no operator starts here.
    pub fn get_operator(&mut self) -> Option<Operator> {
        self.skip_white();
        let start = self.mark();

        let mut text = String::new();
        let mut longest = None;
        while let Some(ch) = self.current_char() {
            text.push(ch);
            if !is_operator_prefix(&text) {
                break;
            }
            self.advance();
            if let Some(op) = Operator::from_text(&text) {
                longest = Some((op, self.mark()));
            }
        }

        match longest {
            Some((op, end)) => {
                self.reset(end);
                self.skip_white();
                Some(op)
            }
            None => {
                self.reset(start);
                None
            }
        }
    }

    /// Take the next operator only if it belongs to `accepted`
    pub fn accept_operator(&mut self, accepted: &[Operator]) -> Option<Operator> {
        let mark = self.mark();
        match self.get_operator() {
            Some(op) if accepted.contains(&op) => Some(op),
            _ => {
                self.reset(mark);
                None
            }
        }
    }
}
