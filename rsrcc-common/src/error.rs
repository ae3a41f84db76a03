//! Error handling for the RSRC compiler
//!
//! Every error is fatal: the first one raised aborts translation and is
//! handed back to the driver, which decides how to report it.

use crate::source_loc::SourceLocation;
use serde::Serialize;
use thiserror::Error;

/// Main compiler error type that encompasses all phases of compilation
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum CompilerError {
    #[error("Syntax error at {location}: expected {expected}, found {found}")]
    SyntaxError {
        location: SourceLocation,
        expected: String,
        found: String,
    },

    #[error("Duplicate symbol at {location}: {name}")]
    DuplicateSymbol {
        location: SourceLocation,
        name: String,
    },

    #[error("Identifier shadows keyword at {location}: {name}")]
    ShadowsKeyword {
        location: SourceLocation,
        name: String,
    },

    #[error("Undeclared identifier at {location}: {name}")]
    UndeclaredIdentifier {
        location: SourceLocation,
        name: String,
    },

    #[error("Unknown symbol kind at {location}: {name} ({detail})")]
    UnknownSymbolKind {
        location: SourceLocation,
        name: String,
        detail: String,
    },

    #[error("Argument count mismatch at {location}: {name} takes {expected}, got {found}")]
    ArgumentCountMismatch {
        location: SourceLocation,
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("IO error: {message}")]
    IoError { message: String },
}

impl CompilerError {
    /// Create a syntax error
    pub fn syntax_error(expected: impl Into<String>, found: impl Into<String>, location: SourceLocation) -> Self {
        CompilerError::SyntaxError {
            location,
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an undeclared identifier error
    pub fn undeclared(name: &str, location: SourceLocation) -> Self {
        CompilerError::UndeclaredIdentifier {
            location,
            name: name.to_string(),
        }
    }

    /// Location the error was raised at, if it has one
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            CompilerError::SyntaxError { location, .. }
            | CompilerError::DuplicateSymbol { location, .. }
            | CompilerError::ShadowsKeyword { location, .. }
            | CompilerError::UndeclaredIdentifier { location, .. }
            | CompilerError::UnknownSymbolKind { location, .. }
            | CompilerError::ArgumentCountMismatch { location, .. } => Some(location),
            CompilerError::IoError { .. } => None,
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for CompilerError {
    fn from(err: std::io::Error) -> Self {
        CompilerError::IoError {
            message: err.to_string(),
        }
    }
}
