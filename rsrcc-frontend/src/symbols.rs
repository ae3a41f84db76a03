//! Scoped symbol table
//!
//! Scopes form a stack with the global scope at the bottom. The only
//! operations are declare, lookup, enter and exit; symbols are never
//! modified once declared.

use rsrcc_codegen::Reg;
use rsrcc_common::{CompilerError, SourceLocation};
use std::collections::HashMap;
use thiserror::Error;

/// Reserved words of the source language
pub const KEYWORDS: [&str; 6] = ["var", "function", "if", "else", "while", "return"];

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    GlobalVar,
    LocalVar,
    Function,
}

/// Where a symbol lives at run time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    /// A word at `offset` from `base`
    Frame { offset: i32, base: Reg },
    /// A static word or code address
    Label(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub storage: Storage,
    /// Only set for functions
    pub param_count: Option<usize>,
}

impl Symbol {
    pub fn global(name: String, label: String) -> Self {
        Self {
            name,
            kind: SymbolKind::GlobalVar,
            storage: Storage::Label(label),
            param_count: None,
        }
    }

    /// A parameter or block-local variable addressed from the base pointer
    pub fn local(name: String, offset: i32) -> Self {
        Self {
            name,
            kind: SymbolKind::LocalVar,
            storage: Storage::Frame { offset, base: Reg::Bp },
            param_count: None,
        }
    }

    pub fn function(name: String, label: String, param_count: usize) -> Self {
        Self {
            name,
            kind: SymbolKind::Function,
            storage: Storage::Label(label),
            param_count: Some(param_count),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("variable shadows keyword: {0}")]
    ShadowsKeyword(String),

    #[error("symbol not found: {0}")]
    NotFound(String),
}

impl SymbolError {
    /// Attach the source location the failing name was read at
    pub fn at(self, location: SourceLocation) -> CompilerError {
        match self {
            SymbolError::DuplicateSymbol(name) => CompilerError::DuplicateSymbol { location, name },
            SymbolError::ShadowsKeyword(name) => CompilerError::ShadowsKeyword { location, name },
            SymbolError::NotFound(name) => CompilerError::UndeclaredIdentifier { location, name },
        }
    }
}

/// One level of the scope stack, in declaration order
#[derive(Debug, Clone, Default)]
pub struct Scope {
    symbols: Vec<Symbol>,
    index: HashMap<String, usize>,
}

impl Scope {
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.index.get(name).map(|&i| &self.symbols[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Symbols in declaration order
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    fn insert(&mut self, symbol: Symbol) -> &Symbol {
        let slot = self.symbols.len();
        self.index.insert(symbol.name.clone(), slot);
        self.symbols.push(symbol);
        &self.symbols[slot]
    }
}

#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    /// Create a table holding only the (empty) global scope
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    /// Number of scopes on the stack, the global scope included
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Pop the innermost scope. The global scope is never popped.
    pub fn exit_scope(&mut self) -> Option<Scope> {
        if self.scopes.len() > 1 {
            self.scopes.pop()
        } else {
            None
        }
    }

    /// Check that `name` could be declared in the innermost scope
    pub fn check_declarable(&self, name: &str) -> Result<(), SymbolError> {
        if self.scopes.last().is_some_and(|scope| scope.contains(name)) {
            return Err(SymbolError::DuplicateSymbol(name.to_string()));
        }
        if is_keyword(name) {
            return Err(SymbolError::ShadowsKeyword(name.to_string()));
        }
        Ok(())
    }

    /// Add a symbol to the innermost scope
    pub fn declare(&mut self, symbol: Symbol) -> Result<&Symbol, SymbolError> {
        self.check_declarable(&symbol.name)?;
        let scope = self
            .scopes
            .last_mut()
            .ok_or_else(|| SymbolError::NotFound(symbol.name.clone()))?;
        Ok(scope.insert(symbol))
    }

    /// Look up a symbol by name, innermost scope first
    pub fn lookup(&self, name: &str) -> Result<&Symbol, SymbolError> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .ok_or_else(|| SymbolError::NotFound(name.to_string()))
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
