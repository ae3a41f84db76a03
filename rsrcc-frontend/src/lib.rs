//! RSRC Compiler - Frontend
//!
//! This crate turns source text into RSRC instructions in a single pass:
//! - Lexer: character scanner handing out names, numerals and operators
//! - Symbols: the scope stack used for name resolution
//! - Parser: the syntax-directed translator that emits code as it parses

pub mod lexer;
pub mod parser;
pub mod symbols;

pub use lexer::{Operator, Scanner};
pub use parser::Translator;
pub use symbols::{Storage, Symbol, SymbolError, SymbolKind, SymbolTable};

use rsrcc_codegen::emit::{self, TargetConfig};
use rsrcc_codegen::{AsmInst, AsmSink};
use rsrcc_common::CompilerError;

/// High-level frontend interface
pub struct Frontend;

impl Frontend {
    /// Translate a whole program into `sink`, framed by the target
    /// prologue and epilogue.
    ///
    /// On error the instructions emitted so far stay in the sink and no
    /// epilogue is written.
    pub fn compile<S: AsmSink>(
        source: &str,
        filename: &str,
        config: &TargetConfig,
        sink: &mut S,
    ) -> Result<(), CompilerError> {
        sink.emit_all(emit::prologue(config));
        Self::translate(source, filename, sink)?;
        sink.emit_all(emit::epilogue());
        Ok(())
    }

    /// Translate a program without prologue or epilogue
    pub fn translate<S: AsmSink>(source: &str, filename: &str, sink: &mut S) -> Result<(), CompilerError> {
        let mut translator = Translator::new(Scanner::new(source, filename), sink);
        translator.translate_program()
    }

    /// Compile to a vector of instructions with the default target
    pub fn compile_to_instructions(source: &str) -> Result<Vec<AsmInst>, CompilerError> {
        let mut sink = Vec::new();
        Self::compile(source, "<input>", &TargetConfig::default(), &mut sink)?;
        Ok(sink)
    }

    /// Compile to assembly text with the default target
    pub fn compile_to_string(source: &str) -> Result<String, CompilerError> {
        let instructions = Self::compile_to_instructions(source)?;
        Ok(emit::emit_program(&instructions))
    }
}
