//! Syntax-directed translator
//!
//! A recursive descent parser that emits RSRC code while it parses. There is
//! no syntax tree: every production writes its instructions to the sink as
//! soon as it has recognized enough input to do so.
//!
//! Expression values travel through two registers. A production leaves its
//! value in PRIMARY; a binary operator saves the left value on the stack,
//! translates the right operand into PRIMARY, and restores the left value
//! into SECONDARY before combining them.

pub mod declarations;
pub mod statements;
pub mod expressions;

use crate::lexer::Scanner;
use crate::symbols::{Storage, Symbol, SymbolKind, SymbolTable};
use log::trace;
use rsrcc_codegen::abi::{self, CallingConvention, Frame};
use rsrcc_codegen::{AsmInst, AsmSink, Imm, Reg};
use rsrcc_common::{CompilerError, LabelGenerator, SourceLocation};

/// Deepest nesting of blocks and expressions accepted before translation
/// gives up instead of exhausting the stack
pub const MAX_NESTING_DEPTH: usize = 128;

/// Bookkeeping for the function currently being translated
#[derive(Debug)]
pub(crate) struct FunctionContext {
    pub(crate) frame: Frame,
    /// Locals declared so far in each block entered since the function
    /// boundary, outermost first
    pub(crate) block_locals: Vec<usize>,
}

impl FunctionContext {
    fn new(frame: Frame) -> Self {
        Self {
            frame,
            block_locals: Vec::new(),
        }
    }

    /// Stack words currently held by locals of this function
    pub(crate) fn live_locals(&self) -> usize {
        self.block_locals.iter().sum()
    }
}

/// All state of one compilation
pub struct Translator<'s, S: AsmSink> {
    pub(crate) scanner: Scanner,
    pub(crate) symbols: SymbolTable,
    pub(crate) labels: LabelGenerator,
    pub(crate) function: Option<FunctionContext>,
    /// Blocks and expressions currently open
    depth: usize,
    out: &'s mut S,
}

impl<'s, S: AsmSink> Translator<'s, S> {
    pub fn new(scanner: Scanner, out: &'s mut S) -> Self {
        Self {
            scanner,
            symbols: SymbolTable::new(),
            labels: LabelGenerator::new(),
            function: None,
            depth: 0,
            out,
        }
    }

    /// Run a recursive production one nesting level deeper
    pub(crate) fn nested<T>(
        &mut self,
        translate: impl FnOnce(&mut Self) -> Result<T, CompilerError>,
    ) -> Result<T, CompilerError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(CompilerError::syntax_error(
                format!("at most {} nested levels", MAX_NESTING_DEPTH),
                "nesting too deep",
                self.scanner.current_location(),
            ));
        }
        self.depth += 1;
        let result = translate(self);
        self.depth -= 1;
        result
    }

    pub(crate) fn emit(&mut self, inst: AsmInst) {
        self.out.emit(inst);
    }

    pub(crate) fn emit_all(&mut self, insts: Vec<AsmInst>) {
        self.out.emit_all(insts);
    }

    pub(crate) fn new_label(&mut self) -> String {
        let label = self.labels.new_label();
        trace!("allocated label {label}");
        label
    }

    pub(crate) fn post_label(&mut self, label: &str) {
        self.emit(AsmInst::Label(label.to_string()));
    }

    /// Branch to `label` if PRIMARY is zero
    pub(crate) fn jump_if_zero(&mut self, label: &str) {
        self.emit(AsmInst::La(CallingConvention::BRANCH_TARGET, Imm::Label(label.to_string())));
        self.emit(AsmInst::Brzr(CallingConvention::BRANCH_TARGET, CallingConvention::STATUS));
    }

    pub(crate) fn jump(&mut self, label: &str) {
        self.emit(AsmInst::La(CallingConvention::BRANCH_TARGET, Imm::Label(label.to_string())));
        self.emit(AsmInst::Br(CallingConvention::BRANCH_TARGET));
    }

    pub(crate) fn push_primary(&mut self) {
        self.emit_all(abi::gen_push(CallingConvention::PRIMARY));
    }

    pub(crate) fn pop_secondary(&mut self) {
        self.emit_all(abi::gen_pop(CallingConvention::SECONDARY));
    }

    pub(crate) fn lookup(&self, name: &str, location: &SourceLocation) -> Result<Symbol, CompilerError> {
        self.symbols
            .lookup(name)
            .cloned()
            .map_err(|e| e.at(location.clone()))
    }

    /// Memory operand of a variable symbol
    pub(crate) fn variable_operand(&self, symbol: &Symbol, location: &SourceLocation) -> Result<(Imm, Reg), CompilerError> {
        match (symbol.kind, &symbol.storage) {
            (SymbolKind::GlobalVar, Storage::Label(label)) => Ok((Imm::Label(label.clone()), Reg::Zero)),
            (SymbolKind::LocalVar, Storage::Frame { offset, base }) => Ok((Imm::Value(*offset), *base)),
            (SymbolKind::Function, _) => Err(CompilerError::syntax_error(
                "variable",
                format!("function '{}'", symbol.name),
                location.clone(),
            )),
            (kind, storage) => Err(CompilerError::UnknownSymbolKind {
                location: location.clone(),
                name: symbol.name.clone(),
                detail: format!("{:?} stored as {:?}", kind, storage),
            }),
        }
    }

    /// Innermost function being translated
    pub(crate) fn current_function(&mut self, location: &SourceLocation) -> Result<&mut FunctionContext, CompilerError> {
        self.function.as_mut().ok_or_else(|| {
            CompilerError::syntax_error("function declaration", "statement outside a function", location.clone())
        })
    }
}
