//! Program, global and function translation, and call sites

use crate::parser::{FunctionContext, Translator};
use crate::symbols::{Storage, Symbol, SymbolKind};
use log::debug;
use rsrcc_codegen::abi::{CallSite, CallingConvention, Frame};
use rsrcc_codegen::{AsmInst, AsmSink, Imm, Reg};
use rsrcc_common::{CompilerError, SourceLocation, FUNCTION_PREFIX, GLOBAL_PREFIX};

/// Fixed entry label of the program's `main` function
pub const MAIN_LABEL: &str = "main";

impl<'s, S: AsmSink> Translator<'s, S> {
    /// program := { "var" global } { "function" function } EOF
    pub fn translate_program(&mut self) -> Result<(), CompilerError> {
        while self.scanner.accept_word("var")? {
            self.translate_global_var()?;
        }

        self.emit_entry_sequence();

        while self.scanner.accept_word("function")? {
            self.translate_function()?;
        }

        if !self.scanner.at_eof() {
            return Err(self.scanner.expected("'function'"));
        }

        self.check_main()
    }

    /// global := NAME [ "=" expression ] ";"
    fn translate_global_var(&mut self) -> Result<(), CompilerError> {
        let location = self.scanner.current_location();
        let name = self.scanner.get_name()?;
        self.symbols
            .check_declarable(&name)
            .map_err(|e| e.at(location.clone()))?;

        let label = self.labels.new_label_with_prefix(GLOBAL_PREFIX);
        debug!("global {name} stored at {label}");

        // The data word sits in the instruction stream, so execution hops
        // over it.
        let resume = self.new_label();
        self.jump(&resume);
        self.emit(AsmInst::Word(label.clone()));
        self.post_label(&resume);

        self.symbols
            .declare(Symbol::global(name, label.clone()))
            .map_err(|e| e.at(location))?;

        if self.scanner.accept_char('=') {
            self.translate_expression()?;
            self.emit(AsmInst::Store(CallingConvention::PRIMARY, Imm::Label(label), Reg::Zero));
        }
        self.scanner.match_char(';')
    }

    /// Call `main` with an empty argument list and halt when it returns
    fn emit_entry_sequence(&mut self) {
        self.emit(AsmInst::Comment("program entry".to_string()));
        let site = CallSite::new(0);
        self.emit_all(site.gen_setup());
        self.emit_all(site.gen_transfer(MAIN_LABEL));
        self.emit_all(site.gen_cleanup());
        self.emit(AsmInst::Stop);
    }

    /// function := NAME "(" [ NAME { "," NAME } ] ")" block
    fn translate_function(&mut self) -> Result<(), CompilerError> {
        let location = self.scanner.current_location();
        let name = self.scanner.get_name()?;
        self.symbols
            .check_declarable(&name)
            .map_err(|e| e.at(location.clone()))?;

        let params = self.translate_parameter_list()?;

        let label = if name == MAIN_LABEL {
            MAIN_LABEL.to_string()
        } else {
            self.labels.new_label_with_prefix(FUNCTION_PREFIX)
        };
        debug!("function {name}({}) at {label}", params.len());

        // Declared before the body so the function can call itself.
        self.symbols
            .declare(Symbol::function(name.clone(), label.clone(), params.len()))
            .map_err(|e| e.at(location))?;

        self.symbols.enter_scope();
        for (index, (param, param_location)) in params.iter().enumerate() {
            let offset = CallingConvention::param_offset(index);
            self.symbols
                .declare(Symbol::local(param.clone(), offset))
                .map_err(|e| e.at(param_location.clone()))?;
        }

        let frame = Frame::new(label);
        self.emit(AsmInst::Comment(format!("function {}", name)));
        self.emit_all(frame.gen_prologue());
        self.function = Some(FunctionContext::new(frame));

        self.translate_block()?;

        // Falling off the end of the body returns; the block has already
        // released its locals.
        if let Some(ctx) = self.function.take() {
            let code = ctx.frame.gen_return(ctx.live_locals());
            self.emit_all(code);
        }
        self.symbols.exit_scope();
        Ok(())
    }

    fn translate_parameter_list(&mut self) -> Result<Vec<(String, SourceLocation)>, CompilerError> {
        self.scanner.match_char('(')?;
        let mut params = Vec::new();
        if self.scanner.peek() != Some(')') {
            loop {
                let location = self.scanner.current_location();
                params.push((self.scanner.get_name()?, location));
                if !self.scanner.accept_char(',') {
                    break;
                }
            }
        }
        self.scanner.match_char(')')?;
        Ok(params)
    }

    /// call := "(" [ expression { "," expression } ] ")"
    ///
    /// The callee name has already been read and resolved. Leaves the
    /// returned value in PRIMARY.
    pub(crate) fn translate_call(&mut self, callee: &Symbol, location: &SourceLocation) -> Result<(), CompilerError> {
        let (label, param_count) = match (callee.kind, &callee.storage, callee.param_count) {
            (SymbolKind::Function, Storage::Label(label), Some(count)) => (label.clone(), count),
            (kind, storage, _) => {
                return Err(CompilerError::UnknownSymbolKind {
                    location: location.clone(),
                    name: callee.name.clone(),
                    detail: format!("{:?} stored as {:?} called as a function", kind, storage),
                })
            }
        };

        self.scanner.match_char('(')?;
        let site = CallSite::new(param_count);
        self.emit_all(site.gen_setup());

        let mut found = 0;
        if self.scanner.peek() != Some(')') {
            loop {
                if found == param_count {
                    return Err(argument_mismatch(callee, param_count, found + 1, location));
                }
                self.translate_expression()?;
                self.emit(site.gen_store_arg(found));
                found += 1;
                if !self.scanner.accept_char(',') {
                    break;
                }
            }
        }
        self.scanner.match_char(')')?;
        if found != param_count {
            return Err(argument_mismatch(callee, param_count, found, location));
        }

        self.emit_all(site.gen_transfer(&label));
        self.emit_all(site.gen_cleanup());
        Ok(())
    }

    /// `main` must exist and take no parameters since the entry sequence
    /// calls it with none.
    fn check_main(&mut self) -> Result<(), CompilerError> {
        let location = self.scanner.current_location();
        let main = self.lookup(MAIN_LABEL, &location)?;
        match main.param_count {
            Some(0) => Ok(()),
            Some(count) => Err(argument_mismatch(&main, count, 0, &location)),
            None => Err(CompilerError::UndeclaredIdentifier {
                location,
                name: format!("function {}", MAIN_LABEL),
            }),
        }
    }
}

fn argument_mismatch(callee: &Symbol, expected: usize, found: usize, location: &SourceLocation) -> CompilerError {
    CompilerError::ArgumentCountMismatch {
        location: location.clone(),
        name: callee.name.clone(),
        expected,
        found,
    }
}
