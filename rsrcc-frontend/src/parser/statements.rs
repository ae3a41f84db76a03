//! Block and statement translation

use crate::parser::Translator;
use crate::symbols::{Symbol, SymbolKind};
use log::trace;
use rsrcc_codegen::abi::{self, CallingConvention};
use rsrcc_codegen::{AsmInst, AsmSink};
use rsrcc_common::{CompilerError, SourceLocation};

impl<'s, S: AsmSink> Translator<'s, S> {
    /// block := "{" { statement } "}"
    ///
    /// Opens a scope for the block's locals and releases their stack words
    /// when the closing brace is reached.
    pub(crate) fn translate_block(&mut self) -> Result<(), CompilerError> {
        self.nested(Self::translate_block_body)
    }

    fn translate_block_body(&mut self) -> Result<(), CompilerError> {
        let location = self.scanner.current_location();
        self.scanner.match_char('{')?;
        self.symbols.enter_scope();
        self.current_function(&location)?.block_locals.push(0);
        trace!("enter block at {location}, scope depth {}", self.symbols.depth());

        loop {
            match self.scanner.peek() {
                Some('}') => break,
                None => return Err(self.scanner.expected("'}'")),
                Some(_) => self.translate_statement()?,
            }
        }
        self.scanner.match_char('}')?;

        let declared = self.current_function(&location)?.block_locals.pop().unwrap_or(0);
        self.emit_all(abi::gen_dealloc(declared));
        if let Some(scope) = self.symbols.exit_scope() {
            let names: Vec<&str> = scope.symbols().iter().map(|s| s.name.as_str()).collect();
            trace!("leave block from {location}, released {declared} locals [{}]", names.join(", "));
        }
        Ok(())
    }

    fn translate_statement(&mut self) -> Result<(), CompilerError> {
        let location = self.scanner.current_location();
        if !self.scanner.at_name() {
            return Err(self.scanner.expected("statement"));
        }
        let word = self.scanner.get_name()?;
        match word.as_str() {
            "if" => self.translate_if(),
            "while" => self.translate_while(),
            "var" => self.translate_local_var(),
            "return" => self.translate_return(&location),
            "else" | "function" => Err(CompilerError::syntax_error(
                "statement",
                format!("'{}'", word),
                location,
            )),
            _ => self.translate_name_statement(&word, &location),
        }
    }

    /// if := "if" "(" expression ")" block [ "else" block ]
    fn translate_if(&mut self) -> Result<(), CompilerError> {
        self.translate_condition()?;
        let skip = self.new_label();
        self.jump_if_zero(&skip);
        self.translate_block()?;

        if self.scanner.accept_word("else")? {
            let end = self.new_label();
            self.jump(&end);
            self.post_label(&skip);
            self.translate_block()?;
            self.post_label(&end);
        } else {
            self.post_label(&skip);
        }
        Ok(())
    }

    /// while := "while" "(" expression ")" block
    fn translate_while(&mut self) -> Result<(), CompilerError> {
        let top = self.new_label();
        let exit = self.new_label();
        self.post_label(&top);
        self.translate_condition()?;
        self.jump_if_zero(&exit);
        self.translate_block()?;
        self.jump(&top);
        self.post_label(&exit);
        Ok(())
    }

    fn translate_condition(&mut self) -> Result<(), CompilerError> {
        self.scanner.match_char('(')?;
        self.translate_expression()?;
        self.scanner.match_char(')')
    }

    /// local := "var" NAME [ "=" expression ] ";"
    fn translate_local_var(&mut self) -> Result<(), CompilerError> {
        let location = self.scanner.current_location();
        let name = self.scanner.get_name()?;
        self.symbols
            .check_declarable(&name)
            .map_err(|e| e.at(location.clone()))?;

        let slot = self.current_function(&location)?.live_locals();
        let offset = CallingConvention::local_offset(slot);
        trace!("local {name} at {offset}(bp)");
        self.symbols
            .declare(Symbol::local(name, offset))
            .map_err(|e| e.at(location.clone()))?;
        if let Some(count) = self.current_function(&location)?.block_locals.last_mut() {
            *count += 1;
        }
        self.emit_all(abi::gen_alloc(1));

        if self.scanner.accept_char('=') {
            self.translate_expression()?;
            self.emit(AsmInst::Store(
                CallingConvention::PRIMARY,
                offset.into(),
                CallingConvention::FRAME_PTR,
            ));
        }
        self.scanner.match_char(';')
    }

    /// return := "return" [ expression ] ";"
    ///
    /// Releases the locals of every block open in the function, not just
    /// the innermost one.
    fn translate_return(&mut self, location: &SourceLocation) -> Result<(), CompilerError> {
        if self.scanner.peek() != Some(';') {
            self.translate_expression()?;
            self.emit(abi::gen_set_return_value());
        }
        self.scanner.match_char(';')?;

        let ctx = self.current_function(location)?;
        let code = ctx.frame.gen_return(ctx.live_locals());
        self.emit_all(code);
        Ok(())
    }

    /// assignment := NAME "=" expression ";"
    /// call-statement := NAME call ";"
    fn translate_name_statement(&mut self, name: &str, location: &SourceLocation) -> Result<(), CompilerError> {
        let symbol = self.lookup(name, location)?;
        if symbol.kind == SymbolKind::Function {
            self.translate_call(&symbol, location)?;
        } else {
            let (disp, base) = self.variable_operand(&symbol, location)?;
            self.scanner.match_char('=')?;
            self.translate_expression()?;
            self.emit(AsmInst::Store(CallingConvention::PRIMARY, disp, base));
        }
        self.scanner.match_char(';')
    }
}
