//! Expression translation by precedence climbing
//!
//! Levels, lowest first: logical-or, logical-and, unary-not, relational,
//! additive, multiplicative, unary-sign, primary. Each level leaves its
//! value in PRIMARY.

use crate::lexer::Operator;
use crate::parser::Translator;
use crate::symbols::SymbolKind;
use rsrcc_codegen::abi::CallingConvention;
use rsrcc_codegen::{AsmInst, AsmSink, Imm, Shift};
use rsrcc_common::CompilerError;

const OR_OPS: [Operator; 2] = [Operator::Pipe, Operator::PipePipe];
const AND_OPS: [Operator; 2] = [Operator::Ampersand, Operator::AmpersandAmpersand];
const NOT_OPS: [Operator; 2] = [Operator::Tilde, Operator::Bang];
const REL_OPS: [Operator; 6] = [
    Operator::Less,
    Operator::Greater,
    Operator::LessEqual,
    Operator::GreaterEqual,
    Operator::EqualEqual,
    Operator::BangEqual,
];
const ADD_OPS: [Operator; 2] = [Operator::Plus, Operator::Minus];
const MUL_OPS: [Operator; 4] = [
    Operator::Star,
    Operator::Slash,
    Operator::LeftShift,
    Operator::RightShift,
];

const P: rsrcc_codegen::Reg = CallingConvention::PRIMARY;
const S: rsrcc_codegen::Reg = CallingConvention::SECONDARY;

impl<'s, Sink: AsmSink> Translator<'s, Sink> {
    /// Translate an expression, leaving its value in PRIMARY
    pub fn translate_expression(&mut self) -> Result<(), CompilerError> {
        self.nested(Self::translate_logical_or)
    }

    /// Save the left operand, translate the right one with `operand`, and
    /// bring the left one back into SECONDARY
    fn translate_right_operand(
        &mut self,
        operand: fn(&mut Self) -> Result<(), CompilerError>,
    ) -> Result<(), CompilerError> {
        self.push_primary();
        operand(self)?;
        self.pop_secondary();
        Ok(())
    }

    fn translate_logical_or(&mut self) -> Result<(), CompilerError> {
        self.translate_logical_and()?;
        while let Some(op) = self.scanner.accept_operator(&OR_OPS) {
            self.translate_right_operand(Self::translate_logical_and)?;
            match op {
                Operator::Pipe => self.emit(AsmInst::Or(P, P, S)),
                _ => self.emit(AsmInst::Lor(P, P, S)),
            }
        }
        Ok(())
    }

    fn translate_logical_and(&mut self) -> Result<(), CompilerError> {
        self.translate_unary_not()?;
        while let Some(op) = self.scanner.accept_operator(&AND_OPS) {
            self.translate_right_operand(Self::translate_unary_not)?;
            match op {
                Operator::Ampersand => self.emit(AsmInst::And(P, P, S)),
                _ => self.emit(AsmInst::Land(P, P, S)),
            }
        }
        Ok(())
    }

    fn translate_unary_not(&mut self) -> Result<(), CompilerError> {
        match self.scanner.accept_operator(&NOT_OPS) {
            Some(op) => {
                self.nested(Self::translate_unary_not)?;
                match op {
                    Operator::Tilde => self.emit(AsmInst::Not(P, P)),
                    _ => self.emit(AsmInst::Lnot(P, P)),
                }
                Ok(())
            }
            None => self.translate_relation(),
        }
    }

    fn translate_relation(&mut self) -> Result<(), CompilerError> {
        self.translate_additive()?;
        while let Some(op) = self.scanner.accept_operator(&REL_OPS) {
            self.translate_right_operand(Self::translate_additive)?;
            self.emit_comparison(op);
        }
        Ok(())
    }

    /// Leave a truth value for `SECONDARY op PRIMARY` in the status
    /// register: nonzero when true, zero when false.
    fn emit_comparison(&mut self, op: Operator) {
        let status = CallingConvention::STATUS;
        let sign = Shift::Count(CallingConvention::WORD_BITS - 1);

        // left - right; `!=` needs nothing more
        self.emit(AsmInst::Sub(status, S, P));
        match op {
            Operator::Less | Operator::GreaterEqual => {
                self.emit(AsmInst::Shra(status, status, sign));
                if op == Operator::GreaterEqual {
                    self.emit(AsmInst::Lnot(status, status));
                }
            }
            Operator::Greater | Operator::LessEqual => {
                // -(l - r) is negative exactly when l > r
                self.emit(AsmInst::Neg(status, status));
                self.emit(AsmInst::Shra(status, status, sign));
                if op == Operator::LessEqual {
                    self.emit(AsmInst::Lnot(status, status));
                }
            }
            Operator::EqualEqual => self.emit(AsmInst::Lnot(status, status)),
            _ => {}
        }
    }

    fn translate_additive(&mut self) -> Result<(), CompilerError> {
        self.translate_multiplicative()?;
        while let Some(op) = self.scanner.accept_operator(&ADD_OPS) {
            self.translate_right_operand(Self::translate_multiplicative)?;
            // The right operand is in PRIMARY, so operand order is SECONDARY, PRIMARY.
            match op {
                Operator::Plus => self.emit(AsmInst::Add(P, S, P)),
                _ => self.emit(AsmInst::Sub(P, S, P)),
            }
        }
        Ok(())
    }

    fn translate_multiplicative(&mut self) -> Result<(), CompilerError> {
        self.translate_unary_sign()?;
        while let Some(op) = self.scanner.accept_operator(&MUL_OPS) {
            self.translate_right_operand(Self::translate_unary_sign)?;
            match op {
                Operator::Star => self.emit(AsmInst::Mul(P, S, P)),
                Operator::Slash => self.emit(AsmInst::Div(P, S, P)),
                Operator::LeftShift => self.emit(AsmInst::Shl(P, S, Shift::Reg(P))),
                _ => self.emit(AsmInst::Shr(P, S, Shift::Reg(P))),
            }
        }
        Ok(())
    }

    fn translate_unary_sign(&mut self) -> Result<(), CompilerError> {
        match self.scanner.accept_operator(&ADD_OPS) {
            Some(op) => {
                self.nested(Self::translate_unary_sign)?;
                if op == Operator::Minus {
                    self.emit(AsmInst::Neg(P, P));
                }
                Ok(())
            }
            None => self.translate_primary(),
        }
    }

    /// primary := "(" expression ")" | NAME | NAME call | NUMERAL
    fn translate_primary(&mut self) -> Result<(), CompilerError> {
        if self.scanner.accept_char('(') {
            self.translate_expression()?;
            return self.scanner.match_char(')');
        }

        if self.scanner.at_name() {
            let location = self.scanner.current_location();
            let name = self.scanner.get_name()?;
            let symbol = self.lookup(&name, &location)?;
            if symbol.kind == SymbolKind::Function {
                return self.translate_call(&symbol, &location);
            }
            let (disp, base) = self.variable_operand(&symbol, &location)?;
            self.emit(AsmInst::Load(P, disp, base));
            return Ok(());
        }

        if self.scanner.at_numeral() {
            let value = self.scanner.get_num()?;
            self.emit(AsmInst::La(P, Imm::Value(value)));
            return Ok(());
        }

        Err(self.scanner.expected("expression"))
    }
}
