//! Instruction sinks and program framing
//!
//! The translator never formats text itself. It hands every instruction to
//! an [`AsmSink`]; tests collect them in a `Vec`, the driver streams them
//! straight to its output with a [`TextSink`].

use crate::asm::{AsmInst, Imm, Reg};
use std::io::{self, Write};

/// Program image origin used when nothing else is configured
pub const DEFAULT_ORIGIN: u32 = 4096;
/// Initial stack pointer used when nothing else is configured
pub const DEFAULT_STACK_TOP: i32 = 0xFFFC;

/// Target parameters that shape the program prologue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetConfig {
    pub origin: u32,
    /// Loaded with `la`, so it is a signed word
    pub stack_top: i32,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN,
            stack_top: DEFAULT_STACK_TOP,
        }
    }
}

/// Destination for generated instructions
pub trait AsmSink {
    fn emit(&mut self, inst: AsmInst);

    fn emit_all(&mut self, insts: Vec<AsmInst>) {
        for inst in insts {
            self.emit(inst);
        }
    }
}

impl AsmSink for Vec<AsmInst> {
    fn emit(&mut self, inst: AsmInst) {
        self.push(inst);
    }
}

/// Streams instructions as text, one line each.
///
/// Write failures are latched: the first one stops further output and is
/// reported by [`TextSink::finish`].
pub struct TextSink<W: Write> {
    out: W,
    error: Option<io::Error>,
    lines: usize,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            error: None,
            lines: 0,
        }
    }

    /// Number of lines written so far
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Flush the output and surface the first write error, if any
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> AsmSink for TextSink<W> {
    fn emit(&mut self, inst: AsmInst) {
        if self.error.is_some() {
            return;
        }
        match writeln!(self.out, "{}", format_line(&inst)) {
            Ok(()) => self.lines += 1,
            Err(err) => self.error = Some(err),
        }
    }
}

/// Render one instruction as a line of assembly.
///
/// Labels and directives start at column 0; instructions are indented.
pub fn format_line(inst: &AsmInst) -> String {
    match inst {
        AsmInst::Label(_)
        | AsmInst::Word(_)
        | AsmInst::Org(_)
        | AsmInst::End
        | AsmInst::Comment(_) => inst.to_string(),
        _ => format!("\t{}", inst),
    }
}

/// Render a whole instruction sequence
pub fn emit_program(insts: &[AsmInst]) -> String {
    let mut text = String::new();
    for inst in insts {
        text.push_str(&format_line(inst));
        text.push('\n');
    }
    text
}

/// Origin directive plus stack and base pointer initialization
pub fn prologue(config: &TargetConfig) -> Vec<AsmInst> {
    vec![
        AsmInst::Org(config.origin),
        AsmInst::La(Reg::Sp, Imm::Value(config.stack_top)),
        AsmInst::AddI(Reg::Bp, Reg::Sp, 0),
    ]
}

/// End-of-program marker
pub fn epilogue() -> Vec<AsmInst> {
    vec![AsmInst::End]
}
