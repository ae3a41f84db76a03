//! RSRC Assembly Instruction Definitions
//!
//! This module defines the instruction set and register model for the RSRC
//! target: a 32-bit word machine with 32 general purpose registers.

use std::fmt;

/// Registers the translator uses.
///
/// The RSRC has 32 general purpose registers; only these roles are ever
/// named in generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg {
    Zero,       // r0: reads as zero in address computations
    Primary,    // r1: expression results and comparison status
    Secondary,  // r2: the spilled left operand
    Target,     // r3: branch target address
    Ret,        // r19: function return value
    Link,       // r29: return address written by brl
    Bp,         // r30: base pointer of the active frame
    Sp,         // r31: stack pointer, addresses the next free word
}

impl Reg {
    /// Hardware register number
    pub fn number(self) -> u8 {
        match self {
            Reg::Zero => 0,
            Reg::Primary => 1,
            Reg::Secondary => 2,
            Reg::Target => 3,
            Reg::Ret => 19,
            Reg::Link => 29,
            Reg::Bp => 30,
            Reg::Sp => 31,
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.number())
    }
}

/// An immediate that is either a number or a label resolved by the assembler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Imm {
    Value(i32),
    Label(String),
}

impl fmt::Display for Imm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Imm::Value(v) => write!(f, "{}", v),
            Imm::Label(l) => write!(f, "{}", l),
        }
    }
}

impl From<i32> for Imm {
    fn from(value: i32) -> Self {
        Imm::Value(value)
    }
}

/// Shift amount: a register or a constant count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    Reg(Reg),
    Count(u8),
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shift::Reg(r) => write!(f, "{}", r),
            Shift::Count(c) => write!(f, "{}", c),
        }
    }
}

/// RSRC Assembly Instructions
#[derive(Debug, Clone, PartialEq)]
pub enum AsmInst {
    // Arithmetic Instructions
    Add(Reg, Reg, Reg),           // rd = rs + rt
    AddI(Reg, Reg, i32),          // rd = rs + imm
    Sub(Reg, Reg, Reg),           // rd = rs - rt
    Neg(Reg, Reg),                // rd = -rs
    Mul(Reg, Reg, Reg),           // rd = rs * rt
    Div(Reg, Reg, Reg),           // rd = rs / rt

    // Logical Instructions
    Or(Reg, Reg, Reg),            // rd = rs | rt
    And(Reg, Reg, Reg),           // rd = rs & rt
    Not(Reg, Reg),                // rd = ~rs
    Lor(Reg, Reg, Reg),           // rd = rs || rt
    Land(Reg, Reg, Reg),          // rd = rs && rt
    Lnot(Reg, Reg),               // rd = (rs == 0) ? 1 : 0
    Shr(Reg, Reg, Shift),         // rd = rs >> n (logical)
    Shra(Reg, Reg, Shift),        // rd = rs >> n (sign extending)
    Shl(Reg, Reg, Shift),         // rd = rs << n

    // Memory Instructions
    Load(Reg, Imm, Reg),          // rd = memory[imm + base]
    Store(Reg, Imm, Reg),         // memory[imm + base] = rs
    La(Reg, Imm),                 // rd = imm

    // Control Flow Instructions
    Br(Reg),                      // goto target
    Brzr(Reg, Reg),               // goto target if cond == 0
    Brnz(Reg, Reg),               // goto target if cond != 0
    Brl(Reg, Reg),                // link = pc; goto target
    Stop,

    // Assembly Pseudo-Instructions
    Org(u32),                     // Origin of the program image
    Word(String),                 // One labelled data word
    Label(String),                // Label for jumps/calls
    Comment(String),              // Assembly comment
    End,                          // End of program
}

impl fmt::Display for AsmInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Arithmetic
            AsmInst::Add(rd, rs, rt) => write!(f, "add {}, {}, {}", rd, rs, rt),
            AsmInst::AddI(rd, rs, imm) => write!(f, "addi {}, {}, {}", rd, rs, imm),
            AsmInst::Sub(rd, rs, rt) => write!(f, "sub {}, {}, {}", rd, rs, rt),
            AsmInst::Neg(rd, rs) => write!(f, "neg {}, {}", rd, rs),
            AsmInst::Mul(rd, rs, rt) => write!(f, "mul {}, {}, {}", rd, rs, rt),
            AsmInst::Div(rd, rs, rt) => write!(f, "div {}, {}, {}", rd, rs, rt),

            // Logical
            AsmInst::Or(rd, rs, rt) => write!(f, "or {}, {}, {}", rd, rs, rt),
            AsmInst::And(rd, rs, rt) => write!(f, "and {}, {}, {}", rd, rs, rt),
            AsmInst::Not(rd, rs) => write!(f, "not {}, {}", rd, rs),
            AsmInst::Lor(rd, rs, rt) => write!(f, "lor {}, {}, {}", rd, rs, rt),
            AsmInst::Land(rd, rs, rt) => write!(f, "land {}, {}, {}", rd, rs, rt),
            AsmInst::Lnot(rd, rs) => write!(f, "lnot {}, {}", rd, rs),
            AsmInst::Shr(rd, rs, n) => write!(f, "shr {}, {}, {}", rd, rs, n),
            AsmInst::Shra(rd, rs, n) => write!(f, "shra {}, {}, {}", rd, rs, n),
            AsmInst::Shl(rd, rs, n) => write!(f, "shl {}, {}, {}", rd, rs, n),

            // Memory
            AsmInst::Load(rd, disp, base) => write!(f, "ld {}, {}({})", rd, disp, base),
            AsmInst::Store(rs, disp, base) => write!(f, "st {}, {}({})", rs, disp, base),
            AsmInst::La(rd, imm) => write!(f, "la {}, {}", rd, imm),

            // Control Flow
            AsmInst::Br(target) => write!(f, "br {}", target),
            AsmInst::Brzr(target, cond) => write!(f, "brzr {}, {}", target, cond),
            AsmInst::Brnz(target, cond) => write!(f, "brnz {}, {}", target, cond),
            AsmInst::Brl(link, target) => write!(f, "brl {}, {}", link, target),
            AsmInst::Stop => write!(f, "stop"),

            // Pseudo
            AsmInst::Org(addr) => write!(f, ".org {}", addr),
            AsmInst::Word(label) => write!(f, "{}:\t.dw 1", label),
            AsmInst::Label(label) => write!(f, "{}:", label),
            AsmInst::Comment(text) => write!(f, "; {}", text),
            AsmInst::End => write!(f, ".end"),
        }
    }
}
