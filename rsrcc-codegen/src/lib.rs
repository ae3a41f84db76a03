//! RSRC Compiler - Code Generation Backend
//! 
//! This crate holds everything that knows about the RSRC target:
//! 
//! - Assembly instruction and register definitions
//! - The frame protocol (call sites, function entry, return)
//! - Instruction sinks and program prologue/epilogue

pub mod asm;
pub mod abi;
pub mod emit;

pub use asm::{AsmInst, Imm, Reg, Shift};
pub use abi::{CallSite, CallingConvention, Frame};
pub use emit::{emit_program, AsmSink, TargetConfig, TextSink};
