//! RSRC Frame Protocol
//!
//! Calling convention, stack frame layout, and the instruction sequences
//! for call sites, function entry and return.
//!
//! The stack grows toward lower addresses and `SP` always addresses the next
//! free word. A frame looks like this once the callee is running:
//!
//! ```text
//!   BP + 8 + 4(N-1)   last argument
//!   ...
//!   BP + 8            first argument
//!   BP + 4            return address      (frame-control word)
//!   BP + 0            caller's BP         (frame-control word)  <- BP
//!   BP - 4            first local
//!   ...
//! ```

use crate::asm::{AsmInst, Imm, Reg};

/// RSRC calling convention
///
/// Register usage:
/// - r1 (PRIMARY): expression results and comparison status
/// - r2 (SECONDARY): left operand restored from the stack
/// - r3: branch target address
/// - r19: return value
/// - r29: link register written by `brl`
/// - r30, r31: base pointer and stack pointer
pub struct CallingConvention;

impl CallingConvention {
    pub const WORD_BYTES: i32 = 4;
    pub const WORD_BITS: u8 = 32;

    /// Words at the base of every frame: saved base pointer and return address
    pub const FRAME_CONTROL_WORDS: i32 = 2;
    pub const SAVED_BP_OFFSET: i32 = 0;
    pub const RETURN_ADDR_OFFSET: i32 = Self::WORD_BYTES;

    pub const PRIMARY: Reg = Reg::Primary;
    pub const SECONDARY: Reg = Reg::Secondary;
    pub const STATUS: Reg = Reg::Primary;
    pub const BRANCH_TARGET: Reg = Reg::Target;
    pub const RETURN_VALUE: Reg = Reg::Ret;
    pub const LINK: Reg = Reg::Link;
    pub const FRAME_PTR: Reg = Reg::Bp;
    pub const STACK_PTR: Reg = Reg::Sp;

    /// Base-pointer offset of the parameter at `index` (0-based)
    pub fn param_offset(index: usize) -> i32 {
        (Self::FRAME_CONTROL_WORDS + index as i32) * Self::WORD_BYTES
    }

    /// Base-pointer offset of the local living in stack slot `slot` (0-based,
    /// counted over every block live in the function)
    pub fn local_offset(slot: usize) -> i32 {
        -(slot as i32 + 1) * Self::WORD_BYTES
    }

    fn words(count: usize) -> i32 {
        count as i32 * Self::WORD_BYTES
    }
}

/// Store `reg` on top of the stack
pub fn gen_push(reg: Reg) -> Vec<AsmInst> {
    vec![
        AsmInst::Store(reg, Imm::Value(0), CallingConvention::STACK_PTR),
        AsmInst::AddI(CallingConvention::STACK_PTR, CallingConvention::STACK_PTR, -CallingConvention::WORD_BYTES),
    ]
}

/// Move the top of the stack into `reg`
pub fn gen_pop(reg: Reg) -> Vec<AsmInst> {
    vec![
        AsmInst::AddI(CallingConvention::STACK_PTR, CallingConvention::STACK_PTR, CallingConvention::WORD_BYTES),
        AsmInst::Load(reg, Imm::Value(0), CallingConvention::STACK_PTR),
    ]
}

/// Reserve `count` stack words
pub fn gen_alloc(count: usize) -> Vec<AsmInst> {
    if count == 0 {
        return Vec::new();
    }
    vec![AsmInst::AddI(
        CallingConvention::STACK_PTR,
        CallingConvention::STACK_PTR,
        -CallingConvention::words(count),
    )]
}

/// Release `count` stack words
pub fn gen_dealloc(count: usize) -> Vec<AsmInst> {
    if count == 0 {
        return Vec::new();
    }
    vec![AsmInst::AddI(
        CallingConvention::STACK_PTR,
        CallingConvention::STACK_PTR,
        CallingConvention::words(count),
    )]
}

/// Caller side of one call
///
/// The sequence is split in three because argument code is emitted by the
/// translator between [`CallSite::gen_setup`] and [`CallSite::gen_transfer`].
#[derive(Debug, Clone)]
pub struct CallSite {
    pub arg_count: usize,
}

impl CallSite {
    pub fn new(arg_count: usize) -> Self {
        Self { arg_count }
    }

    /// Reserve the argument words plus the return-address word
    pub fn gen_setup(&self) -> Vec<AsmInst> {
        gen_alloc(self.arg_count + 1)
    }

    /// Store PRIMARY into the slot of argument `index`.
    ///
    /// Only valid while the stack is exactly as [`CallSite::gen_setup`] left
    /// it, which holds between argument expressions.
    pub fn gen_store_arg(&self, index: usize) -> AsmInst {
        // SP here is the address the callee's BP will take once the caller's
        // BP is pushed, so the slot is exactly the parameter offset.
        AsmInst::Store(
            CallingConvention::PRIMARY,
            Imm::Value(CallingConvention::param_offset(index)),
            CallingConvention::STACK_PTR,
        )
    }

    /// Push the caller's BP, point BP at it and branch-and-link to `label`
    pub fn gen_transfer(&self, label: &str) -> Vec<AsmInst> {
        let mut code = gen_push(CallingConvention::FRAME_PTR);
        code.push(AsmInst::AddI(
            CallingConvention::FRAME_PTR,
            CallingConvention::STACK_PTR,
            CallingConvention::WORD_BYTES,
        ));
        code.push(AsmInst::La(CallingConvention::BRANCH_TARGET, Imm::Label(label.to_string())));
        code.push(AsmInst::Brl(CallingConvention::LINK, CallingConvention::BRANCH_TARGET));
        code
    }

    /// Restore the caller's BP, release the frame and fetch the result
    pub fn gen_cleanup(&self) -> Vec<AsmInst> {
        let mut code = vec![AsmInst::Load(
            CallingConvention::FRAME_PTR,
            Imm::Value(CallingConvention::SAVED_BP_OFFSET),
            CallingConvention::FRAME_PTR,
        )];
        code.extend(gen_dealloc(self.arg_count + CallingConvention::FRAME_CONTROL_WORDS as usize));
        code.push(AsmInst::Add(
            CallingConvention::PRIMARY,
            CallingConvention::RETURN_VALUE,
            Reg::Zero,
        ));
        code
    }
}

/// Callee side of the protocol
#[derive(Debug, Clone)]
pub struct Frame {
    /// Entry label of the function
    pub label: String,
}

impl Frame {
    pub fn new(label: String) -> Self {
        Self { label }
    }

    /// Post the entry label and save the return address into its
    /// frame-control word
    pub fn gen_prologue(&self) -> Vec<AsmInst> {
        vec![
            AsmInst::Label(self.label.clone()),
            AsmInst::Store(
                CallingConvention::LINK,
                Imm::Value(CallingConvention::RETURN_ADDR_OFFSET),
                CallingConvention::FRAME_PTR,
            ),
        ]
    }

    /// Release `live_locals` words and branch to the saved return address
    pub fn gen_return(&self, live_locals: usize) -> Vec<AsmInst> {
        let mut code = gen_dealloc(live_locals);
        code.push(AsmInst::Load(
            CallingConvention::BRANCH_TARGET,
            Imm::Value(CallingConvention::RETURN_ADDR_OFFSET),
            CallingConvention::FRAME_PTR,
        ));
        code.push(AsmInst::Br(CallingConvention::BRANCH_TARGET));
        code
    }
}

/// Move PRIMARY into the return-value register
pub fn gen_set_return_value() -> AsmInst {
    AsmInst::Add(CallingConvention::RETURN_VALUE, CallingConvention::PRIMARY, Reg::Zero)
}
