//! Minimal RSRC simulator for executing translated programs in tests

#![allow(dead_code)]

use rsrcc_codegen::emit::DEFAULT_STACK_TOP;
use rsrcc_codegen::{AsmInst, Imm, Reg, Shift};
use rsrcc_frontend::Frontend;
use std::collections::HashMap;

/// Data words get addresses far away from the stack
const DATA_BASE: i32 = 0x0010_0000;
const STEP_LIMIT: usize = 1_000_000;

pub struct Machine {
    program: Vec<AsmInst>,
    labels: HashMap<String, i32>,
    regs: [i32; 32],
    memory: HashMap<i32, i32>,
    pc: usize,
    pub steps: usize,
}

impl Machine {
    pub fn new(program: Vec<AsmInst>) -> Self {
        let mut labels = HashMap::new();
        for (index, inst) in program.iter().enumerate() {
            match inst {
                AsmInst::Label(label) => {
                    assert!(labels.insert(label.clone(), index as i32).is_none(), "label {label} posted twice");
                }
                AsmInst::Word(label) => {
                    let address = DATA_BASE + 4 * index as i32;
                    assert!(labels.insert(label.clone(), address).is_none(), "label {label} posted twice");
                }
                _ => {}
            }
        }

        Self {
            program,
            labels,
            regs: [0; 32],
            memory: HashMap::new(),
            pc: 0,
            steps: 0,
        }
    }

    pub fn reg(&self, reg: Reg) -> i32 {
        match reg {
            Reg::Zero => 0,
            other => self.regs[other.number() as usize],
        }
    }

    fn set(&mut self, reg: Reg, value: i32) {
        if reg != Reg::Zero {
            self.regs[reg.number() as usize] = value;
        }
    }

    fn imm(&self, imm: &Imm) -> i32 {
        match imm {
            Imm::Value(v) => *v,
            Imm::Label(label) => *self
                .labels
                .get(label)
                .unwrap_or_else(|| panic!("undefined label {label}")),
        }
    }

    fn shift(&self, shift: Shift) -> u32 {
        match shift {
            Shift::Reg(reg) => (self.reg(reg) as u32) & 31,
            Shift::Count(count) => u32::from(count) & 31,
        }
    }

    fn load(&self, address: i32) -> i32 {
        self.memory.get(&address).copied().unwrap_or(0)
    }

    /// Value of the data word bound to `label`
    pub fn word(&self, label: &str) -> i32 {
        self.load(self.imm(&Imm::Label(label.to_string())))
    }

    /// Run until `stop`; returns PRIMARY at that point
    pub fn run(&mut self) -> i32 {
        loop {
            assert!(self.steps < STEP_LIMIT, "step limit exceeded");
            self.steps += 1;

            let inst = self
                .program
                .get(self.pc)
                .cloned()
                .unwrap_or_else(|| panic!("pc {} ran off the program", self.pc));
            self.pc += 1;

            match inst {
                AsmInst::Add(d, s, t) => self.set(d, self.reg(s).wrapping_add(self.reg(t))),
                AsmInst::AddI(d, s, imm) => self.set(d, self.reg(s).wrapping_add(imm)),
                AsmInst::Sub(d, s, t) => self.set(d, self.reg(s).wrapping_sub(self.reg(t))),
                AsmInst::Neg(d, s) => self.set(d, self.reg(s).wrapping_neg()),
                AsmInst::Mul(d, s, t) => self.set(d, self.reg(s).wrapping_mul(self.reg(t))),
                AsmInst::Div(d, s, t) => self.set(d, self.reg(s).wrapping_div(self.reg(t))),
                AsmInst::Or(d, s, t) => self.set(d, self.reg(s) | self.reg(t)),
                AsmInst::And(d, s, t) => self.set(d, self.reg(s) & self.reg(t)),
                AsmInst::Not(d, s) => self.set(d, !self.reg(s)),
                AsmInst::Lor(d, s, t) => self.set(d, (self.reg(s) != 0 || self.reg(t) != 0) as i32),
                AsmInst::Land(d, s, t) => self.set(d, (self.reg(s) != 0 && self.reg(t) != 0) as i32),
                AsmInst::Lnot(d, s) => self.set(d, (self.reg(s) == 0) as i32),
                AsmInst::Shr(d, s, n) => self.set(d, ((self.reg(s) as u32) >> self.shift(n)) as i32),
                AsmInst::Shra(d, s, n) => self.set(d, self.reg(s) >> self.shift(n)),
                AsmInst::Shl(d, s, n) => self.set(d, ((self.reg(s) as u32) << self.shift(n)) as i32),
                AsmInst::Load(d, disp, base) => {
                    let address = self.imm(&disp).wrapping_add(self.reg(base));
                    self.set(d, self.load(address));
                }
                AsmInst::Store(s, disp, base) => {
                    let address = self.imm(&disp).wrapping_add(self.reg(base));
                    self.memory.insert(address, self.reg(s));
                }
                AsmInst::La(d, imm) => self.set(d, self.imm(&imm)),
                AsmInst::Br(target) => self.pc = self.reg(target) as usize,
                AsmInst::Brzr(target, cond) => {
                    if self.reg(cond) == 0 {
                        self.pc = self.reg(target) as usize;
                    }
                }
                AsmInst::Brnz(target, cond) => {
                    if self.reg(cond) != 0 {
                        self.pc = self.reg(target) as usize;
                    }
                }
                AsmInst::Brl(link, target) => {
                    let destination = self.reg(target) as usize;
                    self.set(link, self.pc as i32);
                    self.pc = destination;
                }
                AsmInst::Stop | AsmInst::End => return self.reg(Reg::Primary),
                AsmInst::Org(_) | AsmInst::Word(_) | AsmInst::Label(_) | AsmInst::Comment(_) => {}
            }
        }
    }
}

/// Compile `source` with the default target and run it; returns the
/// machine after `stop` together with `main`'s result
pub fn execute(source: &str) -> (Machine, i32) {
    let program = Frontend::compile_to_instructions(source)
        .unwrap_or_else(|e| panic!("compilation failed: {e}\n{source}"));
    let mut machine = Machine::new(program);
    let result = machine.run();
    (machine, result)
}

/// Result of `main`, asserting the stack is balanced afterwards
pub fn run_main(source: &str) -> i32 {
    let (machine, result) = execute(source);
    assert_eq!(
        machine.reg(Reg::Sp),
        DEFAULT_STACK_TOP,
        "stack pointer not restored after running:\n{source}"
    );
    result
}
