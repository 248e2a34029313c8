use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::opcode::{BaseOp, MacroOp, Opcode};

/// Registers and base-opcode immediates are in `0..RADIX`.
pub const RADIX: i64 = 12;
pub const NUM_REGS: usize = 12;

/// Register and memory cell contents. Wide enough that products of two
/// 32-bit patterns stay exact.
pub type Word = i128;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    Register(u8),
    Immediate(i64),
    /// Jump target; gone after fixup.
    Label(String),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Register(r) => write!(f, "r{r}"),
            Operand::Immediate(v) => write!(f, "#{v}"),
            Operand::Label(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
}

impl Instruction {
    pub fn new(opcode: impl Into<Opcode>, operands: Vec<Operand>) -> Self {
        Self {
            opcode: opcode.into(),
            operands,
        }
    }

    pub fn base(&self) -> Option<BaseOp> {
        self.opcode.base()
    }

    pub fn is(&self, op: BaseOp) -> bool {
        self.opcode == Opcode::Base(op)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgramError {
    #[error("duplicate label: {0}")]
    DuplicateLabel(String),
}

/// Instructions in program order plus the label table built while parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub instructions: Vec<Instruction>,
    pub labels: HashMap<String, usize>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instr: Instruction) -> &mut Self {
        self.instructions.push(instr);
        self
    }

    /// Binds `name` to the index of the next instruction pushed.
    pub fn bind_label(&mut self, name: impl Into<String>) -> Result<(), ProgramError> {
        let name = name.into();
        if self.labels.contains_key(&name) {
            return Err(ProgramError::DuplicateLabel(name));
        }
        self.labels.insert(name, self.instructions.len());
        Ok(())
    }

    pub fn label(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }
}

// Shorthands for building programs in code and tests.

pub fn r(index: u8) -> Operand {
    Operand::Register(index)
}

pub fn imm(value: i64) -> Operand {
    Operand::Immediate(value)
}

pub fn label(name: &str) -> Operand {
    Operand::Label(name.to_string())
}

pub fn op(opcode: BaseOp, operands: &[Operand]) -> Instruction {
    Instruction::new(opcode, operands.to_vec())
}

pub fn mac(opcode: MacroOp, operands: &[Operand]) -> Instruction {
    Instruction::new(opcode, operands.to_vec())
}
