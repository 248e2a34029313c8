use std::fmt;

use serde::{Deserialize, Serialize};

use crate::instructions::{desc_for, macro_desc_for, OpClass, MACRO_TABLE, TABLE};

/// Opcodes of the card-encodable instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseOp {
    Move,
    Zero,
    NumBuild,
    Add,
    Add1,
    SubCond,
    Sub1Cond,
    Mult,
    Divide,
    SetF,
    SetNF,
    FIsZero,
    FLess,
    Halve,
    JumpFwd,
    JumpBwd,
    JumpFwdNF,
    JumpBwdNF,
    Store,
    Load,
    Output,
    Return,
}

/// Simulation-only opcodes. They execute directly and have no card encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MacroOp {
    AddImm,
    Add,
    NumBuild,
    LoadBytewise,
    StoreBytewise,
    Gt,
    Eq,
    Neq,
    Lt,
    Div,
    Rem,
    RetPseudo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    Base(BaseOp),
    Macro(MacroOp),
}

impl BaseOp {
    pub fn mnemonic(self) -> &'static str {
        desc_for(self).mnemonic
    }

    pub fn class(self) -> OpClass {
        desc_for(self).class
    }

    pub fn is_jump(self) -> bool {
        self.class().contains(OpClass::JUMP)
    }

    pub fn is_backward(self) -> bool {
        self.class().contains(OpClass::BACKWARD)
    }

    /// The jump with the opposite direction and the same flag condition.
    pub fn flipped(self) -> Option<BaseOp> {
        match self {
            BaseOp::JumpFwd => Some(BaseOp::JumpBwd),
            BaseOp::JumpBwd => Some(BaseOp::JumpFwd),
            BaseOp::JumpFwdNF => Some(BaseOp::JumpBwdNF),
            BaseOp::JumpBwdNF => Some(BaseOp::JumpFwdNF),
            _ => None,
        }
    }
}

impl MacroOp {
    pub fn mnemonic(self) -> &'static str {
        macro_desc_for(self).mnemonic
    }
}

impl Opcode {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Base(op) => op.mnemonic(),
            Opcode::Macro(op) => op.mnemonic(),
        }
    }

    pub fn from_mnemonic(name: &str) -> Option<Opcode> {
        if let Some(d) = TABLE.iter().find(|d| d.mnemonic == name) {
            return Some(Opcode::Base(d.op));
        }
        MACRO_TABLE
            .iter()
            .find(|d| d.mnemonic == name)
            .map(|d| Opcode::Macro(d.op))
    }

    pub fn base(self) -> Option<BaseOp> {
        match self {
            Opcode::Base(op) => Some(op),
            Opcode::Macro(_) => None,
        }
    }
}

impl From<BaseOp> for Opcode {
    fn from(op: BaseOp) -> Self {
        Opcode::Base(op)
    }
}

impl From<MacroOp> for Opcode {
    fn from(op: MacroOp) -> Self {
        Opcode::Macro(op)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
