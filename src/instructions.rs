use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::opcode::{BaseOp, MacroOp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    Reg,
    Imm,
    /// A label before fixup, `r0` after.
    Target,
}

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpClass: u8 {
const JUMP = 1 << 0;
const BACKWARD = 1 << 1;
const IF_NOT_FLAG = 1 << 2; // only taken when the flag is clear
const RETURN = 1 << 3;
const WRITES_FLAG = 1 << 4;
const CHAINS = 1 << 5; // next instruction may continue this one's result
}
}

#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub op: BaseOp,
    pub mnemonic: &'static str,
    pub operands: &'static [OperandKind],
    pub class: OpClass,
}

#[derive(Debug, Clone, Copy)]
pub struct MacroDesc {
    pub op: MacroOp,
    pub mnemonic: &'static str,
    pub operands: &'static [OperandKind],
}

use OperandKind::{Imm, Reg, Target};

const fn d(
    op: BaseOp,
    mnemonic: &'static str,
    operands: &'static [OperandKind],
    class: OpClass,
) -> InstrDesc {
    InstrDesc { op, mnemonic, operands, class }
}

pub const TABLE: &[InstrDesc] = &[
    d(BaseOp::Move, "Move", &[Reg, Reg], OpClass::empty()),
    d(BaseOp::Zero, "Zero", &[Reg], OpClass::empty()),
    d(BaseOp::NumBuild, "NumBuild", &[Imm, Imm], OpClass::CHAINS),
    d(BaseOp::Add, "Add", &[Reg, Reg], OpClass::empty()),
    d(BaseOp::Add1, "Add1", &[Reg], OpClass::empty()),
    d(BaseOp::SubCond, "SubCond", &[Reg, Reg], OpClass::WRITES_FLAG),
    d(BaseOp::Sub1Cond, "Sub1Cond", &[Reg], OpClass::WRITES_FLAG),
    d(BaseOp::Mult, "Mult", &[Reg, Reg], OpClass::empty()),
    d(BaseOp::Divide, "Divide", &[Reg], OpClass::WRITES_FLAG),
    d(BaseOp::SetF, "SetF", &[Reg], OpClass::empty()),
    d(BaseOp::SetNF, "SetNF", &[Reg], OpClass::empty()),
    d(
        BaseOp::FIsZero,
        "FIsZero",
        &[Reg],
        OpClass::WRITES_FLAG.union(OpClass::CHAINS),
    ),
    d(
        BaseOp::FLess,
        "FLess",
        &[Reg, Reg],
        OpClass::WRITES_FLAG.union(OpClass::CHAINS),
    ),
    d(BaseOp::Halve, "Halve", &[Reg], OpClass::WRITES_FLAG),
    d(BaseOp::JumpFwd, "JumpFwd", &[Target], OpClass::JUMP),
    d(
        BaseOp::JumpBwd,
        "JumpBwd",
        &[Target],
        OpClass::JUMP.union(OpClass::BACKWARD),
    ),
    d(
        BaseOp::JumpFwdNF,
        "JumpFwdNF",
        &[Target],
        OpClass::JUMP.union(OpClass::IF_NOT_FLAG),
    ),
    d(
        BaseOp::JumpBwdNF,
        "JumpBwdNF",
        &[Target],
        OpClass::JUMP
            .union(OpClass::BACKWARD)
            .union(OpClass::IF_NOT_FLAG),
    ),
    d(BaseOp::Store, "Store", &[Reg, Reg], OpClass::empty()),
    d(BaseOp::Load, "Load", &[Reg, Reg], OpClass::empty()),
    d(BaseOp::Output, "Output", &[Reg], OpClass::empty()),
    d(BaseOp::Return, "Return", &[], OpClass::RETURN),
];

pub const MACRO_TABLE: &[MacroDesc] = &[
    MacroDesc { op: MacroOp::AddImm, mnemonic: "ADD_IMM_MACRO", operands: &[Reg, Imm] },
    MacroDesc { op: MacroOp::Add, mnemonic: "ADD_MACRO", operands: &[Reg, Reg] },
    MacroDesc { op: MacroOp::NumBuild, mnemonic: "NUMBUILD_MACRO", operands: &[Imm] },
    MacroDesc { op: MacroOp::LoadBytewise, mnemonic: "LOADBYTEWISE_MACRO", operands: &[Reg, Reg] },
    MacroDesc { op: MacroOp::StoreBytewise, mnemonic: "STOREBYTEWISE_MACRO", operands: &[Reg, Reg] },
    MacroDesc { op: MacroOp::Gt, mnemonic: "GT_MACRO", operands: &[Reg, Reg, Reg] },
    MacroDesc { op: MacroOp::Eq, mnemonic: "EQ_MACRO", operands: &[Reg, Reg, Reg] },
    MacroDesc { op: MacroOp::Neq, mnemonic: "NEQ_MACRO", operands: &[Reg, Reg, Reg] },
    MacroDesc { op: MacroOp::Lt, mnemonic: "LT_MACRO", operands: &[Reg, Reg, Reg] },
    MacroDesc { op: MacroOp::Div, mnemonic: "DIV_MACRO", operands: &[Reg, Reg] },
    MacroDesc { op: MacroOp::Rem, mnemonic: "REM_MACRO", operands: &[Reg, Reg] },
    MacroDesc { op: MacroOp::RetPseudo, mnemonic: "RET_PSEUDO", operands: &[] },
];

pub fn desc_for(op: BaseOp) -> &'static InstrDesc {
    // TABLE is declared in BaseOp order
    &TABLE[op as usize]
}

pub fn macro_desc_for(op: MacroOp) -> &'static MacroDesc {
    &MACRO_TABLE[op as usize]
}
