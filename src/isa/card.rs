//! Card encoding.
//!
//! A finalized base instruction becomes three fields, each in `[0, 11]`, and each
//! field is printed through a 12-entry symbol table. Field 0 is the major opcode;
//! fields 1 and 2 are either a fixed sub-opcode or an operand value.
//!
//! | major | opcodes                                                            | field 1     | field 2   |
//! |-------|--------------------------------------------------------------------|-------------|-----------|
//! | 0-7   | Move NumBuild Add SubCond Mult FLess Store Load                    | operand 0   | operand 1 |
//! | 8     | Zero Add1 Sub1Cond Divide SetF SetNF FIsZero Halve Output           | sub-op      | operand 0 |
//! | 9     | JumpFwd JumpBwd JumpFwdNF JumpBwdNF                                | sub-op      | operand 0 |
//! | 10    | Return                                                             | 0           | 0         |

use serde::Serialize;

use crate::opcode::{BaseOp, Opcode};
use crate::program::{Instruction, Operand, Program, RADIX};

pub const FIELDS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Fixed(u8),
    Operand(usize),
}

pub type Template = [Field; FIELDS];

use Field::{Fixed, Operand as Arg};

pub fn template(op: BaseOp) -> Template {
    match op {
        BaseOp::Move => [Fixed(0), Arg(0), Arg(1)],
        BaseOp::NumBuild => [Fixed(1), Arg(0), Arg(1)],
        BaseOp::Add => [Fixed(2), Arg(0), Arg(1)],
        BaseOp::SubCond => [Fixed(3), Arg(0), Arg(1)],
        BaseOp::Mult => [Fixed(4), Arg(0), Arg(1)],
        BaseOp::FLess => [Fixed(5), Arg(0), Arg(1)],
        BaseOp::Store => [Fixed(6), Arg(0), Arg(1)],
        BaseOp::Load => [Fixed(7), Arg(0), Arg(1)],
        BaseOp::Zero => [Fixed(8), Fixed(0), Arg(0)],
        BaseOp::Add1 => [Fixed(8), Fixed(1), Arg(0)],
        BaseOp::Sub1Cond => [Fixed(8), Fixed(2), Arg(0)],
        BaseOp::Divide => [Fixed(8), Fixed(3), Arg(0)],
        BaseOp::SetF => [Fixed(8), Fixed(4), Arg(0)],
        BaseOp::SetNF => [Fixed(8), Fixed(5), Arg(0)],
        BaseOp::FIsZero => [Fixed(8), Fixed(6), Arg(0)],
        BaseOp::Halve => [Fixed(8), Fixed(7), Arg(0)],
        BaseOp::Output => [Fixed(8), Fixed(8), Arg(0)],
        BaseOp::JumpFwd => [Fixed(9), Fixed(0), Arg(0)],
        BaseOp::JumpBwd => [Fixed(9), Fixed(1), Arg(0)],
        BaseOp::JumpFwdNF => [Fixed(9), Fixed(2), Arg(0)],
        BaseOp::JumpBwdNF => [Fixed(9), Fixed(3), Arg(0)],
        BaseOp::Return => [Fixed(10), Fixed(0), Fixed(0)],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Card {
    pub fields: [u8; FIELDS],
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("instruction {index}: {mnemonic} has no card encoding")]
    NoTemplate { index: usize, mnemonic: &'static str },
    #[error("instruction {index}: operand {operand} is missing")]
    MissingOperand { index: usize, operand: usize },
    #[error("instruction {index}: operand `{found}` is not resolved")]
    Unresolved { index: usize, found: String },
    #[error("instruction {index}: field value {value} outside [0, 11]")]
    FieldOutOfRange { index: usize, value: i64 },
}

pub fn encode(index: usize, instr: &Instruction) -> Result<Card, EncodeError> {
    let op = match instr.opcode {
        Opcode::Base(op) => op,
        Opcode::Macro(m) => {
            return Err(EncodeError::NoTemplate {
                index,
                mnemonic: m.mnemonic(),
            })
        }
    };
    let mut fields = [0u8; FIELDS];
    for (slot, field) in fields.iter_mut().zip(template(op)) {
        let value = match field {
            Fixed(v) => v as i64,
            Arg(k) => match instr.operands.get(k) {
                Some(Operand::Register(r)) => *r as i64,
                Some(Operand::Immediate(v)) => *v,
                Some(Operand::Label(name)) => {
                    return Err(EncodeError::Unresolved {
                        index,
                        found: name.clone(),
                    })
                }
                None => return Err(EncodeError::MissingOperand { index, operand: k }),
            },
        };
        if !(0..RADIX).contains(&value) {
            return Err(EncodeError::FieldOutOfRange { index, value });
        }
        *slot = value as u8;
    }
    Ok(Card { fields })
}

/// Encodes a resolved program. Must run after fixup.
pub fn project(program: &Program) -> Result<Vec<Card>, EncodeError> {
    program
        .instructions
        .iter()
        .enumerate()
        .map(|(i, instr)| encode(i, instr))
        .collect()
}

/// The external 12-symbol alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: [String; 12],
}

const DIGIT_SYMBOLS: [&str; 12] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "A", "B"];

impl Default for SymbolTable {
    fn default() -> Self {
        Self {
            symbols: DIGIT_SYMBOLS.map(String::from),
        }
    }
}

impl SymbolTable {
    /// One symbol per char; `None` unless exactly 12 chars are given.
    pub fn from_chars(s: &str) -> Option<Self> {
        let v: Vec<String> = s.chars().map(String::from).collect();
        let symbols: [String; 12] = v.try_into().ok()?;
        Some(Self { symbols })
    }

    pub fn symbol(&self, value: u8) -> Option<&str> {
        self.symbols.get(value as usize).map(String::as_str)
    }

    /// `None` if any field has no symbol.
    pub fn render(&self, card: &Card) -> Option<Vec<&str>> {
        card.fields.iter().map(|&f| self.symbol(f)).collect()
    }
}
