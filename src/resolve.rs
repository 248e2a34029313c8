//! Jump fixup.
//!
//! Every jump and `Return` is emitted behind two `NumBuild` slots. Fixup turns the
//! symbolic target into a self-relative distance, writes it into those slots as
//! four base-12 digits and leaves the jump reading `r0`, which is where the two
//! chained `NumBuild`s deposit the value at run time.

use tracing::debug;

use crate::opcode::BaseOp;
use crate::program::{Operand, Program, RADIX};

/// Number of digits spread over the two literal-load slots.
pub const DIGITS: usize = 4;
/// Largest magnitude two `NumBuild`s can produce.
pub const MAX_ENCODABLE: usize = 12 * 12 * 12 * 12 - 1;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FixupError {
    #[error("undefined label `{label}` referenced at instruction {index}")]
    UndefinedLabel { index: usize, label: String },
    #[error("{op} at instruction {index} is not preceded by two NumBuild slots")]
    MissingLiteralLoad { index: usize, op: &'static str },
    #[error("{op} at instruction {index} expects a single label operand")]
    ExpectedLabel { index: usize, op: &'static str },
    #[error("value {value} at instruction {index} does not fit in four base-12 digits")]
    DisplacementOverflow { index: usize, value: usize },
}

/// Splits `value` into base-12 digits, most significant first.
pub fn encode_digits(value: usize) -> Option<[i64; DIGITS]> {
    if value > MAX_ENCODABLE {
        return None;
    }
    let v = value as i64;
    Some([
        v / (RADIX * RADIX * RADIX) % RADIX,
        v / (RADIX * RADIX) % RADIX,
        v / RADIX % RADIX,
        v % RADIX,
    ])
}

/// Value left in `r0` by `NumBuild d0,d1` followed by `NumBuild d2,d3`.
pub fn decode_digits(digits: [i64; DIGITS]) -> i64 {
    let hi = digits[0] * RADIX + digits[1];
    let lo = digits[2] * RADIX + digits[3];
    hi * RADIX * RADIX + lo
}

/// Resolves every jump and return in `program`.
///
/// Runs once on freshly parsed programs; the label table is consumed.
pub fn resolve(mut program: Program) -> Result<Program, FixupError> {
    let len = program.len();
    for index in 0..len {
        let Some(op) = program.instructions[index].base() else {
            continue;
        };
        if op.is_jump() {
            let target = jump_target(&program, index, op)?;
            let d = target as i64 - index as i64 - 1;
            let resolved = match (op.is_backward(), d < 0) {
                (false, true) | (true, false) if d != 0 => op.flipped().unwrap_or(op),
                _ => op,
            };
            let magnitude = d.unsigned_abs() as usize;
            debug!(
                index,
                target,
                displacement = d,
                from = op.mnemonic(),
                to = resolved.mnemonic(),
                "fixup jump"
            );
            write_slots(&mut program, index, op, magnitude)?;
            let instr = &mut program.instructions[index];
            instr.opcode = resolved.into();
            instr.operands = vec![Operand::Register(0)];
        } else if op == BaseOp::Return {
            debug!(index, end = len, "fixup return");
            write_slots(&mut program, index, op, len)?;
        }
    }
    program.labels.clear();
    Ok(program)
}

fn jump_target(program: &Program, index: usize, op: BaseOp) -> Result<usize, FixupError> {
    check_slots(program, index, op)?;
    match program.instructions[index].operands.as_slice() {
        [Operand::Label(name)] => program.label(name).ok_or_else(|| FixupError::UndefinedLabel {
            index,
            label: name.clone(),
        }),
        _ => Err(FixupError::ExpectedLabel {
            index,
            op: op.mnemonic(),
        }),
    }
}

fn check_slots(program: &Program, index: usize, op: BaseOp) -> Result<(), FixupError> {
    let ok = index >= 2
        && program.instructions[index - 2].is(BaseOp::NumBuild)
        && program.instructions[index - 1].is(BaseOp::NumBuild);
    if ok {
        Ok(())
    } else {
        Err(FixupError::MissingLiteralLoad {
            index,
            op: op.mnemonic(),
        })
    }
}

fn write_slots(
    program: &mut Program,
    index: usize,
    op: BaseOp,
    value: usize,
) -> Result<(), FixupError> {
    check_slots(program, index, op)?;
    let digits =
        encode_digits(value).ok_or(FixupError::DisplacementOverflow { index, value })?;
    program.instructions[index - 2].operands =
        vec![Operand::Immediate(digits[0]), Operand::Immediate(digits[1])];
    program.instructions[index - 1].operands =
        vec![Operand::Immediate(digits[2]), Operand::Immediate(digits[3])];
    Ok(())
}
