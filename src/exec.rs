use crate::instructions::{desc_for, macro_desc_for, OpClass};
use crate::machine::{Chain, Fault, Flow, Machine};
use crate::memory::Memory;
use crate::opcode::{BaseOp, MacroOp, Opcode};
use crate::program::{Instruction, Operand, Word, NUM_REGS, RADIX};

pub trait Executor {
    fn exec<M: Memory>(
        &self,
        m: &mut Machine,
        mem: &mut M,
        instr: &Instruction,
        len: usize,
    ) -> Result<Flow, Fault>;
}

/// Interprets base and macro instructions directly; macros are never lowered.
pub struct DirectExecutor;

impl Executor for DirectExecutor {
    fn exec<M: Memory>(
        &self,
        m: &mut Machine,
        mem: &mut M,
        instr: &Instruction,
        len: usize,
    ) -> Result<Flow, Fault> {
        match instr.opcode {
            Opcode::Base(op) => {
                arity(instr, desc_for(op).operands.len())?;
                exec_base(m, mem, op, &instr.operands, len)
            }
            Opcode::Macro(op) => {
                arity(instr, macro_desc_for(op).operands.len())?;
                exec_macro(m, mem, op, &instr.operands)
            }
        }
    }
}

fn arity(instr: &Instruction, expected: usize) -> Result<(), Fault> {
    if instr.operands.len() == expected {
        Ok(())
    } else {
        Err(Fault::OperandCount {
            expected,
            found: instr.operands.len(),
        })
    }
}

fn reg(ops: &[Operand], index: usize) -> Result<usize, Fault> {
    match &ops[index] {
        Operand::Register(r) if (*r as usize) < NUM_REGS => Ok(*r as usize),
        Operand::Register(r) => Err(Fault::RegisterOutOfRange(*r)),
        other => Err(Fault::ExpectedRegister {
            index,
            found: other.clone(),
        }),
    }
}

fn imm(ops: &[Operand], index: usize) -> Result<i64, Fault> {
    match &ops[index] {
        Operand::Immediate(v) => Ok(*v),
        other => Err(Fault::ExpectedImmediate {
            index,
            found: other.clone(),
        }),
    }
}

/// Immediate restricted to a single base-12 digit.
fn digit(ops: &[Operand], index: usize) -> Result<i64, Fault> {
    let v = imm(ops, index)?;
    if (0..RADIX).contains(&v) {
        Ok(v)
    } else {
        Err(Fault::ImmediateOutOfRange(v))
    }
}

fn distinct(op: BaseOp, a: usize, b: usize) -> Result<(), Fault> {
    if a == b {
        Err(Fault::SameRegister {
            op: op.mnemonic(),
            reg: a as u8,
        })
    } else {
        Ok(())
    }
}

fn checked(v: Option<Word>) -> Result<Word, Fault> {
    v.ok_or(Fault::Overflow)
}

fn load<M: Memory>(mem: &M, addr: Word) -> Result<Word, Fault> {
    mem.read(addr).ok_or(Fault::Uninitialized { addr })
}

/// `pc ± offset` must name an instruction; execution resumes one past it.
fn jump(m: &Machine, offset: Word, backward: bool, len: usize) -> Result<Flow, Fault> {
    let pc = m.pc as Word;
    let target = checked(if backward {
        pc.checked_sub(offset)
    } else {
        pc.checked_add(offset)
    })?;
    if (0..len as Word).contains(&target) {
        Ok(Flow::Jump(target as usize + 1))
    } else {
        Err(Fault::JumpOutOfBounds { target, len })
    }
}

fn exec_base<M: Memory>(
    m: &mut Machine,
    mem: &mut M,
    op: BaseOp,
    ops: &[Operand],
    len: usize,
) -> Result<Flow, Fault> {
    let class = op.class();
    match op {
        BaseOp::Move => {
            let (dst, src) = (reg(ops, 0)?, reg(ops, 1)?);
            distinct(op, dst, src)?;
            m.regs[dst] = m.regs[src];
        }
        BaseOp::Zero => {
            let dst = reg(ops, 0)?;
            m.regs[dst] = 0;
        }
        BaseOp::NumBuild => {
            let v = Word::from(digit(ops, 0)? * RADIX + digit(ops, 1)?);
            m.regs[0] = if m.chain == Chain::NumBuild {
                let shifted = checked(m.regs[0].checked_mul(Word::from(RADIX * RADIX)))?;
                checked(shifted.checked_add(v))?
            } else {
                v
            };
        }
        BaseOp::Add => {
            let (dst, src) = (reg(ops, 0)?, reg(ops, 1)?);
            m.regs[dst] = checked(m.regs[dst].checked_add(m.regs[src]))?;
        }
        BaseOp::Add1 => {
            let dst = reg(ops, 0)?;
            m.regs[dst] = checked(m.regs[dst].checked_add(1))?;
        }
        BaseOp::SubCond => {
            let (dst, src) = (reg(ops, 0)?, reg(ops, 1)?);
            distinct(op, dst, src)?;
            if m.regs[dst] >= m.regs[src] {
                m.regs[dst] = checked(m.regs[dst].checked_sub(m.regs[src]))?;
                m.flag = false;
            } else {
                m.flag = true;
            }
        }
        BaseOp::Sub1Cond => {
            let dst = reg(ops, 0)?;
            if m.regs[dst] > 0 {
                m.regs[dst] -= 1;
                m.flag = false;
            } else {
                m.flag = true;
            }
        }
        BaseOp::Mult => {
            let (dst, src) = (reg(ops, 0)?, reg(ops, 1)?);
            m.regs[dst] = checked(m.regs[dst].checked_mul(m.regs[src]))?;
        }
        BaseOp::Divide => {
            let dst = reg(ops, 0)?;
            let divisor = m.regs[0];
            if dst == 0 || dst == 6 || divisor == 0 {
                return Err(Fault::InvalidDivide {
                    dst: dst as u8,
                    divisor,
                });
            }
            let quot = checked(m.regs[dst].checked_div_euclid(divisor))?;
            let rem = checked(m.regs[dst].checked_rem_euclid(divisor))?;
            m.regs[dst] = rem;
            m.regs[6] = quot;
            m.flag = quot != 0;
        }
        BaseOp::SetF => {
            let dst = reg(ops, 0)?;
            m.regs[dst] = m.flag as Word;
        }
        BaseOp::SetNF => {
            let dst = reg(ops, 0)?;
            m.regs[dst] = !m.flag as Word;
        }
        BaseOp::FIsZero => {
            let src = reg(ops, 0)?;
            let b = m.regs[src] == 0;
            combine_flag(m, b);
        }
        BaseOp::FLess => {
            let (a, b) = (reg(ops, 0)?, reg(ops, 1)?);
            distinct(op, a, b)?;
            let less = m.regs[a] < m.regs[b];
            combine_flag(m, less);
        }
        BaseOp::Halve => {
            let dst = reg(ops, 0)?;
            m.flag = m.regs[dst].rem_euclid(2) == 1;
            m.regs[dst] = m.regs[dst].div_euclid(2);
        }
        BaseOp::JumpFwd | BaseOp::JumpBwd | BaseOp::JumpFwdNF | BaseOp::JumpBwdNF => {
            let src = reg(ops, 0)?;
            // a skipped NF jump still advances by one
            if !(class.contains(OpClass::IF_NOT_FLAG) && m.flag) {
                return jump(m, m.regs[src], class.contains(OpClass::BACKWARD), len);
            }
        }
        BaseOp::Store => {
            let (addr, val) = (reg(ops, 0)?, reg(ops, 1)?);
            mem.write(m.regs[addr], m.regs[val]);
        }
        BaseOp::Load => {
            let (dst, addr) = (reg(ops, 0)?, reg(ops, 1)?);
            m.regs[dst] = load(mem, m.regs[addr])?;
        }
        BaseOp::Output => {
            let src = reg(ops, 0)?;
            m.output.push(m.regs[src]);
        }
        BaseOp::Return => {}
    }
    if class.contains(OpClass::RETURN) {
        return Ok(Flow::Return);
    }
    Ok(Flow::Next(chain_after(class)))
}

/// What the next instruction may continue from an instruction of `class`.
fn chain_after(class: OpClass) -> Chain {
    if !class.contains(OpClass::CHAINS) {
        Chain::Idle
    } else if class.contains(OpClass::WRITES_FLAG) {
        Chain::FlagCombine
    } else {
        Chain::NumBuild
    }
}

fn combine_flag(m: &mut Machine, b: bool) {
    if m.chain == Chain::FlagCombine {
        m.flag |= b;
    } else {
        m.flag = b;
    }
}

fn exec_macro<M: Memory>(
    m: &mut Machine,
    mem: &mut M,
    op: MacroOp,
    ops: &[Operand],
) -> Result<Flow, Fault> {
    match op {
        MacroOp::AddImm => {
            let dst = reg(ops, 0)?;
            let v = Word::from(imm(ops, 1)?);
            m.regs[dst] = checked(m.regs[dst].checked_add(v))?;
        }
        MacroOp::Add => {
            let (dst, src) = (reg(ops, 0)?, reg(ops, 1)?);
            m.regs[dst] = checked(m.regs[dst].checked_add(m.regs[src]))?;
        }
        MacroOp::NumBuild => {
            m.regs[0] = Word::from(imm(ops, 0)?);
        }
        MacroOp::LoadBytewise => {
            let (dst, addr) = (reg(ops, 0)?, reg(ops, 1)?);
            let base = m.regs[addr];
            let mut val: Word = 0;
            for i in 0..4 {
                let at = checked(base.checked_add(i))?;
                let cell = load(mem, at)?;
                val |= checked(cell.checked_mul(1 << (8 * i)))?;
            }
            m.regs[dst] = val;
        }
        MacroOp::StoreBytewise => {
            let (src, addr) = (reg(ops, 0)?, reg(ops, 1)?);
            let base = m.regs[addr];
            let v = m.regs[src];
            for i in 0..4 {
                let at = checked(base.checked_add(i))?;
                mem.write(at, (v >> (8 * i)) & 0xFF);
            }
        }
        MacroOp::Gt | MacroOp::Eq | MacroOp::Neq | MacroOp::Lt => {
            let (dst, a, b) = (reg(ops, 0)?, reg(ops, 1)?, reg(ops, 2)?);
            let (a, b) = (m.regs[a], m.regs[b]);
            let holds = match op {
                MacroOp::Gt => a > b,
                MacroOp::Eq => a == b,
                MacroOp::Neq => a != b,
                _ => a < b,
            };
            m.regs[dst] = holds as Word;
        }
        MacroOp::Div | MacroOp::Rem => {
            let (dst, src) = (reg(ops, 0)?, reg(ops, 1)?);
            let divisor = m.regs[src];
            if divisor == 0 {
                return Err(Fault::DivisionByZero);
            }
            m.regs[dst] = if op == MacroOp::Div {
                checked(m.regs[dst].checked_div(divisor))?
            } else {
                checked(m.regs[dst].checked_rem(divisor))?
            };
        }
        MacroOp::RetPseudo => return Ok(Flow::Return),
    }
    Ok(Flow::Next(Chain::Idle))
}
