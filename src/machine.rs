use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::disasm::fmt_instruction;
use crate::exec::Executor;
use crate::memory::Memory;
use crate::program::{Operand, Program, Word, NUM_REGS};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Initial value of r1 and r2.
    pub stack_top: i64,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self { stack_top: 128 }
    }
}

/// What the next instruction continues from the one just executed.
///
/// Recomputed after every instruction, so a chain never reaches past the
/// immediately preceding step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Chain {
    #[default]
    Idle,
    /// A `NumBuild` left a partial literal in r0.
    NumBuild,
    /// A comparison left a flag that the next comparison ORs into.
    FlagCombine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Halt {
    /// Program counter ran past the last instruction.
    EndOfProgram,
    /// A return-class instruction executed.
    Return,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Halted(Halt),
}

/// Control-flow outcome of one executed instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Next(Chain),
    /// Taken jump; the value is the landing index.
    Jump(usize),
    Return,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    #[error("expected {expected} operands, got {found}")]
    OperandCount { expected: usize, found: usize },
    #[error("operand {index}: expected a register, got `{found}`")]
    ExpectedRegister { index: usize, found: Operand },
    #[error("operand {index}: expected an immediate, got `{found}`")]
    ExpectedImmediate { index: usize, found: Operand },
    #[error("register r{0} out of range")]
    RegisterOutOfRange(u8),
    #[error("immediate #{0} out of range")]
    ImmediateOutOfRange(i64),
    #[error("{op} cannot use r{reg} for both operands")]
    SameRegister { op: &'static str, reg: u8 },
    #[error("invalid Divide setup: destination r{dst}, divisor {divisor}")]
    InvalidDivide { dst: u8, divisor: Word },
    #[error("division by zero")]
    DivisionByZero,
    #[error("jump target {target} outside program of length {len}")]
    JumpOutOfBounds { target: Word, len: usize },
    #[error("memory read from uninitialized address {addr}")]
    Uninitialized { addr: Word },
    #[error("arithmetic overflow")]
    Overflow,
    #[error("step limit of {0} reached")]
    StepLimit(u64),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("fault at instruction {pc} (`{instr}`): {fault}")]
pub struct Trap {
    pub pc: usize,
    pub instr: String,
    #[source]
    pub fault: Fault,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    pub pc: usize,
    pub regs: [Word; NUM_REGS],
    pub flag: bool,
    pub chain: Chain,
    pub output: Vec<Word>,
    pub cfg: MachineConfig,
}

impl Machine {
    pub fn new(cfg: MachineConfig) -> Self {
        let mut m = Self {
            pc: 0,
            regs: [0; NUM_REGS],
            flag: false,
            chain: Chain::Idle,
            output: Vec::new(),
            cfg,
        };
        m.reset();
        m
    }

    pub fn reset(&mut self) {
        self.pc = 0;
        self.regs = [0; NUM_REGS];
        self.regs[1] = Word::from(self.cfg.stack_top);
        self.regs[2] = Word::from(self.cfg.stack_top);
        self.flag = false;
        self.chain = Chain::Idle;
        self.output.clear();
    }

    /// Executes the instruction at `pc`.
    pub fn step<M: Memory, X: Executor>(
        &mut self,
        program: &Program,
        mem: &mut M,
        exec: &X,
    ) -> Result<Step, Trap> {
        let pc = self.pc;
        let Some(instr) = program.get(pc) else {
            return Ok(Step::Halted(Halt::EndOfProgram));
        };
        trace!(
            pc,
            instr = %fmt_instruction(instr),
            regs = ?self.regs.map(display_word),
            flag = self.flag,
            "step"
        );
        let flow = exec
            .exec(self, mem, instr, program.len())
            .map_err(|fault| Trap {
                pc,
                instr: fmt_instruction(instr),
                fault,
            })?;
        match flow {
            Flow::Next(chain) => {
                self.pc = pc + 1;
                self.chain = chain;
            }
            Flow::Jump(target) => {
                self.pc = target;
                self.chain = Chain::Idle;
            }
            Flow::Return => return Ok(Step::Halted(Halt::Return)),
        }
        Ok(Step::Continue)
    }

    /// Steps until the program halts, giving up after `max_steps` instructions.
    pub fn run<M: Memory, X: Executor>(
        &mut self,
        program: &Program,
        mem: &mut M,
        exec: &X,
        max_steps: u64,
    ) -> Result<Halt, Trap> {
        for _ in 0..max_steps {
            if let Step::Halted(halt) = self.step(program, mem, exec)? {
                debug!(?halt, pc = self.pc, outputs = self.output.len(), "halted");
                return Ok(halt);
            }
        }
        Err(Trap {
            pc: self.pc,
            instr: program.get(self.pc).map(fmt_instruction).unwrap_or_default(),
            fault: Fault::StepLimit(max_steps),
        })
    }
}

/// Shows a register the way a 32-bit two's-complement target would print it.
///
/// Values in `[2^31, 2^32)` come out negative; everything else is unchanged.
/// Only used for diagnostics, arithmetic always sees the stored value.
pub fn display_word(v: Word) -> Word {
    if (1 << 31..1 << 32).contains(&v) {
        v - (1 << 32)
    } else {
        v
    }
}
