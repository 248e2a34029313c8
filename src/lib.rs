pub mod disasm;
pub mod exec;
pub mod instructions;
pub mod machine;
pub mod memory;
pub mod opcode;
pub mod parse;
pub mod program;
pub mod resolve;

pub mod isa {
    pub mod card; // 3-field card records and the 12-symbol table
}

pub use exec::{DirectExecutor, Executor};
pub use machine::{Fault, Halt, Machine, MachineConfig, Step, Trap};
pub use memory::{Memory, SparseMemory};
pub use opcode::{BaseOp, MacroOp, Opcode};
pub use program::{Instruction, Operand, Program, ProgramError};
pub use resolve::{resolve, FixupError};
