pub mod asm;
pub mod cpu;
pub mod decoder;
pub mod disasm;
pub mod exec;
pub mod instructions;
pub mod memory;
pub mod observe;
pub mod program;

pub mod isa {
    pub mod smc4; // canonical 16-register revision
}

pub use asm::{assemble, AsmError, AsmErrorKind, Assembly, SymbolTable};
pub use cpu::{Cpu, CpuConfig, Dump, Exit, Flag, Trap};
pub use memory::{Bus, LinearMemory};
pub use program::Program;
