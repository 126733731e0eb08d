use crate::decoder::Decoder;
use crate::exec::{Executor, Flow};
use crate::instructions::{FLAG_REG, NUM_REGS, WORD};
use crate::memory::Bus;
use crate::observe::Sink;
use crate::program::Program;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, trace};

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dump: u8 {
const TRACE = 1 << 0; // (pc, raw bytes) before each step
const REGS_EACH_STEP = 1 << 1;
const REGS_AT_END = 1 << 2;
const MEMORY_AT_END = 1 << 3;
}
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CpuConfig {
    /// Abort with [`Trap::StepLimit`] after this many executed words.
    pub step_limit: Option<u64>,
    pub dump: Dump,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            step_limit: None,
            dump: Dump::empty(),
        }
    }
}

/// Outcome of the last `cmp`, as stored in the flag register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Flag {
    Equal = 1,
    NotEqual = 2,
    Less = 3,
    Greater = 4,
}

impl Flag {
    /// One three-way decision; never yields `NotEqual`, which is only ever
    /// derived from "not `Equal`".
    pub fn compare(a: u8, b: u8) -> Flag {
        match a.cmp(&b) {
            Ordering::Less => Flag::Less,
            Ordering::Greater => Flag::Greater,
            Ordering::Equal => Flag::Equal,
        }
    }

    pub fn from_reg(v: u8) -> Option<Flag> {
        match v {
            1 => Some(Flag::Equal),
            2 => Some(Flag::NotEqual),
            3 => Some(Flag::Less),
            4 => Some(Flag::Greater),
            _ => None,
        }
    }

    pub fn is_equal(self) -> bool {
        self == Flag::Equal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Exit {
    /// A `halt` word was executed.
    Halted,
    /// `pc` moved past the last word.
    EndOfImage,
}

#[derive(thiserror::Error, Debug)]
pub enum Trap {
    #[error("unknown opcode '{opcode}' at {pc:#08x}")]
    UnknownOpcode { pc: u32, opcode: u8 },
    #[error("return address stack is empty at {pc:#08x}")]
    StackUnderflow { pc: u32 },
    #[error("amount of bytes ({len}) is not divisible by four")]
    ImageLength { len: usize },
    #[error("unaligned jump target {target:#08x} at {pc:#08x}")]
    Unaligned { pc: u32, target: u32 },
    #[error("bus error at {addr:#06x}: {source}")]
    Bus {
        addr: u32,
        #[source]
        source: anyhow::Error,
    },
    #[error("step limit of {limit} reached")]
    StepLimit { limit: u64 },
    #[error("failed to write observation output")]
    Sink(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cpu {
    pub pc: u32,
    pub regs: [u8; NUM_REGS],
    /// Return addresses pushed by `jal`.
    pub ret_stack: Vec<u32>,
    pub steps: u64,
    pub cfg: CpuConfig,
}

impl Cpu {
    pub fn new(cfg: CpuConfig) -> Self {
        Self {
            pc: 0,
            regs: [0; NUM_REGS],
            ret_stack: Vec::new(),
            steps: 0,
            cfg,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.cfg);
    }

    pub fn flag(&self) -> Option<Flag> {
        Flag::from_reg(self.regs[FLAG_REG])
    }

    /// Executes the word at `pc`. Returns `Some` once the machine has stopped.
    pub fn step<B: Bus, D: Decoder, X: Executor>(
        &mut self,
        prog: &Program,
        bus: &mut B,
        dec: &D,
        exec: &X,
        sink: &mut dyn Sink,
    ) -> Result<Option<Exit>, Trap> {
        let pc = self.pc;
        let Some(raw) = prog.fetch(pc) else {
            return Ok(Some(Exit::EndOfImage));
        };
        if self.cfg.dump.contains(Dump::TRACE) {
            sink.fetch(pc, raw)?;
        }
        trace!(pc, ?raw, "fetch");

        let d = dec.decode(raw).ok_or(Trap::UnknownOpcode { pc, opcode: raw[0] })?;
        let flow = exec.exec(self, bus, d)?;
        self.steps += 1;

        let exit = match flow {
            Flow::Next => {
                self.pc = pc.wrapping_add(WORD);
                None
            }
            Flow::Jump(target) => {
                if target % WORD != 0 {
                    return Err(Trap::Unaligned { pc, target });
                }
                self.pc = target;
                None
            }
            Flow::Halt => Some(Exit::Halted),
        };
        if self.cfg.dump.contains(Dump::REGS_EACH_STEP) {
            sink.registers(&self.regs)?;
        }
        Ok(exit)
    }

    /// Runs from the current `pc` until `halt`, the end of the image or a trap.
    pub fn run<B: Bus, D: Decoder, X: Executor>(
        &mut self,
        prog: &Program,
        bus: &mut B,
        dec: &D,
        exec: &X,
        sink: &mut dyn Sink,
    ) -> Result<Exit, Trap> {
        debug!(words = prog.words(), "run start");
        let exit = loop {
            if let Some(limit) = self.cfg.step_limit {
                if self.steps >= limit {
                    return Err(Trap::StepLimit { limit });
                }
            }
            if let Some(exit) = self.step(prog, bus, dec, exec, sink)? {
                break exit;
            }
        };
        debug!(?exit, steps = self.steps, pc = self.pc, "run end");

        if self.cfg.dump.contains(Dump::REGS_AT_END) {
            sink.registers(&self.regs)?;
        }
        if self.cfg.dump.contains(Dump::MEMORY_AT_END) {
            let mem = bus.dump().map_err(|source| Trap::Bus { addr: 0, source })?;
            sink.memory(&mem)?;
        }
        Ok(exit)
    }
}
