//! Where traces and register/memory dumps go. None of this is CPU state.

use std::io::{self, Write};

pub trait Sink {
    fn fetch(&mut self, _pc: u32, _raw: [u8; 4]) -> io::Result<()> {
        Ok(())
    }
    fn registers(&mut self, _regs: &[u8]) -> io::Result<()> {
        Ok(())
    }
    fn memory(&mut self, _mem: &[u8]) -> io::Result<()> {
        Ok(())
    }
}

/// Discards everything.
pub struct NullSink;

impl Sink for NullSink {}

fn join(values: &[u8]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Line-oriented text output: `pc: b0, b1, b2, b3`, `registers: ...`, `memory: ...`.
pub struct TextSink<W: Write> {
    out: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Sink for TextSink<W> {
    fn fetch(&mut self, pc: u32, raw: [u8; 4]) -> io::Result<()> {
        writeln!(self.out, "{pc}: {}, {}, {}, {}", raw[0], raw[1], raw[2], raw[3])
    }
    fn registers(&mut self, regs: &[u8]) -> io::Result<()> {
        writeln!(self.out, "registers: {}", join(regs))
    }
    fn memory(&mut self, mem: &[u8]) -> io::Result<()> {
        writeln!(self.out, "memory: {}", join(mem))
    }
}

/// Keeps everything in memory; handy for tests and for JSON reports.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    pub fetches: Vec<(u32, [u8; 4])>,
    pub registers: Vec<Vec<u8>>,
    pub memory: Option<Vec<u8>>,
}

impl Sink for Recorder {
    fn fetch(&mut self, pc: u32, raw: [u8; 4]) -> io::Result<()> {
        self.fetches.push((pc, raw));
        Ok(())
    }
    fn registers(&mut self, regs: &[u8]) -> io::Result<()> {
        self.registers.push(regs.to_vec());
        Ok(())
    }
    fn memory(&mut self, mem: &[u8]) -> io::Result<()> {
        self.memory = Some(mem.to_vec());
        Ok(())
    }
}
