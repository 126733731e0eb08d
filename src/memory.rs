use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Number of cells addressable by a 16-bit `store`/`load` operand.
pub const MEMORY_SIZE: usize = 0x1_0000;

pub trait Bus {
    fn read_u8(&mut self, addr: u32) -> Result<u8>;
    fn write_u8(&mut self, addr: u32, val: u8) -> Result<()>;

    /// Full contents for end-of-run dumps.
    fn dump(&mut self) -> Result<Vec<u8>> {
        (0..MEMORY_SIZE as u32).map(|addr| self.read_u8(addr)).collect()
    }
}

/// Flat byte-addressed data memory. Code lives in the [`Program`](crate::Program),
/// not here.
#[derive(Clone, Serialize, Deserialize)]
pub struct LinearMemory {
    pub mem: Vec<u8>,
}

impl LinearMemory {
    pub fn new(size: usize) -> Self {
        Self { mem: vec![0; size] }
    }

    fn check(&self, addr: u32) -> Result<usize> {
        let off = addr as usize;
        ensure!(
            off < self.mem.len(),
            "address {addr:#06x} outside {} byte memory",
            self.mem.len()
        );
        Ok(off)
    }
}

impl Default for LinearMemory {
    fn default() -> Self {
        Self::new(MEMORY_SIZE)
    }
}

impl std::fmt::Debug for LinearMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let used = self.mem.iter().filter(|&&b| b != 0).count();
        f.debug_struct("LinearMemory")
            .field("size", &self.mem.len())
            .field("nonzero", &used)
            .finish()
    }
}

impl Bus for LinearMemory {
    fn read_u8(&mut self, addr: u32) -> Result<u8> {
        let off = self.check(addr)?;
        Ok(self.mem[off])
    }
    fn write_u8(&mut self, addr: u32, val: u8) -> Result<()> {
        let off = self.check(addr)?;
        self.mem[off] = val;
        Ok(())
    }
    fn dump(&mut self) -> Result<Vec<u8>> {
        Ok(self.mem.clone())
    }
}
