use crate::cpu::Trap;
use crate::instructions::WORD;

/// An assembled image: a flat run of 4-byte words with no header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    bytes: Vec<u8>,
}

impl Program {
    /// Takes ownership of an image, rejecting lengths that are not whole words.
    pub fn new(bytes: Vec<u8>) -> Result<Self, Trap> {
        if bytes.len() % WORD as usize != 0 {
            return Err(Trap::ImageLength { len: bytes.len() });
        }
        Ok(Self { bytes })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of instruction slots.
    pub fn words(&self) -> usize {
        self.bytes.len() / WORD as usize
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Word at a byte offset, `None` past the end or off a word boundary.
    pub fn fetch(&self, pc: u32) -> Option<[u8; 4]> {
        if pc % WORD != 0 {
            return None;
        }
        let off = pc as usize;
        let w = self.bytes.get(off..off + WORD as usize)?;
        Some([w[0], w[1], w[2], w[3]])
    }
}

impl TryFrom<Vec<u8>> for Program {
    type Error = Trap;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        Program::new(bytes)
    }
}
