use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    Add,
    AddI,
    Sub,
    SubI,
    And,
    AndI,
    Or,
    OrI,
    Xor,
    XorI,
    Store,
    Load,
    Cmp,
    Jmp,
    Jeq,
    Jne,
    Jlt,
    Jgt,
    Jal,
    Ret,
    Halt,
    Noop,
}

impl Op {
    /// Ops that may replace `pc` instead of falling through.
    pub fn is_control_flow(self) -> bool {
        matches!(
            self,
            Op::Jmp | Op::Jeq | Op::Jne | Op::Jlt | Op::Jgt | Op::Jal | Op::Ret
        )
    }
}

/// One decoded 4-byte word. Field use depends on the operand shape:
///
/// * register ops: `rs1 op rs2 -> rd`
/// * immediate ops: `imm op rs1 -> rd`
/// * `store`/`load`: register in `rd`, 16-bit address in `imm`
/// * `cmp`: `rs1`, `rs2`
/// * jumps: 24-bit target in `imm`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoded {
    pub op: Op,
    pub rd: u8,
    pub rs1: u8,
    pub rs2: u8,
    pub imm: u32,
    pub raw: [u8; 4],
}

pub trait Decoder {
    fn decode(&self, raw: [u8; 4]) -> Option<Decoded>;
}
