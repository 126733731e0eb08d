use crate::decoder::Op;

/// Size of the register file.
pub const NUM_REGS: usize = 16;
/// Register that receives the outcome of `cmp`.
pub const FLAG_REG: usize = 1;
/// Bytes per instruction slot.
pub const WORD: u32 = 4;
/// Largest literal a jump operand can hold (3 bytes).
pub const MAX_TARGET: u32 = 0xFF_FFFF;

/// Fill byte for blank, comment and label lines (same as `noop`).
pub const PAD: u8 = 0xFF;
/// Alternate label padding accepted by the CPU.
pub const LABEL_PAD: u8 = 0xFC;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `[op, src1, src2, dst]`
    Rrr,
    /// `[op, imm, src, dst]`
    Irr,
    /// `[op, reg, addrHi, addrLo]`
    Ra,
    /// `[op, reg1, reg2, 0]`
    Rr,
    /// `[op, hi, mid, lo]`
    Jump,
    /// `[op, op, op, op]`
    Nullary,
}

impl Shape {
    /// Number of whitespace separated tokens on a source line, mnemonic included.
    pub fn tokens(self) -> usize {
        match self {
            Shape::Rrr | Shape::Irr => 4,
            Shape::Ra | Shape::Rr => 3,
            Shape::Jump => 2,
            Shape::Nullary => 1,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub op: Op,
    pub mnemonic: &'static str,
    pub opcode: u8,
    pub shape: Shape,
    /// Operand pattern shown in "expected ..." diagnostics.
    pub syntax: &'static str,
}

impl InstrDesc {
    pub fn usage(&self) -> String {
        if self.syntax.is_empty() {
            self.mnemonic.to_string()
        } else {
            format!("{} {}", self.mnemonic, self.syntax)
        }
    }
}

const fn rrr(op: Op, mnemonic: &'static str, opcode: u8) -> InstrDesc {
    InstrDesc { op, mnemonic, opcode, shape: Shape::Rrr, syntax: "[srcReg1] [srcReg2] [dstReg]" }
}

const fn irr(op: Op, mnemonic: &'static str, opcode: u8) -> InstrDesc {
    InstrDesc { op, mnemonic, opcode, shape: Shape::Irr, syntax: "[immediate] [srcReg] [dstReg]" }
}

const fn jump(op: Op, mnemonic: &'static str, opcode: u8) -> InstrDesc {
    InstrDesc { op, mnemonic, opcode, shape: Shape::Jump, syntax: "[immediate | label]" }
}

const fn nullary(op: Op, mnemonic: &'static str, opcode: u8) -> InstrDesc {
    InstrDesc { op, mnemonic, opcode, shape: Shape::Nullary, syntax: "" }
}

pub const TABLE: &[InstrDesc] = &[
    rrr(Op::Add, "add", 0x00),
    irr(Op::AddI, "addi", 0x01),
    rrr(Op::Sub, "sub", 0x02),
    irr(Op::SubI, "subi", 0x03),
    rrr(Op::And, "and", 0x04),
    irr(Op::AndI, "andi", 0x05),
    rrr(Op::Or, "or", 0x06),
    irr(Op::OrI, "ori", 0x07),
    rrr(Op::Xor, "xor", 0x08),
    irr(Op::XorI, "xori", 0x09),
    InstrDesc {
        op: Op::Store,
        mnemonic: "store",
        opcode: 0x0A,
        shape: Shape::Ra,
        syntax: "[srcReg] [dstAddress]",
    },
    InstrDesc {
        op: Op::Load,
        mnemonic: "load",
        opcode: 0x0B,
        shape: Shape::Ra,
        syntax: "[dstReg] [srcAddress]",
    },
    InstrDesc {
        op: Op::Cmp,
        mnemonic: "cmp",
        opcode: 0x0C,
        shape: Shape::Rr,
        syntax: "[reg1] [reg2]",
    },
    jump(Op::Jmp, "jmp", 0x0D),
    jump(Op::Jeq, "jeq", 0x0E),
    jump(Op::Jne, "jne", 0x0F),
    jump(Op::Jlt, "jlt", 0x10),
    jump(Op::Jgt, "jgt", 0x11),
    jump(Op::Jal, "jal", 0x12),
    nullary(Op::Ret, "ret", 0xFD),
    nullary(Op::Halt, "halt", 0xFE),
    nullary(Op::Noop, "noop", 0xFF),
];

/// Looks up an already lower-cased mnemonic.
pub fn by_mnemonic(mnemonic: &str) -> Option<&'static InstrDesc> {
    TABLE.iter().find(|d| d.mnemonic == mnemonic)
}

pub fn by_opcode(opcode: u8) -> Option<&'static InstrDesc> {
    TABLE.iter().find(|d| d.opcode == opcode)
}

pub fn by_op(op: Op) -> &'static InstrDesc {
    // every Op has exactly one row
    TABLE
        .iter()
        .find(|d| d.op == op)
        .unwrap_or_else(|| unreachable!("no table entry for {op:?}"))
}
