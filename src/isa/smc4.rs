use crate::decoder::{Decoded, Decoder, Op};
use crate::instructions::{self, Shape, LABEL_PAD, NUM_REGS};

/// Decoder for the 16-register SMC4 revision (the superset of the 8-register
/// add/sub/load/store machine).
///
/// Every word is `[opcode, b1, b2, b3]`. Multi-byte fields are big-endian.
/// Words that do not describe a valid instruction decode to `None`, which
/// covers unknown opcodes, register bytes outside the file and nullary words
/// whose bytes are not all equal.
#[derive(Debug, Default, Clone, Copy)]
pub struct Smc4Decoder;

impl Smc4Decoder {
    pub fn new() -> Self {
        Self
    }
}

#[inline]
fn reg(b: u8) -> Option<u8> {
    ((b as usize) < NUM_REGS).then_some(b)
}

/// 24-bit big-endian target from the three operand bytes.
#[inline]
pub fn target24(raw: [u8; 4]) -> u32 {
    ((raw[1] as u32) << 16) | ((raw[2] as u32) << 8) | raw[3] as u32
}

/// 16-bit big-endian address from the last two operand bytes.
#[inline]
pub fn addr16(raw: [u8; 4]) -> u32 {
    ((raw[2] as u32) << 8) | raw[3] as u32
}

impl Decoder for Smc4Decoder {
    fn decode(&self, raw: [u8; 4]) -> Option<Decoded> {
        let [opcode, b1, b2, b3] = raw;
        let blank = Decoded { op: Op::Noop, rd: 0, rs1: 0, rs2: 0, imm: 0, raw };

        if opcode == LABEL_PAD {
            return raw.iter().all(|&b| b == LABEL_PAD).then_some(blank);
        }

        let desc = instructions::by_opcode(opcode)?;
        let d = match desc.shape {
            Shape::Rrr => Decoded {
                op: desc.op,
                rs1: reg(b1)?,
                rs2: reg(b2)?,
                rd: reg(b3)?,
                ..blank
            },
            Shape::Irr => Decoded {
                op: desc.op,
                imm: b1 as u32,
                rs1: reg(b2)?,
                rd: reg(b3)?,
                ..blank
            },
            Shape::Ra => Decoded {
                op: desc.op,
                rd: reg(b1)?,
                imm: addr16(raw),
                ..blank
            },
            Shape::Rr => Decoded {
                op: desc.op,
                rs1: reg(b1)?,
                rs2: reg(b2)?,
                ..blank
            },
            Shape::Jump => Decoded {
                op: desc.op,
                imm: target24(raw),
                ..blank
            },
            Shape::Nullary => {
                if b1 != opcode || b2 != opcode || b3 != opcode {
                    return None;
                }
                Decoded { op: desc.op, ..blank }
            }
        };
        Some(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_register_and_immediate_forms() {
        let dec = Smc4Decoder::new();
        let add = dec.decode([0x00, 1, 2, 3]).unwrap();
        assert_eq!((add.op, add.rs1, add.rs2, add.rd), (Op::Add, 1, 2, 3));

        let subi = dec.decode([0x03, 200, 4, 5]).unwrap();
        assert_eq!((subi.op, subi.imm, subi.rs1, subi.rd), (Op::SubI, 200, 4, 5));
    }

    #[test]
    fn jump_target_uses_all_three_bytes() {
        let dec = Smc4Decoder::new();
        let d = dec.decode([0x0D, 0x01, 0x02, 0x04]).unwrap();
        assert_eq!(d.op, Op::Jmp);
        assert_eq!(d.imm, 0x01_0204);
    }

    #[test]
    fn memory_address_is_big_endian() {
        let dec = Smc4Decoder::new();
        let d = dec.decode([0x0B, 7, 0xAB, 0xCD]).unwrap();
        assert_eq!((d.op, d.rd, d.imm), (Op::Load, 7, 0xABCD));
    }

    #[test]
    fn rejects_malformed_words() {
        let dec = Smc4Decoder::new();
        assert!(dec.decode([0xFE, 0xFE, 0xFE, 0x00]).is_none());
        assert!(dec.decode([0xFF, 0xFF, 0x00, 0xFF]).is_none());
        assert!(dec.decode([0x00, 16, 0, 0]).is_none());
        assert!(dec.decode([0x42, 0, 0, 0]).is_none());
        assert!(dec.decode([LABEL_PAD, LABEL_PAD, LABEL_PAD, 0]).is_none());
    }

    #[test]
    fn label_padding_is_a_noop() {
        let dec = Smc4Decoder::new();
        let d = dec.decode([LABEL_PAD; 4]).unwrap();
        assert_eq!(d.op, Op::Noop);
    }
}
