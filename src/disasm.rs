use std::collections::HashMap;

use crate::decoder::{Decoded, Op};
use crate::instructions::{self, Shape};

/// Formats a decoded word in source syntax, so the text assembles back to the
/// same word (padding words come back as `noop`).
pub fn fmt_decoded(d: &Decoded) -> String {
    fmt_with_labels(d, &HashMap::new())
}

/// Like [`fmt_decoded`], but jump targets that match a symbol are printed by name.
pub fn fmt_with_labels(d: &Decoded, labels: &HashMap<u32, String>) -> String {
    let desc = instructions::by_op(d.op);
    let mn = desc.mnemonic;
    match desc.shape {
        Shape::Rrr => format!("{mn} {} {} {}", d.rs1, d.rs2, d.rd),
        Shape::Irr => format!("{mn} {} {} {}", d.imm, d.rs1, d.rd),
        Shape::Ra => format!("{mn} {} {:04x}", d.rd, d.imm),
        Shape::Rr => format!("{mn} {} {}", d.rs1, d.rs2),
        Shape::Jump => match labels.get(&d.imm) {
            Some(name) => format!("{mn} {name}"),
            None => format!("{mn} {}", d.imm),
        },
        Shape::Nullary => mn.to_string(),
    }
}

/// True for words that end a straight-line run when listing or analysing.
pub fn ends_block(op: Op) -> bool {
    matches!(op, Op::Jmp | Op::Ret | Op::Halt)
}
