use tracing::trace;

use super::labels;
use super::operand::{self, Target};
use super::{AsmError, SymbolTable};
use crate::instructions::{self, Shape, PAD, WORD};

/// Pass 2: one word per line. Blank and label lines become padding so that
/// the offsets handed out by pass 1 stay valid.
pub fn encode(lines: &[&str], symbols: &SymbolTable) -> Result<Vec<u8>, AsmError> {
    let mut out = Vec::with_capacity(lines.len() * WORD as usize);
    for (idx, line) in lines.iter().enumerate() {
        let word = if line.is_empty() || labels::declared(line).is_some() {
            [PAD; 4]
        } else {
            encode_line(idx, line, symbols)?
        };
        out.extend_from_slice(&word);
    }
    Ok(out)
}

fn encode_line(idx: usize, line: &str, symbols: &SymbolTable) -> Result<[u8; 4], AsmError> {
    let toks: Vec<&str> = line.split_whitespace().collect();
    let first = toks.first().copied().unwrap_or_default();
    let desc = instructions::by_mnemonic(&first.to_lowercase())
        .ok_or_else(|| AsmError::syntax(idx, format!("unknown instruction '{first}'")))?;
    if toks.len() != desc.shape.tokens() {
        return Err(AsmError::syntax(idx, format!("expected '{}'", desc.usage())));
    }

    let reg = |t: &str| {
        operand::register(t)
            .ok_or_else(|| AsmError::operand(idx, format!("invalid register '{t}'")))
    };
    let imm = |t: &str| {
        operand::immediate(t)
            .ok_or_else(|| AsmError::operand(idx, format!("invalid immediate '{t}'")))
    };

    let op = desc.opcode;
    let word = match desc.shape {
        Shape::Rrr => [op, reg(toks[1])?, reg(toks[2])?, reg(toks[3])?],
        Shape::Irr => [op, imm(toks[1])?, reg(toks[2])?, reg(toks[3])?],
        Shape::Ra => {
            let r = reg(toks[1])?;
            let addr = operand::address(toks[2])
                .ok_or_else(|| AsmError::operand(idx, format!("invalid address '{}'", toks[2])))?;
            let [hi, lo] = addr.to_be_bytes();
            [op, r, hi, lo]
        }
        Shape::Rr => [op, reg(toks[1])?, reg(toks[2])?, 0],
        Shape::Jump => {
            let tgt = resolve_target(idx, toks[1], symbols)?;
            let [_, hi, mid, lo] = tgt.to_be_bytes();
            [op, hi, mid, lo]
        }
        Shape::Nullary => [op; 4],
    };
    trace!(line = idx + 1, ?word, "encoded");
    Ok(word)
}

fn resolve_target(idx: usize, tok: &str, symbols: &SymbolTable) -> Result<u32, AsmError> {
    match operand::target(tok) {
        Some(Target::Abs(v)) => Ok(v),
        Some(Target::Label(name)) => operand::lookup(symbols, name).ok_or_else(|| {
            let name = name.strip_prefix('.').unwrap_or(name);
            AsmError::label(idx, format!("undefined label '{name}'"))
        }),
        None => Err(AsmError::operand(idx, format!("invalid immediate '{tok}'"))),
    }
}
