use super::SymbolTable;
use crate::instructions::{MAX_TARGET, NUM_REGS};

/// Decimal register number, or one of the `zero`/`comp` aliases.
pub fn register(tok: &str) -> Option<u8> {
    if tok.eq_ignore_ascii_case("zero") {
        return Some(0);
    }
    if tok.eq_ignore_ascii_case("comp") {
        return Some(1);
    }
    tok.parse::<u8>().ok().filter(|&r| (r as usize) < NUM_REGS)
}

/// Decimal byte.
pub fn immediate(tok: &str) -> Option<u8> {
    tok.parse::<u8>().ok()
}

/// Hexadecimal 16-bit data address, `0x` prefix optional.
pub fn address(tok: &str) -> Option<u16> {
    let hex = tok
        .strip_prefix("0x")
        .or_else(|| tok.strip_prefix("0X"))
        .unwrap_or(tok);
    u16::from_str_radix(hex, 16).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    Abs(u32),
    Label(&'a str),
}

/// Jump operand: a decimal literal that fits in 3 bytes, or a label
/// reference. Only all-digit tokens count as literals, so names such as
/// `1st` or `-x` are still looked up. `None` means a literal that is too large.
pub fn target(tok: &str) -> Option<Target<'_>> {
    let digits = tok.strip_prefix('+').unwrap_or(tok);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Some(Target::Label(tok));
    }
    tok.parse::<u32>()
        .ok()
        .filter(|&v| v <= MAX_TARGET)
        .map(Target::Abs)
}

/// Finds a label reference, trying the token as written first and then
/// without the declaring `.`.
pub fn lookup(symbols: &SymbolTable, tok: &str) -> Option<u32> {
    symbols
        .get(tok)
        .or_else(|| tok.strip_prefix('.').and_then(|name| symbols.get(name)))
        .copied()
}
