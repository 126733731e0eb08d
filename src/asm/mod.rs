//! Two-pass assembler.
//!
//! Source is line oriented. `;` starts a comment, `.name` declares a label and
//! every other non-blank line is `mnemonic operand...`. Each source line owns
//! exactly one 4-byte slot of the image, so a label's address is simply its
//! line index times four.

mod encode;
mod labels;
pub mod operand;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::cpu::Trap;
use crate::program::Program;

/// Label name to byte offset.
pub type SymbolTable = BTreeMap<String, u32>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AsmErrorKind {
    /// Unknown mnemonic or wrong operand count.
    Syntax,
    /// Register, immediate, address or jump literal out of bounds or unparsable.
    OperandRange,
    /// Empty, duplicate or undefined label.
    Label,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("error on line {line}: {message}")]
pub struct AsmError {
    /// 1-based source line.
    pub line: usize,
    pub kind: AsmErrorKind,
    pub message: String,
}

impl AsmError {
    fn new(idx: usize, kind: AsmErrorKind, message: impl Into<String>) -> Self {
        Self {
            line: idx + 1,
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn syntax(idx: usize, message: impl Into<String>) -> Self {
        Self::new(idx, AsmErrorKind::Syntax, message)
    }

    pub(crate) fn operand(idx: usize, message: impl Into<String>) -> Self {
        Self::new(idx, AsmErrorKind::OperandRange, message)
    }

    pub(crate) fn label(idx: usize, message: impl Into<String>) -> Self {
        Self::new(idx, AsmErrorKind::Label, message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assembly {
    pub image: Vec<u8>,
    pub symbols: SymbolTable,
}

impl Assembly {
    pub fn program(&self) -> Result<Program, Trap> {
        Program::new(self.image.clone())
    }
}

/// Drops the comment and surrounding whitespace.
fn strip(line: &str) -> &str {
    line.split(';').next().unwrap_or_default().trim()
}

/// Assembles a whole source text. The first error aborts; label errors from
/// pass 1 are reported before any encoding error.
pub fn assemble(source: &str) -> Result<Assembly, AsmError> {
    let lines: Vec<&str> = source.lines().map(strip).collect();
    let symbols = labels::resolve(&lines)?;
    let image = encode::encode(&lines, &symbols)?;
    debug!(lines = lines.len(), labels = symbols.len(), bytes = image.len(), "assembled");
    Ok(Assembly { image, symbols })
}
