use tracing::trace;

use super::{AsmError, SymbolTable};
use crate::instructions::WORD;

/// Label declared by a (comment-stripped, trimmed) line, if it is a label line.
pub fn declared(line: &str) -> Option<&str> {
    line.strip_prefix('.').map(str::trim)
}

/// Pass 1: every `.name` line binds `name` to the offset of its own slot.
pub fn resolve(lines: &[&str]) -> Result<SymbolTable, AsmError> {
    let mut table = SymbolTable::new();
    for (idx, line) in lines.iter().enumerate() {
        let Some(name) = declared(line) else { continue };
        if name.is_empty() {
            return Err(AsmError::label(idx, "label names cannot be empty"));
        }
        if table.contains_key(name) {
            return Err(AsmError::label(idx, format!("label '{name}' already exists")));
        }
        let offset = idx as u32 * WORD;
        trace!(name, offset, "label");
        table.insert(name.to_string(), offset);
    }
    Ok(table)
}
