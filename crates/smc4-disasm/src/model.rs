use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use smc4_rs::instructions::WORD;

/// A raw image loaded for inspection. Unlike [`smc4_rs::Program`] it may be a
/// window into a larger file.
#[derive(Debug, Clone)]
pub struct Image {
    pub name: String,
    pub bytes: Vec<u8>,
}

pub fn load_raw_bin(path: &Path, skip: usize, len: Option<usize>) -> Result<Image> {
    let file = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    anyhow::ensure!(skip <= file.len(), "--skip exceeds file size");
    anyhow::ensure!(skip % WORD as usize == 0, "--skip must be a multiple of {WORD}");
    let mut payload = &file[skip..];
    if let Some(lim) = len {
        anyhow::ensure!(lim <= payload.len(), "--len exceeds remaining file size after skip");
        payload = &payload[..lim];
    }
    anyhow::ensure!(
        payload.len() % WORD as usize == 0,
        "image length {} is not a multiple of {WORD}",
        payload.len()
    );
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".into());
    Ok(Image { name, bytes: payload.to_vec() })
}

pub fn read_word(img: &Image, addr: u32) -> Option<[u8; 4]> {
    let off = addr as usize;
    let w = img.bytes.get(off..off.checked_add(WORD as usize)?)?;
    Some([w[0], w[1], w[2], w[3]])
}

pub fn is_mapped(img: &Image, addr: u32) -> bool {
    addr % WORD == 0 && (addr as usize) < img.bytes.len()
}

/// Reads a symbol table written by `basm --symbols` and keys it by address.
pub fn load_labels(path: &Path) -> Result<HashMap<u32, String>> {
    let txt = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let table: BTreeMap<String, u32> =
        serde_json::from_str(&txt).with_context(|| format!("parsing {}", path.display()))?;
    Ok(table.into_iter().map(|(name, addr)| (addr, name)).collect())
}
