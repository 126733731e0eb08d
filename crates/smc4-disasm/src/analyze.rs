use std::collections::{BTreeSet, HashMap, VecDeque};
use serde::Serialize;

use smc4_rs::decoder::{Decoder, Op};
use smc4_rs::disasm::ends_block;
use smc4_rs::instructions::WORD;
use smc4_rs::isa::smc4::Smc4Decoder;

use crate::model::{is_mapped, read_word, Image};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind { Fallthrough, Branch, CondBranch, Call }

impl EdgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeKind::Fallthrough => "ft",
            EdgeKind::Branch => "br",
            EdgeKind::CondBranch => "cbr",
            EdgeKind::Call => "call",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Edge { pub from: u32, pub to: u32, pub kind: EdgeKind }

#[derive(Debug, Default)]
pub struct Analysis {
    pub visited: BTreeSet<u32>,
    pub edges: Vec<Edge>,
    pub rets: BTreeSet<u32>,
    pub halts: BTreeSet<u32>,
    /// Words after which control never falls through.
    pub terminators: BTreeSet<u32>,
    /// Reached words that do not decode.
    pub invalid: BTreeSet<u32>,
}

/// Walks every path reachable from `entries`. `ret` targets are not followed;
/// the word after each `jal` is queued as its fallthrough instead.
pub fn analyze_entries(img: &Image, entries: &[u32], max_instr: usize) -> Analysis {
    let dec = Smc4Decoder::new();
    let mut out = Analysis::default();
    let mut queue: VecDeque<u32> = entries.iter().copied().filter(|&e| is_mapped(img, e)).collect();
    let mut steps = 0usize;

    while let Some(pc) = queue.pop_front() {
        if steps >= max_instr { break; }
        if !out.visited.insert(pc) { continue; }
        let Some(raw) = read_word(img, pc) else { continue };
        let Some(d) = dec.decode(raw) else {
            out.invalid.insert(pc);
            continue;
        };
        steps += 1;
        if ends_block(d.op) { out.terminators.insert(pc); }
        let ft = pc.wrapping_add(WORD);
        let mut push = |to: u32, kind: EdgeKind, edges: &mut Vec<Edge>| {
            edges.push(Edge { from: pc, to, kind });
            if is_mapped(img, to) { queue.push_back(to); }
        };
        if !d.op.is_control_flow() && d.op != Op::Halt {
            if is_mapped(img, ft) { push(ft, EdgeKind::Fallthrough, &mut out.edges); }
            continue;
        }
        match d.op {
            Op::Jmp => push(d.imm, EdgeKind::Branch, &mut out.edges),
            Op::Jeq | Op::Jne | Op::Jlt | Op::Jgt => {
                push(d.imm, EdgeKind::CondBranch, &mut out.edges);
                push(ft, EdgeKind::Fallthrough, &mut out.edges);
            }
            Op::Jal => {
                push(d.imm, EdgeKind::Call, &mut out.edges);
                push(ft, EdgeKind::Fallthrough, &mut out.edges);
            }
            Op::Ret => { out.rets.insert(pc); }
            Op::Halt => { out.halts.insert(pc); }
            _ => {}
        }
    }
    out
}

#[derive(Debug, Clone, Serialize)]
pub struct Block { pub start: u32, pub end: u32 }

#[derive(Debug, Clone, Serialize)]
pub struct EdgeOut { pub from: u32, pub to: u32, pub kind: String }

/// Splits the analysed words into straight-line blocks. A block starts at an
/// entry or at any edge destination other than a plain fallthrough, and ends
/// after a word that cannot fall through.
pub fn blocks(a: &Analysis, entries: &[u32]) -> Vec<Block> {
    let mut starts: BTreeSet<u32> = entries.iter().copied().collect();
    for e in &a.edges {
        if e.kind != EdgeKind::Fallthrough { starts.insert(e.to); }
    }
    let mut out = Vec::new();
    let mut cur: Option<u32> = None;
    let mut prev = 0u32;
    for &pc in &a.visited {
        let contiguous = cur.is_some() && pc == prev.wrapping_add(WORD);
        if let Some(start) = cur {
            if !contiguous || starts.contains(&pc) {
                out.push(Block { start, end: prev.wrapping_add(WORD) });
                cur = None;
            }
        }
        if cur.is_none() { cur = Some(pc); }
        prev = pc;
        if a.terminators.contains(&pc) || a.invalid.contains(&pc) {
            if let Some(start) = cur.take() {
                out.push(Block { start, end: pc.wrapping_add(WORD) });
            }
        }
    }
    if let Some(start) = cur {
        out.push(Block { start, end: prev.wrapping_add(WORD) });
    }
    out
}

/// Edges between block starts, deduplicated and in address order.
pub fn block_edges(a: &Analysis, blocks: &[Block]) -> Vec<EdgeOut> {
    let owner: HashMap<u32, u32> = blocks.iter()
        .flat_map(|b| (b.start..b.end).step_by(WORD as usize).map(move |pc| (pc, b.start)))
        .collect();
    let mut out: Vec<EdgeOut> = a.edges.iter()
        .filter(|e| e.kind != EdgeKind::Fallthrough || blocks.iter().any(|b| b.start == e.to))
        .map(|e| EdgeOut {
            from: owner.get(&e.from).copied().unwrap_or(e.from),
            to: e.to,
            kind: e.kind.as_str().to_string(),
        })
        .collect();
    out.sort_by(|x, y| (x.from, x.to, &x.kind).cmp(&(y.from, y.to, &y.kind)));
    out.dedup_by(|x, y| x.from == y.from && x.to == y.to && x.kind == y.kind);
    out
}
