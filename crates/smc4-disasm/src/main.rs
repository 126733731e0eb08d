use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use smc4_rs::decoder::Decoder;
use smc4_rs::disasm::fmt_with_labels;
use smc4_rs::instructions::WORD;
use smc4_rs::isa::smc4::Smc4Decoder;

use smc4_disasm::{analyze_entries, block_edges, blocks, load_labels, load_raw_bin, read_word, Block, EdgeOut, Image};

#[derive(Parser, Debug)]
#[command(author, version, about = "SMC4 disassembler CLI", long_about=None)]
struct Cli {
    /// Bytes to drop from the front of the file (word multiple)
    #[arg(long, default_value_t = 0usize)]
    skip: usize,
    /// Image produced by `basm`
    #[arg(value_name = "BINFILE")]
    input: PathBuf,
    /// Bytes to keep after `--skip`; the rest of the file if omitted
    #[arg(long)]
    len: Option<usize>,
    /// Symbol table written by `basm --symbols`
    #[arg(long, value_name = "FILE", global = true)]
    labels: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every word in `[start, end)`
    Range {
        /// First byte address
        start: String,
        /// One past the last byte address
        end: String,
        /// Prefix each line with its raw bytes
        #[arg(long)]
        show_bytes: bool,
        /// Destination file; stdout if omitted
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Follow control flow from entry points
    Analyze {
        /// Where to start walking; repeatable, defaults to 0
        #[arg(long = "entry", value_name = "ADDR", num_args = 1.., required = false)]
        entries: Vec<String>,
        /// Decode budget
        #[arg(long, default_value_t = 100_000usize)]
        max_instr: usize,
        /// Summary as text or a JSON report
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Emit a linear listing of analyzed code (text format only)
        #[arg(long)]
        listing: bool,
        /// Destination file; stdout if omitted
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat { Text, Json }

#[derive(Debug, Clone, serde::Serialize)]
struct BlockOut { start: u32, end: u32, insns: Vec<String> }

#[derive(Debug, Clone, serde::Serialize)]
struct Report {
    entries: Vec<u32>,
    blocks: Vec<BlockOut>,
    edges: Vec<EdgeOut>,
    invalid: Vec<u32>,
}

/// `0x`-prefixed hex or plain decimal.
fn parse_addr(text: &str) -> Result<u32> {
    let text = text.trim();
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.with_context(|| format!("bad address '{text}'"))
}

/// One listing line: `0x000010: jmp loop`, optionally with raw bytes.
fn render_word(img: &Image, pc: u32, labels: &HashMap<u32, String>, show_bytes: bool) -> Option<String> {
    let dec = Smc4Decoder::new();
    let raw = read_word(img, pc)?;
    let text = match dec.decode(raw) {
        Some(d) => fmt_with_labels(&d, labels),
        None => format!("; invalid {:02x} {:02x} {:02x} {:02x}", raw[0], raw[1], raw[2], raw[3]),
    };
    let mut line = format!("{pc:#08x}: ");
    if show_bytes {
        for b in raw { let _ = write!(line, "{b:02x} "); }
        line.push_str("  ");
    }
    line.push_str(&text);
    Some(line)
}

fn emit(text: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, text)?,
        None => print!("{text}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let img = load_raw_bin(&cli.input, cli.skip, cli.len)?;
    debug!(name = %img.name, bytes = img.bytes.len(), "image loaded");
    let labels = match &cli.labels {
        Some(path) => load_labels(path)?,
        None => HashMap::new(),
    };

    match cli.cmd {
        Command::Range { start, end, show_bytes, out } => {
            let start = parse_addr(&start)?;
            let end = parse_addr(&end)?;
            anyhow::ensure!(start <= end, "range end {end:#x} lies before start {start:#x}");
            anyhow::ensure!(start % WORD == 0, "start must be word aligned");

            let mut buf = String::new();
            let mut pc = start;
            while pc < end {
                if let Some(name) = labels.get(&pc) { let _ = writeln!(buf, "{name}:"); }
                let Some(line) = render_word(&img, pc, &labels, show_bytes) else {
                    let _ = writeln!(buf, "{pc:#08x}: <oob>");
                    break;
                };
                let _ = writeln!(buf, "{line}");
                pc = pc.wrapping_add(WORD);
            }
            emit(&buf, out.as_deref())?;
        }
        Command::Analyze { entries, max_instr, format, listing, out } => {
            let mut seeds: Vec<u32> = if entries.is_empty() {
                vec![0]
            } else {
                entries.iter().map(|e| parse_addr(e)).collect::<Result<_>>()?
            };
            seeds.sort_unstable();
            seeds.dedup();

            let analysis = analyze_entries(&img, &seeds, max_instr);
            debug!(visited = analysis.visited.len(), invalid = analysis.invalid.len(), "analysis done");
            let blks: Vec<Block> = blocks(&analysis, &seeds);
            let edges = block_edges(&analysis, &blks);

            let mut buf = String::new();
            match format {
                OutputFormat::Json => {
                    let report = Report {
                        entries: seeds.clone(),
                        blocks: blks.iter().map(|b| BlockOut {
                            start: b.start,
                            end: b.end,
                            insns: (b.start..b.end)
                                .step_by(WORD as usize)
                                .filter_map(|pc| render_word(&img, pc, &labels, false))
                                .collect(),
                        }).collect(),
                        edges,
                        invalid: analysis.invalid.iter().copied().collect(),
                    };
                    buf = serde_json::to_string_pretty(&report)?;
                    buf.push('\n');
                }
                OutputFormat::Text => {
                    let _ = writeln!(buf, "Analysis summary ({}):", img.name);
                    let _ = writeln!(buf, "  entries   : {:?}", seeds.iter().map(|a| format!("{a:#08x}")).collect::<Vec<_>>());
                    let _ = writeln!(buf, "  insts     : {}", analysis.visited.len());
                    let _ = writeln!(buf, "  blocks    : {}", blks.len());
                    let _ = writeln!(buf, "  edges     : {}", edges.len());
                    let _ = writeln!(buf, "  invalid   : {}", analysis.invalid.len());
                    let _ = writeln!(buf, "Edges:");
                    for e in &edges {
                        let _ = writeln!(buf, "  {:#08x} -> {:#08x} ({})", e.from, e.to, e.kind);
                    }
                    if listing {
                        let _ = writeln!(buf, "\nListing (analyzed PCs):");
                        for &pc in &analysis.visited {
                            if let Some(name) = labels.get(&pc) { let _ = writeln!(buf, "{name}:"); }
                            if let Some(line) = render_word(&img, pc, &labels, false) {
                                let _ = writeln!(buf, "  {line}");
                            }
                        }
                    }
                }
            }
            emit(&buf, out.as_deref())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_in_hex_and_decimal() {
        assert_eq!(parse_addr("0x10").unwrap(), 0x10);
        assert_eq!(parse_addr("16").unwrap(), 16);
        assert!(parse_addr("zz").is_err());
    }

    #[test]
    fn render_word_uses_labels_and_bytes() {
        let img = Image { name: "t".into(), bytes: vec![0x0D, 0, 0, 8, 0xFE, 0xFE, 0xFE, 0x00] };
        let labels = HashMap::from([(8u32, "end".to_string())]);
        assert_eq!(render_word(&img, 0, &labels, false).unwrap(), "0x000000: jmp end");
        assert_eq!(
            render_word(&img, 0, &HashMap::new(), true).unwrap(),
            "0x000000: 0d 00 00 08   jmp 8"
        );
        assert!(render_word(&img, 4, &labels, false).unwrap().contains("invalid fe fe fe 00"));
        assert!(render_word(&img, 8, &labels, false).is_none());
    }
}
