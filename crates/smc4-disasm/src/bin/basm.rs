use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use smc4_rs::assemble;

#[derive(Parser, Debug)]
#[command(author, version, about = "SMC4 assembler")]
struct Opts {
    /// Input assembly file (one instruction, label or comment per line)
    #[arg(value_name = "SOURCE")]
    input: PathBuf,
    /// Output binary (default: `<input stem>.bin` next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Also write the symbol table as JSON
    #[arg(long, value_name = "FILE")]
    symbols: Option<PathBuf>,
}

/// Sibling path with the same stem and a `.bin` extension.
fn output_path(input: &Path) -> PathBuf {
    input.with_extension("bin")
}

/// Where the image goes. Never the source itself, which a `.bin` input
/// would otherwise become.
fn destination(input: &Path, output: Option<&Path>) -> Result<PathBuf> {
    let out = output.map_or_else(|| output_path(input), Path::to_path_buf);
    let same = out == input
        || matches!(
            (fs::canonicalize(&out), fs::canonicalize(input)),
            (Ok(a), Ok(b)) if a == b
        );
    anyhow::ensure!(!same, "output {} would overwrite the source file", out.display());
    Ok(out)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    let text = fs::read_to_string(&opts.input)
        .with_context(|| format!("reading {}", opts.input.display()))?;
    let asm = assemble(&text)?;

    let out = destination(&opts.input, opts.output.as_deref())?;
    let existed = out.exists();
    fs::write(&out, &asm.image).with_context(|| format!("writing {}", out.display()))?;
    if existed {
        let name = out.file_name().unwrap_or(out.as_os_str()).to_string_lossy();
        println!("file '{name}' already existed and was overwritten");
    }
    info!(path = %out.display(), bytes = asm.image.len(), "image written");

    if let Some(path) = &opts.symbols {
        let json = serde_json::to_string_pretty(&asm.symbols)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}
