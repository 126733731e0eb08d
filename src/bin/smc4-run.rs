use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use smc4_rs::exec::IntExecutor;
use smc4_rs::isa::smc4::Smc4Decoder;
use smc4_rs::observe::{Recorder, TextSink};
use smc4_rs::{Cpu, CpuConfig, Dump, Exit, LinearMemory, Program};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DumpMode {
    /// Nothing
    None,
    /// Final register file
    Regs,
    /// Register file after every step
    RegsEachStep,
    /// Final registers and the whole memory bank
    All,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Run an SMC4 binary image")]
struct Opts {
    #[arg(value_name = "BINFILE")]
    input: String,
    #[arg(long, value_enum, default_value_t = DumpMode::Regs)]
    dump: DumpMode,
    /// Print `pc: bytes` before each step
    #[arg(long)]
    trace: bool,
    /// Stop with an error after this many steps
    #[arg(long)]
    max_steps: Option<u64>,
    /// Text dumps or a JSON report of the final state
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl Opts {
    fn config(&self) -> CpuConfig {
        let mut dump = match self.dump {
            DumpMode::None => Dump::empty(),
            DumpMode::Regs => Dump::REGS_AT_END,
            DumpMode::RegsEachStep => Dump::REGS_EACH_STEP,
            DumpMode::All => Dump::REGS_AT_END | Dump::MEMORY_AT_END,
        };
        dump.set(Dump::TRACE, self.trace);
        CpuConfig {
            step_limit: self.max_steps,
            dump,
        }
    }
}

#[derive(Serialize)]
struct Fetch {
    pc: u32,
    bytes: [u8; 4],
}

#[derive(Serialize)]
struct Report<'a> {
    exit: Exit,
    pc: u32,
    steps: u64,
    registers: &'a [u8],
    #[serde(skip_serializing_if = "Option::is_none")]
    memory: Option<&'a [u8]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<Vec<Fetch>>,
}

/// Runs to completion and folds the final state, plus the fetch trace when
/// requested, into one JSON document.
fn json_report(opts: &Opts, prog: &Program) -> Result<String> {
    let mut cfg = opts.config();
    cfg.dump &= Dump::TRACE;
    let mut cpu = Cpu::new(cfg);
    let mut mem = LinearMemory::default();
    let mut rec = Recorder::default();
    let exit = cpu.run(prog, &mut mem, &Smc4Decoder::new(), &IntExecutor, &mut rec)?;
    let report = Report {
        exit,
        pc: cpu.pc,
        steps: cpu.steps,
        registers: &cpu.regs,
        memory: matches!(opts.dump, DumpMode::All).then_some(mem.mem.as_slice()),
        trace: opts.trace.then(|| {
            rec.fetches
                .iter()
                .map(|&(pc, bytes)| Fetch { pc, bytes })
                .collect()
        }),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    let bytes = std::fs::read(&opts.input).with_context(|| format!("reading {}", opts.input))?;
    let prog = Program::new(bytes)?;

    match opts.format {
        OutputFormat::Text => {
            let mut cpu = Cpu::new(opts.config());
            let mut mem = LinearMemory::default();
            let stdout = std::io::stdout();
            let mut sink = TextSink::new(stdout.lock());
            cpu.run(&prog, &mut mem, &Smc4Decoder::new(), &IntExecutor, &mut sink)?;
        }
        OutputFormat::Json => println!("{}", json_report(&opts, &prog)?),
    }
    Ok(())
}
