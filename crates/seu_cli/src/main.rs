//! `seu`: run a fault-injection campaign against the reference memory
//! controller and print the read-error statistics.
//!
//! The two positional parameters are the cycle count and the mean number of
//! bit flips per cycle. Everything else comes from flags, an optional
//! `seu.toml`, or built-in defaults, in that order of precedence.

#![warn(missing_docs)]

mod campaign;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, ValueEnum};
use seu_config::ReportFormat;
use seu_sim::CodeKind;
use tracing_subscriber::EnvFilter;

/// Inject random single-event upsets into a simulated ECC memory
/// controller and classify every memory read.
#[derive(Parser, Debug)]
#[command(name = "seu", version, about = "SEU fault-injection harness")]
pub struct Cli {
    /// Clock cycles to simulate.
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub cycles: u64,

    /// Mean bit flips per cycle (Poisson rate).
    #[arg(value_parser = parse_rate, allow_negative_numbers = true)]
    pub lambda: f64,

    /// Fault-model seed (default: wall-clock seconds).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Path to a `seu.toml` campaign file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Address width of the reference design; depth is 2^n cells.
    #[arg(long)]
    pub addr_bits: Option<u32>,

    /// Data bits per cell of the reference design.
    #[arg(long)]
    pub data_bits: Option<u32>,

    /// Error-correcting code of the reference design.
    #[arg(long, value_enum)]
    pub code: Option<CodeArg>,

    /// Make every n-th request a write.
    #[arg(long)]
    pub write_every: Option<u32>,

    /// Write a VCD waveform to this path.
    #[arg(long)]
    pub waveform: Option<PathBuf>,

    /// Report format.
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Print the final memory contents after the report.
    #[arg(long)]
    pub dump_memory: bool,

    /// Independent runs with consecutive seeds.
    #[arg(long)]
    pub runs: Option<u32>,

    /// More log output on stderr (repeat for trace level).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Error-correcting code selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CodeArg {
    /// No check bits.
    Identity,
    /// Single even-parity bit.
    Parity,
    /// Hsiao SEC-DED.
    Hsiao,
}

impl From<CodeArg> for CodeKind {
    fn from(arg: CodeArg) -> Self {
        match arg {
            CodeArg::Identity => CodeKind::Identity,
            CodeArg::Parity => CodeKind::Parity,
            CodeArg::Hsiao => CodeKind::Hsiao,
        }
    }
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// `name: value` lines.
    Text,
    /// A JSON object.
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

/// Parses a fault rate: a finite, non-negative real.
fn parse_rate(s: &str) -> Result<f64, String> {
    let rate: f64 = s.parse().map_err(|e| format!("'{s}' is not a number: {e}"))?;
    if !rate.is_finite() || rate < 0.0 {
        return Err(format!("'{s}' must be finite and non-negative"));
    }
    Ok(rate)
}

/// Default log filter for the verbosity flags. `RUST_LOG` overrides it.
fn log_filter(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter(verbose, quiet)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match campaign::run(&cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
