//! Fault-injection harness for error-correcting memory controllers.
//!
//! The harness runs a clocked design through the [`Dut`] adapter trait,
//! flips randomly chosen stored memory bits every cycle, and keeps its own
//! record of which bits are corrupted. Every SRAM read the design issues is
//! scored by how many corrupted bits the addressed cell holds at that
//! moment, independently of what the design itself reports.
//!
//! # Usage
//!
//! ```ignore
//! use seu_harness::{run_campaign, HarnessConfig, NullObserver};
//!
//! let config = HarnessConfig { cycles: 1_000_000, lambda: 1e-4, seed: Some(1), ..Default::default() };
//! let outcome = run_campaign(dut, &config, Box::new(NullObserver))?;
//! print!("{}", outcome.statistics);
//! ```
//!
//! # Modules
//!
//! - `error`: Harness error types
//! - `fault`: Seeded Poisson fault model
//! - `shadow`: Ground-truth corruption masks
//! - `classify`: SRAM access sampling and read classification
//! - `stats`: Run counters and the text report
//! - `hooks`: Per-cycle observer callbacks
//! - `driver`: The clock driver sequencing each cycle
//! - `dump`: End-of-run memory dump
//! - `sweep`: Parallel runs over many seeds

#![warn(missing_docs)]

pub mod classify;
pub mod driver;
pub mod dump;
pub mod error;
pub mod fault;
pub mod hooks;
pub mod shadow;
pub mod stats;
pub mod sweep;

use std::path::PathBuf;

use serde::Serialize;
use seu_sim::Dut;
use tracing::{debug, info};

pub use classify::SramAccess;
pub use driver::ClockDriver;
pub use dump::{DumpRow, MemoryDump};
pub use error::HarnessError;
pub use fault::{seed_from_clock, FaultEvent, FaultModel};
pub use hooks::{CycleObserver, NullObserver, ResponseEvent, TracingObserver};
pub use shadow::ShadowErrorMask;
pub use stats::RunStatistics;
pub use sweep::{run_sweep, SweepSummary};

/// Parameters of one fault-injection run.
#[derive(Clone, Debug, Default)]
pub struct HarnessConfig {
    /// Clock cycles to run. Must be positive.
    pub cycles: u64,
    /// Mean bit flips per cycle.
    pub lambda: f64,
    /// Fault-model seed. `None` takes one from the wall clock.
    pub seed: Option<u64>,
    /// VCD output path. `None` disables waveform capture.
    pub waveform_path: Option<PathBuf>,
    /// Capture a memory dump at the end of the run.
    pub dump_memory: bool,
}

/// Everything a completed run produced.
#[derive(Clone, Debug, Serialize)]
pub struct RunOutcome {
    /// The seed the fault model used.
    pub seed: u64,
    /// Mean flips per cycle.
    pub lambda: f64,
    /// Counters.
    #[serde(flatten)]
    pub statistics: RunStatistics,
    /// Final memory contents, if requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_dump: Option<MemoryDump>,
}

impl RunOutcome {
    /// Pretty-printed JSON report.
    pub fn to_json(&self) -> Result<String, HarnessError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Runs `dut` for `config.cycles` cycles with random faults.
///
/// The run is all-or-nothing: an error from the DUT or an out-of-range
/// fault aborts it. Errors the DUT itself reports are only counted.
pub fn run_campaign<D: Dut>(
    dut: D,
    config: &HarnessConfig,
    observer: Box<dyn CycleObserver>,
) -> Result<RunOutcome, HarnessError> {
    if config.cycles == 0 {
        return Err(HarnessError::ZeroCycles);
    }
    let seed = match config.seed {
        Some(seed) => seed,
        None => seed_from_clock()?,
    };

    let mut driver = ClockDriver::new(dut, config.lambda, seed)?;
    driver.set_observer(observer);
    if let Some(path) = &config.waveform_path {
        debug!(path = %path.display(), "recording waveform");
        driver.attach_waveform(seu_sim::vcd_file(path)?)?;
    }

    debug!(
        seed,
        lambda = config.lambda,
        cycles = config.cycles,
        depth = driver.shadow().depth(),
        width = driver.shadow().width(),
        "run started"
    );
    driver.run(config.cycles)?;

    let memory_dump = if config.dump_memory {
        Some(driver.memory_dump()?)
    } else {
        None
    };
    let statistics = driver.finish()?;
    info!(
        seed,
        errors_injected = statistics.errors_injected,
        reads = statistics.total_reads(),
        "run complete"
    );

    Ok(RunOutcome {
        seed,
        lambda: config.lambda,
        statistics,
        memory_dump,
    })
}
