//! The campaign command: merge settings, build the design, run, report.
//!
//! The statistics report goes to stdout. Everything else is logged to
//! stderr through `tracing`.

use std::fmt::Write as _;

use seu_config::{CampaignConfig, ReportFormat};
use seu_harness::{
    run_campaign, run_sweep, seed_from_clock, HarnessConfig, HarnessError, RunOutcome,
    SweepSummary, TracingObserver,
};
use seu_sim::{ReferenceDut, Traffic};
use tracing::{info, warn};

use crate::Cli;

/// Runs a campaign as described by `cli`. Returns the process exit code.
pub fn run(cli: &Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            info!(path = %path.display(), "loading campaign file");
            seu_config::load_config(path)?
        }
        None => CampaignConfig::default(),
    };
    apply_overrides(&mut config, cli);
    seu_config::validate_config(&config)?;

    let seed = match config.run.seed {
        Some(seed) => seed,
        None => seed_from_clock()?,
    };
    info!(seed, "fault-model seed");

    let harness = HarnessConfig {
        cycles: cli.cycles,
        lambda: cli.lambda,
        seed: Some(seed),
        waveform_path: config.output.waveform.clone(),
        dump_memory: config.output.dump_memory,
    };
    let dut = &config.dut;
    let build = || -> Result<ReferenceDut, HarnessError> {
        Ok(ReferenceDut::new(
            dut.addr_bits,
            dut.data_bits,
            dut.code,
            dut.traffic,
        )?)
    };

    let report = if config.run.runs == 1 {
        let outcome = run_campaign(build()?, &harness, Box::new(TracingObserver))?;
        render_single(&outcome, config.output.format)?
    } else {
        if harness.waveform_path.is_some() {
            warn!("waveform capture is disabled for multi-run sweeps");
        }
        let seeds = sweep_seeds(seed, config.run.runs);
        let outcomes = run_sweep(build, &harness, &seeds)?;
        render_sweep(&outcomes, config.output.format)?
    };
    print!("{report}");
    Ok(0)
}

/// Applies command-line flags on top of the campaign file.
fn apply_overrides(config: &mut CampaignConfig, cli: &Cli) {
    if let Some(bits) = cli.addr_bits {
        config.dut.addr_bits = bits;
    }
    if let Some(bits) = cli.data_bits {
        config.dut.data_bits = bits;
    }
    if let Some(code) = cli.code {
        config.dut.code = code.into();
    }
    if let Some(n) = cli.write_every {
        config.dut.traffic = Traffic::WriteEvery(n);
    }
    if let Some(seed) = cli.seed {
        config.run.seed = Some(seed);
    }
    if let Some(runs) = cli.runs {
        config.run.runs = runs;
    }
    if let Some(path) = &cli.waveform {
        config.output.waveform = Some(path.clone());
    }
    if let Some(format) = cli.format {
        config.output.format = format.into();
    }
    if cli.dump_memory {
        config.output.dump_memory = true;
    }
}

/// Seeds `seed, seed + 1, ...` for `runs` runs.
fn sweep_seeds(seed: u64, runs: u32) -> Vec<u64> {
    (0..u64::from(runs)).map(|i| seed.wrapping_add(i)).collect()
}

fn render_single(outcome: &RunOutcome, format: ReportFormat) -> Result<String, HarnessError> {
    match format {
        ReportFormat::Json => Ok(outcome.to_json()? + "\n"),
        ReportFormat::Text => {
            let mut out = outcome.statistics.to_string();
            if let Some(dump) = &outcome.memory_dump {
                out.push_str(&dump.to_string());
            }
            Ok(out)
        }
    }
}

fn render_sweep(outcomes: &[RunOutcome], format: ReportFormat) -> Result<String, HarnessError> {
    let summary = SweepSummary::from_outcomes(outcomes);
    match format {
        ReportFormat::Json => {
            let value = serde_json::json!({
                "runs": outcomes,
                "summary": summary,
            });
            Ok(serde_json::to_string_pretty(&value)? + "\n")
        }
        ReportFormat::Text => {
            let mut out = String::new();
            for outcome in outcomes {
                let _ = writeln!(out, "# seed {}", outcome.seed);
                out.push_str(&render_single(outcome, ReportFormat::Text)?);
            }
            if let Some(summary) = summary {
                out.push_str("# summary\n");
                out.push_str(&summary.to_string());
            }
            Ok(out)
        }
    }
}
