//! Configuration types deserialized from `seu.toml`.

use std::path::PathBuf;

use serde::Deserialize;
use seu_sim::{CodeKind, Traffic};

/// The top-level campaign configuration parsed from `seu.toml`.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct CampaignConfig {
    /// Shape of the reference design.
    #[serde(default)]
    pub dut: DutConfig,
    /// Seeding and repetition.
    #[serde(default)]
    pub run: RunConfig,
    /// Report and side-artifact settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// The reference write-back controller to simulate.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DutConfig {
    /// Address width; the memory has `2^addr_bits` cells.
    pub addr_bits: u32,
    /// Data bits per cell, before check bits are added.
    pub data_bits: u32,
    /// Error-correcting code protecting each cell.
    pub code: CodeKind,
    /// Request pattern on the controller's request port.
    pub traffic: Traffic,
}

impl Default for DutConfig {
    fn default() -> Self {
        Self {
            addr_bits: 4,
            data_bits: 11,
            code: CodeKind::Hsiao,
            traffic: Traffic::ReadSweep,
        }
    }
}

/// Seeding and repetition of the campaign.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RunConfig {
    /// Fault-model seed. Taken from the wall clock when absent.
    pub seed: Option<u64>,
    /// Independent runs, seeded `seed, seed + 1, ...`.
    pub runs: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: None,
            runs: 1,
        }
    }
}

/// What the campaign writes besides the report.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// VCD waveform path. Only honored for single runs.
    pub waveform: Option<PathBuf>,
    /// Report format.
    pub format: ReportFormat,
    /// Print the final memory contents after the report.
    pub dump_memory: bool,
}

/// Report output format.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Fixed `name: value` lines (default).
    #[default]
    Text,
    /// A JSON object.
    Json,
}
