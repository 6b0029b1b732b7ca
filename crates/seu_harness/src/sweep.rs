//! Parallel seed sweeps.
//!
//! Every seed gets its own DUT, fault model, and driver, so runs share no
//! state and the outcome of each is the same as running it alone.

use std::fmt;

use rayon::prelude::*;
use serde::Serialize;
use seu_sim::Dut;
use tracing::info;

use crate::error::HarnessError;
use crate::hooks::NullObserver;
use crate::{run_campaign, HarnessConfig, RunOutcome};

/// Runs one campaign per seed in parallel.
///
/// `factory` builds a fresh DUT for each run. Waveform capture is disabled
/// for every run. Outcomes are returned in seed order.
pub fn run_sweep<D, F>(
    factory: F,
    config: &HarnessConfig,
    seeds: &[u64],
) -> Result<Vec<RunOutcome>, HarnessError>
where
    D: Dut,
    F: Fn() -> Result<D, HarnessError> + Sync,
{
    info!(runs = seeds.len(), cycles = config.cycles, lambda = config.lambda, "starting seed sweep");
    seeds
        .par_iter()
        .map(|&seed| {
            let run_config = HarnessConfig {
                seed: Some(seed),
                waveform_path: None,
                ..config.clone()
            };
            run_campaign(factory()?, &run_config, Box::new(NullObserver))
        })
        .collect()
}

/// Averages over the outcomes of a sweep.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SweepSummary {
    /// Number of runs averaged.
    pub runs: usize,
    /// Seeds of the runs, in order.
    pub seeds: Vec<u64>,
    /// Mean of `errors_injected`.
    pub mean_errors_injected: f64,
    /// Per-bucket mean of `read_with_errors`.
    pub mean_read_with_errors: Vec<f64>,
}

impl SweepSummary {
    /// Summarizes `outcomes`. Returns `None` when there are none.
    pub fn from_outcomes(outcomes: &[RunOutcome]) -> Option<Self> {
        let first = outcomes.first()?;
        let runs = outcomes.len();
        let n = runs as f64;
        let buckets = first.statistics.read_with_errors.len();

        let mut totals = vec![0u64; buckets];
        for outcome in outcomes {
            for (total, count) in totals
                .iter_mut()
                .zip(&outcome.statistics.read_with_errors)
            {
                *total += count;
            }
        }
        let injected: u64 = outcomes
            .iter()
            .map(|o| o.statistics.errors_injected)
            .sum();

        Some(Self {
            runs,
            seeds: outcomes.iter().map(|o| o.seed).collect(),
            mean_errors_injected: injected as f64 / n,
            mean_read_with_errors: totals.into_iter().map(|t| t as f64 / n).collect(),
        })
    }
}

impl fmt::Display for SweepSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "runs: {}", self.runs)?;
        writeln!(f, "mean_errors_injected: {:.3}", self.mean_errors_injected)?;
        for (i, mean) in self.mean_read_with_errors.iter().enumerate() {
            writeln!(f, "mean_read_with_errors[{i}] = {mean:.3}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seu_sim::{CodeKind, ReferenceDut, Traffic};

    fn factory() -> Result<ReferenceDut, HarnessError> {
        Ok(ReferenceDut::new(3, 8, CodeKind::Hsiao, Traffic::ReadSweep)?)
    }

    fn config(lambda: f64) -> HarnessConfig {
        HarnessConfig {
            cycles: 2_000,
            lambda,
            ..HarnessConfig::default()
        }
    }

    #[test]
    fn outcomes_follow_seed_order() {
        let seeds = [9, 3, 7, 1];
        let outcomes = run_sweep(factory, &config(0.01), &seeds).unwrap();
        let got: Vec<u64> = outcomes.iter().map(|o| o.seed).collect();
        assert_eq!(got, seeds);
    }

    #[test]
    fn sweep_matches_single_runs() {
        let seeds = [11, 12];
        let outcomes = run_sweep(factory, &config(0.02), &seeds).unwrap();
        for (outcome, &seed) in outcomes.iter().zip(&seeds) {
            let single = run_campaign(
                factory().unwrap(),
                &HarnessConfig {
                    seed: Some(seed),
                    ..config(0.02)
                },
                Box::new(NullObserver),
            )
            .unwrap();
            assert_eq!(outcome.statistics, single.statistics);
        }
    }

    #[test]
    fn summary_means() {
        let seeds = [1, 2, 3];
        let outcomes = run_sweep(factory, &config(0.0), &seeds).unwrap();
        let summary = SweepSummary::from_outcomes(&outcomes).unwrap();
        assert_eq!(summary.runs, 3);
        assert_eq!(summary.seeds, vec![1, 2, 3]);
        assert_eq!(summary.mean_errors_injected, 0.0);
        assert_eq!(summary.mean_read_with_errors[0], 2_000.0);
        assert!(summary.mean_read_with_errors[1..].iter().all(|&m| m == 0.0));
    }

    #[test]
    fn empty_summary() {
        assert!(SweepSummary::from_outcomes(&[]).is_none());
    }

    #[test]
    fn factory_errors_propagate() {
        let bad = || -> Result<ReferenceDut, HarnessError> {
            Ok(ReferenceDut::new(0, 8, CodeKind::Hsiao, Traffic::ReadSweep)?)
        };
        assert!(run_sweep(bad, &config(0.0), &[1]).is_err());
    }
}
