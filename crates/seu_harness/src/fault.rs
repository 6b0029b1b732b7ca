//! Seeded random fault model.
//!
//! Each cycle draws a flip count from Poisson(λ), then an independent,
//! uniformly distributed (cell, bit) target per flip. The draw sequence is a
//! pure function of the seed, λ, and the memory geometry.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Poisson};
use seu_sim::MAX_WORD_BITS;

use crate::error::HarnessError;

/// One injected bit flip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FaultEvent {
    /// The cycle in which the flip was applied.
    pub cycle: u64,
    /// The memory cell.
    pub cell: usize,
    /// The bit within the cell.
    pub bit: u32,
}

/// Random source for per-cycle fault draws.
#[derive(Clone, Debug)]
pub struct FaultModel {
    rng: StdRng,
    /// `None` when λ is zero: no draws are ever made.
    flips: Option<Poisson<f64>>,
    lambda: f64,
    seed: u64,
    depth: usize,
    width: u32,
}

impl FaultModel {
    /// Creates a fault model for a `depth` x `width` memory.
    pub fn new(lambda: f64, seed: u64, depth: usize, width: u32) -> Result<Self, HarnessError> {
        check_geometry(depth, width)?;
        if !lambda.is_finite() || lambda < 0.0 {
            return Err(HarnessError::InvalidRate(lambda));
        }
        let flips = if lambda > 0.0 {
            Some(Poisson::new(lambda).map_err(|_| HarnessError::InvalidRate(lambda))?)
        } else {
            None
        };
        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            flips,
            lambda,
            seed,
            depth,
            width,
        })
    }

    /// Mean flips per cycle.
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// The seed the draw sequence was started from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draws the number of flips for one cycle.
    pub fn draw_count(&mut self) -> u64 {
        match &self.flips {
            Some(dist) => {
                let count: f64 = dist.sample(&mut self.rng);
                count as u64
            }
            None => 0,
        }
    }

    /// Draws one flip target.
    pub fn draw_target(&mut self, cycle: u64) -> FaultEvent {
        let cell = self.rng.gen_range(0..self.depth);
        let bit = self.rng.gen_range(0..self.width);
        FaultEvent { cycle, cell, bit }
    }

    /// Draws every flip for one cycle.
    pub fn draw_cycle(&mut self, cycle: u64) -> Vec<FaultEvent> {
        let count = self.draw_count();
        (0..count).map(|_| self.draw_target(cycle)).collect()
    }
}

/// Verifies a memory geometry can be tracked with `u64` masks.
pub(crate) fn check_geometry(depth: usize, width: u32) -> Result<(), HarnessError> {
    if depth == 0 || width == 0 || width > MAX_WORD_BITS {
        return Err(HarnessError::UnsupportedGeometry { depth, width });
    }
    Ok(())
}

/// A seed from the wall clock, in whole seconds since the Unix epoch.
pub fn seed_from_clock() -> Result<u64, HarnessError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| HarnessError::Entropy(e.to_string()))
}
