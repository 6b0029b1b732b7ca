//! Simulation time for clock-edge driven runs.
//!
//! The harness advances time in half clock periods: every settle that
//! follows a clock edge is one half period later than the previous one.
//! [`SimTime`] counts nanoseconds, which is also the waveform timescale.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Nanoseconds per microsecond.
pub const NS_PER_US: u64 = 1_000;
/// Nanoseconds per millisecond.
pub const NS_PER_MS: u64 = 1_000_000;
/// Length of half a clock period in nanoseconds.
pub const HALF_PERIOD_NS: u64 = 5;

/// A simulation time point with nanosecond resolution.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SimTime {
    /// Simulation time in nanoseconds.
    pub ns: u64,
}

impl SimTime {
    /// Time zero.
    pub fn zero() -> Self {
        Self { ns: 0 }
    }

    /// Creates a time from a nanosecond value.
    pub fn from_ns(ns: u64) -> Self {
        Self { ns }
    }

    /// Returns the time one clock edge later.
    pub fn next_edge(&self) -> Self {
        Self {
            ns: self.ns + HALF_PERIOD_NS,
        }
    }

    /// Returns the time at which clock cycle `cycle` starts.
    pub fn at_cycle(cycle: u64) -> Self {
        Self {
            ns: cycle * 2 * HALF_PERIOD_NS,
        }
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = self.ns;
        if ns >= NS_PER_MS && ns.is_multiple_of(NS_PER_MS) {
            write!(f, "{} ms", ns / NS_PER_MS)
        } else if ns >= NS_PER_US && ns.is_multiple_of(NS_PER_US) {
            write!(f, "{} us", ns / NS_PER_US)
        } else {
            write!(f, "{ns} ns")
        }
    }
}
