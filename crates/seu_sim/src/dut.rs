//! The DUT adapter contract.
//!
//! A [`Dut`] wraps one clocked design instance. The harness only ever talks
//! to the design through this trait: it drives the clock, reads interface
//! signals by name, and flips stored memory bits directly, bypassing the
//! design's own write path.

use crate::error::SimError;
use crate::signal::Signal;

/// Widest memory word (and signal) a DUT adapter may expose.
pub const MAX_WORD_BITS: u32 = 64;

/// Returns a mask with the low `width` bits set.
pub fn word_mask(width: u32) -> u64 {
    if width >= MAX_WORD_BITS {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// A clocked design under test with a directly accessible memory array.
///
/// Signal values are two-state and at most [`MAX_WORD_BITS`] wide. Writes
/// through [`set_signal`](Dut::set_signal) take effect at the next
/// [`settle`](Dut::settle); reads return the most recently settled value.
/// `settle` must be deterministic: identical inputs give identical outputs.
pub trait Dut {
    /// Propagates all pending input changes, evaluating clock edges.
    fn settle(&mut self) -> Result<(), SimError>;

    /// Returns the settled value of a signal.
    fn signal(&self, signal: Signal) -> Result<u64, SimError>;

    /// Drives an input signal. Takes effect at the next settle.
    fn set_signal(&mut self, signal: Signal, value: u64) -> Result<(), SimError>;

    /// Returns the width of a signal in bits.
    fn signal_width(&self, signal: Signal) -> Result<u32, SimError>;

    /// Width of one memory cell in bits.
    fn memory_width(&self) -> u32;

    /// Number of memory cells.
    fn memory_depth(&self) -> usize;

    /// Reads one stored memory bit.
    fn memory_bit(&self, cell: usize, bit: u32) -> Result<bool, SimError>;

    /// Overwrites one stored memory bit without going through the design.
    fn set_memory_bit(&mut self, cell: usize, bit: u32, value: bool) -> Result<(), SimError>;

    /// Reads a whole memory cell.
    fn memory_word(&self, cell: usize) -> Result<u64, SimError> {
        let mut word = 0u64;
        for bit in 0..self.memory_width().min(MAX_WORD_BITS) {
            if self.memory_bit(cell, bit)? {
                word |= 1 << bit;
            }
        }
        Ok(word)
    }

    /// Reads a single-bit signal as a boolean.
    fn flag(&self, signal: Signal) -> Result<bool, SimError> {
        Ok(self.signal(signal)? != 0)
    }

    /// Drives the clock to `level` and settles.
    fn drive_clock(&mut self, level: bool) -> Result<(), SimError> {
        self.set_signal(Signal::Clock, u64::from(level))?;
        self.settle()
    }

    /// Drives the clock low once and settles.
    fn reset(&mut self) -> Result<(), SimError> {
        self.drive_clock(false)
    }

    /// One full clock cycle: rising edge, settle, falling edge, settle.
    fn pulse_clock(&mut self) -> Result<(), SimError> {
        self.drive_clock(true)?;
        self.drive_clock(false)
    }
}
