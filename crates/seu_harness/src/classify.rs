//! Outcome classification of observed SRAM accesses.
//!
//! The classifier never looks at the DUT's own error flags. A read is scored
//! purely by how many bits of the addressed cell the shadow mask says are
//! corrupted.

use seu_sim::{Dut, Signal};

use crate::error::HarnessError;
use crate::shadow::ShadowErrorMask;
use crate::stats::RunStatistics;

/// SRAM access presented before a clock edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SramAccess {
    /// Clock-enable low.
    Idle,
    /// Clock-enable high, write-enable low.
    Read {
        /// Addressed cell.
        cell: usize,
    },
    /// Clock-enable and write-enable high.
    Write {
        /// Addressed cell.
        cell: usize,
    },
}

impl SramAccess {
    /// Samples the settled SRAM control signals of `dut`.
    pub fn sample<D: Dut + ?Sized>(dut: &D) -> Result<Self, HarnessError> {
        if !dut.flag(Signal::SramClkEn)? {
            return Ok(Self::Idle);
        }
        let addr = dut.signal(Signal::SramAddr)?;
        let depth = dut.memory_depth();
        let cell = usize::try_from(addr)
            .ok()
            .filter(|&c| c < depth)
            .ok_or(HarnessError::AddressOutOfRange { addr, depth })?;
        if dut.flag(Signal::SramWriteEn)? {
            Ok(Self::Write { cell })
        } else {
            Ok(Self::Read { cell })
        }
    }
}

/// Scores a read of `cell` into the histogram. Returns the error count.
pub fn classify_read(
    shadow: &ShadowErrorMask,
    stats: &mut RunStatistics,
    cell: usize,
) -> Result<u32, HarnessError> {
    let errors = shadow.error_count(cell)?;
    stats.record_read(errors);
    Ok(errors)
}

/// Applies a committed write of `cell`: the whole word is now clean.
/// Returns how many corrupted bits the write overwrote.
pub fn clear_write(
    shadow: &mut ShadowErrorMask,
    stats: &mut RunStatistics,
    cell: usize,
) -> Result<u32, HarnessError> {
    // Assumes full-word writes. A masked write would have to clear per bit.
    let cleared = shadow.clear(cell)?;
    stats.sram_writes += 1;
    Ok(cleared)
}
