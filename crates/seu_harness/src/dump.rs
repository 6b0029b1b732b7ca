//! End-of-run memory dump.

use std::fmt;

use serde::Serialize;
use seu_sim::Dut;

use crate::error::HarnessError;
use crate::shadow::ShadowErrorMask;

/// One memory cell at the end of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DumpRow {
    /// Cell index.
    pub cell: usize,
    /// Word physically stored in the DUT.
    pub word: u64,
    /// Shadow mask of bits still corrupted.
    pub mask: u64,
}

impl DumpRow {
    /// The stored word with every tracked flip undone.
    pub fn clean(&self) -> u64 {
        self.word ^ self.mask
    }
}

/// Snapshot of the DUT memory alongside the shadow masks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MemoryDump {
    /// Bits per cell.
    pub width: u32,
    /// One row per cell, in index order.
    pub rows: Vec<DumpRow>,
}

impl MemoryDump {
    /// Reads every cell of `dut` and pairs it with its shadow mask.
    pub fn capture<D: Dut + ?Sized>(
        dut: &D,
        shadow: &ShadowErrorMask,
    ) -> Result<Self, HarnessError> {
        let rows = shadow
            .iter()
            .map(|(cell, mask)| {
                Ok(DumpRow {
                    cell,
                    word: dut.memory_word(cell)?,
                    mask,
                })
            })
            .collect::<Result<Vec<_>, HarnessError>>()?;
        Ok(Self {
            width: shadow.width(),
            rows,
        })
    }

    /// Cells whose stored word still differs from the clean value.
    pub fn corrupted(&self) -> impl Iterator<Item = &DumpRow> {
        self.rows.iter().filter(|r| r.mask != 0)
    }
}

impl fmt::Display for MemoryDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = (self.width as usize).div_ceil(4).max(6);
        let index_digits = format!("{:x}", self.rows.len().saturating_sub(1)).len().max(2);
        writeln!(
            f,
            "{:idx$}  {:>w$}  {:>w$}  {:>w$}",
            "",
            "memory",
            "flip",
            "real",
            idx = index_digits,
            w = digits
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:0idx$x}: {:0w$x}  {:0w$x}  {:0w$x}",
                row.cell,
                row.word,
                row.mask,
                row.clean(),
                idx = index_digits,
                w = digits
            )?;
        }
        Ok(())
    }
}
