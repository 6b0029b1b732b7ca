//! Ground-truth record of injected corruption.
//!
//! One mask per memory cell. Bit `b` of cell `c` is set exactly when a flip
//! was injected there and no write to `c` has been observed since. Flipping
//! an already-flipped bit restores the stored value, so the mask toggles.

use serde::Serialize;

use crate::error::HarnessError;
use crate::fault::check_geometry;

/// Per-cell bit masks of currently corrupted stored bits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ShadowErrorMask {
    masks: Vec<u64>,
    width: u32,
}

impl ShadowErrorMask {
    /// A clean mask for a `depth` x `width` memory.
    pub fn new(depth: usize, width: u32) -> Result<Self, HarnessError> {
        check_geometry(depth, width)?;
        Ok(Self {
            masks: vec![0; depth],
            width,
        })
    }

    /// Number of cells.
    pub fn depth(&self) -> usize {
        self.masks.len()
    }

    /// Bits per cell.
    pub fn width(&self) -> u32 {
        self.width
    }

    fn check_cell(&self, cell: usize) -> Result<(), HarnessError> {
        if cell >= self.masks.len() {
            return Err(HarnessError::AddressOutOfRange {
                addr: cell as u64,
                depth: self.masks.len(),
            });
        }
        Ok(())
    }

    /// Records a flip of `bit` in `cell`.
    pub fn toggle(&mut self, cell: usize, bit: u32) -> Result<(), HarnessError> {
        if cell >= self.masks.len() || bit >= self.width {
            return Err(HarnessError::FaultOutOfRange {
                cell,
                bit,
                depth: self.masks.len(),
                width: self.width,
            });
        }
        self.masks[cell] ^= 1 << bit;
        Ok(())
    }

    /// The corruption mask of `cell`.
    pub fn mask(&self, cell: usize) -> Result<u64, HarnessError> {
        self.check_cell(cell)?;
        Ok(self.masks[cell])
    }

    /// Number of corrupted bits in `cell`.
    pub fn error_count(&self, cell: usize) -> Result<u32, HarnessError> {
        Ok(self.mask(cell)?.count_ones())
    }

    /// Forgets all corruption in `cell`, returning how many bits were set.
    pub fn clear(&mut self, cell: usize) -> Result<u32, HarnessError> {
        self.check_cell(cell)?;
        let cleared = self.masks[cell].count_ones();
        self.masks[cell] = 0;
        Ok(cleared)
    }

    /// Corrupted bits across the whole memory.
    pub fn total_errors(&self) -> u64 {
        self.masks.iter().map(|m| u64::from(m.count_ones())).sum()
    }

    /// Iterates over `(cell, mask)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.masks.iter().copied().enumerate()
    }
}
