//! Error types for harness runs.

use seu_sim::SimError;

/// Errors that end a harness run.
///
/// A run is all-or-nothing: any of these aborts it, and no partial
/// statistics are reported.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// The DUT adapter failed.
    #[error(transparent)]
    Sim(#[from] SimError),

    /// The mean fault rate is negative or not a finite number.
    #[error("invalid fault rate {0}: must be finite and non-negative")]
    InvalidRate(f64),

    /// A run was requested with zero cycles.
    #[error("cycle count must be positive")]
    ZeroCycles,

    /// The DUT reports a memory the harness cannot track.
    #[error("unsupported memory geometry: {depth} cells of {width} bits")]
    UnsupportedGeometry {
        /// Number of memory cells.
        depth: usize,
        /// Memory word width in bits.
        width: u32,
    },

    /// A fault target fell outside the memory. Indicates a broken draw.
    #[error("fault target cell {cell} bit {bit} outside {depth}x{width} memory")]
    FaultOutOfRange {
        /// The drawn cell.
        cell: usize,
        /// The drawn bit.
        bit: u32,
        /// Number of memory cells.
        depth: usize,
        /// Memory word width in bits.
        width: u32,
    },

    /// The DUT presented an SRAM address outside the memory.
    #[error("SRAM address {addr} outside memory depth {depth}")]
    AddressOutOfRange {
        /// The presented address.
        addr: u64,
        /// Number of memory cells.
        depth: usize,
    },

    /// No seed was given and the system clock could not provide one.
    #[error("entropy source unavailable: {0}")]
    Entropy(String),

    /// A report could not be serialized.
    #[error("report serialization failed: {0}")]
    Report(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_rate_display() {
        let e = HarnessError::InvalidRate(-0.5);
        assert_eq!(
            e.to_string(),
            "invalid fault rate -0.5: must be finite and non-negative"
        );
    }

    #[test]
    fn zero_cycles_display() {
        assert_eq!(
            HarnessError::ZeroCycles.to_string(),
            "cycle count must be positive"
        );
    }

    #[test]
    fn fault_out_of_range_display() {
        let e = HarnessError::FaultOutOfRange {
            cell: 16,
            bit: 3,
            depth: 16,
            width: 16,
        };
        assert_eq!(
            e.to_string(),
            "fault target cell 16 bit 3 outside 16x16 memory"
        );
    }

    #[test]
    fn address_out_of_range_display() {
        let e = HarnessError::AddressOutOfRange { addr: 40, depth: 32 };
        assert_eq!(e.to_string(), "SRAM address 40 outside memory depth 32");
    }

    #[test]
    fn sim_error_is_transparent() {
        let e: HarnessError = SimError::UnknownSignal("x".into()).into();
        assert_eq!(e.to_string(), "unknown signal 'x'");
    }
}
