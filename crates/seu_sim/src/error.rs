//! Error types for DUT adapters and waveform capture.
//!
//! All errors that can occur while driving a design under test, or while
//! writing its waveform, are represented as variants of [`SimError`].

use std::io;

use crate::signal::Signal;

/// Errors that can occur while stepping or probing a design under test.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A signal name did not match any known interface signal.
    #[error("unknown signal '{0}'")]
    UnknownSignal(String),

    /// The backend does not expose the requested signal.
    #[error("signal {0} is not available on this design")]
    SignalUnavailable(Signal),

    /// The signal is an output of the design and cannot be driven.
    #[error("signal {0} is not drivable")]
    NotDrivable(Signal),

    /// A memory access addressed a cell outside the memory array.
    #[error("memory cell {cell} out of range (depth {depth})")]
    CellOutOfRange {
        /// The requested cell index.
        cell: usize,
        /// The number of cells in the memory.
        depth: usize,
    },

    /// A memory access addressed a bit outside the word.
    #[error("memory bit {bit} out of range (width {width})")]
    BitOutOfRange {
        /// The requested bit index.
        bit: u32,
        /// The memory word width in bits.
        width: u32,
    },

    /// The design uses a construct this backend cannot model.
    #[error("unsupported: {reason}")]
    Unsupported {
        /// Description of the unsupported construct.
        reason: String,
    },

    /// An I/O error occurred while writing waveform data.
    #[error("waveform I/O error: {0}")]
    WaveformIo(#[from] io::Error),
}
