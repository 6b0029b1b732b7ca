//! DUT adapter contract and simulation plumbing for the fault-injection
//! harness.
//!
//! The harness drives a clocked memory-controller design through the
//! [`Dut`] trait: named interface signals, clock edges with a synchronous
//! settle, and direct access to the stored memory bits so faults can be
//! injected behind the controller's back.
//!
//! # Modules
//!
//! - `error`: DUT adapter error types
//! - `signal`: Interface signal names
//! - `dut`: The [`Dut`] trait
//! - `time`: Nanosecond simulation time
//! - `waveform`: Waveform capture (VCD format)
//! - `reference`: Behavioural write-back controller model

#![warn(missing_docs)]

pub mod dut;
pub mod error;
pub mod reference;
pub mod signal;
pub mod time;
pub mod waveform;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

pub use dut::{word_mask, Dut, MAX_WORD_BITS};
pub use error::SimError;
pub use reference::{CodeKind, LinearCode, ReferenceDut, Traffic};
pub use signal::Signal;
pub use time::SimTime;
pub use waveform::{VcdRecorder, WaveformProbe, WaveformRecorder};

/// Opens a buffered VCD recorder writing to `path`.
pub fn vcd_file(path: &Path) -> Result<Box<dyn WaveformRecorder>, SimError> {
    let file = File::create(path)?;
    Ok(Box::new(VcdRecorder::new(BufWriter::new(file))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vcd_file_writes_header() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("waves.vcd");
        let mut rec = vcd_file(&path).unwrap();
        rec.finalize().unwrap();
        drop(rec);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("$timescale"));
    }

    #[test]
    fn vcd_file_bad_path() {
        let err = vcd_file(Path::new("/nonexistent/dir/waves.vcd")).err().unwrap();
        assert!(matches!(err, SimError::WaveformIo(_)));
    }
}
