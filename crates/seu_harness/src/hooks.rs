//! Per-cycle observer hooks.
//!
//! Observers see what the driver sees, in the order it sees it. They are
//! read-only taps: nothing an observer does changes the statistics or ends
//! the run early.

use tracing::{debug, trace, warn};

use crate::fault::FaultEvent;

/// A response transfer as seen on the interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResponseEvent {
    /// Cycle of the transfer.
    pub cycle: u64,
    /// `rsp__read_data`.
    pub data: u64,
    /// `rsp__error`.
    pub error: bool,
    /// `rsp__uncorrectable_error`.
    pub uncorrectable: bool,
}

/// Callbacks invoked by the clock driver. Every method defaults to a no-op.
pub trait CycleObserver {
    /// A bit flip was applied.
    fn on_fault(&mut self, _event: &FaultEvent) {}

    /// A request transfer (`req__valid && req__ready`).
    fn on_request(&mut self, _cycle: u64, _addr: u64, _write: bool) {}

    /// A response transfer (`rsp__valid && rsp__ready`).
    fn on_response(&mut self, _event: &ResponseEvent) {}

    /// A classified SRAM read of `cell` with `errors` corrupted bits.
    fn on_read(&mut self, _cycle: u64, _cell: usize, _errors: u32) {}

    /// An SRAM write of `cell` landed, overwriting `cleared` corrupted bits.
    fn on_write(&mut self, _cycle: u64, _cell: usize, _cleared: u32) {}
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl CycleObserver for NullObserver {}

/// Emits every hook as a `tracing` event.
///
/// Faults and flagged responses go out at debug level, the per-cycle
/// traffic at trace level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl CycleObserver for TracingObserver {
    fn on_fault(&mut self, event: &FaultEvent) {
        debug!(cycle = event.cycle, cell = event.cell, bit = event.bit, "fault injected");
    }

    fn on_request(&mut self, cycle: u64, addr: u64, write: bool) {
        trace!(cycle, addr, write, "request");
    }

    fn on_response(&mut self, event: &ResponseEvent) {
        if event.uncorrectable {
            warn!(
                cycle = event.cycle,
                data = event.data,
                "response flagged uncorrectable"
            );
        } else if event.error {
            debug!(cycle = event.cycle, data = event.data, "response corrected");
        } else {
            trace!(cycle = event.cycle, data = event.data, "response");
        }
    }

    fn on_read(&mut self, cycle: u64, cell: usize, errors: u32) {
        if errors > 0 {
            debug!(cycle, cell, errors, "read of corrupted cell");
        } else {
            trace!(cycle, cell, "read");
        }
    }

    fn on_write(&mut self, cycle: u64, cell: usize, cleared: u32) {
        trace!(cycle, cell, cleared, "write");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counting {
        faults: usize,
        reads: usize,
    }

    impl CycleObserver for Counting {
        fn on_fault(&mut self, _event: &FaultEvent) {
            self.faults += 1;
        }

        fn on_read(&mut self, _cycle: u64, _cell: usize, _errors: u32) {
            self.reads += 1;
        }
    }

    #[test]
    fn defaults_are_noops() {
        let mut obs = Counting::default();
        let ev = FaultEvent {
            cycle: 0,
            cell: 1,
            bit: 2,
        };
        obs.on_fault(&ev);
        obs.on_write(0, 1, 0);
        obs.on_request(0, 1, false);
        obs.on_read(1, 1, 1);
        assert_eq!(obs.faults, 1);
        assert_eq!(obs.reads, 1);
    }

    #[test]
    fn tracing_observer_without_subscriber() {
        let mut obs = TracingObserver;
        obs.on_fault(&FaultEvent {
            cycle: 3,
            cell: 0,
            bit: 0,
        });
        obs.on_response(&ResponseEvent {
            cycle: 4,
            data: 0,
            error: true,
            uncorrectable: true,
        });
        obs.on_read(4, 0, 2);
    }
}
