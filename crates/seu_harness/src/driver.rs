//! The per-cycle clock driver.
//!
//! [`ClockDriver`] owns the DUT, the fault model, the shadow masks and the
//! counters for one run. Each [`step`](ClockDriver::step) is one clock cycle
//! in a fixed order:
//!
//! 1. draw this cycle's faults and apply each to the DUT and the shadow mask
//! 2. sample the request/response handshakes
//! 3. sample the SRAM controls as settled before the edge
//! 4. classify a pending read now, or remember a pending write's address
//! 5. pulse the clock
//! 6. clear the shadow mask of the remembered write address
//!
//! Reads are classified before the edge because the SRAM captures the
//! stored word at the edge. Writes land at the edge, so their clear follows
//! it.

use seu_sim::{Dut, Signal, SimTime, WaveformProbe, WaveformRecorder};

use crate::classify::{classify_read, clear_write, SramAccess};
use crate::dump::MemoryDump;
use crate::error::HarnessError;
use crate::fault::{FaultEvent, FaultModel};
use crate::hooks::{CycleObserver, NullObserver, ResponseEvent};
use crate::shadow::ShadowErrorMask;
use crate::stats::RunStatistics;

/// Drives one DUT through a fault-injection run.
pub struct ClockDriver<D: Dut> {
    dut: D,
    faults: FaultModel,
    shadow: ShadowErrorMask,
    stats: RunStatistics,
    observer: Box<dyn CycleObserver>,
    probe: Option<WaveformProbe>,
    cycle: u64,
    time: SimTime,
}

impl<D: Dut> ClockDriver<D> {
    /// Resets `dut` and prepares a run at mean rate `lambda` flips per
    /// cycle, drawing from `seed`.
    pub fn new(mut dut: D, lambda: f64, seed: u64) -> Result<Self, HarnessError> {
        let depth = dut.memory_depth();
        let width = dut.memory_width();
        let faults = FaultModel::new(lambda, seed, depth, width)?;
        let shadow = ShadowErrorMask::new(depth, width)?;
        dut.reset()?;
        Ok(Self {
            dut,
            faults,
            shadow,
            stats: RunStatistics::new(width),
            observer: Box::new(NullObserver),
            probe: None,
            cycle: 0,
            time: SimTime::zero(),
        })
    }

    /// Replaces the observer.
    pub fn set_observer(&mut self, observer: Box<dyn CycleObserver>) {
        self.observer = observer;
    }

    /// Starts recording the DUT's signals, beginning with their current
    /// values.
    pub fn attach_waveform(
        &mut self,
        recorder: Box<dyn WaveformRecorder>,
    ) -> Result<(), HarnessError> {
        let mut probe = WaveformProbe::attach(recorder, &self.dut)?;
        probe.sample(self.time, &self.dut)?;
        self.probe = Some(probe);
        Ok(())
    }

    /// The design under test.
    pub fn dut(&self) -> &D {
        &self.dut
    }

    /// Mutable access to the design, e.g. to drive external traffic.
    pub fn dut_mut(&mut self) -> &mut D {
        &mut self.dut
    }

    /// Current ground-truth corruption.
    pub fn shadow(&self) -> &ShadowErrorMask {
        &self.shadow
    }

    /// Counters so far.
    pub fn statistics(&self) -> &RunStatistics {
        &self.stats
    }

    /// Cycles completed.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Seed of the fault model.
    pub fn seed(&self) -> u64 {
        self.faults.seed()
    }

    /// Flips `bit` of `cell` in the DUT memory and records it in the shadow
    /// mask. Both happen or neither does.
    pub fn inject_fault(&mut self, cell: usize, bit: u32) -> Result<(), HarnessError> {
        let event = FaultEvent {
            cycle: self.cycle,
            cell,
            bit,
        };
        self.apply_fault(&event)
    }

    fn apply_fault(&mut self, event: &FaultEvent) -> Result<(), HarnessError> {
        if event.cell >= self.shadow.depth() || event.bit >= self.shadow.width() {
            return Err(HarnessError::FaultOutOfRange {
                cell: event.cell,
                bit: event.bit,
                depth: self.shadow.depth(),
                width: self.shadow.width(),
            });
        }
        let stored = self.dut.memory_bit(event.cell, event.bit)?;
        self.dut.set_memory_bit(event.cell, event.bit, !stored)?;
        self.shadow.toggle(event.cell, event.bit)?;
        self.stats.errors_injected += 1;
        self.observer.on_fault(event);
        Ok(())
    }

    fn sample_handshakes(&mut self) -> Result<(), HarnessError> {
        let cycle = self.cycle;
        let dut = &self.dut;

        let req_valid = dut.flag(Signal::ReqValid)?;
        let req_fire = req_valid && dut.flag(Signal::ReqReady)?;
        let rsp_ready = dut.flag(Signal::RspReady)?;
        let rsp_fire = rsp_ready && dut.flag(Signal::RspValid)?;

        if req_valid {
            self.stats.req_valid_cycles += 1;
        }
        if req_fire {
            self.stats.req_fire_cycles += 1;
            let addr = dut.signal(Signal::ReqAddr)?;
            let write = dut.flag(Signal::ReqWriteEn)?;
            self.observer.on_request(cycle, addr, write);
        }
        if rsp_ready {
            self.stats.rsp_ready_cycles += 1;
        }
        if rsp_fire {
            self.stats.rsp_fire_cycles += 1;
            let event = ResponseEvent {
                cycle,
                data: dut.signal(Signal::RspReadData)?,
                error: dut.flag(Signal::RspError)?,
                uncorrectable: dut.flag(Signal::RspUncorrectableError)?,
            };
            if event.error {
                self.stats.rsp_error_reports += 1;
            }
            if event.uncorrectable {
                self.stats.rsp_uncorrectable_reports += 1;
            }
            self.observer.on_response(&event);
        }
        Ok(())
    }

    fn edge(&mut self, level: bool) -> Result<(), HarnessError> {
        self.dut.drive_clock(level)?;
        self.time = self.time.next_edge();
        if let Some(probe) = &mut self.probe {
            probe.sample(self.time, &self.dut)?;
        }
        Ok(())
    }

    /// Runs one clock cycle.
    pub fn step(&mut self) -> Result<(), HarnessError> {
        let cycle = self.cycle;

        for event in self.faults.draw_cycle(cycle) {
            self.apply_fault(&event)?;
        }

        self.sample_handshakes()?;

        let pending_write = match SramAccess::sample(&self.dut)? {
            SramAccess::Read { cell } => {
                let errors = classify_read(&self.shadow, &mut self.stats, cell)?;
                self.observer.on_read(cycle, cell, errors);
                None
            }
            SramAccess::Write { cell } => Some(cell),
            SramAccess::Idle => None,
        };

        self.edge(true)?;
        self.edge(false)?;

        if let Some(cell) = pending_write {
            let cleared = clear_write(&mut self.shadow, &mut self.stats, cell)?;
            self.observer.on_write(cycle, cell, cleared);
        }

        self.cycle += 1;
        self.stats.cycles = self.cycle;
        Ok(())
    }

    /// Runs `cycles` clock cycles.
    pub fn run(&mut self, cycles: u64) -> Result<(), HarnessError> {
        for _ in 0..cycles {
            self.step()?;
        }
        Ok(())
    }

    /// Snapshot of the DUT memory next to the shadow masks.
    pub fn memory_dump(&self) -> Result<MemoryDump, HarnessError> {
        MemoryDump::capture(&self.dut, &self.shadow)
    }

    /// Ends the run, flushing any waveform, and returns the counters.
    pub fn finish(self) -> Result<RunStatistics, HarnessError> {
        if let Some(probe) = self.probe {
            probe.finish()?;
        }
        Ok(self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seu_sim::{CodeKind, ReferenceDut, Traffic, VcdRecorder};

    fn sweep(lambda: f64, seed: u64) -> ClockDriver<ReferenceDut> {
        let dut = ReferenceDut::new(4, 11, CodeKind::Hsiao, Traffic::ReadSweep).unwrap();
        ClockDriver::new(dut, lambda, seed).unwrap()
    }

    fn external() -> ClockDriver<ReferenceDut> {
        let mut dut = ReferenceDut::new(4, 11, CodeKind::Hsiao, Traffic::External).unwrap();
        dut.set_signal(Signal::RspReady, 1).unwrap();
        ClockDriver::new(dut, 0.0, 0).unwrap()
    }

    fn drive_request(driver: &mut ClockDriver<ReferenceDut>, addr: u64, write: bool) {
        let dut = driver.dut_mut();
        dut.set_signal(Signal::ReqValid, 1).unwrap();
        dut.set_signal(Signal::ReqAddr, addr).unwrap();
        dut.set_signal(Signal::ReqWriteEn, u64::from(write)).unwrap();
        dut.settle().unwrap();
    }

    fn drive_idle(driver: &mut ClockDriver<ReferenceDut>) {
        let dut = driver.dut_mut();
        dut.set_signal(Signal::ReqValid, 0).unwrap();
        dut.settle().unwrap();
    }

    #[test]
    fn sweep_reads_every_cycle() {
        let mut driver = sweep(0.0, 1);
        driver.run(100).unwrap();
        let stats = driver.finish().unwrap();
        assert_eq!(stats.cycles, 100);
        assert_eq!(stats.req_valid_cycles, 100);
        assert_eq!(stats.req_fire_cycles, 100);
        assert_eq!(stats.rsp_ready_cycles, 100);
        assert_eq!(stats.rsp_fire_cycles, 99);
        assert_eq!(stats.errors_injected, 0);
        assert_eq!(stats.read_with_errors[0], 100);
        assert_eq!(stats.sram_writes, 0);
    }

    #[test]
    fn injected_fault_updates_both_sides() {
        let mut driver = sweep(0.0, 1);
        driver.inject_fault(5, 7).unwrap();
        assert!(driver.dut().memory_bit(5, 7).unwrap());
        assert_eq!(driver.shadow().mask(5).unwrap(), 1 << 7);
        assert_eq!(driver.statistics().errors_injected, 1);
    }

    #[test]
    fn out_of_range_fault_leaves_state_untouched() {
        let mut driver = sweep(0.0, 1);
        let err = driver.inject_fault(16, 0).unwrap_err();
        assert!(matches!(err, HarnessError::FaultOutOfRange { cell: 16, .. }));
        assert!(driver.inject_fault(0, 16).is_err());
        assert_eq!(driver.statistics().errors_injected, 0);
        assert_eq!(driver.shadow().total_errors(), 0);
    }

    #[test]
    fn single_fault_lands_in_bucket_one() {
        let mut driver = external();
        driver.inject_fault(3, 2).unwrap();
        drive_request(&mut driver, 3, false);
        driver.step().unwrap();
        let stats = driver.statistics();
        assert_eq!(stats.read_with_errors[1], 1);
        assert_eq!(stats.total_reads(), 1);
    }

    #[test]
    fn corrected_read_is_written_back_and_cleared() {
        let mut driver = external();
        driver.inject_fault(3, 2).unwrap();
        drive_request(&mut driver, 3, false);
        driver.step().unwrap();
        drive_idle(&mut driver);
        // Write-back cycle.
        driver.step().unwrap();
        let stats = driver.statistics();
        assert_eq!(stats.sram_writes, 1);
        assert_eq!(stats.rsp_error_reports, 1);
        assert_eq!(stats.rsp_uncorrectable_reports, 0);
        assert_eq!(driver.shadow().mask(3).unwrap(), 0);
        assert!(!driver.dut().memory_bit(3, 2).unwrap());
    }

    #[test]
    fn explicit_write_clears_shadow() {
        let mut driver = external();
        for bit in [0, 4, 9] {
            driver.inject_fault(8, bit).unwrap();
        }
        drive_request(&mut driver, 8, true);
        driver.step().unwrap();
        assert_eq!(driver.shadow().mask(8).unwrap(), 0);
        assert_eq!(driver.statistics().sram_writes, 1);
    }

    #[test]
    fn waveform_is_written() {
        let buf = Vec::new();
        let mut driver = sweep(0.0, 1);
        driver
            .attach_waveform(Box::new(VcdRecorder::new(buf)))
            .unwrap();
        driver.run(3).unwrap();
        let stats = driver.finish().unwrap();
        assert_eq!(stats.cycles, 3);
    }
}
