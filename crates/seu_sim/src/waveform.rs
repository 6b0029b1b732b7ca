//! Waveform capture for harness runs.
//!
//! The [`WaveformRecorder`] trait abstracts waveform output. [`VcdRecorder`]
//! implements the IEEE 1364 Value Change Dump (VCD) format, producing text
//! files that can be viewed in GTKWave, Surfer, or other waveform viewers.
//! [`WaveformProbe`] connects a recorder to a [`Dut`] and records only the
//! signals whose value changed since the previous sample.

use std::io::Write;

use crate::dut::Dut;
use crate::error::SimError;
use crate::signal::Signal;
use crate::time::SimTime;

/// Trait for recording simulation waveforms.
///
/// Implementations write signal changes to a particular format.
pub trait WaveformRecorder {
    /// Registers a signal for recording.
    fn register_signal(&mut self, id: Signal, name: &str, width: u32) -> Result<(), SimError>;

    /// Opens a new scope (hierarchy level) in the waveform.
    fn begin_scope(&mut self, name: &str) -> Result<(), SimError>;

    /// Closes the current scope.
    fn end_scope(&mut self) -> Result<(), SimError>;

    /// Records a value change at the given time.
    fn record_change(&mut self, time: SimTime, id: Signal, value: u64) -> Result<(), SimError>;

    /// Finalizes the waveform output (flush, write trailer, etc.).
    fn finalize(&mut self) -> Result<(), SimError>;
}

/// VCD (Value Change Dump) format recorder following IEEE 1364.
///
/// Signal identifiers use printable ASCII characters starting from `!` (0x21).
pub struct VcdRecorder<W: Write> {
    writer: W,
    id_map: Vec<(Signal, String, u32)>, // (signal, id_code, width)
    next_id: u32,
    header_written: bool,
    current_time: Option<SimTime>,
}

impl<W: Write> VcdRecorder<W> {
    /// Creates a new VCD recorder writing to the given output.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            id_map: Vec::new(),
            next_id: 0,
            header_written: false,
            current_time: None,
        }
    }

    /// Consumes the recorder and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_header(&mut self) -> Result<(), SimError> {
        writeln!(self.writer, "$version")?;
        writeln!(self.writer, "  seu fault-injection harness")?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$timescale")?;
        writeln!(self.writer, "  1ns")?;
        writeln!(self.writer, "$end")?;
        Ok(())
    }

    fn ensure_header(&mut self) -> Result<(), SimError> {
        if !self.header_written {
            self.write_header()?;
            self.header_written = true;
        }
        Ok(())
    }

    /// Generates a VCD identifier code from a sequential index.
    ///
    /// Multi-character codes are generated for indices >= 94.
    fn make_id_code(index: u32) -> String {
        let mut result = String::new();
        let mut idx = index;
        loop {
            let c = (b'!' + (idx % 94) as u8) as char;
            result.push(c);
            idx /= 94;
            if idx == 0 {
                break;
            }
            idx -= 1;
        }
        result
    }

    fn format_value(value: u64, width: u32) -> String {
        if width == 1 {
            let bit = if value & 1 == 1 { "1" } else { "0" };
            bit.to_string()
        } else {
            let mut s = String::with_capacity(width as usize + 1);
            s.push('b');
            for i in (0..width).rev() {
                s.push(if (value >> i) & 1 == 1 { '1' } else { '0' });
            }
            s
        }
    }
}

impl<W: Write> WaveformRecorder for VcdRecorder<W> {
    fn register_signal(&mut self, id: Signal, name: &str, width: u32) -> Result<(), SimError> {
        let id_code = Self::make_id_code(self.next_id);
        self.next_id += 1;

        writeln!(self.writer, "$var wire {width} {id_code} {name} $end")?;

        self.id_map.push((id, id_code, width));
        Ok(())
    }

    fn begin_scope(&mut self, name: &str) -> Result<(), SimError> {
        self.ensure_header()?;
        writeln!(self.writer, "$scope module {name} $end")?;
        Ok(())
    }

    fn end_scope(&mut self) -> Result<(), SimError> {
        writeln!(self.writer, "$upscope $end")?;
        Ok(())
    }

    fn record_change(&mut self, time: SimTime, id: Signal, value: u64) -> Result<(), SimError> {
        self.ensure_header()?;

        if self.current_time != Some(time) {
            if self.current_time.is_none() {
                writeln!(self.writer, "$enddefinitions $end")?;
                writeln!(self.writer, "$dumpvars")?;
            }
            writeln!(self.writer, "#{}", time.ns)?;
            self.current_time = Some(time);
        }

        let (_, id_code, width) = self
            .id_map
            .iter()
            .find(|(sig, _, _)| *sig == id)
            .ok_or(SimError::SignalUnavailable(id))?;

        let val_str = Self::format_value(value, *width);
        if *width == 1 {
            writeln!(self.writer, "{val_str}{id_code}")?;
        } else {
            writeln!(self.writer, "{val_str} {id_code}")?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), SimError> {
        if self.current_time.is_none() {
            self.ensure_header()?;
            writeln!(self.writer, "$enddefinitions $end")?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Samples a DUT's interface signals into a [`WaveformRecorder`].
///
/// Only signals the DUT exposes are registered. The first sample records
/// every signal; later samples record changed values only.
pub struct WaveformProbe {
    recorder: Box<dyn WaveformRecorder>,
    signals: Vec<(Signal, Option<u64>)>,
}

impl WaveformProbe {
    /// Registers every available signal of `dut` under a `top` scope.
    pub fn attach<D: Dut + ?Sized>(
        mut recorder: Box<dyn WaveformRecorder>,
        dut: &D,
    ) -> Result<Self, SimError> {
        let mut signals = Vec::new();
        recorder.begin_scope("top")?;
        for sig in Signal::ALL {
            match dut.signal_width(sig) {
                Ok(width) => {
                    recorder.register_signal(sig, sig.name(), width)?;
                    signals.push((sig, None));
                }
                Err(SimError::SignalUnavailable(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        recorder.end_scope()?;
        Ok(Self { recorder, signals })
    }

    /// Records the current value of every changed signal at `time`.
    pub fn sample<D: Dut + ?Sized>(&mut self, time: SimTime, dut: &D) -> Result<(), SimError> {
        for (sig, last) in &mut self.signals {
            let value = dut.signal(*sig)?;
            if *last != Some(value) {
                self.recorder.record_change(time, *sig, value)?;
                *last = Some(value);
            }
        }
        Ok(())
    }

    /// Flushes the recorder.
    pub fn finish(mut self) -> Result<(), SimError> {
        self.recorder.finalize()
    }
}
