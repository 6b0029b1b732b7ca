//! Cycle model of a write-back memory controller in front of an SRAM.
//!
//! The model evaluates in two phases. [`ReferenceDut::settle`] first applies
//! the register updates of a rising clock edge (if the clock went from low
//! to high since the last settle), using the combinational values settled
//! before the edge, then recomputes all combinational outputs.

use serde::{Deserialize, Serialize};

use crate::dut::{word_mask, Dut};
use crate::error::SimError;
use crate::reference::code::LinearCode;
use crate::reference::CodeKind;
use crate::signal::Signal;

/// Widest address bus the model accepts.
pub const MAX_ADDR_BITS: u32 = 20;

/// Request pattern presented on the controller's request port.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Traffic {
    /// Always-valid reads of consecutive addresses; responses always taken.
    #[default]
    ReadSweep,
    /// Like `ReadSweep`, but every n-th accepted request is a write of the
    /// request counter.
    WriteEvery(u32),
    /// Request-side signals are driven through [`Dut::set_signal`].
    External,
}

/// Values on the requester side of the interface.
#[derive(Clone, Copy, Debug, Default)]
struct RequestSide {
    valid: bool,
    addr: u64,
    write_en: bool,
    write_data: u64,
    rsp_ready: bool,
}

/// Settled combinational outputs.
#[derive(Clone, Copy, Debug, Default)]
struct Outputs {
    req: RequestSide,
    req_ready: bool,
    rsp_data: u64,
    rsp_error: bool,
    rsp_uncorrectable: bool,
    sram_clk_en: bool,
    sram_write_en: bool,
    sram_addr: u64,
    sram_write_data: u64,
}

/// Behavioural reference design: requester, write-back controller, SRAM.
#[derive(Clone, Debug)]
pub struct ReferenceDut {
    code: LinearCode,
    addr_bits: u32,
    traffic: Traffic,

    clk: bool,
    prev_clk: bool,
    external: RequestSide,

    // Registers.
    sweep_addr: u64,
    accepted: u64,
    rsp_valid: bool,
    writeback_valid: bool,
    last_req_addr: u64,
    read_data: u64,
    memory: Vec<u64>,

    out: Outputs,
}

impl ReferenceDut {
    /// Builds a controller over `2^addr_bits` cells holding `data_bits` of
    /// data each, encoded with `code`.
    pub fn new(
        addr_bits: u32,
        data_bits: u32,
        code: CodeKind,
        traffic: Traffic,
    ) -> Result<Self, SimError> {
        if addr_bits == 0 || addr_bits > MAX_ADDR_BITS {
            return Err(SimError::Unsupported {
                reason: format!("address width {addr_bits} (expected 1..={MAX_ADDR_BITS})"),
            });
        }
        if traffic == Traffic::WriteEvery(0) {
            return Err(SimError::Unsupported {
                reason: "write interval of zero".into(),
            });
        }
        let code = LinearCode::new(code, data_bits)?;
        let mut dut = Self {
            code,
            addr_bits,
            traffic,
            clk: false,
            prev_clk: false,
            external: RequestSide::default(),
            sweep_addr: 0,
            accepted: 0,
            rsp_valid: false,
            writeback_valid: false,
            last_req_addr: 0,
            read_data: 0,
            memory: vec![0; 1usize << addr_bits],
            out: Outputs::default(),
        };
        dut.evaluate();
        Ok(dut)
    }

    /// The code protecting each memory word.
    pub fn code(&self) -> &LinearCode {
        &self.code
    }

    /// The request pattern.
    pub fn traffic(&self) -> Traffic {
        self.traffic
    }

    fn addr_mask(&self) -> u64 {
        word_mask(self.addr_bits)
    }

    fn request_side(&self) -> RequestSide {
        let sweep = RequestSide {
            valid: true,
            addr: self.sweep_addr,
            write_en: false,
            write_data: 0,
            rsp_ready: true,
        };
        match self.traffic {
            Traffic::ReadSweep => sweep,
            Traffic::WriteEvery(n) => RequestSide {
                write_en: self.accepted % u64::from(n) == 0,
                write_data: self.accepted & word_mask(self.code.data_bits()),
                ..sweep
            },
            Traffic::External => self.external,
        }
    }

    /// Recomputes every combinational output from inputs and registers.
    fn evaluate(&mut self) {
        let req = self.request_side();
        let decoded = self.code.decode(self.read_data);

        let rsp_fire = self.rsp_valid && req.rsp_ready;
        let writeback = self.writeback_valid && decoded.error && !decoded.uncorrectable;
        let req_ready = !writeback && (rsp_fire || !self.rsp_valid);
        let req_fire = req.valid && req_ready;

        let (sram_clk_en, sram_write_en, sram_addr, sram_write_data) = if writeback {
            (true, true, self.last_req_addr, decoded.codeword)
        } else {
            (
                req_fire,
                req.write_en,
                req.addr,
                self.code.encode(req.write_data),
            )
        };

        self.out = Outputs {
            req,
            req_ready,
            rsp_data: decoded.data,
            rsp_error: decoded.error,
            rsp_uncorrectable: decoded.uncorrectable,
            sram_clk_en,
            sram_write_en,
            sram_addr,
            sram_write_data,
        };
    }

    /// Register updates of one rising edge, from the pre-edge outputs.
    fn rising_edge(&mut self) {
        let out = self.out;
        let req_fire = out.req.valid && out.req_ready;
        let rsp_fire = self.rsp_valid && out.req.rsp_ready;

        if req_fire {
            self.sweep_addr = (out.req.addr + 1) & self.addr_mask();
            self.accepted += 1;
            self.rsp_valid = true;
        } else if rsp_fire {
            self.rsp_valid = false;
        }
        self.writeback_valid = req_fire && !out.req.write_en;
        self.last_req_addr = out.req.addr;

        if out.sram_clk_en {
            let cell = out.sram_addr as usize;
            self.read_data = self.memory[cell];
            if out.sram_write_en {
                self.memory[cell] = out.sram_write_data & word_mask(self.code.total_bits());
            }
        }
    }

    fn check_cell(&self, cell: usize, bit: u32) -> Result<(), SimError> {
        if cell >= self.memory.len() {
            return Err(SimError::CellOutOfRange {
                cell,
                depth: self.memory.len(),
            });
        }
        if bit >= self.code.total_bits() {
            return Err(SimError::BitOutOfRange {
                bit,
                width: self.code.total_bits(),
            });
        }
        Ok(())
    }
}

impl Dut for ReferenceDut {
    fn settle(&mut self) -> Result<(), SimError> {
        if self.clk && !self.prev_clk {
            self.rising_edge();
        }
        self.prev_clk = self.clk;
        self.evaluate();
        Ok(())
    }

    fn signal(&self, signal: Signal) -> Result<u64, SimError> {
        let out = &self.out;
        Ok(match signal {
            Signal::Clock => u64::from(self.clk),
            Signal::ReqValid => u64::from(out.req.valid),
            Signal::ReqReady => u64::from(out.req_ready),
            Signal::ReqAddr => out.req.addr,
            Signal::ReqWriteEn => u64::from(out.req.write_en),
            Signal::ReqWriteData => out.req.write_data,
            Signal::RspValid => u64::from(self.rsp_valid),
            Signal::RspReady => u64::from(out.req.rsp_ready),
            Signal::RspReadData => out.rsp_data,
            Signal::RspError => u64::from(out.rsp_error),
            Signal::RspUncorrectableError => u64::from(out.rsp_uncorrectable),
            Signal::SramClkEn => u64::from(out.sram_clk_en),
            Signal::SramWriteEn => u64::from(out.sram_write_en),
            Signal::SramAddr => out.sram_addr,
            Signal::SramWriteData => out.sram_write_data,
            Signal::SramReadData => self.read_data,
        })
    }

    fn set_signal(&mut self, signal: Signal, value: u64) -> Result<(), SimError> {
        let external = self.traffic == Traffic::External;
        match signal {
            Signal::Clock => self.clk = value & 1 == 1,
            Signal::ReqValid if external => self.external.valid = value & 1 == 1,
            Signal::ReqAddr if external => self.external.addr = value & self.addr_mask(),
            Signal::ReqWriteEn if external => self.external.write_en = value & 1 == 1,
            Signal::ReqWriteData if external => {
                self.external.write_data = value & word_mask(self.code.data_bits())
            }
            Signal::RspReady if external => self.external.rsp_ready = value & 1 == 1,
            other => return Err(SimError::NotDrivable(other)),
        }
        Ok(())
    }

    fn signal_width(&self, signal: Signal) -> Result<u32, SimError> {
        Ok(match signal {
            Signal::ReqAddr | Signal::SramAddr => self.addr_bits,
            Signal::ReqWriteData | Signal::RspReadData => self.code.data_bits(),
            Signal::SramWriteData | Signal::SramReadData => self.code.total_bits(),
            _ => 1,
        })
    }

    fn memory_width(&self) -> u32 {
        self.code.total_bits()
    }

    fn memory_depth(&self) -> usize {
        self.memory.len()
    }

    fn memory_bit(&self, cell: usize, bit: u32) -> Result<bool, SimError> {
        self.check_cell(cell, bit)?;
        Ok((self.memory[cell] >> bit) & 1 == 1)
    }

    fn set_memory_bit(&mut self, cell: usize, bit: u32, value: bool) -> Result<(), SimError> {
        self.check_cell(cell, bit)?;
        if value {
            self.memory[cell] |= 1 << bit;
        } else {
            self.memory[cell] &= !(1 << bit);
        }
        Ok(())
    }

    fn memory_word(&self, cell: usize) -> Result<u64, SimError> {
        self.check_cell(cell, 0)?;
        Ok(self.memory[cell])
    }
}
