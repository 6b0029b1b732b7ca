//! Names of the memory-controller interface signals a harness observes.
//!
//! The controller exposes three bundles: the request port (`req__*`), the
//! response port (`rsp__*`) and the SRAM port (`sram__*`), plus the clock.
//! Port names follow the flattened record naming of the generated RTL.

use std::fmt;
use std::str::FromStr;

use crate::error::SimError;

/// One interface signal of a memory controller under test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Signal {
    /// The design clock.
    Clock,
    /// Request valid, driven by the requester.
    ReqValid,
    /// Request ready, driven by the controller.
    ReqReady,
    /// Request address.
    ReqAddr,
    /// Request write enable.
    ReqWriteEn,
    /// Request write data (unencoded).
    ReqWriteData,
    /// Response valid, driven by the controller.
    RspValid,
    /// Response ready, driven by the requester.
    RspReady,
    /// Response read data (decoded).
    RspReadData,
    /// The controller detected an error in the response word.
    RspError,
    /// The controller could not correct the error in the response word.
    RspUncorrectableError,
    /// SRAM clock enable: the SRAM performs an access on the next edge.
    SramClkEn,
    /// SRAM write enable: the access is a write.
    SramWriteEn,
    /// SRAM address.
    SramAddr,
    /// SRAM write data (encoded).
    SramWriteData,
    /// SRAM read data (encoded, as stored).
    SramReadData,
}

impl Signal {
    /// Every signal, in port order.
    pub const ALL: [Signal; 16] = [
        Signal::Clock,
        Signal::ReqValid,
        Signal::ReqReady,
        Signal::ReqAddr,
        Signal::ReqWriteEn,
        Signal::ReqWriteData,
        Signal::RspValid,
        Signal::RspReady,
        Signal::RspReadData,
        Signal::RspError,
        Signal::RspUncorrectableError,
        Signal::SramClkEn,
        Signal::SramWriteEn,
        Signal::SramAddr,
        Signal::SramWriteData,
        Signal::SramReadData,
    ];

    /// Returns the flattened port name of this signal.
    pub fn name(self) -> &'static str {
        match self {
            Signal::Clock => "clk",
            Signal::ReqValid => "req__valid",
            Signal::ReqReady => "req__ready",
            Signal::ReqAddr => "req__addr",
            Signal::ReqWriteEn => "req__write_en",
            Signal::ReqWriteData => "req__write_data",
            Signal::RspValid => "rsp__valid",
            Signal::RspReady => "rsp__ready",
            Signal::RspReadData => "rsp__read_data",
            Signal::RspError => "rsp__error",
            Signal::RspUncorrectableError => "rsp__uncorrectable_error",
            Signal::SramClkEn => "sram__clk_en",
            Signal::SramWriteEn => "sram__write_en",
            Signal::SramAddr => "sram__addr",
            Signal::SramWriteData => "sram__write_data",
            Signal::SramReadData => "sram__read_data",
        }
    }

    /// Returns the bundle this signal belongs to (`req`, `rsp`, `sram`), or
    /// `None` for the clock.
    pub fn bundle(self) -> Option<&'static str> {
        self.name().split_once("__").map(|(bundle, _)| bundle)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Signal {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Signal::ALL
            .iter()
            .copied()
            .find(|sig| sig.name() == s)
            .ok_or_else(|| SimError::UnknownSignal(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = Signal::ALL.iter().map(|s| s.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Signal::ALL.len());
    }

    #[test]
    fn parse_every_name() {
        for sig in Signal::ALL {
            assert_eq!(sig.name().parse::<Signal>().unwrap(), sig);
        }
    }

    #[test]
    fn parse_unknown_name() {
        let err = "sram__bogus".parse::<Signal>().unwrap_err();
        assert!(matches!(err, SimError::UnknownSignal(ref n) if n == "sram__bogus"));
    }

    #[test]
    fn bundles() {
        assert_eq!(Signal::Clock.bundle(), None);
        assert_eq!(Signal::ReqAddr.bundle(), Some("req"));
        assert_eq!(Signal::RspUncorrectableError.bundle(), Some("rsp"));
        assert_eq!(Signal::SramWriteEn.bundle(), Some("sram"));
    }

    #[test]
    fn display_matches_name() {
        assert_eq!(Signal::SramClkEn.to_string(), "sram__clk_en");
    }
}
