//! Behavioural reference design for exercising the harness.
//!
//! Models the testbench a generated controller is usually simulated in: a
//! requester, a write-back error-correcting controller, and a synchronous
//! SRAM. It implements [`Dut`](crate::Dut) so the harness and its tests have
//! a backend without an external RTL simulator.

pub mod code;
pub mod model;

pub use code::{CodeKind, Decoded, LinearCode};
pub use model::{ReferenceDut, Traffic, MAX_ADDR_BITS};
