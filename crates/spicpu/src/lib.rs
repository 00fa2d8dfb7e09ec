//! Microcoded 8-bit CPU that fetches its program over a serial link.
//!
//! There is no on-chip program memory. Every instruction byte is read from
//! an external serial memory device by the bus master, one transaction at
//! a time, while the sequencer waits. Each call to [`Core::tick`] is one
//! edge of the single shared clock.

mod alu;
mod cpu;
mod decode;
mod registers;
mod sequencer;

pub use crate::alu::{compute, AluOp, AluResult};
pub use crate::cpu::{Core, CoreInputs, CoreOutputs};
pub use crate::decode::{decode, ControlLines, Instruction, Op, ShiftReg, Source};
pub use crate::registers::Registers;
pub use crate::sequencer::{Phase, Sequencer};
