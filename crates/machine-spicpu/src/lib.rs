//! Serial-fetch CPU board.
//!
//! Wires the [`spicpu::Core`] to a [`spi_sram::SerialSram`] holding the
//! microprogram, through the shared bidirectional pins:
//!
//! | pin | signal |
//! |---|---|
//! | `uio[0]` | chip-select (active low, out) |
//! | `uio[1]` | data-out (out) |
//! | `uio[2]` | data-in (in) |
//! | `uio[3]` | clock-out (out) |
//!
//! `ui_in` is the operand bus (A in bits 7:4, B in bits 3:0) and `uo_out`
//! the result bus.

mod config;
mod error;
mod machine;
pub mod microprogram;
mod pins;
pub mod trace;

pub use config::MachineConfig;
pub use error::MachineError;
pub use machine::{Machine, SETTLE_TICKS};
pub use pins::{Pins, UIO_CS_N, UIO_MISO, UIO_MOSI, UIO_OE, UIO_SCK};
