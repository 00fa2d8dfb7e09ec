//! Shared traits and signal types for the serial-fetch microcoded CPU.
//!
//! Everything advances on one clock. A tick is one active edge of that
//! clock; every component steps exactly once per tick.

mod clock;
mod observable;
mod serial;
mod tickable;
mod ticks;

pub use clock::MasterClock;
pub use observable::{Observable, Value};
pub use serial::{SerialDevice, SpiLines};
pub use tickable::Tickable;
pub use ticks::Ticks;
