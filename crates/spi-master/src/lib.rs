//! Bit-serial bus master for external serial memory.
//!
//! Issues `READ` (0x03) transactions: command byte, 16-bit big-endian
//! address, then `length` data bytes, everything most-significant bit
//! first. Mode 0: the clock idles low, data-out changes while the clock is
//! low and both sides sample on the rising edge.
//!
//! One serial bit takes two system ticks (clock low, clock high), so a
//! one-byte read occupies `1 + 2 * (8 + 16 + 8) + 1 = 66` ticks from the
//! chip-select falling to it rising again.

mod master;

pub use master::{SpiMaster, State, MAX_BURST, READ_COMMAND};

/// System ticks a read of `length` bytes occupies, chip-select assert to
/// deassert inclusive.
#[must_use]
pub const fn transaction_ticks(length: u8) -> u64 {
    2 + 2 * (COMMAND_BITS as u64 + ADDRESS_BITS as u64 + 8 * length as u64)
}

/// Width of the command field in bits.
pub const COMMAND_BITS: u8 = 8;

/// Width of the address field in bits.
pub const ADDRESS_BITS: u8 = 16;
