//! Datapath register file.

/// Datapath registers snapshot.
///
/// The sequencer owns the live copy. Everything else sees copies.
/// `Default` is the power-on/reset state: every register zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    /// Address of the next instruction byte in external memory.
    pub pc: u16,
    /// Accumulator; first ALU operand and ALU destination.
    pub a: u8,
    pub b: u8,
    /// Shift register A.
    pub sa: u8,
    /// Shift register B.
    pub sb: u8,
    /// Output latch, driven onto the result bus.
    pub out: u8,
    /// Overflow from the last executed instruction.
    pub overflow: bool,
}
