//! Serial SRAM device model.
//!
//! Plays the external program memory. Only the sequential read command
//! (0x03) is decoded: 8 command bits and a 16-bit big-endian address are
//! shifted in on rising clock edges, then data bytes are shifted out MSB
//! first, each bit presented after a falling edge (mode 0). The address
//! auto-increments and wraps at the end of the array.
//!
//! Contents are placed with [`SerialSram::load`], standing in for whatever
//! programs the real part before the CPU comes out of reset.

use log::trace;
use spicpu_core::{Observable, SerialDevice, SpiLines, Value};

/// Sequential read.
pub const CMD_READ: u8 = 0x03;

/// Default size: the full 16-bit address space.
pub const DEFAULT_SIZE: usize = 0x1_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Chip-select high.
    Deselected,
    Command,
    Address,
    /// Streaming bytes out.
    Data,
    /// Unrecognised command; wait for chip-select to rise.
    Ignore,
}

impl Phase {
    const fn name(self) -> &'static str {
        match self {
            Self::Deselected => "Deselected",
            Self::Command => "Command",
            Self::Address => "Address",
            Self::Data => "Data",
            Self::Ignore => "Ignore",
        }
    }
}

pub struct SerialSram {
    mem: Vec<u8>,
    phase: Phase,
    prev: SpiLines,
    shift: u16,
    bits: u8,
    command: u8,
    address: u16,
    out_byte: u8,
    out_bit: u8,
    miso: bool,
    frames: u64,
}

impl SerialSram {
    /// A zero-filled device of `size` bytes (at least one, at most 64 KiB).
    #[must_use]
    pub fn new(size: usize) -> Self {
        let size = size.clamp(1, DEFAULT_SIZE);
        Self {
            mem: vec![0; size],
            phase: Phase::Deselected,
            prev: SpiLines::IDLE,
            shift: 0,
            bits: 0,
            command: 0,
            address: 0,
            out_byte: 0,
            out_bit: 0,
            miso: false,
            frames: 0,
        }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.mem.len()
    }

    /// Backdoor write of `data` starting at `address`, wrapping at the end
    /// of the array.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        let len = self.mem.len();
        for (i, &byte) in data.iter().enumerate() {
            self.mem[(usize::from(address) + i) % len] = byte;
        }
    }

    /// Backdoor read.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.mem[usize::from(address) % self.mem.len()]
    }

    /// Read frames that reached the data phase since creation.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn latch_byte(&mut self) {
        self.out_byte = self.peek(self.address);
        self.out_bit = 0;
    }

    fn on_rising(&mut self, mosi: bool) {
        match self.phase {
            Phase::Command => {
                self.shift = (self.shift << 1) | u16::from(mosi);
                self.bits += 1;
                if self.bits == 8 {
                    self.command = self.shift as u8;
                    self.shift = 0;
                    self.bits = 0;
                    self.phase = if self.command == CMD_READ {
                        Phase::Address
                    } else {
                        trace!("sram: ignoring command {:#04X}", self.command);
                        Phase::Ignore
                    };
                }
            }
            Phase::Address => {
                self.shift = (self.shift << 1) | u16::from(mosi);
                self.bits += 1;
                if self.bits == 16 {
                    self.address = (usize::from(self.shift) % self.mem.len()) as u16;
                    self.phase = Phase::Data;
                    self.frames = self.frames.saturating_add(1);
                    self.latch_byte();
                }
            }
            Phase::Data => {
                self.out_bit += 1;
                if self.out_bit == 8 {
                    self.address = self.address.wrapping_add(1);
                    if usize::from(self.address) >= self.mem.len() {
                        self.address = 0;
                    }
                    self.latch_byte();
                }
            }
            Phase::Deselected | Phase::Ignore => {}
        }
    }
}

impl Default for SerialSram {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE)
    }
}

impl SerialDevice for SerialSram {
    fn clock(&mut self, lines: SpiLines) -> bool {
        let prev = self.prev;
        self.prev = lines;

        if lines.cs_n {
            self.phase = Phase::Deselected;
            self.miso = false;
            return false;
        }

        if prev.cs_n {
            self.phase = Phase::Command;
            self.shift = 0;
            self.bits = 0;
        }

        if lines.sck && !prev.sck {
            self.on_rising(lines.mosi);
        } else if !lines.sck && prev.sck && self.phase == Phase::Data {
            self.miso = (self.out_byte >> (7 - self.out_bit)) & 1 != 0;
        }
        self.miso
    }
}

const SRAM_QUERY_PATHS: &[&str] = &["phase", "command", "address", "miso", "frames", "size"];

impl Observable for SerialSram {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "phase" => Some(self.phase.name().into()),
            "command" => Some(self.command.into()),
            "address" => Some(self.address.into()),
            "miso" => Some(self.miso.into()),
            "frames" => Some(self.frames.into()),
            "size" => Some((self.mem.len() as u64).into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        SRAM_QUERY_PATHS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOW: SpiLines = SpiLines {
        cs_n: false,
        sck: false,
        mosi: false,
    };

    /// Bit-bang one byte onto the device, MSB first; returns data-in levels
    /// seen at each rising edge.
    fn shift_byte(dev: &mut SerialSram, byte: u8) -> u8 {
        let mut got = 0;
        for i in (0..8).rev() {
            let mosi = (byte >> i) & 1 != 0;
            let miso = dev.clock(SpiLines { mosi, ..LOW });
            got = (got << 1) | u8::from(miso);
            dev.clock(SpiLines { sck: true, mosi, ..LOW });
        }
        got
    }

    #[test]
    fn streams_bytes_after_header() {
        let mut dev = SerialSram::new(256);
        dev.load(0x10, &[0xDE, 0xAD]);

        dev.clock(LOW);
        shift_byte(&mut dev, CMD_READ);
        shift_byte(&mut dev, 0x00);
        shift_byte(&mut dev, 0x10);
        assert_eq!(shift_byte(&mut dev, 0), 0xDE);
        assert_eq!(shift_byte(&mut dev, 0), 0xAD);
        assert_eq!(dev.frames(), 1);
    }

    #[test]
    fn address_wraps_at_device_size() {
        let mut dev = SerialSram::new(16);
        dev.load(15, &[0x11, 0x22]);
        assert_eq!(dev.peek(15), 0x11);
        assert_eq!(dev.peek(0), 0x22);

        dev.clock(LOW);
        shift_byte(&mut dev, CMD_READ);
        shift_byte(&mut dev, 0x00);
        shift_byte(&mut dev, 0x0F);
        assert_eq!(shift_byte(&mut dev, 0), 0x11);
        assert_eq!(shift_byte(&mut dev, 0), 0x22);
    }

    #[test]
    fn unknown_command_keeps_data_in_low() {
        let mut dev = SerialSram::new(256);
        dev.load(0, &[0xFF; 4]);

        dev.clock(LOW);
        shift_byte(&mut dev, 0x9F);
        shift_byte(&mut dev, 0x00);
        shift_byte(&mut dev, 0x00);
        assert_eq!(shift_byte(&mut dev, 0), 0x00);
        assert_eq!(dev.query("phase"), Some(Value::from("Ignore")));
        assert_eq!(dev.frames(), 0);
    }

    #[test]
    fn deselect_mid_header_restarts_framing() {
        let mut dev = SerialSram::new(256);
        dev.load(0x02, &[0x5A]);

        dev.clock(LOW);
        shift_byte(&mut dev, CMD_READ);
        shift_byte(&mut dev, 0x00);
        assert!(!dev.clock(SpiLines::IDLE));

        dev.clock(LOW);
        shift_byte(&mut dev, CMD_READ);
        shift_byte(&mut dev, 0x00);
        shift_byte(&mut dev, 0x02);
        assert_eq!(shift_byte(&mut dev, 0), 0x5A);
    }
}
