//! Transaction state machine.

use log::{debug, warn};
use spicpu_core::{Observable, SpiLines, Value};

use crate::{ADDRESS_BITS, COMMAND_BITS};

/// Sequential read command understood by the memory device.
pub const READ_COMMAND: u8 = 0x03;

/// Largest burst a single transaction can return.
pub const MAX_BURST: usize = u8::MAX as usize;

/// Transaction phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No transaction. Lines held at `SpiLines::IDLE`.
    Idle,
    /// Chip-select goes low this tick.
    AssertCs,
    /// Shifting the 8 command bits out.
    ShiftCmd,
    /// Shifting the 16 address bits out.
    ShiftAddr,
    /// Shifting `length` data bytes in.
    ShiftData,
    /// Chip-select goes high this tick; the transaction completes.
    DeassertCs,
}

impl State {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::AssertCs => "AssertCs",
            Self::ShiftCmd => "ShiftCmd",
            Self::ShiftAddr => "ShiftAddr",
            Self::ShiftData => "ShiftData",
            Self::DeassertCs => "DeassertCs",
        }
    }
}

/// Read-only serial bus master.
///
/// The owner starts a read with [`SpiMaster::start_read`], then calls
/// [`SpiMaster::tick`] once per system tick with the current data-in level
/// and drives the returned lines onto the link. [`SpiMaster::is_done`]
/// goes high on the tick chip-select is released and stays high until the
/// next read is started.
pub struct SpiMaster {
    state: State,
    lines: SpiLines,
    /// True when the next tick is the rising half of the current bit.
    high: bool,
    /// Bit position within the current field (command, address or byte).
    bit: u8,
    /// Data byte currently being received.
    byte: u8,
    address: u16,
    length: u8,
    shift_in: u8,
    data: [u8; MAX_BURST],
    received: u8,
    done: bool,
    transactions: u64,
}

impl SpiMaster {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            lines: SpiLines::IDLE,
            high: false,
            bit: 0,
            byte: 0,
            address: 0,
            length: 0,
            shift_in: 0,
            data: [0; MAX_BURST],
            received: 0,
            done: false,
            transactions: 0,
        }
    }

    /// Open a read of `length` bytes starting at `address`.
    ///
    /// Only one transaction may be outstanding. A request made while a
    /// transaction is in flight is an integration fault in the caller; it
    /// is dropped and the current transaction continues untouched.
    pub fn start_read(&mut self, address: u16, length: u8) {
        if self.is_busy() {
            warn!("spi: read of {address:#06X} dropped, bus busy in {:?}", self.state);
            return;
        }
        debug!("spi: open read {address:#06X} len {length}");
        self.state = State::AssertCs;
        self.address = address;
        self.length = length;
        self.received = 0;
        self.done = false;
    }

    /// Advance one system tick.
    ///
    /// `miso` is the data-in level as left by the device after the previous
    /// tick. Returns the lines to drive for this tick.
    pub fn tick(&mut self, miso: bool) -> SpiLines {
        match self.state {
            State::Idle => {
                self.lines = SpiLines::IDLE;
            }
            State::AssertCs => {
                self.lines = SpiLines {
                    cs_n: false,
                    sck: false,
                    mosi: false,
                };
                self.enter(State::ShiftCmd);
            }
            State::ShiftCmd => {
                let bit = (READ_COMMAND >> (COMMAND_BITS - 1 - self.bit)) & 1 != 0;
                if self.shift_out(bit, COMMAND_BITS) {
                    self.enter(State::ShiftAddr);
                }
            }
            State::ShiftAddr => {
                let bit = (self.address >> (ADDRESS_BITS - 1 - self.bit)) & 1 != 0;
                if self.shift_out(bit, ADDRESS_BITS) {
                    if self.length == 0 {
                        self.enter(State::DeassertCs);
                    } else {
                        self.enter(State::ShiftData);
                        self.byte = 0;
                        self.shift_in = 0;
                    }
                }
            }
            State::ShiftData => self.tick_data(miso),
            State::DeassertCs => {
                self.lines = SpiLines::IDLE;
                self.state = State::Idle;
                self.done = true;
                self.transactions = self.transactions.saturating_add(1);
                debug!(
                    "spi: close read {:#06X}, {} byte(s) {:02X?}",
                    self.address,
                    self.received,
                    self.received()
                );
            }
        }
        self.lines
    }

    /// One half-bit of an outgoing field. Returns true once the last bit's
    /// rising edge has been driven.
    fn shift_out(&mut self, bit: bool, width: u8) -> bool {
        if self.high {
            self.lines.sck = true;
            self.high = false;
            self.bit += 1;
            self.bit == width
        } else {
            self.lines.sck = false;
            self.lines.mosi = bit;
            self.high = true;
            false
        }
    }

    fn tick_data(&mut self, miso: bool) {
        if !self.high {
            // Falling edge: the device moves on to its next bit.
            self.lines.sck = false;
            self.lines.mosi = false;
            self.high = true;
            return;
        }

        self.lines.sck = true;
        self.high = false;
        self.shift_in = (self.shift_in << 1) | u8::from(miso);
        self.bit += 1;
        if self.bit < 8 {
            return;
        }

        self.data[usize::from(self.byte)] = self.shift_in;
        self.received = self.byte + 1;
        self.shift_in = 0;
        self.bit = 0;
        self.byte += 1;
        if self.byte == self.length {
            self.state = State::DeassertCs;
        }
    }

    fn enter(&mut self, state: State) {
        self.state = state;
        self.bit = 0;
        self.high = false;
    }

    /// Abort any transaction and return to `Idle` with chip-select high.
    ///
    /// Takes effect immediately: the lines read back as idle before the
    /// next tick.
    pub fn reset(&mut self) {
        if self.is_busy() {
            debug!("spi: reset aborted read {:#06X} in {:?}", self.address, self.state);
        }
        self.state = State::Idle;
        self.lines = SpiLines::IDLE;
        self.high = false;
        self.bit = 0;
        self.byte = 0;
        self.address = 0;
        self.length = 0;
        self.shift_in = 0;
        self.data = [0; MAX_BURST];
        self.received = 0;
        self.done = false;
    }

    /// True while a transaction is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.state != State::Idle
    }

    /// True once the last started transaction has completed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Bytes received by the last completed transaction.
    ///
    /// Empty while a transaction is in flight.
    #[must_use]
    pub fn received(&self) -> &[u8] {
        if self.done {
            &self.data[..usize::from(self.received)]
        } else {
            &[]
        }
    }

    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    /// Lines as driven on the last tick.
    #[must_use]
    pub fn lines(&self) -> SpiLines {
        self.lines
    }

    /// Completed transactions since power-on. Not cleared by reset.
    #[must_use]
    pub fn transactions(&self) -> u64 {
        self.transactions
    }
}

impl Default for SpiMaster {
    fn default() -> Self {
        Self::new()
    }
}

const SPI_QUERY_PATHS: &[&str] = &[
    "state",
    "cs_n",
    "sck",
    "mosi",
    "address",
    "length",
    "bit",
    "byte",
    "done",
    "transactions",
];

impl Observable for SpiMaster {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "state" => Some(self.state.name().into()),
            "cs_n" => Some(self.lines.cs_n.into()),
            "sck" => Some(self.lines.sck.into()),
            "mosi" => Some(self.lines.mosi.into()),
            "address" => Some(self.address.into()),
            "length" => Some(self.length.into()),
            "bit" => Some(self.bit.into()),
            "byte" => Some(self.byte.into()),
            "done" => Some(self.done.into()),
            "transactions" => Some(self.transactions.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        SPI_QUERY_PATHS
    }
}
