//! The board: core plus external memory behind the shared pins.

use log::{debug, info};
use spi_sram::SerialSram;
use spicpu::{Core, CoreInputs, Registers};
use spicpu_core::{MasterClock, Observable, SerialDevice, Tickable, Ticks, Value};

use crate::config::MachineConfig;
use crate::error::MachineError;
use crate::pins::Pins;
use crate::trace::PinSample;

/// Ticks that cover two worst-case passes of the multiply routine, so a
/// product for freshly applied operands is on the result bus afterwards.
pub const SETTLE_TICKS: u64 = 20_000;

/// Serial-fetch CPU board.
///
/// Reset, enable and the operand bus are latched inputs: set them, then
/// tick. Data-in from the memory reaches the core one tick after the
/// memory drives it, as through a register on real pins.
pub struct Machine {
    core: Core,
    sram: SerialSram,
    clock: MasterClock,
    rst_n: bool,
    ena: bool,
    ui_in: u8,
    miso: bool,
    trace: Option<Vec<PinSample>>,
}

impl Machine {
    /// Build a board from `config` with the program loaded at address 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the config fails [`MachineConfig::validate`].
    pub fn new(config: &MachineConfig) -> Result<Self, MachineError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Stock multiplier board.
    #[must_use]
    pub fn multiplier() -> Self {
        Self::build(&MachineConfig::default())
    }

    fn build(config: &MachineConfig) -> Self {
        let image = config.image();
        let mut sram = SerialSram::new(config.memory_size);
        sram.load(0, image);
        info!(
            "machine: {} byte program in {} byte memory, clock {} Hz",
            image.len(),
            sram.size(),
            config.clock.frequency_hz
        );
        Self {
            core: Core::new(),
            sram,
            clock: config.clock,
            rst_n: true,
            ena: true,
            ui_in: config.operands,
            miso: false,
            trace: None,
        }
    }

    /// Drive the operand bus: A in bits 7:4, B in bits 3:0.
    pub fn set_operand_bus(&mut self, ui_in: u8) {
        if ui_in != self.ui_in {
            debug!("machine: operands {:#04X} -> {ui_in:#04X}", self.ui_in);
        }
        self.ui_in = ui_in;
    }

    /// Drive both 4-bit operands; upper bits are discarded.
    pub fn set_operands(&mut self, a: u8, b: u8) {
        self.set_operand_bus(((a & 0x0F) << 4) | (b & 0x0F));
    }

    /// Hold reset asserted (`true`) or released.
    pub fn set_reset(&mut self, asserted: bool) {
        self.rst_n = !asserted;
    }

    pub fn set_enable(&mut self, enabled: bool) {
        self.ena = enabled;
    }

    /// Assert reset for `ticks` ticks, then release it.
    pub fn reset_cycle(&mut self, ticks: u64) {
        self.set_reset(true);
        self.tick_n(Ticks::new(ticks.max(1)));
        self.set_reset(false);
    }

    /// Apply `a` and `b`, run until the product has settled, and return the
    /// result bus.
    pub fn multiply(&mut self, a: u8, b: u8) -> u8 {
        self.set_operands(a, b);
        self.tick_n(Ticks::new(SETTLE_TICKS));
        self.result()
    }

    /// Run until `executed` instructions have retired since reset, or
    /// `limit` ticks have passed. Returns the ticks spent.
    pub fn run_until_executed(&mut self, executed: u64, limit: u64) -> u64 {
        let mut spent = 0;
        while spent < limit && self.core.sequencer().executed() < executed {
            self.tick();
            spent += 1;
        }
        spent
    }

    /// Start recording pin samples, discarding any earlier trace.
    pub fn start_trace(&mut self) {
        self.trace = Some(Vec::new());
    }

    /// Stop recording and return what was captured.
    pub fn take_trace(&mut self) -> Vec<PinSample> {
        self.trace.take().unwrap_or_default()
    }

    /// The result bus.
    #[must_use]
    pub fn result(&self) -> u8 {
        self.core.outputs().result
    }

    #[must_use]
    pub fn pins(&self) -> Pins {
        let out = self.core.outputs();
        Pins::new(self.ui_in, out.result, out.spi, self.miso)
    }

    #[must_use]
    pub fn registers(&self) -> Registers {
        self.core.registers()
    }

    #[must_use]
    pub fn core(&self) -> &Core {
        &self.core
    }

    #[must_use]
    pub fn memory(&self) -> &SerialSram {
        &self.sram
    }

    #[must_use]
    pub fn clock(&self) -> MasterClock {
        self.clock
    }

    #[must_use]
    pub fn ticks(&self) -> Ticks {
        self.core.ticks()
    }
}

impl Tickable for Machine {
    fn tick(&mut self) {
        let sampled = self.miso;
        let out = self.core.tick(CoreInputs {
            rst_n: self.rst_n,
            ena: self.ena,
            operands: self.ui_in,
            miso: sampled,
        });
        self.miso = self.sram.clock(out.spi);

        if let Some(trace) = self.trace.as_mut() {
            trace.push(PinSample {
                tick: self.core.ticks().get(),
                cs_n: out.spi.cs_n,
                sck: out.spi.sck,
                mosi: out.spi.mosi,
                miso: sampled,
            });
        }
    }
}

const MACHINE_QUERY_PATHS: &[&str] = &[
    "ui_in",
    "uo_out",
    "uio_in",
    "uio_out",
    "uio_oe",
    "rst_n",
    "ena",
    "core.pc",
    "core.a",
    "core.b",
    "core.sa",
    "core.sb",
    "core.out",
    "core.overflow",
    "core.phase",
    "core.instruction",
    "core.opcode",
    "core.executed",
    "core.ticks",
    "core.in_reset",
    "core.bus.state",
    "core.bus.cs_n",
    "core.bus.sck",
    "core.bus.mosi",
    "core.bus.address",
    "core.bus.length",
    "core.bus.bit",
    "core.bus.byte",
    "core.bus.done",
    "core.bus.transactions",
    "sram.phase",
    "sram.command",
    "sram.address",
    "sram.miso",
    "sram.frames",
    "sram.size",
];

impl Observable for Machine {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("core.") {
            return self.core.query(rest);
        }
        if let Some(rest) = path.strip_prefix("sram.") {
            return self.sram.query(rest);
        }
        let pins = self.pins();
        match path {
            "ui_in" => Some(pins.ui_in.into()),
            "uo_out" => Some(pins.uo_out.into()),
            "uio_in" => Some(pins.uio_in.into()),
            "uio_out" => Some(pins.uio_out.into()),
            "uio_oe" => Some(pins.uio_oe.into()),
            "rst_n" => Some(self.rst_n.into()),
            "ena" => Some(self.ena.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        MACHINE_QUERY_PATHS
    }
}
