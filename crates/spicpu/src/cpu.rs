//! The CPU core: sequencer plus bus master behind one clock.

use log::debug;
use spi_master::SpiMaster;
use spicpu_core::{Observable, SpiLines, Ticks, Value};

use crate::registers::Registers;
use crate::sequencer::Sequencer;

/// Inputs sampled on each clock edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreInputs {
    /// Reset, active low. Synchronous: sampled on the clock edge.
    pub rst_n: bool,
    /// Core runs only while high.
    pub ena: bool,
    /// Operand bus: high nibble A, low nibble B.
    pub operands: u8,
    /// Serial data-in from the memory device.
    pub miso: bool,
}

impl Default for CoreInputs {
    fn default() -> Self {
        Self {
            rst_n: true,
            ena: true,
            operands: 0,
            miso: false,
        }
    }
}

/// Outputs after a clock edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreOutputs {
    /// Result bus: the output latch.
    pub result: u8,
    /// Serial link to the memory device.
    pub spi: SpiLines,
}

/// Serial-fetch CPU core.
///
/// Owns the sequencer and the bus master and steps them in a fixed order
/// each tick: sequencer first (it may start a read), then the bus master.
pub struct Core {
    seq: Sequencer,
    bus: SpiMaster,
    /// Ticks since creation, including reset and disabled ticks.
    ticks: Ticks,
    in_reset: bool,
}

impl Core {
    #[must_use]
    pub fn new() -> Self {
        Self {
            seq: Sequencer::new(),
            bus: SpiMaster::new(),
            ticks: Ticks::ZERO,
            in_reset: false,
        }
    }

    /// Advance one clock edge.
    ///
    /// Reset wins over enable: with `rst_n` low the bus master is forced
    /// idle (chip-select high) and every register is cleared on this edge,
    /// whatever was in flight. With `ena` low nothing moves and every
    /// output holds its level.
    pub fn tick(&mut self, inputs: CoreInputs) -> CoreOutputs {
        self.ticks.bump();

        if !inputs.rst_n {
            if !self.in_reset {
                debug!(
                    "core: reset at {} (pc {:#06X}, bus {:?})",
                    self.ticks,
                    self.seq.registers().pc,
                    self.bus.state()
                );
            }
            self.in_reset = true;
            self.reset();
            return self.outputs();
        }
        if self.in_reset {
            debug!("core: reset released at {}", self.ticks);
            self.in_reset = false;
        }

        if inputs.ena {
            self.seq.step(&mut self.bus, inputs.operands);
            self.bus.tick(inputs.miso);
        }
        self.outputs()
    }

    /// Force the power-on state immediately.
    pub fn reset(&mut self) {
        self.bus.reset();
        self.seq.reset();
    }

    #[must_use]
    pub fn outputs(&self) -> CoreOutputs {
        CoreOutputs {
            result: self.seq.registers().out,
            spi: self.bus.lines(),
        }
    }

    #[must_use]
    pub fn registers(&self) -> Registers {
        self.seq.registers()
    }

    #[must_use]
    pub fn sequencer(&self) -> &Sequencer {
        &self.seq
    }

    #[must_use]
    pub fn bus(&self) -> &SpiMaster {
        &self.bus
    }

    #[must_use]
    pub fn ticks(&self) -> Ticks {
        self.ticks
    }

    /// True while the last sampled reset input was asserted.
    #[must_use]
    pub fn in_reset(&self) -> bool {
        self.in_reset
    }
}

impl Default for Core {
    fn default() -> Self {
        Self::new()
    }
}

const CORE_QUERY_PATHS: &[&str] = &[
    "pc",
    "a",
    "b",
    "sa",
    "sb",
    "out",
    "overflow",
    "phase",
    "instruction",
    "opcode",
    "executed",
    "ticks",
    "in_reset",
    "bus.state",
    "bus.cs_n",
    "bus.sck",
    "bus.mosi",
    "bus.address",
    "bus.length",
    "bus.bit",
    "bus.byte",
    "bus.done",
    "bus.transactions",
];

impl Observable for Core {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("bus.") {
            return self.bus.query(rest);
        }
        let regs = self.seq.registers();
        match path {
            "pc" => Some(regs.pc.into()),
            "a" => Some(regs.a.into()),
            "b" => Some(regs.b.into()),
            "sa" => Some(regs.sa.into()),
            "sb" => Some(regs.sb.into()),
            "out" => Some(regs.out.into()),
            "overflow" => Some(regs.overflow.into()),
            "phase" => Some(self.seq.phase().name().into()),
            "instruction" => Some(self.seq.instruction().to_string().into()),
            "opcode" => Some(self.seq.instruction().op.opcode().into()),
            "executed" => Some(self.seq.executed().into()),
            "ticks" => Some(self.ticks.get().into()),
            "in_reset" => Some(self.in_reset.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        CORE_QUERY_PATHS
    }
}
