//! Fetch/decode/execute sequencer.
//!
//! Each instruction goes through:
//!
//! 1. `Fetch` - start a one-byte read at PC.
//! 2. `AwaitOpcode` - wait for the bus master; decode the byte.
//! 3. `AwaitOperand` - only when the instruction carries an immediate
//!    or displacement byte: a second one-byte read at PC+1.
//! 4. `Execute` - one tick: ALU, register write-back, PC update.
//!
//! The sequencer never starts a read while the bus master is busy, so at
//! most one transaction is ever outstanding.

use log::trace;
use spi_master::SpiMaster;

use crate::alu;
use crate::decode::{Instruction, Op, ShiftReg, Source};
use crate::registers::Registers;

/// Sequencer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Fetch,
    AwaitOpcode,
    AwaitOperand,
    Execute,
}

impl Phase {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fetch => "Fetch",
            Self::AwaitOpcode => "AwaitOpcode",
            Self::AwaitOperand => "AwaitOperand",
            Self::Execute => "Execute",
        }
    }
}

pub struct Sequencer {
    regs: Registers,
    phase: Phase,
    /// Instruction being executed.
    instruction: Instruction,
    /// Immediate or displacement byte for the current instruction.
    operand: u8,
    /// Instructions retired since reset.
    executed: u64,
}

impl Sequencer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: Registers::default(),
            phase: Phase::Fetch,
            instruction: Instruction::default(),
            operand: 0,
            executed: 0,
        }
    }

    /// Advance one tick. Called before the bus master ticks, so a read
    /// started here puts chip-select low on this same tick.
    ///
    /// `operand_bus` is the live operand input: high nibble A, low nibble B.
    pub fn step(&mut self, bus: &mut SpiMaster, operand_bus: u8) {
        match self.phase {
            Phase::Fetch => {
                bus.start_read(self.regs.pc, 1);
                self.phase = Phase::AwaitOpcode;
            }
            Phase::AwaitOpcode => {
                let Some(byte) = Self::take_byte(bus) else {
                    return;
                };
                self.instruction = Instruction::from_byte(byte);
                self.operand = 0;
                if self.instruction.needs_immediate() {
                    bus.start_read(self.regs.pc.wrapping_add(1), 1);
                    self.phase = Phase::AwaitOperand;
                } else {
                    self.phase = Phase::Execute;
                }
            }
            Phase::AwaitOperand => {
                let Some(byte) = Self::take_byte(bus) else {
                    return;
                };
                self.operand = byte;
                self.phase = Phase::Execute;
            }
            Phase::Execute => {
                self.execute(operand_bus);
                self.phase = Phase::Fetch;
            }
        }
    }

    fn take_byte(bus: &SpiMaster) -> Option<u8> {
        if bus.is_done() {
            bus.received().first().copied()
        } else {
            None
        }
    }

    fn read_source(&self, src: Source, operand_bus: u8) -> u8 {
        match src {
            Source::Immediate => self.operand,
            Source::OperandHi => operand_bus >> 4,
            Source::OperandLo => operand_bus & 0x0F,
            Source::A => self.regs.a,
            Source::B => self.regs.b,
            Source::Sa => self.regs.sa,
            Source::Sb => self.regs.sb,
            Source::Zero => 0,
        }
    }

    fn shift_reg(&mut self, reg: ShiftReg) -> &mut u8 {
        match reg {
            ShiftReg::Sa => &mut self.regs.sa,
            ShiftReg::Sb => &mut self.regs.sb,
        }
    }

    fn execute(&mut self, operand_bus: u8) {
        let instr = self.instruction;
        let pc = self.regs.pc;
        let value = if instr.op.reads_source() {
            self.read_source(instr.source(), operand_bus)
        } else {
            0
        };
        let result = alu::compute(self.regs.a, value, instr.op.alu_op());
        let mut next = pc.wrapping_add(instr.byte_len());

        match instr.op {
            Op::Lda => self.regs.a = value,
            Op::Ldb => self.regs.b = value,
            Op::Ldo => self.regs.out = value,
            Op::Ldsa => self.regs.sa = value,
            Op::Ldsb => self.regs.sb = value,
            Op::Lsh => *self.shift_reg(instr.shift_reg()) <<= 1,
            Op::Rsh => *self.shift_reg(instr.shift_reg()) >>= 1,
            Op::Snza => {
                if self.regs.a != 0 {
                    next = next.wrapping_add_signed(i16::from(self.operand as i8));
                }
            }
            Op::Snzs => {
                if *self.shift_reg(instr.shift_reg()) != 0 {
                    next = next.wrapping_add_signed(i16::from(self.operand as i8));
                }
            }
            Op::Clr | Op::Add | Op::Sub | Op::And | Op::Or | Op::Xor | Op::Inv => {
                self.regs.a = result.value;
            }
        }
        self.regs.overflow = result.overflow;
        self.regs.pc = next;
        self.executed = self.executed.saturating_add(1);

        trace!(
            "{pc:04X}: {instr} a={:02X} b={:02X} sa={:02X} sb={:02X} out={:02X} v={} -> {next:04X}",
            self.regs.a,
            self.regs.b,
            self.regs.sa,
            self.regs.sb,
            self.regs.out,
            u8::from(self.regs.overflow),
        );
    }

    /// Return to the power-on state: PC zero, every register cleared, the
    /// next tick fetches from address 0.
    pub fn reset(&mut self) {
        self.regs = Registers::default();
        self.phase = Phase::Fetch;
        self.instruction = Instruction::default();
        self.operand = 0;
        self.executed = 0;
    }

    #[must_use]
    pub fn registers(&self) -> Registers {
        self.regs
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn instruction(&self) -> Instruction {
        self.instruction
    }

    #[must_use]
    pub fn executed(&self) -> u64 {
        self.executed
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}
