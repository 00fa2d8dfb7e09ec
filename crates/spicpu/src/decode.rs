//! Instruction decoder.
//!
//! An instruction byte is `oooo aaaa`: a 4-bit opcode and a 4-bit
//! argument. Every opcode value names exactly one of sixteen operations,
//! so decoding is total: there is no invalid instruction.

use std::fmt;

use crate::alu::AluOp;

/// The sixteen operations, in opcode order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Op {
    /// Load A from the argument's source.
    Lda = 0,
    /// Load B.
    Ldb = 1,
    /// Load the output latch (drives the result bus).
    Ldo = 2,
    /// Load shift register A.
    Ldsa = 3,
    /// Load shift register B.
    Ldsb = 4,
    /// Shift a shift register left by one.
    Lsh = 5,
    /// Shift a shift register right by one.
    Rsh = 6,
    /// Clear A.
    Clr = 7,
    /// Skip by a signed displacement if A is nonzero.
    Snza = 8,
    /// Skip by a signed displacement if a shift register is nonzero.
    Snzs = 9,
    Add = 10,
    Sub = 11,
    And = 12,
    Or = 13,
    Xor = 14,
    /// Invert A.
    Inv = 15,
}

impl Op {
    /// All operations in opcode order.
    pub const ALL: [Op; 16] = [
        Op::Lda,
        Op::Ldb,
        Op::Ldo,
        Op::Ldsa,
        Op::Ldsb,
        Op::Lsh,
        Op::Rsh,
        Op::Clr,
        Op::Snza,
        Op::Snzs,
        Op::Add,
        Op::Sub,
        Op::And,
        Op::Or,
        Op::Xor,
        Op::Inv,
    ];

    /// Decode the low four bits of `nibble`.
    #[must_use]
    pub const fn from_nibble(nibble: u8) -> Op {
        Self::ALL[(nibble & 0x0F) as usize]
    }

    #[must_use]
    pub const fn opcode(self) -> u8 {
        self as u8
    }

    /// Name of the control line this operation asserts.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        ControlLines::NAMES[self as usize]
    }

    /// The single control line this operation asserts.
    #[must_use]
    pub const fn control(self) -> ControlLines {
        ControlLines(1 << self as u16)
    }

    /// ALU function selected by this operation, if any.
    #[must_use]
    pub const fn alu_op(self) -> Option<AluOp> {
        match self {
            Op::Add => Some(AluOp::Add),
            Op::Sub => Some(AluOp::Sub),
            Op::And => Some(AluOp::And),
            Op::Or => Some(AluOp::Or),
            Op::Xor => Some(AluOp::Xor),
            Op::Inv => Some(AluOp::Inv),
            Op::Clr => Some(AluOp::Clr),
            _ => None,
        }
    }

    /// True for operations whose argument selects an operand [`Source`].
    #[must_use]
    pub const fn reads_source(self) -> bool {
        matches!(
            self,
            Op::Lda | Op::Ldb | Op::Ldo | Op::Ldsa | Op::Ldsb | Op::Add | Op::Sub | Op::And | Op::Or | Op::Xor
        )
    }

    /// True for the conditional skips, which always carry a displacement.
    #[must_use]
    pub const fn is_skip(self) -> bool {
        matches!(self, Op::Snza | Op::Snzs)
    }
}

/// Sixteen one-hot control lines, bit `n` for opcode `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlLines(u16);

impl ControlLines {
    /// Line names, indexed by opcode.
    pub const NAMES: [&'static str; 16] = [
        "LDA", "LDB", "LDO", "LDSA", "LDSB", "LSH", "RSH", "CLR", "SNZA", "SNZS", "ADD", "SUB",
        "AND", "OR", "XOR", "INV",
    ];

    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    #[must_use]
    pub const fn is_asserted(self, op: Op) -> bool {
        self.0 & (1 << op as u16) != 0
    }

    #[must_use]
    pub const fn count_asserted(self) -> u32 {
        self.0.count_ones()
    }

    /// Names of every asserted line.
    pub fn asserted(self) -> impl Iterator<Item = &'static str> {
        Self::NAMES
            .into_iter()
            .enumerate()
            .filter(move |(i, _)| self.0 & (1u16 << *i) != 0)
            .map(|(_, name)| name)
    }
}

/// Decode a 4-bit opcode to its control lines. Bits above 3 are ignored.
#[must_use]
pub const fn decode(opcode: u8) -> ControlLines {
    Op::from_nibble(opcode).control()
}

/// Where a load or ALU operation takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// The byte following the instruction.
    Immediate,
    /// Operand bus bits 7:4.
    OperandHi,
    /// Operand bus bits 3:0.
    OperandLo,
    A,
    B,
    Sa,
    Sb,
    /// Constant zero. Argument values 7 and above.
    Zero,
}

impl Source {
    #[must_use]
    pub const fn from_arg(arg: u8) -> Source {
        match arg & 0x0F {
            0 => Source::Immediate,
            1 => Source::OperandHi,
            2 => Source::OperandLo,
            3 => Source::A,
            4 => Source::B,
            5 => Source::Sa,
            6 => Source::Sb,
            _ => Source::Zero,
        }
    }

    #[must_use]
    pub const fn arg(self) -> u8 {
        match self {
            Source::Immediate => 0,
            Source::OperandHi => 1,
            Source::OperandLo => 2,
            Source::A => 3,
            Source::B => 4,
            Source::Sa => 5,
            Source::Sb => 6,
            Source::Zero => 7,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Source::Immediate => "#",
            Source::OperandHi => "hi",
            Source::OperandLo => "lo",
            Source::A => "a",
            Source::B => "b",
            Source::Sa => "sa",
            Source::Sb => "sb",
            Source::Zero => "0",
        }
    }
}

/// Shift register selected by argument bit 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftReg {
    Sa,
    Sb,
}

impl ShiftReg {
    #[must_use]
    pub const fn from_arg(arg: u8) -> ShiftReg {
        if arg & 1 == 0 { ShiftReg::Sa } else { ShiftReg::Sb }
    }

    #[must_use]
    pub const fn arg(self) -> u8 {
        match self {
            ShiftReg::Sa => 0,
            ShiftReg::Sb => 1,
        }
    }
}

/// A decoded instruction byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub op: Op,
    /// Low nibble of the instruction byte.
    pub arg: u8,
}

impl Instruction {
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        Self {
            op: Op::from_nibble(byte >> 4),
            arg: byte & 0x0F,
        }
    }

    #[must_use]
    pub const fn to_byte(self) -> u8 {
        (self.op.opcode() << 4) | (self.arg & 0x0F)
    }

    /// Operation reading `src`.
    #[must_use]
    pub const fn with_source(op: Op, src: Source) -> Self {
        Self { op, arg: src.arg() }
    }

    /// Shift or skip acting on `reg`.
    #[must_use]
    pub const fn with_shift_reg(op: Op, reg: ShiftReg) -> Self {
        Self { op, arg: reg.arg() }
    }

    #[must_use]
    pub const fn source(self) -> Source {
        Source::from_arg(self.arg)
    }

    #[must_use]
    pub const fn shift_reg(self) -> ShiftReg {
        ShiftReg::from_arg(self.arg)
    }

    /// True when one more byte must be fetched before execution.
    #[must_use]
    pub const fn needs_immediate(self) -> bool {
        self.op.is_skip() || (self.op.reads_source() && matches!(self.source(), Source::Immediate))
    }

    /// Bytes this instruction occupies in memory.
    #[must_use]
    pub const fn byte_len(self) -> u16 {
        if self.needs_immediate() { 2 } else { 1 }
    }
}

impl Default for Instruction {
    fn default() -> Self {
        Self::from_byte(0x00)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.op.mnemonic();
        match self.op {
            Op::Clr | Op::Inv => write!(f, "{name}"),
            Op::Lsh | Op::Rsh | Op::Snzs => {
                let reg = match self.shift_reg() {
                    ShiftReg::Sa => "sa",
                    ShiftReg::Sb => "sb",
                };
                write!(f, "{name} {reg}")
            }
            Op::Snza => write!(f, "{name}"),
            _ => write!(f, "{name} {}", self.source().name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_opcode_asserts_exactly_one_line() {
        let expected = [
            "LDA", "LDB", "LDO", "LDSA", "LDSB", "LSH", "RSH", "CLR", "SNZA", "SNZS", "ADD", "SUB",
            "AND", "OR", "XOR", "INV",
        ];
        for opcode in 0..16u8 {
            let lines = decode(opcode);
            let ones: Vec<_> = lines.asserted().collect();
            assert_eq!(ones.len(), 1, "opcode {opcode}: {ones:?}");
            assert_eq!(ones[0], expected[usize::from(opcode)], "opcode {opcode}");
        }
    }

    #[test]
    fn decoding_is_injective() {
        let mut seen = 0u16;
        for opcode in 0..16u8 {
            let bits = decode(opcode).bits();
            assert_eq!(seen & bits, 0, "opcode {opcode} reuses a line");
            seen |= bits;
        }
        assert_eq!(seen, 0xFFFF);
    }

    #[test]
    fn upper_bits_are_ignored() {
        for opcode in 0..16u8 {
            assert_eq!(decode(opcode | 0xF0), decode(opcode));
        }
    }

    #[test]
    fn control_matches_op_table() {
        for op in Op::ALL {
            assert!(op.control().is_asserted(op));
            assert_eq!(op.control().count_asserted(), 1);
            assert_eq!(Op::from_nibble(op.opcode()), op);
        }
    }

    #[test]
    fn alu_ops_are_the_seven_alu_lines() {
        let alu: Vec<_> = Op::ALL.into_iter().filter(|op| op.alu_op().is_some()).collect();
        assert_eq!(alu, [Op::Clr, Op::Add, Op::Sub, Op::And, Op::Or, Op::Xor, Op::Inv]);
    }

    #[test]
    fn instruction_length_follows_source() {
        assert_eq!(Instruction::from_byte(0x00).byte_len(), 2); // LDA #
        assert_eq!(Instruction::from_byte(0x01).byte_len(), 1); // LDA hi
        assert_eq!(Instruction::from_byte(0xA0).byte_len(), 2); // ADD #
        assert_eq!(Instruction::from_byte(0xA5).byte_len(), 1); // ADD sa
        assert_eq!(Instruction::from_byte(0x80).byte_len(), 2); // SNZA
        assert_eq!(Instruction::from_byte(0x91).byte_len(), 2); // SNZS sb
        assert_eq!(Instruction::from_byte(0x70).byte_len(), 1); // CLR ignores arg
        assert_eq!(Instruction::from_byte(0xF0).byte_len(), 1); // INV ignores arg
        assert_eq!(Instruction::from_byte(0x50).byte_len(), 1); // LSH sa
    }

    #[test]
    fn reserved_sources_read_zero() {
        for arg in 7..16 {
            assert_eq!(Source::from_arg(arg), Source::Zero);
        }
    }

    #[test]
    fn byte_encoding_round_trips() {
        for byte in 0..=255u8 {
            assert_eq!(Instruction::from_byte(byte).to_byte(), byte);
        }
    }

    #[test]
    fn disassembles() {
        assert_eq!(Instruction::from_byte(0x31).to_string(), "LDSA hi");
        assert_eq!(Instruction::from_byte(0x61).to_string(), "RSH sb");
        assert_eq!(Instruction::from_byte(0xC0).to_string(), "AND #");
        assert_eq!(Instruction::from_byte(0x7F).to_string(), "CLR");
        assert_eq!(Instruction::from_byte(0x17).to_string(), "LDB 0");
    }
}
