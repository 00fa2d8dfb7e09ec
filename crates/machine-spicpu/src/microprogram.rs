//! Stock microprogram and a listing helper.

use spicpu::{Instruction, Op, ShiftReg, Source};

/// Shift-and-add 4x4 multiplier.
///
/// Reads A and B from the operand bus, multiplies them one bit of B at a
/// time and latches the 8-bit product on the result bus, then jumps back
/// to address 0 and does it again, so a new pair of operands shows up
/// within two passes.
///
/// SA holds the shifted multiplicand, SB the remaining multiplier bits,
/// B the running product. A is scratch.
pub const MULTIPLY: [u8; 22] = [
    src(Op::Ldsa, Source::OperandHi), // 00  SA = A
    src(Op::Ldsb, Source::OperandLo), // 01  SB = B
    src(Op::Ldb, Source::Zero), // 02  product = 0
    src(Op::Lda, Source::Sb), // 03  loop:
    src(Op::And, Source::Immediate),
    0x01, // 04  low multiplier bit
    src(Op::Xor, Source::Immediate),
    0x01, // 06  A = 1 if the bit is clear
    src(Op::Snza, Source::Immediate),
    3, // 08  bit clear: skip the add
    src(Op::Lda, Source::B), // 0A
    src(Op::Add, Source::Sa), // 0B
    src(Op::Ldb, Source::A), // 0C  product += SA
    reg(Op::Lsh, ShiftReg::Sa), // 0D
    reg(Op::Rsh, ShiftReg::Sb), // 0E
    reg(Op::Snzs, ShiftReg::Sb),
    (-14i8) as u8, // 0F  bits left: loop
    src(Op::Ldo, Source::B), // 11
    src(Op::Lda, Source::Immediate),
    0x01, // 12
    src(Op::Snza, Source::Immediate),
    (-22i8) as u8, // 14  back to 00
];

const fn src(op: Op, source: Source) -> u8 {
    Instruction::with_source(op, source).to_byte()
}

const fn reg(op: Op, reg: ShiftReg) -> u8 {
    Instruction::with_shift_reg(op, reg).to_byte()
}

/// One disassembled instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingLine {
    pub address: u16,
    pub bytes: Vec<u8>,
    pub text: String,
}

/// Disassemble `image` as loaded at address 0.
///
/// Skip targets are resolved to absolute addresses. A trailing opcode
/// whose operand byte lies past the end of the image is listed alone.
#[must_use]
pub fn listing(image: &[u8]) -> Vec<ListingLine> {
    let mut lines = Vec::new();
    let mut i = 0usize;
    while i < image.len() {
        let instr = Instruction::from_byte(image[i]);
        let address = u16::try_from(i).unwrap_or(u16::MAX);
        let operand = if instr.needs_immediate() {
            image.get(i + 1).copied()
        } else {
            None
        };
        let text = match operand {
            Some(d) if instr.op.is_skip() => {
                let next = address.wrapping_add(instr.byte_len());
                let target = next.wrapping_add_signed(i16::from(d as i8));
                format!("{instr} {target:04X}")
            }
            Some(imm) if instr.source() == Source::Immediate => format!("{instr}${imm:02X}"),
            _ => instr.to_string(),
        };
        let len = 1 + usize::from(operand.is_some());
        lines.push(ListingLine {
            address,
            bytes: image[i..i + len].to_vec(),
            text,
        });
        i += len;
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiply_listing() {
        let lines = listing(&MULTIPLY);
        let text: Vec<(u16, &str)> = lines.iter().map(|l| (l.address, l.text.as_str())).collect();
        assert_eq!(
            text,
            vec![
                (0x00, "LDSA hi"),
                (0x01, "LDSB lo"),
                (0x02, "LDB 0"),
                (0x03, "LDA sb"),
                (0x04, "AND #$01"),
                (0x06, "XOR #$01"),
                (0x08, "SNZA 000D"),
                (0x0A, "LDA b"),
                (0x0B, "ADD sa"),
                (0x0C, "LDB a"),
                (0x0D, "LSH sa"),
                (0x0E, "RSH sb"),
                (0x0F, "SNZS sb 0003"),
                (0x11, "LDO b"),
                (0x12, "LDA #$01"),
                (0x14, "SNZA 0000"),
            ]
        );
        let total: usize = lines.iter().map(|l| l.bytes.len()).sum();
        assert_eq!(total, MULTIPLY.len());
    }

    #[test]
    fn multiply_image_bytes() {
        assert_eq!(
            MULTIPLY,
            [
                0x31, 0x42, 0x17, 0x06, 0xC0, 0x01, 0xE0, 0x01, 0x80, 0x03, 0x04, 0xA5, 0x13, 0x50,
                0x61, 0x91, 0xF2, 0x24, 0x00, 0x01, 0x80, 0xEA,
            ]
        );
    }

    #[test]
    fn truncated_operand_is_listed_alone() {
        let lines = listing(&[0x00]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].bytes, vec![0x00]);
        assert_eq!(lines[0].text, "LDA #");
    }
}
