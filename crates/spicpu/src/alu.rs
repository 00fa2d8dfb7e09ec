//! 8-bit ALU.
//!
//! Purely combinational: the same inputs always give the same result and
//! nothing is remembered between evaluations.

/// ALU function, one per control line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AluOp {
    Add,
    Sub,
    And,
    Or,
    Xor,
    /// Complement of `in1`; `in2` is ignored.
    Inv,
    /// Forces both outputs to zero.
    Clr,
}

/// Result of one ALU evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AluResult {
    pub value: u8,
    /// Carry out of bit 7 for `Add`, borrow for `Sub`, clear otherwise.
    pub overflow: bool,
}

impl AluResult {
    pub const ZERO: Self = Self {
        value: 0,
        overflow: false,
    };
}

/// Evaluate `ctrl` on the two operands.
///
/// `None` means no ALU line is asserted this cycle; both outputs are then
/// zero rather than holding an earlier result.
#[must_use]
pub fn compute(in1: u8, in2: u8, ctrl: Option<AluOp>) -> AluResult {
    let Some(op) = ctrl else {
        return AluResult::ZERO;
    };
    match op {
        AluOp::Add => {
            let (value, overflow) = in1.overflowing_add(in2);
            AluResult { value, overflow }
        }
        AluOp::Sub => {
            let (value, overflow) = in1.overflowing_sub(in2);
            AluResult { value, overflow }
        }
        AluOp::And => logic(in1 & in2),
        AluOp::Or => logic(in1 | in2),
        AluOp::Xor => logic(in1 ^ in2),
        AluOp::Inv => logic(!in1),
        AluOp::Clr => AluResult::ZERO,
    }
}

fn logic(value: u8) -> AluResult {
    AluResult {
        value,
        overflow: false,
    }
}
