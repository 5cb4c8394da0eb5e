//! Expressions evaluated inside process bodies.
//!
//! Expressions are trees over signal reads and constants. They carry no
//! type annotations; widths are inferred and checked during elaboration, so
//! a well-formed elaborated design can be evaluated without width failures.

use kairos_common::Value;
use serde::{Deserialize, Serialize};

use crate::ids::SignalId;

/// A one-operand operation.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Bitwise complement.
    Not,
    /// Two's complement negation.
    Neg,
    /// AND of all bits, producing one bit.
    RedAnd,
    /// OR of all bits, producing one bit.
    RedOr,
    /// XOR of all bits (parity), producing one bit.
    RedXor,
}

/// A two-operand operation. Both operands must have the same width.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum BinaryOp {
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
    /// Wrapping addition.
    Add,
    /// Wrapping subtraction.
    Sub,
    /// Wrapping multiplication.
    Mul,
    /// Logical left shift by the right operand's value.
    Shl,
    /// Right shift; arithmetic when the left operand is signed.
    Shr,
    /// Equality, one bit.
    Eq,
    /// Inequality, one bit.
    Ne,
    /// Less-than, one bit.
    Lt,
    /// Less-than-or-equal, one bit.
    Le,
    /// Greater-than, one bit.
    Gt,
    /// Greater-than-or-equal, one bit.
    Ge,
}

impl BinaryOp {
    /// Short name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Shl => "shl",
            BinaryOp::Shr => "shr",
            BinaryOp::Eq => "eq",
            BinaryOp::Ne => "ne",
            BinaryOp::Lt => "lt",
            BinaryOp::Le => "le",
            BinaryOp::Gt => "gt",
            BinaryOp::Ge => "ge",
        }
    }

    /// Whether the result is always one bit wide.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }
}

/// An expression tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Expr {
    /// A constant value.
    Const(Value),
    /// The current value of a signal.
    Read(SignalId),
    /// Bits `high..=low` of a signal.
    Slice {
        /// Signal being sliced.
        signal: SignalId,
        /// High bit index, inclusive.
        high: u32,
        /// Low bit index, inclusive.
        low: u32,
    },
    /// Concatenation; the first element supplies the most significant bits.
    Concat(Vec<Expr>),
    /// A one-operand operation.
    Unary {
        /// The operation.
        op: UnaryOp,
        /// Operand.
        arg: Box<Expr>,
    },
    /// A two-operand operation.
    Binary {
        /// The operation.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// A two-way multiplexer with a 1-bit select.
    ///
    /// When the select is `X`, the result is the per-bit agreement of the
    /// two inputs: positions where both agree keep their value, every other
    /// position is `X`.
    Mux {
        /// 1-bit select.
        cond: Box<Expr>,
        /// Value when the select is 1.
        when_true: Box<Expr>,
        /// Value when the select is 0.
        when_false: Box<Expr>,
    },
    /// Widening with zero fill.
    ZeroExtend {
        /// Target width.
        width: u32,
        /// Operand.
        arg: Box<Expr>,
    },
    /// Widening that replicates the most significant bit.
    SignExtend {
        /// Target width.
        width: u32,
        /// Operand.
        arg: Box<Expr>,
    },
    /// Narrowing that keeps the low bits.
    Truncate {
        /// Target width.
        width: u32,
        /// Operand.
        arg: Box<Expr>,
    },
}

impl Expr {
    /// A constant.
    pub fn lit(value: Value) -> Expr {
        Expr::Const(value)
    }

    /// Reads a signal.
    pub fn read(signal: SignalId) -> Expr {
        Expr::Read(signal)
    }

    /// Bits `high..=low` of a signal.
    pub fn slice(signal: SignalId, high: u32, low: u32) -> Expr {
        Expr::Slice { signal, high, low }
    }

    /// Concatenates parts, first part most significant.
    pub fn concat(parts: Vec<Expr>) -> Expr {
        Expr::Concat(parts)
    }

    /// Applies a unary operation.
    pub fn unary(op: UnaryOp, arg: Expr) -> Expr {
        Expr::Unary {
            op,
            arg: Box::new(arg),
        }
    }

    /// Applies a binary operation.
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Bitwise complement.
    pub fn not(arg: Expr) -> Expr {
        Expr::unary(UnaryOp::Not, arg)
    }

    /// Bitwise AND.
    pub fn and(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::And, lhs, rhs)
    }

    /// Bitwise OR.
    pub fn or(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Or, lhs, rhs)
    }

    /// Bitwise XOR.
    pub fn xor(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Xor, lhs, rhs)
    }

    /// Wrapping addition.
    pub fn add(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Add, lhs, rhs)
    }

    /// Wrapping subtraction.
    pub fn sub(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Sub, lhs, rhs)
    }

    /// Equality, one bit.
    pub fn eq(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Eq, lhs, rhs)
    }

    /// A two-way multiplexer with a 1-bit select.
    pub fn mux(cond: Expr, when_true: Expr, when_false: Expr) -> Expr {
        Expr::Mux {
            cond: Box::new(cond),
            when_true: Box::new(when_true),
            when_false: Box::new(when_false),
        }
    }

    /// Widens with zero fill.
    pub fn zero_extend(width: u32, arg: Expr) -> Expr {
        Expr::ZeroExtend {
            width,
            arg: Box::new(arg),
        }
    }

    /// Widens by replicating the most significant bit.
    pub fn sign_extend(width: u32, arg: Expr) -> Expr {
        Expr::SignExtend {
            width,
            arg: Box::new(arg),
        }
    }

    /// Narrows, keeping the low bits.
    pub fn truncate(width: u32, arg: Expr) -> Expr {
        Expr::Truncate {
            width,
            arg: Box::new(arg),
        }
    }

    /// Appends every signal this expression reads to `out`.
    pub fn collect_reads(&self, out: &mut Vec<SignalId>) {
        match self {
            Expr::Const(_) => {}
            Expr::Read(signal) => out.push(*signal),
            Expr::Slice { signal, .. } => out.push(*signal),
            Expr::Concat(parts) => {
                for part in parts {
                    part.collect_reads(out);
                }
            }
            Expr::Unary { arg, .. } => arg.collect_reads(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_reads(out);
                rhs.collect_reads(out);
            }
            Expr::Mux {
                cond,
                when_true,
                when_false,
            } => {
                cond.collect_reads(out);
                when_true.collect_reads(out);
                when_false.collect_reads(out);
            }
            Expr::ZeroExtend { arg, .. }
            | Expr::SignExtend { arg, .. }
            | Expr::Truncate { arg, .. } => arg.collect_reads(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_reads_finds_every_signal() {
        let a = SignalId::from_raw(0);
        let b = SignalId::from_raw(1);
        let c = SignalId::from_raw(2);
        let e = Expr::mux(
            Expr::read(c),
            Expr::add(Expr::read(a), Expr::read(b)),
            Expr::slice(a, 3, 0),
        );
        let mut reads = Vec::new();
        e.collect_reads(&mut reads);
        assert_eq!(reads, vec![c, a, b, a]);
    }

    #[test]
    fn constants_read_nothing() {
        let e = Expr::not(Expr::lit(kairos_common::Value::from_u64(5, 4)));
        let mut reads = Vec::new();
        e.collect_reads(&mut reads);
        assert!(reads.is_empty());
    }
}
