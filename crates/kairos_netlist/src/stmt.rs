//! Statements forming process bodies.

use kairos_common::Value;
use serde::{Deserialize, Serialize};

use crate::expr::Expr;
use crate::ids::SignalId;

/// Where an assignment lands: a whole signal or a contiguous bit range.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum AssignTarget {
    /// The whole signal.
    Signal(SignalId),
    /// Bits `high..=low` of a signal; the untouched bits keep their value.
    Slice {
        /// Signal being written.
        signal: SignalId,
        /// High bit index, inclusive.
        high: u32,
        /// Low bit index, inclusive.
        low: u32,
    },
}

impl AssignTarget {
    /// The signal this target writes into.
    pub fn signal(&self) -> SignalId {
        match self {
            AssignTarget::Signal(signal) => *signal,
            AssignTarget::Slice { signal, .. } => *signal,
        }
    }
}

/// One alternative of a case statement.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaseArm {
    /// Constant patterns selecting this arm. Patterns must be fully known
    /// and match the subject's width.
    pub matches: Vec<Value>,
    /// Statements executed when any pattern equals the subject.
    pub body: Vec<Statement>,
}

/// A statement inside a process body.
///
/// Control flow is structural only; there are no loops, so a single
/// execution of a body always terminates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Statement {
    /// Schedules a write of `value` to `target`. Writes take effect when
    /// the kernel commits the surrounding batch, not immediately; within
    /// one process execution the last write to a bit wins.
    Assign {
        /// Destination.
        target: AssignTarget,
        /// Value to write.
        value: Expr,
    },
    /// Two-way branch on a 1-bit condition.
    If {
        /// 1-bit condition.
        cond: Expr,
        /// Statements executed when the condition is 1.
        then_body: Vec<Statement>,
        /// Statements executed when the condition is 0.
        else_body: Vec<Statement>,
    },
    /// Multi-way branch on a subject value, first matching arm wins.
    Case {
        /// Value being matched.
        subject: Expr,
        /// Alternatives, tried in order.
        arms: Vec<CaseArm>,
        /// Statements executed when no arm matches.
        default: Vec<Statement>,
    },
}

impl Statement {
    /// Assigns `value` to a whole signal.
    pub fn assign(signal: SignalId, value: Expr) -> Statement {
        Statement::Assign {
            target: AssignTarget::Signal(signal),
            value,
        }
    }

    /// Assigns `value` to bits `high..=low` of a signal.
    pub fn assign_slice(signal: SignalId, high: u32, low: u32, value: Expr) -> Statement {
        Statement::Assign {
            target: AssignTarget::Slice { signal, high, low },
            value,
        }
    }

    /// A two-way branch.
    pub fn if_else(cond: Expr, then_body: Vec<Statement>, else_body: Vec<Statement>) -> Statement {
        Statement::If {
            cond,
            then_body,
            else_body,
        }
    }

    /// A multi-way branch with a default.
    pub fn case(subject: Expr, arms: Vec<CaseArm>, default: Vec<Statement>) -> Statement {
        Statement::Case {
            subject,
            arms,
            default,
        }
    }

    /// Appends every signal this statement can read to `out`. Slice-assign
    /// targets are not reads; the kernel merges unwritten bits at commit.
    pub fn collect_reads(&self, out: &mut Vec<SignalId>) {
        match self {
            Statement::Assign { value, .. } => value.collect_reads(out),
            Statement::If {
                cond,
                then_body,
                else_body,
            } => {
                cond.collect_reads(out);
                for stmt in then_body.iter().chain(else_body) {
                    stmt.collect_reads(out);
                }
            }
            Statement::Case {
                subject,
                arms,
                default,
            } => {
                subject.collect_reads(out);
                for arm in arms {
                    for stmt in &arm.body {
                        stmt.collect_reads(out);
                    }
                }
                for stmt in default {
                    stmt.collect_reads(out);
                }
            }
        }
    }

    /// Appends every signal this statement can write to `out`.
    pub fn collect_writes(&self, out: &mut Vec<SignalId>) {
        match self {
            Statement::Assign { target, .. } => out.push(target.signal()),
            Statement::If {
                then_body,
                else_body,
                ..
            } => {
                for stmt in then_body.iter().chain(else_body) {
                    stmt.collect_writes(out);
                }
            }
            Statement::Case { arms, default, .. } => {
                for arm in arms {
                    for stmt in &arm.body {
                        stmt.collect_writes(out);
                    }
                }
                for stmt in default {
                    stmt.collect_writes(out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_and_writes_cover_nested_bodies() {
        let a = SignalId::from_raw(0);
        let b = SignalId::from_raw(1);
        let c = SignalId::from_raw(2);
        let stmt = Statement::if_else(
            Expr::read(a),
            vec![Statement::assign(b, Expr::read(c))],
            vec![Statement::assign_slice(c, 1, 0, Expr::read(b))],
        );

        let mut reads = Vec::new();
        stmt.collect_reads(&mut reads);
        assert_eq!(reads, vec![a, c, b]);

        let mut writes = Vec::new();
        stmt.collect_writes(&mut writes);
        assert_eq!(writes, vec![b, c]);
    }
}
