//! Process body evaluation.
//!
//! Evaluation is pure with respect to kernel state: a process reads the
//! committed net values through an [`EvalContext`] and produces
//! [`StagedWrite`]s, which the kernel later merges and commits as one
//! batch. Because nothing lands until the batch commits, processes in the
//! same settling round cannot observe each other, whatever order (or
//! thread) they run in.

use std::collections::HashMap;

use kairos_common::{Logic, Value, WidthError};
use kairos_netlist::{Arena, AssignTarget, BinaryOp, Expr, NetId, SignalId, Statement, UnaryOp};

use crate::state::NetState;

/// Read-only view of the committed state, scoped to one process.
pub(crate) struct EvalContext<'a> {
    /// Committed values of every net.
    pub states: &'a Arena<NetId, NetState>,
    /// The process's module-local signal to net translation.
    pub map: &'a HashMap<SignalId, NetId>,
}

impl<'a> EvalContext<'a> {
    fn read(&self, signal: SignalId) -> &Value {
        &self.states.get(self.map[&signal]).value
    }

    fn net(&self, signal: SignalId) -> NetId {
        self.map[&signal]
    }
}

/// A write produced by one process execution, not yet committed.
///
/// `low` is the bit offset within the target net; whole-signal assignments
/// use offset 0 with a full-width value.
pub(crate) struct StagedWrite {
    pub net: NetId,
    pub low: u32,
    pub value: Value,
}

/// Why a process execution aborted.
#[derive(Debug)]
pub(crate) enum EvalError {
    /// A branch condition or case subject contained `X`.
    UnknownBranch,
    /// A width violation escaped elaboration.
    Width(WidthError),
}

impl From<WidthError> for EvalError {
    fn from(err: WidthError) -> EvalError {
        EvalError::Width(err)
    }
}

/// Executes a process body, appending its writes to `out`.
pub(crate) fn run_process(
    ctx: &EvalContext<'_>,
    body: &[Statement],
    out: &mut Vec<StagedWrite>,
) -> Result<(), EvalError> {
    for stmt in body {
        exec_stmt(ctx, stmt, out)?;
    }
    Ok(())
}

fn exec_stmt(
    ctx: &EvalContext<'_>,
    stmt: &Statement,
    out: &mut Vec<StagedWrite>,
) -> Result<(), EvalError> {
    match stmt {
        Statement::Assign { target, value } => {
            let value = eval_expr(ctx, value)?;
            match target {
                AssignTarget::Signal(signal) => out.push(StagedWrite {
                    net: ctx.net(*signal),
                    low: 0,
                    value,
                }),
                AssignTarget::Slice { signal, low, .. } => out.push(StagedWrite {
                    net: ctx.net(*signal),
                    low: *low,
                    value,
                }),
            }
            Ok(())
        }
        Statement::If {
            cond,
            then_body,
            else_body,
        } => {
            let cond = eval_expr(ctx, cond)?;
            let taken = match cond.get(0) {
                Logic::One => then_body,
                Logic::Zero => else_body,
                Logic::X => return Err(EvalError::UnknownBranch),
            };
            for stmt in taken {
                exec_stmt(ctx, stmt, out)?;
            }
            Ok(())
        }
        Statement::Case {
            subject,
            arms,
            default,
        } => {
            let subject = eval_expr(ctx, subject)?;
            if subject.has_x() {
                return Err(EvalError::UnknownBranch);
            }
            for arm in arms {
                for pattern in &arm.matches {
                    // Patterns are fully known, so equality is decided.
                    if subject.cmp_eq(pattern)? == Logic::One {
                        for stmt in &arm.body {
                            exec_stmt(ctx, stmt, out)?;
                        }
                        return Ok(());
                    }
                }
            }
            for stmt in default {
                exec_stmt(ctx, stmt, out)?;
            }
            Ok(())
        }
    }
}

fn eval_expr(ctx: &EvalContext<'_>, expr: &Expr) -> Result<Value, EvalError> {
    match expr {
        Expr::Const(v) => Ok(v.clone()),
        Expr::Read(signal) => Ok(ctx.read(*signal).clone()),
        Expr::Slice { signal, high, low } => Ok(ctx.read(*signal).slice(*high, *low)?),
        Expr::Concat(parts) => {
            let mut acc: Option<Value> = None;
            for part in parts {
                let v = eval_expr(ctx, part)?;
                acc = Some(match acc {
                    None => v,
                    Some(high) => high.concat(&v),
                });
            }
            Ok(acc.unwrap_or_else(|| Value::zeros(0)))
        }
        Expr::Unary { op, arg } => {
            let v = eval_expr(ctx, arg)?;
            Ok(match op {
                UnaryOp::Not => v.not(),
                UnaryOp::Neg => v.neg(),
                UnaryOp::RedAnd => Value::from_logic(v.reduce_and()),
                UnaryOp::RedOr => Value::from_logic(v.reduce_or()),
                UnaryOp::RedXor => Value::from_logic(v.reduce_xor()),
            })
        }
        Expr::Binary { op, lhs, rhs } => {
            let l = eval_expr(ctx, lhs)?;
            let r = eval_expr(ctx, rhs)?;
            Ok(match op {
                BinaryOp::And => l.and(&r)?,
                BinaryOp::Or => l.or(&r)?,
                BinaryOp::Xor => l.xor(&r)?,
                BinaryOp::Add => l.add(&r)?,
                BinaryOp::Sub => l.sub(&r)?,
                BinaryOp::Mul => l.mul(&r)?,
                BinaryOp::Shl => l.shl(&r)?,
                BinaryOp::Shr => l.shr(&r)?,
                BinaryOp::Eq => Value::from_logic(l.cmp_eq(&r)?),
                BinaryOp::Ne => Value::from_logic(l.cmp_ne(&r)?),
                BinaryOp::Lt => Value::from_logic(l.cmp_lt(&r)?),
                BinaryOp::Le => Value::from_logic(l.cmp_le(&r)?),
                BinaryOp::Gt => Value::from_logic(l.cmp_gt(&r)?),
                BinaryOp::Ge => Value::from_logic(l.cmp_ge(&r)?),
            })
        }
        Expr::Mux {
            cond,
            when_true,
            when_false,
        } => {
            let cond = eval_expr(ctx, cond)?;
            let t = eval_expr(ctx, when_true)?;
            let f = eval_expr(ctx, when_false)?;
            Ok(match cond.get(0) {
                Logic::One => t,
                Logic::Zero => f,
                // Unknown select: keep only the bits both inputs agree on.
                Logic::X => t.x_merge(&f)?,
            })
        }
        Expr::ZeroExtend { width, arg } => Ok(eval_expr(ctx, arg)?.zero_extend(*width)?),
        Expr::SignExtend { width, arg } => Ok(eval_expr(ctx, arg)?.sign_extend(*width)?),
        Expr::Truncate { width, arg } => Ok(eval_expr(ctx, arg)?.truncate(*width)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context_with(values: Vec<Value>) -> (Arena<NetId, NetState>, HashMap<SignalId, NetId>) {
        let mut states = Arena::new();
        let mut map = HashMap::new();
        for (i, value) in values.into_iter().enumerate() {
            let net = states.alloc(NetState {
                previous: value.clone(),
                value,
            });
            map.insert(SignalId::from_raw(i as u32), net);
        }
        (states, map)
    }

    fn sig(i: u32) -> SignalId {
        SignalId::from_raw(i)
    }

    #[test]
    fn assignments_are_staged_not_applied() {
        let (states, map) = context_with(vec![Value::from_u64(5, 4), Value::zeros(4)]);
        let ctx = EvalContext {
            states: &states,
            map: &map,
        };
        let body = vec![
            Statement::assign(sig(1), Expr::read(sig(0))),
            // A later read still sees the committed value, not the staged one.
            Statement::assign(sig(0), Expr::add(Expr::read(sig(1)), Expr::lit(Value::from_u64(1, 4)))),
        ];
        let mut out = Vec::new();
        run_process(&ctx, &body, &mut out).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].value, Value::from_u64(5, 4));
        // sig(1) still read as 0, so sig(0) is staged as 1.
        assert_eq!(out[1].value, Value::from_u64(1, 4));
    }

    #[test]
    fn branch_on_x_aborts() {
        let (states, map) = context_with(vec![Value::unknown(1), Value::zeros(1)]);
        let ctx = EvalContext {
            states: &states,
            map: &map,
        };
        let body = vec![Statement::if_else(
            Expr::read(sig(0)),
            vec![Statement::assign(sig(1), Expr::lit(Value::from_u64(1, 1)))],
            vec![],
        )];
        let mut out = Vec::new();
        assert!(matches!(
            run_process(&ctx, &body, &mut out),
            Err(EvalError::UnknownBranch)
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn mux_with_x_select_merges() {
        let (states, map) = context_with(vec![
            Value::unknown(1),
            Value::from_bit_str("1010").unwrap(),
            Value::from_bit_str("1001").unwrap(),
            Value::zeros(4),
        ]);
        let ctx = EvalContext {
            states: &states,
            map: &map,
        };
        let body = vec![Statement::assign(
            sig(3),
            Expr::mux(Expr::read(sig(0)), Expr::read(sig(1)), Expr::read(sig(2))),
        )];
        let mut out = Vec::new();
        run_process(&ctx, &body, &mut out).unwrap();
        assert_eq!(out[0].value.to_string(), "10XX");
    }

    #[test]
    fn case_picks_first_match_then_default() {
        let (states, map) = context_with(vec![Value::from_u64(2, 2), Value::zeros(4)]);
        let ctx = EvalContext {
            states: &states,
            map: &map,
        };
        let arm = |n: u64, v: u64| kairos_netlist::CaseArm {
            matches: vec![Value::from_u64(n, 2)],
            body: vec![Statement::assign(sig(1), Expr::lit(Value::from_u64(v, 4)))],
        };
        let body = vec![Statement::case(
            Expr::read(sig(0)),
            vec![arm(0, 10), arm(2, 11)],
            vec![Statement::assign(sig(1), Expr::lit(Value::from_u64(15, 4)))],
        )];
        let mut out = Vec::new();
        run_process(&ctx, &body, &mut out).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, Value::from_u64(11, 4));
    }

    #[test]
    fn slice_writes_keep_offset() {
        let (states, map) = context_with(vec![Value::from_u64(3, 2), Value::zeros(8)]);
        let ctx = EvalContext {
            states: &states,
            map: &map,
        };
        let body = vec![Statement::assign_slice(sig(1), 5, 4, Expr::read(sig(0)))];
        let mut out = Vec::new();
        run_process(&ctx, &body, &mut out).unwrap();
        assert_eq!(out[0].low, 4);
        assert_eq!(out[0].value.width(), 2);
    }
}
