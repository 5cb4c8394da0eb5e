//! Conformance test helpers for the Kairos simulation kernel.
//!
//! Provides shared pipeline functions that run a scenario through the full
//! stack (netlist builder → elaboration → kernel) and a few canonical
//! fixtures reused across the integration tests, so each test states only
//! the behavior it checks.

#![warn(missing_docs)]

use kairos_common::Value;
use kairos_netlist::{
    elaborate, Edge, ElaboratedDesign, Expr, ModuleId, NetlistBuilder, SignalTy, Statement,
};
use kairos_sim::{Kernel, SimConfig};

/// Builds a design through `build` and elaborates it.
///
/// Panics if elaboration fails; conformance scenarios are well formed
/// unless a test drives the error path explicitly.
pub fn elaborated(build: impl FnOnce(&mut NetlistBuilder)) -> ElaboratedDesign {
    let mut b = NetlistBuilder::new();
    build(&mut b);
    let (design, interner) = b.finish();
    elaborate(&design, &interner).expect("conformance design should elaborate")
}

/// An idle kernel over the elaborated form of `build`, with defaults.
pub fn kernel_for(build: impl FnOnce(&mut NetlistBuilder)) -> Kernel {
    Kernel::new(elaborated(build))
}

/// An idle kernel with an explicit configuration.
pub fn kernel_with(config: SimConfig, build: impl FnOnce(&mut NetlistBuilder)) -> Kernel {
    Kernel::with_config(elaborated(build), config)
}

/// Shorthand for an unsigned value of the given width.
pub fn v(bits: u64, width: u32) -> Value {
    Value::from_u64(bits, width)
}

/// Shorthand for a single bit.
pub fn bit(level: u64) -> Value {
    Value::from_u64(level, 1)
}

/// Adds a fan-out duplicator module to `b` and returns its id, so tests can
/// use it either as the top module or as a child instance.
///
/// The duplicator replicates one ready/valid input stream to two consumers.
/// The input is ready only when both consumers are, and each consumer's
/// valid is gated on the *other* consumer's readiness so a transfer happens
/// on both outputs in the same cycle or not at all.
pub fn duplicator_module(b: &mut NetlistBuilder) -> ModuleId {
    let mut m = b.module("duplicator");
    let din_valid = m.input("din_valid", SignalTy::bit());
    let dout0_ready = m.input("dout0_ready", SignalTy::bit());
    let dout1_ready = m.input("dout1_ready", SignalTy::bit());
    let din_ready = m.output("din_ready", SignalTy::bit());
    let dout0_valid = m.output("dout0_valid", SignalTy::bit());
    let dout1_valid = m.output("dout1_valid", SignalTy::bit());
    m.comb(
        "split",
        vec![din_valid, dout0_ready, dout1_ready],
        vec![
            Statement::assign(
                din_ready,
                Expr::and(Expr::read(dout0_ready), Expr::read(dout1_ready)),
            ),
            Statement::assign(
                dout0_valid,
                Expr::and(Expr::read(din_valid), Expr::read(dout1_ready)),
            ),
            Statement::assign(
                dout1_valid,
                Expr::and(Expr::read(din_valid), Expr::read(dout0_ready)),
            ),
        ],
    );
    m.id()
}

/// The duplicator elaborated as the design's top module.
pub fn fan_out_duplicator() -> ElaboratedDesign {
    elaborated(|b| {
        let top = duplicator_module(b);
        b.set_top(top);
    })
}

/// A three-state machine stepped by two single-bit inputs.
///
/// The state register `st` starts at `S0 = 0`. From `S0`, both inputs
/// asserted jump straight to `S2 = 2` and `b` alone moves to `S1 = 1`;
/// from `S1`, `a` alone returns to `S0` and both together reach `S2`; from
/// `S2`, `a` alone returns to `S0` and `b` alone falls back to `S1`. When
/// no arm matches the state holds. `dout` decodes the state one-hot.
pub fn state_machine() -> ElaboratedDesign {
    elaborated(|b| {
        let mut m = b.module("fsm");
        let clk = m.input("clk", SignalTy::bit());
        let a = m.input("a", SignalTy::bit());
        let bi = m.input("b", SignalTy::bit());
        let dout = m.output("dout", SignalTy::bits(3));
        let st = m
            .signal_init("st", SignalTy::bits(2), Value::zeros(2))
            .expect("state register init");

        let both = || Expr::and(Expr::read(a), Expr::read(bi));
        let only_a = || Expr::and(Expr::read(a), Expr::not(Expr::read(bi)));
        let only_b = || Expr::and(Expr::not(Expr::read(a)), Expr::read(bi));
        let goto = |next: u64| vec![Statement::assign(st, Expr::lit(v(next, 2)))];

        let arm = |state: u64, body: Vec<Statement>| kairos_netlist::CaseArm {
            matches: vec![v(state, 2)],
            body,
        };
        m.clocked(
            "transition",
            clk,
            Edge::Rising,
            vec![Statement::case(
                Expr::read(st),
                vec![
                    arm(
                        0,
                        vec![Statement::if_else(
                            both(),
                            goto(2),
                            vec![Statement::if_else(Expr::read(bi), goto(1), vec![])],
                        )],
                    ),
                    arm(
                        1,
                        vec![Statement::if_else(
                            only_a(),
                            goto(0),
                            vec![Statement::if_else(both(), goto(2), vec![])],
                        )],
                    ),
                    arm(
                        2,
                        vec![Statement::if_else(
                            only_a(),
                            goto(0),
                            vec![Statement::if_else(only_b(), goto(1), vec![])],
                        )],
                    ),
                ],
                // The fourth encoding is unreachable; fold it back to S0.
                goto(0),
            )],
        );
        m.comb(
            "decode",
            vec![st],
            vec![Statement::case(
                Expr::read(st),
                vec![
                    arm(0, vec![Statement::assign(dout, Expr::lit(v(0b001, 3)))]),
                    arm(1, vec![Statement::assign(dout, Expr::lit(v(0b010, 3)))]),
                    arm(2, vec![Statement::assign(dout, Expr::lit(v(0b100, 3)))]),
                ],
                vec![Statement::assign(dout, Expr::lit(v(0b000, 3)))],
            )],
        );
        let top = m.id();
        b.set_top(top);
    })
}
