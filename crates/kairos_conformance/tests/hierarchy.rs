//! Hierarchical designs: child instances flattened into one net list, bound
//! ports sharing the parent's nets, and child internals probed by dotted path.

use kairos_conformance::{bit, duplicator_module, kernel_for, v};
use kairos_netlist::{Edge, Expr, NetlistBuilder, SignalTy, Statement, UnaryOp};

/// Two identical register stages chained through `mid`.
fn pipe(b: &mut NetlistBuilder) {
    let mut stage = b.module("stage");
    let clk = stage.input("clk", SignalTy::bit());
    let d = stage.input("d", SignalTy::bits(8));
    let q = stage.output("q", SignalTy::bits(8));
    let r = stage.signal("r", SignalTy::bits(8));
    stage.clocked(
        "capture",
        clk,
        Edge::Rising,
        vec![Statement::assign(r, Expr::read(d))],
    );
    stage.comb("expose", vec![r], vec![Statement::assign(q, Expr::read(r))]);
    let stage_id = stage.id();

    let mut m = b.module("pipe");
    let clk = m.input("clk", SignalTy::bit());
    let din = m.input("din", SignalTy::bits(8));
    let dout = m.output("dout", SignalTy::bits(8));
    let mid = m.signal("mid", SignalTy::bits(8));
    let u0 = m.instance("u0", stage_id);
    m.bind(u0, "clk", clk).unwrap();
    m.bind(u0, "d", din).unwrap();
    m.bind(u0, "q", mid).unwrap();
    let u1 = m.instance("u1", stage_id);
    m.bind(u1, "clk", clk).unwrap();
    m.bind(u1, "d", mid).unwrap();
    m.bind(u1, "q", dout).unwrap();
    let top = m.id();
    b.set_top(top);
}

#[test]
fn child_registers_pipeline_data_through_two_stages() {
    let mut k = kernel_for(pipe);
    k.add_clock("clk", 1).unwrap();
    k.set_input("din", v(0x11, 8)).unwrap();
    k.step().unwrap();
    assert!(k.probe("u0.r").unwrap().has_x());

    // First rising edge loads stage 0; the chained stage still sees the
    // pre-edge `mid` and so stays unknown.
    k.step().unwrap();
    assert_eq!(k.probe("u0.r").unwrap(), v(0x11, 8));
    assert!(k.probe("mid").unwrap().has_x());

    k.set_input("din", v(0x22, 8)).unwrap();
    k.step().unwrap();
    assert_eq!(k.probe("mid").unwrap(), v(0x11, 8));

    // Second rising edge: both values are in flight, one per stage.
    k.step().unwrap();
    assert_eq!(k.probe("u0.r").unwrap(), v(0x22, 8));
    assert_eq!(k.probe("u1.r").unwrap(), v(0x11, 8));

    k.step().unwrap();
    assert_eq!(k.read_output("dout").unwrap(), v(0x11, 8));
    k.run_for(2).unwrap();
    assert_eq!(k.read_output("dout").unwrap(), v(0x22, 8));
}

#[test]
fn wiring_a_child_through_parent_ports_is_transparent() {
    let mut k = kernel_for(|b| {
        let dup = duplicator_module(b);
        let mut m = b.module("system");
        let src_valid = m.input("src_valid", SignalTy::bit());
        let sink0_ready = m.input("sink0_ready", SignalTy::bit());
        let sink1_ready = m.input("sink1_ready", SignalTy::bit());
        let src_ready = m.output("src_ready", SignalTy::bit());
        let sink0_valid = m.output("sink0_valid", SignalTy::bit());
        let sink1_valid = m.output("sink1_valid", SignalTy::bit());
        let u = m.instance("dup", dup);
        m.bind(u, "din_valid", src_valid).unwrap();
        m.bind(u, "dout0_ready", sink0_ready).unwrap();
        m.bind(u, "dout1_ready", sink1_ready).unwrap();
        m.bind(u, "din_ready", src_ready).unwrap();
        m.bind(u, "dout0_valid", sink0_valid).unwrap();
        m.bind(u, "dout1_valid", sink1_valid).unwrap();
        let top = m.id();
        b.set_top(top);
    });
    for valid in 0..2u64 {
        for r0 in 0..2u64 {
            for r1 in 0..2u64 {
                k.set_input("src_valid", bit(valid)).unwrap();
                k.set_input("sink0_ready", bit(r0)).unwrap();
                k.set_input("sink1_ready", bit(r1)).unwrap();
                k.step().unwrap();
                assert_eq!(k.read_output("src_ready").unwrap(), bit(r0 & r1));
                assert_eq!(k.read_output("sink0_valid").unwrap(), bit(valid & r1));
                assert_eq!(k.read_output("sink1_valid").unwrap(), bit(valid & r0));
            }
        }
    }
    // Bound child ports share the parent's nets instead of adding their own.
    assert!(k.probe("dup.din_valid").is_err());
}

#[test]
fn packed_and_reduced_views_settle_in_one_step() {
    let mut k = kernel_for(|b| {
        let mut lane = b.module("lane");
        let nib = lane.input("nib", SignalTy::bits(4));
        let flag = lane.output("flag", SignalTy::bit());
        lane.comb(
            "parity",
            vec![nib],
            vec![Statement::assign(
                flag,
                Expr::unary(UnaryOp::RedXor, Expr::read(nib)),
            )],
        );
        let lane_id = lane.id();

        let mut m = b.module("pack");
        let a = m.input("a", SignalTy::bits(4));
        let bi = m.input("b", SignalTy::bits(4));
        let word = m.output("word", SignalTy::bits(8));
        let all_ones = m.output("all_ones", SignalTy::bit());
        let any_one = m.output("any_one", SignalTy::bit());
        let even = m.output("even", SignalTy::bit());
        let pa = m.signal("pa", SignalTy::bit());
        let pb = m.signal("pb", SignalTy::bit());
        let p0 = m.instance("p0", lane_id);
        m.bind(p0, "nib", a).unwrap();
        m.bind(p0, "flag", pa).unwrap();
        let p1 = m.instance("p1", lane_id);
        m.bind(p1, "nib", bi).unwrap();
        m.bind(p1, "flag", pb).unwrap();
        m.comb(
            "pack",
            vec![a, bi],
            vec![Statement::assign(
                word,
                Expr::concat(vec![Expr::read(a), Expr::read(bi)]),
            )],
        );
        m.comb(
            "mark",
            vec![word],
            vec![
                Statement::assign(all_ones, Expr::unary(UnaryOp::RedAnd, Expr::read(word))),
                Statement::assign(any_one, Expr::unary(UnaryOp::RedOr, Expr::read(word))),
            ],
        );
        m.comb(
            "balance",
            vec![pa, pb],
            vec![Statement::assign(
                even,
                Expr::not(Expr::xor(Expr::read(pa), Expr::read(pb))),
            )],
        );
        let top = m.id();
        b.set_top(top);
    });

    // word is {a, b}; all_ones/any_one reduce the packed word; even is the
    // complement of the combined parity from the two lane instances.
    let cases: [(u64, u64, u64, u64, u64, u64); 4] = [
        (0xA, 0x3, 0xA3, 0, 1, 1),
        (0xF, 0xF, 0xFF, 1, 1, 1),
        (0x0, 0x0, 0x00, 0, 0, 1),
        (0x7, 0x0, 0x70, 0, 1, 0),
    ];
    for (a, b, word, all_ones, any_one, even) in cases {
        k.set_input("a", v(a, 4)).unwrap();
        k.set_input("b", v(b, 4)).unwrap();
        k.step().unwrap();
        assert_eq!(k.read_output("word").unwrap(), v(word, 8), "word of {a:#x}/{b:#x}");
        assert_eq!(k.read_output("all_ones").unwrap(), bit(all_ones));
        assert_eq!(k.read_output("any_one").unwrap(), bit(any_one));
        assert_eq!(k.read_output("even").unwrap(), bit(even), "parity of {a:#x}/{b:#x}");
    }
}
