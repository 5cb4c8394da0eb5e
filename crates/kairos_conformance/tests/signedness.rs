//! Signed net semantics observed through the kernel: committed values take
//! the net's declared signedness, so ordered comparison and right shift
//! follow the declaration rather than whatever the driving expression was
//! tagged with.

use kairos_common::Value;
use kairos_conformance::{kernel_for, v};
use kairos_netlist::{BinaryOp, Expr, SignalTy, Statement};

#[test]
fn comparison_on_signed_nets_is_twos_complement() {
    let mut k = kernel_for(|b| {
        let mut m = b.module("threshold");
        let s = m.signal("s", SignalTy::signed_bits(4));
        let t = m
            .signal_init("t", SignalTy::signed_bits(4), Value::from_i64(-8, 4))
            .expect("threshold init");
        let below = m.output("below", SignalTy::bit());
        // `s` is driven from an unsigned-tagged literal; the committed net
        // value must still compare as signed.
        m.comb(
            "drive",
            vec![],
            vec![Statement::assign(s, Expr::lit(v(7, 4)))],
        );
        m.comb(
            "compare",
            vec![s, t],
            vec![Statement::assign(
                below,
                Expr::binary(BinaryOp::Lt, Expr::read(s), Expr::read(t)),
            )],
        );
        let top = m.id();
        b.set_top(top);
    });
    // Signed: 7 < -8 is false, even though the raw patterns order 7 < 8.
    k.step().unwrap();
    assert_eq!(k.read_output("below").unwrap().to_u64(), Some(0));
}

#[test]
fn signed_inputs_order_around_zero() {
    let mut k = kernel_for(|b| {
        let mut m = b.module("order");
        let a = m.input("a", SignalTy::signed_bits(4));
        let t = m.input("t", SignalTy::signed_bits(4));
        let below = m.output("below", SignalTy::bit());
        m.comb(
            "compare",
            vec![a, t],
            vec![Statement::assign(
                below,
                Expr::binary(BinaryOp::Lt, Expr::read(a), Expr::read(t)),
            )],
        );
        let top = m.id();
        b.set_top(top);
    });
    // Stimulus values arrive unsigned-tagged; the ports retag them.
    k.set_input("a", v(0b1000, 4)).unwrap(); // -8
    k.set_input("t", v(0b0111, 4)).unwrap(); // 7
    k.step().unwrap();
    assert_eq!(k.read_output("below").unwrap().to_u64(), Some(1));
    k.set_input("a", v(0b0111, 4)).unwrap();
    k.set_input("t", v(0b1000, 4)).unwrap();
    k.step().unwrap();
    assert_eq!(k.read_output("below").unwrap().to_u64(), Some(0));
}

#[test]
fn right_shift_of_a_signed_net_replicates_the_sign() {
    let mut k = kernel_for(|b| {
        let mut m = b.module("halver");
        let acc = m.signal("acc", SignalTy::signed_bits(4));
        let half = m.output("half", SignalTy::signed_bits(4));
        // 0b1100 is -4 once committed onto the signed net.
        m.comb(
            "drive",
            vec![],
            vec![Statement::assign(acc, Expr::lit(v(0b1100, 4)))],
        );
        m.comb(
            "halve",
            vec![acc],
            vec![Statement::assign(
                half,
                Expr::binary(BinaryOp::Shr, Expr::read(acc), Expr::lit(v(1, 4))),
            )],
        );
        let top = m.id();
        b.set_top(top);
    });
    // Arithmetic: -4 >> 1 = -2 (0b1110), not the logical 0b0110.
    k.step().unwrap();
    assert_eq!(k.read_output("half").unwrap().to_i64(), Some(-2));
}

#[test]
fn sign_extension_carries_negatives_to_a_wider_net() {
    let mut k = kernel_for(|b| {
        let mut m = b.module("widen");
        let a = m.input("a", SignalTy::signed_bits(4));
        let wide = m.output("wide", SignalTy::signed_bits(8));
        m.comb(
            "extend",
            vec![a],
            vec![Statement::assign(wide, Expr::sign_extend(8, Expr::read(a)))],
        );
        let top = m.id();
        b.set_top(top);
    });
    k.set_input("a", v(0b1011, 4)).unwrap(); // -5
    k.step().unwrap();
    assert_eq!(k.read_output("wide").unwrap().to_i64(), Some(-5));
    k.set_input("a", v(0b0101, 4)).unwrap();
    k.step().unwrap();
    assert_eq!(k.read_output("wide").unwrap().to_i64(), Some(5));
}
