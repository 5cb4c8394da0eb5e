//! Per-net runtime state.

use kairos_common::Value;
use kairos_netlist::Net;

/// The committed value of one net, plus its value at the start of the
/// current step for edge detection.
#[derive(Clone, Debug)]
pub(crate) struct NetState {
    /// Current committed value.
    pub value: Value,
    /// Value at the start of the current step, before stimulus and
    /// settling. Edges are detected against this.
    pub previous: Value,
}

impl NetState {
    /// The power-on state of a net: its declared initial value, or all-`X`
    /// when it has none. The stored value always carries the net's
    /// signedness tag.
    pub fn initial(net: &Net) -> NetState {
        let value = match &net.init {
            Some(init) => {
                let init = init.clone();
                if net.ty.signed {
                    init.as_signed()
                } else {
                    init.as_unsigned()
                }
            }
            None => {
                let unknown = Value::unknown(net.ty.width);
                if net.ty.signed {
                    unknown.as_signed()
                } else {
                    unknown
                }
            }
        };
        NetState {
            previous: value.clone(),
            value,
        }
    }
}
