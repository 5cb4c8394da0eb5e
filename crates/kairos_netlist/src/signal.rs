//! Signals and their types.

use kairos_common::{Ident, Value};
use serde::{Deserialize, Serialize};

use crate::ids::SignalId;

/// The shape of a signal: width in bits and signedness.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct SignalTy {
    /// Width in bits.
    pub width: u32,
    /// Whether values are interpreted as two's complement.
    pub signed: bool,
}

impl SignalTy {
    /// A single unsigned bit.
    pub fn bit() -> SignalTy {
        SignalTy {
            width: 1,
            signed: false,
        }
    }

    /// An unsigned vector of the given width.
    pub fn bits(width: u32) -> SignalTy {
        SignalTy {
            width,
            signed: false,
        }
    }

    /// A signed vector of the given width.
    pub fn signed_bits(width: u32) -> SignalTy {
        SignalTy {
            width,
            signed: true,
        }
    }
}

/// A named wire or storage element within one module.
///
/// Signals with no initial value start the simulation at all-`X`; a signal
/// carrying `init` starts at that value, the way a register with a reset
/// literal does.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Signal {
    /// Id within the defining module.
    pub id: SignalId,
    /// Declared name.
    pub name: Ident,
    /// Width and signedness.
    pub ty: SignalTy,
    /// Power-on value, if declared.
    pub init: Option<Value>,
}
