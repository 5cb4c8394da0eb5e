//! Module ports.

use std::fmt;

use kairos_common::Ident;
use serde::{Deserialize, Serialize};

use crate::ids::{PortId, SignalId};
use crate::signal::SignalTy;

/// Which way data flows through a port, seen from inside the module.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum PortDirection {
    /// Driven from outside; read by the module.
    Input,
    /// Driven by the module; read from outside.
    Output,
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortDirection::Input => write!(f, "input"),
            PortDirection::Output => write!(f, "output"),
        }
    }
}

/// A connection point on a module boundary.
///
/// Every port is backed by a signal inside the module; binding an instance
/// port fuses that signal with a net of the enclosing module.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Port {
    /// Id within the defining module.
    pub id: PortId,
    /// Declared name.
    pub name: Ident,
    /// Data flow direction.
    pub direction: PortDirection,
    /// Width and signedness.
    pub ty: SignalTy,
    /// The signal inside the module that carries this port's value.
    pub signal: SignalId,
}
