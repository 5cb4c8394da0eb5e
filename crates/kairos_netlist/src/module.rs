//! Module definitions and child instances.

use kairos_common::Ident;
use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::ids::{InstanceId, ModuleId, ProcessId, SignalId};
use crate::port::Port;
use crate::process::Process;
use crate::signal::Signal;

/// A child module instantiation.
///
/// `bindings` has one slot per port of the instantiated module, in that
/// module's port order. Elaboration requires every slot to be filled
/// exactly once.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Instance {
    /// Id within the enclosing module.
    pub id: InstanceId,
    /// Instance name, used as a path component in flattened net names.
    pub name: Ident,
    /// The module being instantiated.
    pub module: ModuleId,
    /// Signal of the enclosing module bound to each port, by port index.
    pub bindings: Vec<Option<SignalId>>,
}

/// A module definition: ports, signals, processes and child instances.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Module {
    /// Id within the design.
    pub id: ModuleId,
    /// Declared name.
    pub name: Ident,
    /// Boundary ports in declaration order.
    pub ports: Vec<Port>,
    /// Signals declared in this module, ports' backing signals included.
    pub signals: Arena<SignalId, Signal>,
    /// Processes declared in this module.
    pub processes: Arena<ProcessId, Process>,
    /// Child instances declared in this module.
    pub instances: Arena<InstanceId, Instance>,
}

impl Module {
    /// Creates an empty module shell.
    pub fn new(id: ModuleId, name: Ident) -> Module {
        Module {
            id,
            name,
            ports: Vec::new(),
            signals: Arena::new(),
            processes: Arena::new(),
            instances: Arena::new(),
        }
    }

    /// Finds a port by name.
    pub fn port(&self, name: Ident) -> Option<&Port> {
        self.ports.iter().find(|p| p.name == name)
    }

    /// Whether `signal` backs one of this module's ports with the given
    /// direction.
    pub fn is_port_signal(&self, signal: SignalId, direction: crate::port::PortDirection) -> bool {
        self.ports
            .iter()
            .any(|p| p.signal == signal && p.direction == direction)
    }
}
