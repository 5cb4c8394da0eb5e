//! Circuit data model for the kairos simulator.
//!
//! A [`Design`] is a set of [`Module`] definitions: ports, typed signals,
//! processes and child instances, all arena-allocated and addressed by
//! typed ids. Designs are built with [`NetlistBuilder`] and then passed to
//! [`elaborate`], which checks widths, bindings, sensitivity sets and the
//! instantiation hierarchy, and flattens everything into the net-level
//! form the simulation kernel executes.

#![warn(missing_docs)]

pub mod arena;
pub mod builder;
pub mod design;
pub mod elaborate;
pub mod error;
pub mod expr;
pub mod ids;
pub mod module;
pub mod port;
pub mod process;
pub mod signal;
pub mod stmt;

pub use arena::{Arena, ArenaId};
pub use builder::{ModuleBuilder, NetlistBuilder};
pub use design::Design;
pub use elaborate::{elaborate, ElaboratedDesign, FlatProcess, FlatTrigger, Net, TopPort};
pub use error::{BindingError, NetlistError};
pub use expr::{BinaryOp, Expr, UnaryOp};
pub use ids::{InstanceId, ModuleId, NetId, PortId, ProcessId, SignalId};
pub use module::{Instance, Module};
pub use port::{Port, PortDirection};
pub use process::{Edge, Process, ProcessKind};
pub use signal::{Signal, SignalTy};
pub use stmt::{AssignTarget, CaseArm, Statement};
