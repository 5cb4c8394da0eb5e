//! Programmatic netlist construction.
//!
//! [`NetlistBuilder`] owns the design and the name interner; each call to
//! [`NetlistBuilder::module`] opens a [`ModuleBuilder`] scoped to one
//! module. Ids handed out by a module builder are only meaningful inside
//! that module.
//!
//! The builder checks what it can cheaply check at call time (binding
//! shape, initial-value widths); everything that needs a whole-design view
//! is deferred to [`crate::elaborate::elaborate`].

use kairos_common::{Interner, Value, WidthError};

use crate::design::Design;
use crate::error::BindingError;
use crate::ids::{InstanceId, ModuleId, PortId, ProcessId, SignalId};
use crate::module::{Instance, Module};
use crate::port::{Port, PortDirection};
use crate::process::{Edge, Process, ProcessKind};
use crate::signal::{Signal, SignalTy};
use crate::stmt::Statement;

/// Builds a [`Design`] module by module.
pub struct NetlistBuilder {
    design: Design,
    interner: Interner,
}

impl NetlistBuilder {
    /// Creates a builder with an empty design.
    pub fn new() -> NetlistBuilder {
        NetlistBuilder {
            design: Design::new(),
            interner: Interner::new(),
        }
    }

    /// Opens a new module with the given name.
    pub fn module(&mut self, name: &str) -> ModuleBuilder<'_> {
        let ident = self.interner.get_or_intern(name);
        let id = self.design.modules.next_id();
        self.design.modules.alloc(Module::new(id, ident));
        ModuleBuilder {
            design: &mut self.design,
            interner: &self.interner,
            module: id,
        }
    }

    /// Marks `module` as the root of the hierarchy.
    pub fn set_top(&mut self, module: ModuleId) {
        self.design.top = Some(module);
    }

    /// Borrows the interner, e.g. to resolve names for display.
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Consumes the builder, yielding the design and its interner.
    pub fn finish(self) -> (Design, Interner) {
        (self.design, self.interner)
    }
}

impl Default for NetlistBuilder {
    fn default() -> Self {
        NetlistBuilder::new()
    }
}

/// Adds ports, signals, processes and instances to one module.
pub struct ModuleBuilder<'a> {
    design: &'a mut Design,
    interner: &'a Interner,
    module: ModuleId,
}

impl<'a> ModuleBuilder<'a> {
    /// The id of the module being built.
    pub fn id(&self) -> ModuleId {
        self.module
    }

    fn module_mut(&mut self) -> &mut Module {
        self.design.modules.get_mut(self.module)
    }

    /// Declares an internal signal starting at all-`X`.
    pub fn signal(&mut self, name: &str, ty: SignalTy) -> SignalId {
        let name = self.interner.get_or_intern(name);
        let module = self.module_mut();
        let id = module.signals.next_id();
        module.signals.alloc(Signal {
            id,
            name,
            ty,
            init: None,
        });
        id
    }

    /// Declares an internal signal with a power-on value. Fails if the
    /// value's width differs from the declared width.
    pub fn signal_init(
        &mut self,
        name: &str,
        ty: SignalTy,
        init: Value,
    ) -> Result<SignalId, WidthError> {
        if init.width() != ty.width {
            return Err(WidthError::Mismatch {
                op: "init",
                left: ty.width,
                right: init.width(),
            });
        }
        let name = self.interner.get_or_intern(name);
        let module = self.module_mut();
        let id = module.signals.next_id();
        module.signals.alloc(Signal {
            id,
            name,
            ty,
            init: Some(init),
        });
        Ok(id)
    }

    fn port(&mut self, name: &str, direction: PortDirection, ty: SignalTy) -> SignalId {
        let signal = self.signal(name, ty);
        let name = self.interner.get_or_intern(name);
        let module = self.module_mut();
        let id = PortId::from_raw(module.ports.len() as u32);
        module.ports.push(Port {
            id,
            name,
            direction,
            ty,
            signal,
        });
        signal
    }

    /// Declares an input port, returning its backing signal.
    pub fn input(&mut self, name: &str, ty: SignalTy) -> SignalId {
        self.port(name, PortDirection::Input, ty)
    }

    /// Declares an output port, returning its backing signal.
    pub fn output(&mut self, name: &str, ty: SignalTy) -> SignalId {
        self.port(name, PortDirection::Output, ty)
    }

    /// Adds a combinational process watching the given signals.
    pub fn comb(
        &mut self,
        name: &str,
        sensitivity: Vec<SignalId>,
        body: Vec<Statement>,
    ) -> ProcessId {
        let name = self.interner.get_or_intern(name);
        let module = self.module_mut();
        let id = module.processes.next_id();
        module.processes.alloc(Process {
            id,
            name,
            kind: ProcessKind::Combinational { sensitivity },
            body,
        });
        id
    }

    /// Adds a process triggered by an edge of `clock`.
    pub fn clocked(
        &mut self,
        name: &str,
        clock: SignalId,
        edge: Edge,
        body: Vec<Statement>,
    ) -> ProcessId {
        let name = self.interner.get_or_intern(name);
        let module = self.module_mut();
        let id = module.processes.next_id();
        module.processes.alloc(Process {
            id,
            name,
            kind: ProcessKind::Clocked { clock, edge },
            body,
        });
        id
    }

    /// Instantiates `module` as a child, with every port initially unbound.
    ///
    /// Panics if `module` is not in the design.
    pub fn instance(&mut self, name: &str, module: ModuleId) -> InstanceId {
        let port_count = self.design.modules.get(module).ports.len();
        let name = self.interner.get_or_intern(name);
        let parent = self.module_mut();
        let id = parent.instances.next_id();
        parent.instances.alloc(Instance {
            id,
            name,
            module,
            bindings: vec![None; port_count],
        });
        id
    }

    /// Binds `signal` of this module to the named port of a child instance.
    ///
    /// Checks that the port exists, that widths agree, that the port is not
    /// already bound, and that an instance output does not drive a signal
    /// this module receives through an input port.
    pub fn bind(
        &mut self,
        instance: InstanceId,
        port: &str,
        signal: SignalId,
    ) -> Result<(), BindingError> {
        let port_ident = self.interner.get_or_intern(port);
        let parent = self.design.modules.get(self.module);
        let inst = parent.instances.get(instance);
        let child = self.design.modules.get(inst.module);
        let child_port = child.port(port_ident).ok_or_else(|| BindingError::UnknownPort {
            module: self.interner.resolve(child.name).to_string(),
            port: port.to_string(),
        })?;
        let signal_decl = parent.signals.get(signal);
        if child_port.ty.width != signal_decl.ty.width {
            return Err(BindingError::WidthMismatch {
                port: port.to_string(),
                port_width: child_port.ty.width,
                signal: self.interner.resolve(signal_decl.name).to_string(),
                signal_width: signal_decl.ty.width,
            });
        }
        let slot = child_port.id.as_raw() as usize;
        if inst.bindings[slot].is_some() {
            return Err(BindingError::BoundTwice {
                instance: self.interner.resolve(inst.name).to_string(),
                port: port.to_string(),
            });
        }
        if child_port.direction == PortDirection::Output
            && parent.is_port_signal(signal, PortDirection::Input)
        {
            return Err(BindingError::DrivesInput {
                instance: self.interner.resolve(inst.name).to_string(),
                port: port.to_string(),
                signal: self.interner.resolve(signal_decl.name).to_string(),
            });
        }
        let parent = self.design.modules.get_mut(self.module);
        parent.instances.get_mut(instance).bindings[slot] = Some(signal);
        Ok(())
    }
}
