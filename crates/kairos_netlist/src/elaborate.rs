//! Elaboration: checking a design and flattening it to nets.
//!
//! Elaboration is the boundary between construction-time and run-time
//! failures. Everything rejected here (width violations, unbound ports,
//! sensitivity gaps, hierarchy cycles) can never surface during
//! simulation, which lets the kernel evaluate without re-checking.
//!
//! Flattening walks the hierarchy from the top module. Signals bound to a
//! child port share the parent's net; unbound signals get fresh nets named
//! by their instance path. Elaboration does not mutate the design, and two
//! calls on the same design produce identical results.

use std::collections::{HashMap, HashSet};

use kairos_common::{Ident, Interner, Value, WidthError};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::arena::Arena;
use crate::design::Design;
use crate::error::{BindingError, NetlistError};
use crate::expr::{Expr, UnaryOp};
use crate::ids::{ModuleId, NetId, SignalId};
use crate::module::Module;
use crate::port::PortDirection;
use crate::process::{Edge, Process, ProcessKind};
use crate::signal::SignalTy;
use crate::stmt::{AssignTarget, Statement};

/// A flattened signal: one storage location of the running simulation.
#[derive(Clone, Debug)]
pub struct Net {
    /// Hierarchical name; instance path components joined with `.`.
    pub name: String,
    /// Width and signedness.
    pub ty: SignalTy,
    /// Power-on value, if the source signal declared one.
    pub init: Option<Value>,
}

/// What causes a flattened process to run.
#[derive(Clone, Debug)]
pub enum FlatTrigger {
    /// Runs when any watched net changes during delta settling.
    Comb {
        /// Watched nets.
        sensitivity: Vec<NetId>,
    },
    /// Runs on a clock edge, after combinational activity settles.
    Clocked {
        /// The net carrying the clock.
        clock: NetId,
        /// Which transition triggers execution.
        edge: Edge,
    },
}

/// A process lowered to flat nets.
///
/// The body still refers to module-local signal ids; `map` translates them
/// to nets. Keeping the body shared and the map per-process mirrors how
/// one module's processes are stamped out once per instance.
#[derive(Clone, Debug)]
pub struct FlatProcess {
    /// Hierarchical name for diagnostics.
    pub name: String,
    /// Trigger condition in net terms.
    pub trigger: FlatTrigger,
    /// Statements in module-local terms.
    pub body: Vec<Statement>,
    /// Module-local signal id to net id, for this instance.
    pub map: HashMap<SignalId, NetId>,
}

/// A port of the top module, exposed to the stimulus.
#[derive(Clone, Debug)]
pub struct TopPort {
    /// Port name.
    pub name: String,
    /// Data flow direction.
    pub direction: PortDirection,
    /// Width and signedness.
    pub ty: SignalTy,
    /// The net carrying this port's value.
    pub net: NetId,
}

/// The checked, flat form of a design that the simulator executes.
#[derive(Clone, Debug)]
pub struct ElaboratedDesign {
    /// Every net of the flattened hierarchy, in deterministic order.
    pub nets: Arena<NetId, Net>,
    /// Every process of the flattened hierarchy, in deterministic order.
    pub processes: Vec<FlatProcess>,
    /// Combinational process indices keyed by watched net, each list
    /// sorted and deduplicated.
    pub sensitivity: HashMap<NetId, Vec<usize>>,
    /// Writing process indices keyed by driven net, each list sorted and
    /// deduplicated. Nets with no entry are driven only by the stimulus.
    pub drivers: HashMap<NetId, Vec<usize>>,
    /// Ports of the top module.
    pub top_ports: Vec<TopPort>,
}

impl ElaboratedDesign {
    /// Finds a net by its hierarchical name.
    pub fn net_named(&self, name: &str) -> Option<NetId> {
        self.nets
            .iter()
            .find(|(_, net)| net.name == name)
            .map(|(id, _)| id)
    }

    /// Finds a top-level port by name.
    pub fn port_named(&self, name: &str) -> Option<&TopPort> {
        self.top_ports.iter().find(|p| p.name == name)
    }
}

/// Checks `design` and flattens it into an [`ElaboratedDesign`].
pub fn elaborate(design: &Design, interner: &Interner) -> Result<ElaboratedDesign, NetlistError> {
    let top = design.top.ok_or(NetlistError::NoTop)?;
    if !design.modules.contains(top) {
        return Err(NetlistError::NoTop);
    }
    for (_, module) in design.modules.iter() {
        check_module(design, interner, module)?;
    }
    check_hierarchy(design, interner)?;

    let mut flat = Flattener {
        design,
        interner,
        nets: Arena::new(),
        processes: Vec::new(),
    };
    let top_map = flat.flatten(top, "", &HashMap::new())?;

    let top_module = design.modules.get(top);
    let mut top_ports = Vec::new();
    for port in &top_module.ports {
        top_ports.push(TopPort {
            name: interner.resolve(port.name).to_string(),
            direction: port.direction,
            ty: port.ty,
            net: top_map[&port.signal],
        });
    }

    let mut drivers: HashMap<NetId, Vec<usize>> = HashMap::new();
    for (index, process) in flat.processes.iter().enumerate() {
        let mut writes = Vec::new();
        for stmt in &process.body {
            stmt.collect_writes(&mut writes);
        }
        for signal in writes {
            drivers.entry(process.map[&signal]).or_default().push(index);
        }
    }
    for indices in drivers.values_mut() {
        indices.sort_unstable();
        indices.dedup();
    }

    // Top-level inputs belong to the stimulus; no process may drive them.
    for port in &top_ports {
        if port.direction != PortDirection::Input {
            continue;
        }
        if let Some(indices) = drivers.get(&port.net) {
            return Err(NetlistError::InputDriven {
                port: port.name.clone(),
                process: flat.processes[indices[0]].name.clone(),
            });
        }
    }

    let mut sensitivity: HashMap<NetId, Vec<usize>> = HashMap::new();
    for (index, process) in flat.processes.iter().enumerate() {
        if let FlatTrigger::Comb {
            sensitivity: watched,
        } = &process.trigger
        {
            for &net in watched {
                sensitivity.entry(net).or_default().push(index);
            }
        }
    }
    for indices in sensitivity.values_mut() {
        indices.sort_unstable();
        indices.dedup();
    }

    Ok(ElaboratedDesign {
        nets: flat.nets,
        processes: flat.processes,
        sensitivity,
        drivers,
        top_ports,
    })
}

fn check_hierarchy(design: &Design, interner: &Interner) -> Result<(), NetlistError> {
    let mut graph: DiGraph<ModuleId, ()> = DiGraph::new();
    let mut nodes: HashMap<ModuleId, NodeIndex> = HashMap::new();
    for id in design.modules.ids() {
        nodes.insert(id, graph.add_node(id));
    }
    for (id, module) in design.modules.iter() {
        for inst in module.instances.values() {
            // Unknown child modules were already rejected per module.
            graph.add_edge(nodes[&id], nodes[&inst.module], ());
        }
    }
    if let Err(cycle) = toposort(&graph, None) {
        let module = graph[cycle.node_id()];
        return Err(NetlistError::RecursiveHierarchy {
            module: interner
                .resolve(design.modules.get(module).name)
                .to_string(),
        });
    }
    Ok(())
}

fn check_module(design: &Design, interner: &Interner, module: &Module) -> Result<(), NetlistError> {
    let module_name = interner.resolve(module.name).to_string();

    // Signals and instances share one namespace: both become components of
    // flattened net names.
    let mut names: HashSet<Ident> = HashSet::new();
    for signal in module.signals.values() {
        if !names.insert(signal.name) {
            return Err(NetlistError::DuplicateName {
                module: module_name.clone(),
                name: interner.resolve(signal.name).to_string(),
            });
        }
    }
    for inst in module.instances.values() {
        if !names.insert(inst.name) {
            return Err(NetlistError::DuplicateName {
                module: module_name.clone(),
                name: interner.resolve(inst.name).to_string(),
            });
        }
    }

    for signal in module.signals.values() {
        if let Some(init) = &signal.init {
            if init.width() != signal.ty.width {
                return Err(NetlistError::Width(WidthError::Mismatch {
                    op: "init",
                    left: signal.ty.width,
                    right: init.width(),
                }));
            }
        }
    }

    for inst in module.instances.values() {
        if !design.modules.contains(inst.module) {
            return Err(NetlistError::UnknownModule {
                module: module_name.clone(),
                instance: interner.resolve(inst.name).to_string(),
            });
        }
        for binding in inst.bindings.iter().flatten() {
            if !module.signals.contains(*binding) {
                return Err(NetlistError::UnknownSignal {
                    module: module_name.clone(),
                });
            }
        }
    }

    for process in module.processes.values() {
        check_process(interner, module, &module_name, process)?;
    }
    Ok(())
}

fn check_process(
    interner: &Interner,
    module: &Module,
    module_name: &str,
    process: &Process,
) -> Result<(), NetlistError> {
    let process_name = interner.resolve(process.name).to_string();
    let checker = ProcessChecker {
        module,
        module_name,
        process_name: &process_name,
    };

    match &process.kind {
        ProcessKind::Combinational { sensitivity } => {
            for &signal in sensitivity {
                checker.signal_ty(signal)?;
            }
            let allowed: HashSet<SignalId> = sensitivity.iter().copied().collect();
            for signal in process.reads() {
                checker.signal_ty(signal)?;
                if !allowed.contains(&signal) {
                    return Err(NetlistError::SensitivityGap {
                        module: module_name.to_string(),
                        process: process_name.clone(),
                        signal: interner.resolve(module.signals.get(signal).name).to_string(),
                    });
                }
            }
        }
        ProcessKind::Clocked { clock, .. } => {
            let ty = checker.signal_ty(*clock)?;
            if ty.width != 1 {
                return Err(NetlistError::ClockWidth {
                    module: module_name.to_string(),
                    process: process_name.clone(),
                    width: ty.width,
                });
            }
        }
    }

    for stmt in &process.body {
        checker.check_stmt(stmt)?;
    }
    Ok(())
}

/// Width inference and validity checking for one process body.
struct ProcessChecker<'a> {
    module: &'a Module,
    module_name: &'a str,
    process_name: &'a str,
}

impl<'a> ProcessChecker<'a> {
    fn signal_ty(&self, id: SignalId) -> Result<SignalTy, NetlistError> {
        if self.module.signals.contains(id) {
            Ok(self.module.signals.get(id).ty)
        } else {
            Err(NetlistError::UnknownSignal {
                module: self.module_name.to_string(),
            })
        }
    }

    fn body_width(&self, source: WidthError) -> NetlistError {
        NetlistError::BodyWidth {
            module: self.module_name.to_string(),
            process: self.process_name.to_string(),
            source,
        }
    }

    fn condition_width(&self, width: u32) -> NetlistError {
        NetlistError::ConditionWidth {
            module: self.module_name.to_string(),
            process: self.process_name.to_string(),
            width,
        }
    }

    fn expr_ty(&self, expr: &Expr) -> Result<SignalTy, NetlistError> {
        match expr {
            Expr::Const(v) => Ok(SignalTy {
                width: v.width(),
                signed: v.is_signed(),
            }),
            Expr::Read(signal) => self.signal_ty(*signal),
            Expr::Slice { signal, high, low } => {
                let ty = self.signal_ty(*signal)?;
                if *high < *low || *high >= ty.width {
                    return Err(self.body_width(WidthError::SliceRange {
                        high: *high,
                        low: *low,
                        width: ty.width,
                    }));
                }
                Ok(SignalTy::bits(high - low + 1))
            }
            Expr::Concat(parts) => {
                let mut width = 0u32;
                for part in parts {
                    width += self.expr_ty(part)?.width;
                }
                Ok(SignalTy::bits(width))
            }
            Expr::Unary { op, arg } => {
                let ty = self.expr_ty(arg)?;
                Ok(match op {
                    UnaryOp::Not | UnaryOp::Neg => ty,
                    UnaryOp::RedAnd | UnaryOp::RedOr | UnaryOp::RedXor => SignalTy::bit(),
                })
            }
            Expr::Binary { op, lhs, rhs } => {
                let lt = self.expr_ty(lhs)?;
                let rt = self.expr_ty(rhs)?;
                if lt.width != rt.width {
                    return Err(self.body_width(WidthError::Mismatch {
                        op: op.name(),
                        left: lt.width,
                        right: rt.width,
                    }));
                }
                Ok(if op.is_comparison() {
                    SignalTy::bit()
                } else {
                    SignalTy {
                        width: lt.width,
                        signed: lt.signed && rt.signed,
                    }
                })
            }
            Expr::Mux {
                cond,
                when_true,
                when_false,
            } => {
                let ct = self.expr_ty(cond)?;
                if ct.width != 1 {
                    return Err(self.condition_width(ct.width));
                }
                let tt = self.expr_ty(when_true)?;
                let ft = self.expr_ty(when_false)?;
                if tt.width != ft.width {
                    return Err(self.body_width(WidthError::Mismatch {
                        op: "mux",
                        left: tt.width,
                        right: ft.width,
                    }));
                }
                Ok(SignalTy {
                    width: tt.width,
                    signed: tt.signed && ft.signed,
                })
            }
            Expr::ZeroExtend { width, arg } | Expr::SignExtend { width, arg } => {
                let ty = self.expr_ty(arg)?;
                if *width < ty.width {
                    return Err(self.body_width(WidthError::ExtendNarrows {
                        from: ty.width,
                        to: *width,
                    }));
                }
                Ok(SignalTy {
                    width: *width,
                    signed: ty.signed,
                })
            }
            Expr::Truncate { width, arg } => {
                let ty = self.expr_ty(arg)?;
                if *width > ty.width {
                    return Err(self.body_width(WidthError::TruncateWidens {
                        from: ty.width,
                        to: *width,
                    }));
                }
                Ok(SignalTy {
                    width: *width,
                    signed: ty.signed,
                })
            }
        }
    }

    fn check_stmt(&self, stmt: &Statement) -> Result<(), NetlistError> {
        match stmt {
            Statement::Assign { target, value } => {
                let vt = self.expr_ty(value)?;
                let tt = match target {
                    AssignTarget::Signal(signal) => self.signal_ty(*signal)?,
                    AssignTarget::Slice { signal, high, low } => {
                        let ty = self.signal_ty(*signal)?;
                        if *high < *low || *high >= ty.width {
                            return Err(self.body_width(WidthError::SliceRange {
                                high: *high,
                                low: *low,
                                width: ty.width,
                            }));
                        }
                        SignalTy::bits(high - low + 1)
                    }
                };
                if vt.width != tt.width {
                    return Err(self.body_width(WidthError::Mismatch {
                        op: "assign",
                        left: tt.width,
                        right: vt.width,
                    }));
                }
                Ok(())
            }
            Statement::If {
                cond,
                then_body,
                else_body,
            } => {
                let ct = self.expr_ty(cond)?;
                if ct.width != 1 {
                    return Err(self.condition_width(ct.width));
                }
                for s in then_body.iter().chain(else_body) {
                    self.check_stmt(s)?;
                }
                Ok(())
            }
            Statement::Case {
                subject,
                arms,
                default,
            } => {
                let st = self.expr_ty(subject)?;
                for arm in arms {
                    for pattern in &arm.matches {
                        if pattern.width() != st.width {
                            return Err(NetlistError::PatternWidth {
                                module: self.module_name.to_string(),
                                process: self.process_name.to_string(),
                                expected: st.width,
                                found: pattern.width(),
                            });
                        }
                        if pattern.has_x() {
                            return Err(NetlistError::PatternUnknown {
                                module: self.module_name.to_string(),
                                process: self.process_name.to_string(),
                            });
                        }
                    }
                    for s in &arm.body {
                        self.check_stmt(s)?;
                    }
                }
                for s in default {
                    self.check_stmt(s)?;
                }
                Ok(())
            }
        }
    }
}

/// Walks the hierarchy allocating nets and stamping out processes.
struct Flattener<'a> {
    design: &'a Design,
    interner: &'a Interner,
    nets: Arena<NetId, Net>,
    processes: Vec<FlatProcess>,
}

impl<'a> Flattener<'a> {
    fn path(&self, prefix: &str, name: Ident) -> String {
        let name = self.interner.resolve(name);
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        }
    }

    fn flatten(
        &mut self,
        module_id: ModuleId,
        prefix: &str,
        bound: &HashMap<SignalId, NetId>,
    ) -> Result<HashMap<SignalId, NetId>, NetlistError> {
        let module = self.design.modules.get(module_id);
        let mut map = HashMap::new();
        for (signal_id, signal) in module.signals.iter() {
            if let Some(&net) = bound.get(&signal_id) {
                // Port-backing signals bound by the parent share its net.
                map.insert(signal_id, net);
            } else {
                let net = self.nets.alloc(Net {
                    name: self.path(prefix, signal.name),
                    ty: signal.ty,
                    init: signal.init.clone(),
                });
                map.insert(signal_id, net);
            }
        }

        for (_, process) in module.processes.iter() {
            let trigger = match &process.kind {
                ProcessKind::Combinational { sensitivity } => FlatTrigger::Comb {
                    sensitivity: sensitivity.iter().map(|s| map[s]).collect(),
                },
                ProcessKind::Clocked { clock, edge } => FlatTrigger::Clocked {
                    clock: map[clock],
                    edge: *edge,
                },
            };
            self.processes.push(FlatProcess {
                name: self.path(prefix, process.name),
                trigger,
                body: process.body.clone(),
                map: map.clone(),
            });
        }

        for (_, inst) in module.instances.iter() {
            let child = self.design.modules.get(inst.module);
            let mut child_bound = HashMap::new();
            for (slot, port) in child.ports.iter().enumerate() {
                let signal = inst.bindings.get(slot).copied().flatten().ok_or_else(|| {
                    NetlistError::UnboundPort {
                        module: self.interner.resolve(module.name).to_string(),
                        instance: self.interner.resolve(inst.name).to_string(),
                        port: self.interner.resolve(port.name).to_string(),
                    }
                })?;
                // Bind-time checks cover builder-made designs; re-validate
                // so hand-assembled ones fail here instead of mid-run.
                let signal_ty = module.signals.get(signal).ty;
                if signal_ty.width != port.ty.width {
                    return Err(BindingError::WidthMismatch {
                        port: self.interner.resolve(port.name).to_string(),
                        port_width: port.ty.width,
                        signal: self.interner.resolve(module.signals.get(signal).name).to_string(),
                        signal_width: signal_ty.width,
                    }
                    .into());
                }
                child_bound.insert(port.signal, map[&signal]);
            }
            let child_prefix = self.path(prefix, inst.name);
            self.flatten(inst.module, &child_prefix, &child_bound)?;
        }

        Ok(map)
    }
}
